use std::path::PathBuf;

use canopy_core::types::{Id, SymbolKind};
use canopy_core::{CanopyConfig, Store};
use canopy_output::{JsonFormatter, OutputFormatter, QueryEnvelope, TextFormatter};
use canopy_query::filter::{SortField, SortOrder};

use crate::cli_args::{Format, ListArgs, OrderArg, QueryCommand, SortArg};

pub fn run(query: QueryCommand, list: ListArgs, format: Format, db: Option<PathBuf>) -> i32 {
    let root = PathBuf::from(".");
    let db_path = db.unwrap_or_else(|| CanopyConfig::default_db_path(&root));
    let store = match Store::open(&db_path) {
        Ok(s) => s,
        Err(e) => return emit(format, QueryEnvelope::err(command_name(&query), e.to_string())),
    };

    let command = command_name(&query);
    let sort = to_sort_field(list.sort);
    let order = to_sort_order(list.order);
    let page = canopy_query::filter::Page::clamped(list.offset, list.limit);

    let envelope = match dispatch(&store, query, sort, order, page) {
        Ok(envelope) => envelope,
        Err(message) => QueryEnvelope::err(command, message),
    };
    emit(format, envelope)
}

fn command_name(query: &QueryCommand) -> &'static str {
    match query {
        QueryCommand::SymbolAt { .. } => "symbol-at",
        QueryCommand::Definition { .. } => "definition",
        QueryCommand::References { .. } => "references",
        QueryCommand::Callers { .. } => "callers",
        QueryCommand::Callees { .. } => "callees",
        QueryCommand::Implementations { .. } => "implementations",
        QueryCommand::Implements { .. } => "implements",
        QueryCommand::TransitiveCallers { .. } => "transitive-callers",
        QueryCommand::TransitiveCallees { .. } => "transitive-callees",
        QueryCommand::SymbolDetail { .. } => "symbol-detail",
        QueryCommand::ScopeAt { .. } => "scope-at",
        QueryCommand::TypeHierarchy { .. } => "type-hierarchy",
        QueryCommand::Extensions { .. } => "extensions",
        QueryCommand::Reexports { .. } => "reexports",
        QueryCommand::Symbols { .. } => "symbols",
        QueryCommand::Search { .. } => "search",
        QueryCommand::Files { .. } => "files",
        QueryCommand::Packages => "packages",
        QueryCommand::Summary { .. } => "summary",
        QueryCommand::PackageSummary { .. } => "package-summary",
        QueryCommand::Deps { .. } => "deps",
        QueryCommand::Dependents { .. } => "dependents",
        QueryCommand::PackageGraph => "package-graph",
        QueryCommand::CircularDeps => "circular-deps",
        QueryCommand::Unused => "unused",
        QueryCommand::Hotspots { .. } => "hotspots",
    }
}

fn to_sort_field(sort: SortArg) -> SortField {
    match sort {
        SortArg::Name => SortField::Name,
        SortArg::Kind => SortField::Kind,
        SortArg::File => SortField::File,
        SortArg::RefCount => SortField::RefCount,
        SortArg::ExternalRefCount => SortField::ExternalRefCount,
    }
}

fn to_sort_order(order: OrderArg) -> SortOrder {
    match order {
        OrderArg::Asc => SortOrder::Asc,
        OrderArg::Desc => SortOrder::Desc,
    }
}

/// Resolves a `SymbolRef` (either a position triple or `--symbol <id>`) to a
/// symbol id (spec §6.1).
fn resolve_symbol_ref(store: &Store, target: &crate::cli_args::SymbolRef) -> Result<Id, String> {
    if let Some(id) = target.symbol {
        return Ok(id);
    }
    let (Some(file), Some(line), Some(col)) = (&target.file, target.line, target.col) else {
        return Err("provide either <file> <line> <col> or --symbol <id>".to_string());
    };
    let file_id = store.file_id_for_path(file).ok_or_else(|| format!("file not indexed: {file}"))?;
    canopy_query::symbol_at(store, file_id, line, col)
        .map(|s| s.id)
        .ok_or_else(|| format!("no symbol at {file}:{line}:{col}"))
}

fn resolve_file(store: &Store, file: &str) -> Result<Id, String> {
    store.file_id_for_path(file).ok_or_else(|| format!("file not indexed: {file}"))
}

fn dispatch(
    store: &Store,
    query: QueryCommand,
    sort: SortField,
    order: SortOrder,
    page: canopy_query::filter::Page,
) -> Result<QueryEnvelope, String> {
    let command = command_name(&query);
    match query {
        QueryCommand::SymbolAt { file, line, col } => {
            let file_id = resolve_file(store, &file)?;
            let symbol = canopy_query::symbol_at(store, file_id, line, col);
            Ok(QueryEnvelope::ok(command, symbol, None))
        }
        QueryCommand::Definition { file, line, col } => {
            let file_id = resolve_file(store, &file)?;
            let defs = canopy_query::definition_at(store, file_id, line, col);
            let count = defs.len();
            Ok(QueryEnvelope::ok(command, defs, Some(count)))
        }
        QueryCommand::ScopeAt { file, line, col } => {
            let file_id = resolve_file(store, &file)?;
            let scopes = canopy_query::scope_at(store, file_id, line, col);
            let count = scopes.len();
            Ok(QueryEnvelope::ok(command, scopes, Some(count)))
        }
        QueryCommand::References { target } => {
            let id = resolve_symbol_ref(store, &target)?;
            let refs: Vec<_> = store.references_to(id).into_iter().map(|(r, _)| r).collect();
            let count = refs.len();
            Ok(QueryEnvelope::ok(command, refs, Some(count)))
        }
        QueryCommand::Callers { target } => {
            let id = resolve_symbol_ref(store, &target)?;
            let edges = canopy_query::callers(store, id);
            let count = edges.len();
            Ok(QueryEnvelope::ok(command, edges, Some(count)))
        }
        QueryCommand::Callees { target } => {
            let id = resolve_symbol_ref(store, &target)?;
            let edges = canopy_query::callees(store, id);
            let count = edges.len();
            Ok(QueryEnvelope::ok(command, edges, Some(count)))
        }
        QueryCommand::Implementations { target } => {
            let id = resolve_symbol_ref(store, &target)?;
            let impls = store.implementations_of(id);
            let count = impls.len();
            Ok(QueryEnvelope::ok(command, impls, Some(count)))
        }
        QueryCommand::Implements { target } => {
            let id = resolve_symbol_ref(store, &target)?;
            let impls = canopy_query::implements_interfaces(store, id);
            let count = impls.len();
            Ok(QueryEnvelope::ok(command, impls, Some(count)))
        }
        QueryCommand::TransitiveCallers { target, max_depth } => {
            let id = resolve_symbol_ref(store, &target)?;
            let graph = canopy_query::transitive_callers(store, id, max_depth).map_err(|e| e.to_string())?;
            Ok(QueryEnvelope::ok(
                command,
                serde_json::json!({"root": graph.root, "nodes": graph.nodes, "edges": graph.edges}),
                Some(graph.nodes.len()),
            ))
        }
        QueryCommand::TransitiveCallees { target, max_depth } => {
            let id = resolve_symbol_ref(store, &target)?;
            let graph = canopy_query::transitive_callees(store, id, max_depth).map_err(|e| e.to_string())?;
            Ok(QueryEnvelope::ok(
                command,
                serde_json::json!({"root": graph.root, "nodes": graph.nodes, "edges": graph.edges}),
                Some(graph.nodes.len()),
            ))
        }
        QueryCommand::SymbolDetail { target } => {
            let id = resolve_symbol_ref(store, &target)?;
            let detail = canopy_query::symbol_detail(store, id).ok_or_else(|| format!("no symbol with id {id}"))?;
            Ok(QueryEnvelope::ok(
                command,
                serde_json::json!({
                    "symbol": detail.symbol,
                    "params": detail.params,
                    "members": detail.members,
                    "type_params": detail.type_params,
                    "annotations": detail.annotations,
                }),
                None,
            ))
        }
        QueryCommand::TypeHierarchy { target } => {
            let id = resolve_symbol_ref(store, &target)?;
            let hierarchy = canopy_query::type_hierarchy(store, id);
            Ok(QueryEnvelope::ok(
                command,
                serde_json::json!({
                    "implements": hierarchy.implements,
                    "implemented_by": hierarchy.implemented_by,
                    "composes": hierarchy.composes,
                    "composed_by": hierarchy.composed_by,
                    "extensions": hierarchy.extensions,
                }),
                None,
            ))
        }
        QueryCommand::Extensions { target } => {
            let id = resolve_symbol_ref(store, &target)?;
            let bindings = store.extension_bindings_for_type(id);
            let count = bindings.len();
            Ok(QueryEnvelope::ok(command, bindings, Some(count)))
        }
        QueryCommand::Reexports { target } => {
            let id = resolve_symbol_ref(store, &target)?;
            let reexports = canopy_query::reexports_of(store, id);
            let count = reexports.len();
            Ok(QueryEnvelope::ok(command, reexports, Some(count)))
        }
        QueryCommand::Symbols { kind, file_path_prefix } => {
            let filter = build_filter(kind, file_path_prefix)?;
            let result = canopy_query::symbols(store, &filter, sort, order, page);
            Ok(QueryEnvelope::ok(command, result.items, Some(result.total_count)))
        }
        QueryCommand::Search { pattern, kind } => {
            let filter = build_filter(kind, None)?;
            let result = canopy_query::search_symbols(store, &pattern, &filter, sort, order, page);
            Ok(QueryEnvelope::ok(command, result.items, Some(result.total_count)))
        }
        QueryCommand::Files { language } => {
            let files = match language {
                Some(lang) => store.files_by_language(&lang),
                None => store.all_files(),
            };
            let count = files.len();
            Ok(QueryEnvelope::ok(command, page.apply(&files), Some(count)))
        }
        QueryCommand::Packages => {
            let packages: Vec<_> = store
                .symbols_by_kind(SymbolKind::Package)
                .into_iter()
                .chain(store.symbols_by_kind(SymbolKind::Module))
                .chain(store.symbols_by_kind(SymbolKind::Namespace))
                .filter(|s| s.parent_id.is_none())
                .collect();
            let count = packages.len();
            Ok(QueryEnvelope::ok(command, page.apply(&packages), Some(count)))
        }
        QueryCommand::Summary { top } => {
            let summary = canopy_query::project_summary(store, top);
            let languages: Vec<_> = summary
                .languages
                .iter()
                .map(|l| serde_json::json!({"language": l.language, "file_count": l.file_count, "symbol_count": l.symbol_count}))
                .collect();
            Ok(QueryEnvelope::ok(
                command,
                serde_json::json!({
                    "languages": languages,
                    "kind_distribution": summary.kind_distribution,
                    "package_count": summary.package_count,
                    "top_symbols": summary.top_symbols,
                }),
                None,
            ))
        }
        QueryCommand::PackageSummary { package_id } => {
            let summary = canopy_query::deps::package_summary(store, package_id)
                .ok_or_else(|| format!("no package with id {package_id}"))?;
            Ok(QueryEnvelope::ok(
                command,
                serde_json::json!({
                    "package_symbol_id": summary.package_symbol_id,
                    "file_count": summary.file_count,
                    "symbol_count": summary.symbol_count,
                    "language": summary.language,
                }),
                None,
            ))
        }
        QueryCommand::Deps { package_id } => {
            let edges: Vec<_> = canopy_query::package_dependency_graph(store)
                .into_iter()
                .filter(|e| e.from_pkg == package_id)
                .collect();
            let count = edges.len();
            Ok(QueryEnvelope::ok(command, edges_to_json(&edges), Some(count)))
        }
        QueryCommand::Dependents { package_id } => {
            let edges: Vec<_> = canopy_query::package_dependency_graph(store)
                .into_iter()
                .filter(|e| e.to_pkg == package_id)
                .collect();
            let count = edges.len();
            Ok(QueryEnvelope::ok(command, edges_to_json(&edges), Some(count)))
        }
        QueryCommand::PackageGraph => {
            let edges = canopy_query::package_dependency_graph(store);
            let count = edges.len();
            Ok(QueryEnvelope::ok(command, edges_to_json(&edges), Some(count)))
        }
        QueryCommand::CircularDeps => {
            let cycles = canopy_query::circular_dependencies(store);
            let count = cycles.len();
            Ok(QueryEnvelope::ok(command, cycles, Some(count)))
        }
        QueryCommand::Unused => {
            let result = canopy_query::unused(store, &canopy_query::SymbolFilter::default(), sort, order, page);
            Ok(QueryEnvelope::ok(command, result.items, Some(result.total_count)))
        }
        QueryCommand::Hotspots { n } => {
            let hotspots = canopy_query::hotspots(store, n);
            let payload: Vec<_> = hotspots
                .iter()
                .map(|h| {
                    serde_json::json!({
                        "symbol": h.symbol,
                        "external_ref_count": h.external_ref_count,
                        "fan_in": h.fan_in,
                        "fan_out": h.fan_out,
                    })
                })
                .collect();
            let count = payload.len();
            Ok(QueryEnvelope::ok(command, payload, Some(count)))
        }
    }
}

fn edges_to_json(edges: &[canopy_query::PackageEdge]) -> Vec<serde_json::Value> {
    edges
        .iter()
        .map(|e| serde_json::json!({"from_pkg": e.from_pkg, "to_pkg": e.to_pkg, "count": e.count}))
        .collect()
}

fn build_filter(kind: Option<String>, file_path_prefix: Option<String>) -> Result<canopy_query::SymbolFilter, String> {
    let kinds = match kind {
        Some(k) => Some(vec![SymbolKind::parse(&k).ok_or_else(|| format!("unknown symbol kind: {k}"))?]),
        None => None,
    };
    Ok(canopy_query::SymbolFilter {
        kinds,
        file_path_prefix,
        ..Default::default()
    })
}

fn emit(format: Format, envelope: QueryEnvelope) -> i32 {
    let rendered = match format {
        Format::Json => JsonFormatter.format(&envelope),
        Format::Text => TextFormatter.format(&envelope),
    };
    let is_error = envelope.is_error();
    if is_error && format == Format::Text {
        eprintln!("{rendered}");
    } else {
        println!("{rendered}");
    }
    if is_error {
        1
    } else {
        0
    }
}
