//! The generic extraction interpreter (spec §4.3, §9 "embedded scripting
//! runtime"). One engine drives all ten languages: it runs a language's
//! compiled query over the parse tree, groups captures into definitions,
//! references, and imports by capture-name convention, and stages them
//! through an [`Inserter`] (batch or direct).
//!
//! Scope and parent nesting are derived structurally from span containment
//! rather than from the query itself, so the same interpreter works for
//! every grammar without per-language tree-walking code.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor, Tree};

use canopy_core::store::batch_api::{
    Inserter, NewImport, NewReference, NewScope, NewSymbol,
};
use canopy_core::types::{
    ImportKind, ReferenceContext, Scope, ScopeKind, Span, Symbol, SymbolKind, Visibility,
};
use canopy_core::StoreResult;

use crate::bridge::node_text;

/// One `def.*`/`ref.*` capture resolved into a span and classified kind.
#[derive(Debug, Clone)]
struct RawDef {
    kind: SymbolKind,
    name: String,
    span: Span,
}

#[derive(Debug, Clone)]
struct RawRef {
    context: ReferenceContext,
    name: String,
    receiver: Option<String>,
    span: Span,
}

#[derive(Debug, Clone)]
struct RawImport {
    source: String,
    span: Span,
}

fn kind_for_capture(capture: &str) -> Option<SymbolKind> {
    let root = capture.strip_prefix("def.")?.split('.').next()?;
    match root {
        "function" => Some(SymbolKind::Function),
        "method" => Some(SymbolKind::Method),
        "class" => Some(SymbolKind::Class),
        "struct" => Some(SymbolKind::Struct),
        "interface" => Some(SymbolKind::Interface),
        "trait" => Some(SymbolKind::Interface),
        "enum" => Some(SymbolKind::Enum),
        "field" => Some(SymbolKind::Field),
        "module" => Some(SymbolKind::Module),
        "namespace" => Some(SymbolKind::Namespace),
        "package" => Some(SymbolKind::Package),
        _ => None,
    }
}

fn node_span(node: tree_sitter::Node<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(start.row as u32, start.column as u32, end.row as u32, end.column as u32)
}

/// Walks every match of `query` over `tree`, sorting raw captures into
/// definitions, references, and imports (spec §4.3 step 4: "one pass per
/// file produces all extraction rows").
fn collect(query: &Query, tree: &Tree, source: &[u8]) -> (Vec<RawDef>, Vec<RawRef>, Vec<RawImport>) {
    let mut defs: Vec<RawDef> = Vec::new();
    let mut refs: Vec<RawRef> = Vec::new();
    let mut imports: Vec<RawImport> = Vec::new();

    let capture_names = query.capture_names();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), source);

    while let Some(m) = matches.next() {
        let mut def_name: Option<String> = None;
        let mut def_span: Option<Span> = None;
        let mut def_kind: Option<SymbolKind> = None;
        let mut call_name: Option<String> = None;
        let mut call_span: Option<Span> = None;
        let mut call_receiver: Option<String> = None;
        let mut field_name: Option<String> = None;
        let mut field_span: Option<Span> = None;
        let mut field_receiver: Option<String> = None;
        let mut impl_name: Option<String> = None;
        let mut impl_span: Option<Span> = None;
        let mut impl_receiver: Option<String> = None;
        let mut import_source: Option<String> = None;
        let mut import_span: Option<Span> = None;

        for cap in m.captures {
            let name = capture_names[cap.index as usize];
            let text = node_text(cap.node, source);

            if let Some(kind) = kind_for_capture(name) {
                // the bare `def.<kind>` capture anchors the definition's span
                def_kind = Some(kind);
                def_span = Some(node_span(cap.node));
            } else if name.ends_with(".name") && name.starts_with("def.") {
                def_name = Some(text.to_string());
            } else if name == "ref.call" {
                call_span = Some(node_span(cap.node));
            } else if name == "ref.call.name" {
                call_name = Some(text.to_string());
            } else if name == "ref.call.receiver" {
                call_receiver = Some(text.to_string());
            } else if name == "ref.field_access" {
                field_span = Some(node_span(cap.node));
            } else if name == "ref.field_access.name" {
                field_name = Some(text.to_string());
            } else if name == "ref.field_access.receiver" {
                field_receiver = Some(text.to_string());
            } else if name == "ref.implements" {
                impl_span = Some(node_span(cap.node));
            } else if name == "ref.implements.name" {
                impl_name = Some(text.to_string());
            } else if name == "ref.implements.receiver" {
                impl_receiver = Some(text.to_string());
            } else if name == "def.import" {
                import_span = Some(node_span(cap.node));
            } else if name == "def.import.source" {
                import_source = Some(text.trim_matches(['"', '\'']).to_string());
            }
        }

        if let (Some(kind), Some(name), Some(span)) = (def_kind, def_name, def_span) {
            defs.push(RawDef { kind, name, span });
        }
        if let (Some(name), Some(span)) = (call_name, call_span) {
            refs.push(RawRef {
                context: ReferenceContext::Call,
                name,
                receiver: call_receiver,
                span,
            });
        }
        if let (Some(name), Some(span)) = (field_name, field_span) {
            refs.push(RawRef {
                context: ReferenceContext::FieldAccess,
                name,
                receiver: field_receiver,
                span,
            });
        }
        if let (Some(name), Some(span)) = (impl_name, impl_span) {
            refs.push(RawRef {
                context: ReferenceContext::Implements,
                name,
                receiver: impl_receiver,
                span,
            });
        }
        if let (Some(source), Some(span)) = (import_source, import_span) {
            imports.push(RawImport { source, span });
        }
    }

    defs.sort_by_key(|d| (d.span.start_line, d.span.start_col));
    defs.dedup_by(|a, b| a.name == b.name && a.span == b.span);
    (defs, refs, imports)
}

fn scope_kind_for(kind: SymbolKind) -> ScopeKind {
    match kind {
        SymbolKind::Function | SymbolKind::Method => ScopeKind::Function,
        SymbolKind::Class | SymbolKind::Struct | SymbolKind::Interface | SymbolKind::Enum => {
            ScopeKind::Class
        }
        _ => ScopeKind::Block,
    }
}

/// Extract one file into `store` (batch or direct): scopes, symbols,
/// references, and imports (spec §4.3 steps 4-6).
pub fn extract_file(
    store: &mut impl Inserter,
    query: &Query,
    tree: &Tree,
    source: &[u8],
    file_id: i64,
) -> StoreResult<()> {
    let (defs, raw_refs, raw_imports) = collect(query, tree, source);

    let file_span = node_span(tree.root_node());
    let file_scope_id = store.insert_scope(NewScope {
        file_id,
        kind: ScopeKind::File,
        span: file_span,
        parent_id: None,
        symbol_id: None,
    })?;

    // Stack of (symbol span, symbol id, scope id) — innermost on top. A new
    // definition nests under the top entry whose span contains it.
    let mut symbol_stack: Vec<(Span, i64, i64)> = Vec::new();
    let mut inserted: Vec<Symbol> = Vec::new();

    for def in &defs {
        while let Some((top_span, _, _)) = symbol_stack.last() {
            if top_span.contains_span(&def.span) && *top_span != def.span {
                break;
            }
            symbol_stack.pop();
        }
        let (parent_id, parent_scope_id, parent_kind) = match symbol_stack.last() {
            Some((_, id, scope_id)) => (
                Some(*id),
                *scope_id,
                inserted.iter().find(|s| s.id == *id).map(|s| s.kind),
            ),
            None => (None, file_scope_id, None),
        };

        let visibility = if def.name.chars().next().is_some_and(|c| c.is_uppercase()) {
            Visibility::Public
        } else {
            Visibility::Private
        };

        let symbol_id = store.insert_symbol(NewSymbol {
            name: def.name.clone(),
            kind: def.kind,
            visibility,
            modifiers: vec![],
            span: def.span,
            file_id: Some(file_id),
            parent_id,
            signature_hash: canopy_core::hash::signature_hash(&canopy_core::hash::SymbolIdentity {
                name: &def.name,
                kind: def.kind.as_str(),
                visibility: visibility.as_str(),
                modifiers: &[],
                members: &[],
                params: &[],
                type_params: &[],
            }),
        })?;

        if matches!(
            parent_kind,
            Some(SymbolKind::Class) | Some(SymbolKind::Struct) | Some(SymbolKind::Interface)
        ) {
            store.insert_type_member(canopy_core::store::batch_api::NewTypeMember {
                symbol_id: parent_id.unwrap(),
                name: def.name.clone(),
                kind: def.kind.as_str().to_string(),
                type_expr: None,
            })?;
        }

        let scope_id = store.insert_scope(NewScope {
            file_id,
            kind: scope_kind_for(def.kind),
            span: def.span,
            parent_id: Some(parent_scope_id),
            symbol_id: Some(symbol_id),
        })?;

        inserted.push(Symbol {
            id: symbol_id,
            name: def.name.clone(),
            kind: def.kind,
            visibility,
            modifiers: vec![],
            span: def.span,
            file_id: Some(file_id),
            parent_id,
            signature_hash: String::new(),
        });
        symbol_stack.push((def.span, symbol_id, scope_id));
    }

    let enclosing_scope = |span: &Span| -> i64 {
        symbol_stack
            .iter()
            .rev()
            .find(|(s, _, _)| s.contains_span(span))
            .map(|(_, _, scope_id)| *scope_id)
            .unwrap_or(file_scope_id)
    };

    for r in &raw_refs {
        store.insert_reference(NewReference {
            file_id,
            scope_id: Some(enclosing_scope(&r.span)),
            name: r.name.clone(),
            span: r.span,
            context: r.context,
            receiver: r.receiver.clone(),
        })?;
    }

    for imp in &raw_imports {
        store.insert_import(NewImport {
            file_id,
            source: imp.source.clone(),
            imported_name: None,
            local_alias: None,
            kind: ImportKind::Module,
            scope_id: file_scope_id,
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ParserBridge;
    use crate::queries::query_source_for;

    fn extract_rust(source: &[u8]) -> (canopy_core::Store, i64) {
        let mut store = canopy_core::Store::in_memory().unwrap();
        let file_id = store
            .insert_file(&canopy_core::store::extraction::NewFileRow {
                path: "a.rs",
                language: "rust",
                content_hash: "c1",
                line_count: 10,
                last_indexed_at: 0,
            })
            .unwrap();
        let mut bridge = ParserBridge::new();
        let tree = bridge.parse("rust", source).unwrap();
        let query = crate::bridge::compile_query("rust", query_source_for("rust").unwrap()).unwrap();
        extract_file(&mut store, &query, &tree, source, file_id).unwrap();
        (store, file_id)
    }

    #[test]
    fn extracts_top_level_function() {
        let (store, file_id) = extract_rust(b"fn foo() {}");
        let syms = store.symbols_by_file(file_id);
        assert_eq!(syms.len(), 1);
        assert_eq!(syms[0].name, "foo");
        assert_eq!(syms[0].kind, SymbolKind::Function);
    }

    #[test]
    fn struct_and_free_function_both_extracted() {
        let src = b"struct Foo;\nfn bar() {}\n";
        let (store, file_id) = extract_rust(src);
        let syms = store.symbols_by_file(file_id);
        let foo = syms.iter().find(|s| s.name == "Foo").unwrap();
        let bar = syms.iter().find(|s| s.name == "bar").unwrap();
        assert_eq!(foo.kind, SymbolKind::Struct);
        assert_eq!(bar.kind, SymbolKind::Function);
    }

    #[test]
    fn nested_struct_field_becomes_type_member() {
        let src = b"struct Foo {\n    x: i32,\n}\n";
        let (store, file_id) = extract_rust(src);
        let syms = store.symbols_by_file(file_id);
        let foo = syms.iter().find(|s| s.name == "Foo").unwrap();
        let members = store.type_members_of(foo.id);
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "x");
    }

    #[test]
    fn captures_call_reference() {
        let src = b"fn foo() {}\nfn main() { foo(); }\n";
        let (store, file_id) = extract_rust(src);
        let refs = store.references_in_file(file_id);
        assert!(refs.iter().any(|r| r.name == "foo" && r.context == ReferenceContext::Call));
    }
}
