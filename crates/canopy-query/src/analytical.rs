//! `unused`/`hotspots`/`project_summary` (spec §4.6, §8 property 6: unused
//! and hotspots must be disjoint).

use std::collections::HashMap;

use canopy_core::types::Symbol;
use canopy_core::Store;

use crate::callgraph::{callees, callers};
use crate::counts::ref_counts;
use crate::enumeration::{matches_filter, sort_symbols};
use crate::filter::{Page, Paginated, SortField, SortOrder, SymbolFilter};

/// Symbols with zero resolved references, excluding container kinds (spec
/// §4.6 `unused`).
pub fn unused(store: &Store, filter: &SymbolFilter, sort: SortField, order: SortOrder, page: Page) -> Paginated<Symbol> {
    let mut matched: Vec<Symbol> = store
        .unreferenced_symbol_ids()
        .into_iter()
        .filter_map(|id| store.symbol(id))
        .filter(|s| matches_filter(store, s, filter))
        .collect();
    sort_symbols(store, &mut matched, sort, order);
    let total_count = matched.len();
    Paginated {
        items: page.apply(&matched),
        total_count,
    }
}

pub struct Hotspot {
    pub symbol: Symbol,
    pub external_ref_count: usize,
    pub fan_in: usize,
    pub fan_out: usize,
}

/// Top-`n` symbols by external reference count, with direct fan-in/fan-out
/// (spec §4.6 `hotspots`; §9: external ref count is the ranking key).
pub fn hotspots(store: &Store, n: usize) -> Vec<Hotspot> {
    let mut ranked: Vec<Hotspot> = all_symbols(store)
        .into_iter()
        .map(|symbol| {
            let counts = ref_counts(store, symbol.id, symbol.file_id);
            let fan_in = callers(store, symbol.id).len();
            let fan_out = callees(store, symbol.id).len();
            Hotspot {
                external_ref_count: counts.external,
                fan_in,
                fan_out,
                symbol,
            }
        })
        .filter(|h| h.external_ref_count > 0)
        .collect();
    ranked.sort_by(|a, b| b.external_ref_count.cmp(&a.external_ref_count));
    ranked.truncate(n);
    ranked
}

pub struct LanguageSummary {
    pub language: String,
    pub file_count: usize,
    pub symbol_count: usize,
}

pub struct ProjectSummary {
    pub languages: Vec<LanguageSummary>,
    pub kind_distribution: HashMap<String, usize>,
    pub package_count: usize,
    pub top_symbols: Vec<Symbol>,
}

/// Per-language file/symbol counts, kind distribution, package count, and
/// the top-`top` symbols by total reference count (spec §4.6 `project_summary`).
pub fn project_summary(store: &Store, top: usize) -> ProjectSummary {
    let files = store.all_files();
    let mut per_language: HashMap<String, (usize, usize)> = HashMap::new();
    let mut kind_distribution: HashMap<String, usize> = HashMap::new();
    let mut package_count = 0usize;

    for file in &files {
        let symbols = store.symbols_by_file(file.id);
        let entry = per_language.entry(file.language.clone()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += symbols.len();
        for symbol in &symbols {
            *kind_distribution.entry(symbol.kind.as_str().to_string()).or_insert(0) += 1;
            if matches!(
                symbol.kind,
                canopy_core::types::SymbolKind::Package
                    | canopy_core::types::SymbolKind::Module
                    | canopy_core::types::SymbolKind::Namespace
            ) && symbol.parent_id.is_none()
            {
                package_count += 1;
            }
        }
    }

    let mut languages: Vec<LanguageSummary> = per_language
        .into_iter()
        .map(|(language, (file_count, symbol_count))| LanguageSummary {
            language,
            file_count,
            symbol_count,
        })
        .collect();
    languages.sort_by(|a, b| a.language.cmp(&b.language));

    let mut all: Vec<Symbol> = all_symbols(store);
    all.sort_by(|a, b| {
        let ra = ref_counts(store, b.id, b.file_id).total();
        let rb = ref_counts(store, a.id, a.file_id).total();
        ra.cmp(&rb)
    });
    all.truncate(top);

    ProjectSummary {
        languages,
        kind_distribution,
        package_count,
        top_symbols: all,
    }
}

fn all_symbols(store: &Store) -> Vec<Symbol> {
    store.all_files().into_iter().flat_map(|f| store.symbols_by_file(f.id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::store::batch_api::{Inserter, NewReference, NewScope, NewSymbol};
    use canopy_core::store::extraction::NewFileRow;
    use canopy_core::types::{Id, ReferenceContext, ResolutionKind, ScopeKind, Span, SymbolKind, Visibility};

    fn seed(store: &mut Store) -> (Id, Id) {
        let file_id = store
            .insert_file(&NewFileRow {
                path: "a.rs",
                language: "rust",
                content_hash: "c1",
                line_count: 10,
                last_indexed_at: 0,
            })
            .unwrap();
        let used = store
            .insert_symbol(NewSymbol {
                name: "used".into(),
                kind: SymbolKind::Function,
                visibility: Visibility::Public,
                modifiers: vec![],
                span: Span::new(0, 0, 1, 0),
                file_id: Some(file_id),
                parent_id: None,
                signature_hash: "h1".into(),
            })
            .unwrap();
        let dead = store
            .insert_symbol(NewSymbol {
                name: "dead".into(),
                kind: SymbolKind::Function,
                visibility: Visibility::Public,
                modifiers: vec![],
                span: Span::new(2, 0, 3, 0),
                file_id: Some(file_id),
                parent_id: None,
                signature_hash: "h2".into(),
            })
            .unwrap();
        let scope_id = store
            .insert_scope(NewScope {
                file_id,
                kind: ScopeKind::File,
                span: Span::new(0, 0, 10, 0),
                parent_id: None,
                symbol_id: None,
            })
            .unwrap();
        let reference_id = store
            .insert_reference(NewReference {
                file_id,
                scope_id: Some(scope_id),
                name: "used".into(),
                span: Span::new(5, 0, 5, 4),
                context: ReferenceContext::Call,
                receiver: None,
            })
            .unwrap();
        store
            .insert_resolved_reference(reference_id, used, 1.0, ResolutionKind::Direct)
            .unwrap();
        (used, dead)
    }

    #[test]
    fn unused_and_hotspots_are_disjoint() {
        let mut store = Store::in_memory().unwrap();
        let (used, dead) = seed(&mut store);
        let unused_page = unused(&store, &SymbolFilter::default(), SortField::Name, SortOrder::Asc, Page::default());
        let unused_ids: Vec<Id> = unused_page.items.iter().map(|s| s.id).collect();
        assert!(unused_ids.contains(&dead));
        assert!(!unused_ids.contains(&used));

        let hot = hotspots(&store, 10);
        let hot_ids: Vec<Id> = hot.iter().map(|h| h.symbol.id).collect();
        assert!(!hot_ids.contains(&dead));
        for id in hot_ids {
            assert!(!unused_ids.contains(&id));
        }
    }

    #[test]
    fn summary_counts_languages_and_kinds() {
        let mut store = Store::in_memory().unwrap();
        seed(&mut store);
        let summary = project_summary(&store, 5);
        assert_eq!(summary.languages.len(), 1);
        assert_eq!(summary.languages[0].file_count, 1);
        assert_eq!(summary.languages[0].symbol_count, 2);
    }
}
