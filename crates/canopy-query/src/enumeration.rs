//! `symbols`/`search_symbols` (spec §4.6): filtered, sorted, paginated symbol
//! listings. Filtering happens in memory over the store's unfiltered symbol
//! set — the store has no secondary indices for the compound predicates this
//! supports, and repositories stay small enough that a full scan is fine.

use canopy_core::types::Symbol;
use canopy_core::Store;

use crate::counts::ref_counts;
use crate::filter::{glob_to_like, Page, Paginated, SortField, SortOrder, SymbolFilter};

pub(crate) fn matches_filter(store: &Store, symbol: &Symbol, filter: &SymbolFilter) -> bool {
    if let Some(kinds) = &filter.kinds {
        if !kinds.contains(&symbol.kind) {
            return false;
        }
    }
    if let Some(vis) = filter.visibility {
        if symbol.visibility != vis {
            return false;
        }
    }
    if !filter.modifiers.is_empty() && !filter.modifiers.iter().all(|m| symbol.modifiers.contains(m)) {
        return false;
    }
    if let Some(file_id) = filter.file_id {
        if symbol.file_id != Some(file_id) {
            return false;
        }
    }
    if let Some(parent_id) = filter.parent_id {
        if symbol.parent_id != Some(parent_id) {
            return false;
        }
    }
    if let Some(prefix) = &filter.file_path_prefix {
        let normalized = normalize_prefix(prefix);
        let path = symbol.file_id.and_then(|id| store.file(id)).map(|f| f.path);
        if !path.is_some_and(|p| p.starts_with(&normalized)) {
            return false;
        }
    }
    if filter.min_ref_count.is_some() || filter.max_ref_count.is_some() {
        let total = ref_counts(store, symbol.id, symbol.file_id).total();
        if filter.min_ref_count.is_some_and(|min| total < min) {
            return false;
        }
        if filter.max_ref_count.is_some_and(|max| total > max) {
            return false;
        }
    }
    true
}

fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}

fn sort_key(store: &Store, symbol: &Symbol, field: SortField) -> (String, i64) {
    match field {
        SortField::Name => (symbol.name.clone(), 0),
        SortField::Kind => (symbol.kind.as_str().to_string(), 0),
        SortField::File => (
            symbol.file_id.and_then(|id| store.file(id)).map(|f| f.path).unwrap_or_default(),
            0,
        ),
        SortField::RefCount => (String::new(), ref_counts(store, symbol.id, symbol.file_id).total() as i64),
        SortField::ExternalRefCount => (
            String::new(),
            ref_counts(store, symbol.id, symbol.file_id).external as i64,
        ),
    }
}

pub(crate) fn sort_symbols(store: &Store, symbols: &mut [Symbol], field: SortField, order: SortOrder) {
    symbols.sort_by(|a, b| {
        let ka = sort_key(store, a, field);
        let kb = sort_key(store, b, field);
        let cmp = ka.cmp(&kb);
        if order == SortOrder::Desc {
            cmp.reverse()
        } else {
            cmp
        }
    });
}

/// All symbols matching `filter`, sorted and paginated (spec §4.6 `symbols`).
pub fn symbols(
    store: &Store,
    filter: &SymbolFilter,
    sort: SortField,
    order: SortOrder,
    page: Page,
) -> Paginated<Symbol> {
    let mut matched: Vec<Symbol> = all_symbols(store)
        .into_iter()
        .filter(|s| matches_filter(store, s, filter))
        .collect();
    sort_symbols(store, &mut matched, sort, order);
    let total_count = matched.len();
    Paginated {
        items: page.apply(&matched),
        total_count,
    }
}

/// Glob-matched symbol search (spec §4.6 `search_symbols`, §8 property 9).
pub fn search_symbols(
    store: &Store,
    glob: &str,
    filter: &SymbolFilter,
    sort: SortField,
    order: SortOrder,
    page: Page,
) -> Paginated<Symbol> {
    let like = glob_to_like(glob);
    let mut matched: Vec<Symbol> = store
        .symbols_like(&like)
        .into_iter()
        .filter(|s| matches_filter(store, s, filter))
        .collect();
    sort_symbols(store, &mut matched, sort, order);
    let total_count = matched.len();
    Paginated {
        items: page.apply(&matched),
        total_count,
    }
}

fn all_symbols(store: &Store) -> Vec<Symbol> {
    store
        .all_files()
        .into_iter()
        .flat_map(|f| store.symbols_by_file(f.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::store::batch_api::{Inserter, NewSymbol};
    use canopy_core::store::extraction::NewFileRow;
    use canopy_core::types::{Span, SymbolKind, Visibility};

    fn seed(store: &mut Store) {
        let file_id = store
            .insert_file(&NewFileRow {
                path: "a.rs",
                language: "rust",
                content_hash: "c1",
                line_count: 10,
                last_indexed_at: 0,
            })
            .unwrap();
        for (name, kind) in [("foo_bar", SymbolKind::Function), ("fooXbar", SymbolKind::Function)] {
            store
                .insert_symbol(NewSymbol {
                    name: name.into(),
                    kind,
                    visibility: Visibility::Public,
                    modifiers: vec![],
                    span: Span::new(0, 0, 1, 0),
                    file_id: Some(file_id),
                    parent_id: None,
                    signature_hash: format!("h-{name}"),
                })
                .unwrap();
        }
    }

    #[test]
    fn search_escapes_underscore_literal() {
        let mut store = Store::in_memory().unwrap();
        seed(&mut store);
        let result = search_symbols(
            &store,
            "foo_bar",
            &SymbolFilter::default(),
            SortField::Name,
            SortOrder::Asc,
            Page::default(),
        );
        assert_eq!(result.total_count, 1);
        assert_eq!(result.items[0].name, "foo_bar");
    }

    #[test]
    fn limit_zero_returns_no_items_but_keeps_total() {
        let mut store = Store::in_memory().unwrap();
        seed(&mut store);
        let result = symbols(
            &store,
            &SymbolFilter::default(),
            SortField::Name,
            SortOrder::Asc,
            Page { offset: 0, limit: 0 },
        );
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 2);
    }

    #[test]
    fn filters_by_kind() {
        let mut store = Store::in_memory().unwrap();
        seed(&mut store);
        let filter = SymbolFilter {
            kinds: Some(vec![SymbolKind::Struct]),
            ..Default::default()
        };
        let result = symbols(&store, &filter, SortField::Name, SortOrder::Asc, Page::default());
        assert_eq!(result.total_count, 0);
    }
}
