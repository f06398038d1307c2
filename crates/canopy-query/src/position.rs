//! Position-based lookups (spec §4.6): `symbol_at`, `definition_at`, `scope_at`.

use canopy_core::types::{Id, Reference, Scope, Symbol};
use canopy_core::Store;

/// The narrowest symbol whose span contains `(line, col)`, breaking ties by
/// innermost start (spec §4.6 `symbol_at`).
pub fn symbol_at(store: &Store, file_id: Id, line: u32, col: u32) -> Option<Symbol> {
    store.symbol_at_position(file_id, line, col).into_iter().next()
}

/// A resolved reference's target locations — the file/symbol the reference at
/// `(line, col)` points to (spec §4.6 `definition_at`).
pub fn definition_at(store: &Store, file_id: Id, line: u32, col: u32) -> Vec<Symbol> {
    let Some(reference) = find_reference_at(store, file_id, line, col) else {
        return vec![];
    };
    match store.resolved_target_of(reference.id) {
        Some(symbol_id) => store.symbol(symbol_id).into_iter().collect(),
        None => vec![],
    }
}

fn find_reference_at(store: &Store, file_id: Id, line: u32, col: u32) -> Option<Reference> {
    store
        .references_in_file(file_id)
        .into_iter()
        .find(|r| r.span.contains(line, col))
}

/// Scopes innermost-to-outermost, ending at the file scope (spec §4.6 `scope_at`).
pub fn scope_at(store: &Store, file_id: Id, line: u32, col: u32) -> Vec<Scope> {
    let mut candidates: Vec<Scope> = store
        .scopes_in_file(file_id)
        .into_iter()
        .filter(|s| s.span.contains(line, col))
        .collect();
    candidates.sort_by_key(|s| s.span.end_line.saturating_sub(s.span.start_line));
    candidates
}
