//! Resolution-phase orchestration (spec §4.4): runs after every file in a
//! batch has committed its extraction, since a reference in file A may bind
//! to a symbol declared in file B.

use canopy_core::types::{Id, ImplementationKind, ReferenceContext};
use canopy_core::{CanopyError, CanopyResult, Store};
use canopy_parse::resolve::resolve_file;

use crate::cancel::CancelSignal;

pub struct ResolutionSummary {
    pub references_resolved: usize,
    pub call_edges_derived: usize,
    pub implementations_derived: usize,
}

/// Resolve every file's references, then derive `call_edges` rows for the
/// references that resolved to a call. Call edges are a second-order
/// relation on top of `resolved_references`, re-derived every run rather than
/// carried forward, so they never drift from the underlying resolutions.
///
/// Every resolution-derived row for a file is cleared before that file's
/// references are re-resolved — `insert_resolved_reference`/`insert_call_edge`/
/// `insert_implementation` are plain inserts with no upsert, so skipping this
/// would duplicate rows on every re-index of an unchanged repository (spec §8
/// Property 7: two consecutive full indexes of unchanged sources produce
/// byte-identical databases).
pub fn resolve_repository(store: &mut Store) -> CanopyResult<ResolutionSummary> {
    resolve_repository_cancellable(store, None)
}

/// As [`resolve_repository`], checking `cancel` before each file's references
/// are resolved (spec §5: pipeline operations accept a context-style cancel
/// signal). A cancellation stops before the call-edge/implementation
/// derivation passes too, since those read resolutions the cancelled run
/// never produced.
pub fn resolve_repository_cancellable(
    store: &mut Store,
    cancel: Option<&CancelSignal>,
) -> CanopyResult<ResolutionSummary> {
    let file_ids: Vec<Id> = store.all_files().iter().map(|f| f.id).collect();
    store.delete_resolution_data_for_files(&file_ids)?;

    let mut references_resolved = 0;
    for file_id in &file_ids {
        if cancel.is_some_and(|c| c.is_cancelled()) {
            return Err(CanopyError::Cancelled);
        }
        references_resolved += resolve_file(store, *file_id)?;
    }

    let mut call_edges_derived = 0;
    for file_id in &file_ids {
        for reference in store.references_in_file(*file_id) {
            if reference.context != ReferenceContext::Call {
                continue;
            }
            let Some(caller_id) = enclosing_symbol(store, reference.scope_id) else {
                continue;
            };
            let Some(callee_id) = store.resolved_target_of(reference.id) else {
                continue;
            };
            store.insert_call_edge(
                caller_id,
                callee_id,
                *file_id,
                reference.span.start_line,
                reference.span.start_col,
            )?;
            call_edges_derived += 1;
        }
    }

    // Heritage clauses (`extends`/`implements`/`impl ... for`) resolve the
    // interface/trait name normally; the conforming type is named directly by
    // the reference's `receiver` rather than found via scope walk, since an
    // `impl` block (Rust) declares no symbol of its own to walk up to.
    let mut implementations_derived = 0;
    for file_id in &file_ids {
        for reference in store.references_in_file(*file_id) {
            if reference.context != ReferenceContext::Implements {
                continue;
            }
            let Some(receiver_name) = reference.receiver.as_deref() else {
                continue;
            };
            let Some(concrete) = store
                .symbols_by_file(*file_id)
                .into_iter()
                .find(|s| s.name == receiver_name)
            else {
                continue;
            };
            let Some(interface_id) = store.resolved_target_of(reference.id) else {
                continue;
            };
            store.insert_implementation(concrete.id, interface_id, ImplementationKind::Explicit, None)?;
            implementations_derived += 1;
        }
    }

    Ok(ResolutionSummary {
        references_resolved,
        call_edges_derived,
        implementations_derived,
    })
}

/// Walks up the scope chain to find the nearest scope that owns a symbol
/// (the function/method body a call site sits in).
fn enclosing_symbol(store: &Store, scope_id: Option<Id>) -> Option<Id> {
    let mut current = scope_id.and_then(|id| store.scope(id));
    while let Some(scope) = current {
        if let Some(symbol_id) = scope.symbol_id {
            return Some(symbol_id);
        }
        current = scope.parent_id.and_then(|p| store.scope(p));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::store::batch_api::{Inserter, NewReference, NewScope, NewSymbol};
    use canopy_core::store::extraction::NewFileRow;
    use canopy_core::types::{ScopeKind, Span, SymbolKind, Visibility};

    #[test]
    fn derives_call_edge_for_resolved_call() {
        let mut store = Store::in_memory().unwrap();
        let file_id = store
            .insert_file(&NewFileRow {
                path: "a.rs",
                language: "rust",
                content_hash: "c1",
                line_count: 10,
                last_indexed_at: 0,
            })
            .unwrap();
        let file_scope = store
            .insert_scope(NewScope {
                file_id,
                kind: ScopeKind::File,
                span: Span::new(0, 0, 10, 0),
                parent_id: None,
                symbol_id: None,
            })
            .unwrap();
        let callee = store
            .insert_symbol(NewSymbol {
                name: "helper".into(),
                kind: SymbolKind::Function,
                visibility: Visibility::Public,
                modifiers: vec![],
                span: Span::new(0, 0, 1, 0),
                file_id: Some(file_id),
                parent_id: None,
                signature_hash: "h1".into(),
            })
            .unwrap();
        let caller = store
            .insert_symbol(NewSymbol {
                name: "main".into(),
                kind: SymbolKind::Function,
                visibility: Visibility::Public,
                modifiers: vec![],
                span: Span::new(2, 0, 4, 0),
                file_id: Some(file_id),
                parent_id: None,
                signature_hash: "h2".into(),
            })
            .unwrap();
        let caller_scope = store
            .insert_scope(NewScope {
                file_id,
                kind: ScopeKind::Function,
                span: Span::new(2, 0, 4, 0),
                parent_id: Some(file_scope),
                symbol_id: Some(caller),
            })
            .unwrap();
        store
            .insert_reference(NewReference {
                file_id,
                scope_id: Some(caller_scope),
                name: "helper".into(),
                span: Span::new(3, 0, 3, 8),
                context: canopy_core::types::ReferenceContext::Call,
                receiver: None,
            })
            .unwrap();

        let summary = resolve_repository(&mut store).unwrap();
        assert_eq!(summary.references_resolved, 1);
        assert_eq!(summary.call_edges_derived, 1);
        assert_eq!(store.call_edges_from(caller).len(), 1);
        assert_eq!(store.call_edges_to(callee).len(), 1);
    }

    #[test]
    fn derives_implementation_edge_from_rust_trait_impl() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("shape.rs"),
            "trait Shape {}\nstruct Circle;\nimpl Shape for Circle {}\n",
        )
        .unwrap();
        let mut store = Store::in_memory().unwrap();
        crate::extraction::extract_repository(&mut store, dir.path()).unwrap();
        let summary = resolve_repository(&mut store).unwrap();
        assert_eq!(summary.implementations_derived, 1);

        let circle = store
            .symbols_by_name("Circle")
            .into_iter()
            .next()
            .expect("Circle symbol extracted");
        let shape = store
            .symbols_by_name("Shape")
            .into_iter()
            .next()
            .expect("Shape symbol extracted");
        let impls = store.implementations_of(shape.id);
        assert_eq!(impls.len(), 1);
        assert_eq!(impls[0].type_symbol_id, circle.id);
    }

    #[test]
    fn cancelled_signal_stops_resolution_before_any_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib.rs"), "fn helper() {}\nfn main() { helper(); }\n").unwrap();
        let mut store = Store::in_memory().unwrap();
        crate::extraction::extract_repository(&mut store, dir.path()).unwrap();

        let signal = CancelSignal::new();
        signal.cancel();
        let result = resolve_repository_cancellable(&mut store, Some(&signal));
        assert!(matches!(result, Err(CanopyError::Cancelled)));
        assert_eq!(store.references_in_file(store.all_files()[0].id).iter().filter(|r| !store.is_unresolved(r.id)).count(), 0);
    }

    #[test]
    fn reresolving_unchanged_files_does_not_duplicate_rows() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib.rs"), "fn helper() {}\nfn main() { helper(); }\n").unwrap();
        let mut store = Store::in_memory().unwrap();
        crate::extraction::extract_repository(&mut store, dir.path()).unwrap();

        resolve_repository(&mut store).unwrap();
        let first_call_edges = store.call_edges_to(
            store
                .symbols_by_name("helper")
                .into_iter()
                .next()
                .unwrap()
                .id,
        );
        assert_eq!(first_call_edges.len(), 1);

        // Re-resolving without re-extracting (the `index` without `--force`
        // path) must not append a second copy of the same edge.
        resolve_repository(&mut store).unwrap();
        let helper_id = store.symbols_by_name("helper").into_iter().next().unwrap().id;
        let second_call_edges = store.call_edges_to(helper_id);
        assert_eq!(second_call_edges.len(), 1);
    }
}
