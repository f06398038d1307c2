//! The generic scope-aware resolution interpreter (spec §4.4, §9). Replaces
//! name-only matching with lexical scope-chain lookup: a reference binds to
//! the nearest enclosing declaration with the same name before falling back
//! to import-qualified or whole-program heuristic matches.

use canopy_core::types::{Id, Reference, ResolutionKind, Scope, Symbol, SymbolKind};
use canopy_core::{Inserter, Store, StoreResult};

/// A single resolution decision, to be written back via `Store::insert_resolved_reference`.
pub struct Resolution {
    pub reference_id: Id,
    pub target_symbol_id: Id,
    pub confidence: f64,
    pub kind: ResolutionKind,
}

/// Builds the chain of scopes from `scope_id` up to (and including) the
/// file-root scope.
fn scope_chain(store: &Store, scope_id: Id) -> Vec<Scope> {
    let mut chain = Vec::new();
    let mut current = store.scope(scope_id);
    while let Some(scope) = current {
        current = scope.parent_id.and_then(|p| store.scope(p));
        chain.push(scope);
    }
    chain
}

/// Resolve a single reference against scope-visible declarations, then
/// imports, then a whole-store name fallback (spec §4.4 resolution order).
pub fn resolve_reference(store: &Store, reference: &Reference) -> Option<Resolution> {
    let candidates = store.symbols_by_file(reference.file_id);
    let by_name: Vec<&Symbol> = candidates.iter().filter(|s| s.name == reference.name).collect();

    if let Some(scope_id) = reference.scope_id {
        let chain = scope_chain(store, scope_id);
        // Innermost scope first: a scope's "owning" symbol is the container a
        // name declared inside it belongs to (function body, class body...).
        for scope in &chain {
            if let Some(owner_id) = scope.symbol_id {
                if let Some(target) = by_name.iter().find(|s| s.parent_id == Some(owner_id)) {
                    return Some(Resolution {
                        reference_id: reference.id,
                        target_symbol_id: target.id,
                        confidence: 1.0,
                        kind: ResolutionKind::Direct,
                    });
                }
            }
        }
        // File-level (top-level, no parent) declarations are visible from
        // every scope in the file.
        if let Some(target) = by_name.iter().find(|s| s.parent_id.is_none()) {
            return Some(Resolution {
                reference_id: reference.id,
                target_symbol_id: target.id,
                confidence: 0.9,
                kind: ResolutionKind::Direct,
            });
        }
    }

    // Import-qualified: an import whose source or alias matches the
    // reference's receiver/name, resolved against symbols anywhere in the
    // store exported from that module.
    for import in store.imports_in_file(reference.file_id) {
        let alias_matches = import
            .local_alias
            .as_deref()
            .is_some_and(|a| a == reference.name || Some(a) == reference.receiver.as_deref());
        let source_tail_matches = import
            .source
            .rsplit(['/', '.', ':'])
            .next()
            .is_some_and(|tail| tail == reference.name || Some(tail) == reference.receiver.as_deref());
        if alias_matches || source_tail_matches {
            if let Some(target) = store.symbols_by_name(&reference.name).into_iter().next() {
                return Some(Resolution {
                    reference_id: reference.id,
                    target_symbol_id: target.id,
                    confidence: 0.7,
                    kind: ResolutionKind::Import,
                });
            }
        }
    }

    // Whole-program fallback: ambiguous (more than one namesake) or simply
    // the only thing we could find. Lower confidence reflects the lost
    // precision (spec §8 property: heuristic resolutions are always ranked
    // below direct/import ones). A variable declared in another file is
    // never a candidate here — variables are lexically scoped to their own
    // file, so a same-named variable elsewhere is unrelated, not a fallback
    // match (spec §8 Testable Property 8).
    let global_matches: Vec<Symbol> = store
        .symbols_by_name(&reference.name)
        .into_iter()
        .filter(|s| s.kind != SymbolKind::Variable || s.file_id == Some(reference.file_id))
        .collect();
    match global_matches.len() {
        0 => None,
        1 => Some(Resolution {
            reference_id: reference.id,
            target_symbol_id: global_matches[0].id,
            confidence: 0.5,
            kind: ResolutionKind::Heuristic,
        }),
        _ => Some(Resolution {
            reference_id: reference.id,
            target_symbol_id: global_matches[0].id,
            confidence: 0.3,
            kind: ResolutionKind::Heuristic,
        }),
    }
}

/// Resolve every reference in `file_id` and commit the results (spec §4.4
/// step: "resolution runs after all extraction for the batch has committed").
pub fn resolve_file(store: &mut Store, file_id: Id) -> StoreResult<usize> {
    let refs = store.references_in_file(file_id);
    let mut count = 0;
    for reference in &refs {
        if let Some(resolution) = resolve_reference(store, reference) {
            store.insert_resolved_reference(
                resolution.reference_id,
                resolution.target_symbol_id,
                resolution.confidence,
                resolution.kind,
            )?;
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::store::batch_api::{Inserter, NewReference, NewScope, NewSymbol};
    use canopy_core::store::extraction::NewFileRow;
    use canopy_core::types::{ReferenceContext, ScopeKind, SymbolKind, Visibility};
    use canopy_core::types::Span;

    fn seed_call_site(store: &mut Store) -> (Id, Id) {
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
        let reference_id = store
            .insert_reference(NewReference {
                file_id,
                scope_id: Some(caller_scope),
                name: "helper".into(),
                span: Span::new(3, 0, 3, 8),
                context: ReferenceContext::Call,
                receiver: None,
            })
            .unwrap();
        (file_id, reference_id)
    }

    #[test]
    fn resolves_top_level_call_directly() {
        let mut store = Store::in_memory().unwrap();
        let (file_id, reference_id) = seed_call_site(&mut store);
        resolve_file(&mut store, file_id).unwrap();
        assert!(!store.is_unresolved(reference_id));
    }

    #[test]
    fn unknown_name_is_left_unresolved() {
        let mut store = Store::in_memory().unwrap();
        let file_id = store
            .insert_file(&NewFileRow {
                path: "b.rs",
                language: "rust",
                content_hash: "c1",
                line_count: 1,
                last_indexed_at: 0,
            })
            .unwrap();
        let scope_id = store
            .insert_scope(NewScope {
                file_id,
                kind: ScopeKind::File,
                span: Span::new(0, 0, 1, 0),
                parent_id: None,
                symbol_id: None,
            })
            .unwrap();
        let reference_id = store
            .insert_reference(NewReference {
                file_id,
                scope_id: Some(scope_id),
                name: "nonexistent".into(),
                span: Span::new(0, 0, 0, 5),
                context: ReferenceContext::Call,
                receiver: None,
            })
            .unwrap();
        resolve_file(&mut store, file_id).unwrap();
        assert!(store.is_unresolved(reference_id));
    }

    #[test]
    fn local_variable_in_another_file_is_never_a_fallback_target() {
        let mut store = Store::in_memory().unwrap();

        let file_a = store
            .insert_file(&NewFileRow {
                path: "a.rs",
                language: "rust",
                content_hash: "c1",
                line_count: 2,
                last_indexed_at: 0,
            })
            .unwrap();
        store
            .insert_symbol(NewSymbol {
                name: "x".into(),
                kind: SymbolKind::Variable,
                visibility: Visibility::Private,
                modifiers: vec![],
                span: Span::new(0, 0, 0, 5),
                file_id: Some(file_a),
                parent_id: None,
                signature_hash: "h1".into(),
            })
            .unwrap();

        let file_b = store
            .insert_file(&NewFileRow {
                path: "b.rs",
                language: "rust",
                content_hash: "c2",
                line_count: 2,
                last_indexed_at: 0,
            })
            .unwrap();
        let scope_id = store
            .insert_scope(NewScope {
                file_id: file_b,
                kind: ScopeKind::File,
                span: Span::new(0, 0, 2, 0),
                parent_id: None,
                symbol_id: None,
            })
            .unwrap();
        let reference_id = store
            .insert_reference(NewReference {
                file_id: file_b,
                scope_id: Some(scope_id),
                name: "x".into(),
                span: Span::new(1, 0, 1, 1),
                context: ReferenceContext::Other,
                receiver: None,
            })
            .unwrap();

        resolve_file(&mut store, file_b).unwrap();
        assert!(store.is_unresolved(reference_id));
    }

    #[test]
    fn non_variable_whole_program_fallback_still_matches_across_files() {
        let mut store = Store::in_memory().unwrap();

        let file_a = store
            .insert_file(&NewFileRow {
                path: "a.rs",
                language: "rust",
                content_hash: "c1",
                line_count: 2,
                last_indexed_at: 0,
            })
            .unwrap();
        let helper = store
            .insert_symbol(NewSymbol {
                name: "helper".into(),
                kind: SymbolKind::Function,
                visibility: Visibility::Public,
                modifiers: vec![],
                span: Span::new(0, 0, 1, 0),
                file_id: Some(file_a),
                parent_id: None,
                signature_hash: "h1".into(),
            })
            .unwrap();

        let file_b = store
            .insert_file(&NewFileRow {
                path: "b.rs",
                language: "rust",
                content_hash: "c2",
                line_count: 2,
                last_indexed_at: 0,
            })
            .unwrap();
        let scope_id = store
            .insert_scope(NewScope {
                file_id: file_b,
                kind: ScopeKind::File,
                span: Span::new(0, 0, 2, 0),
                parent_id: None,
                symbol_id: None,
            })
            .unwrap();
        let reference_id = store
            .insert_reference(NewReference {
                file_id: file_b,
                scope_id: Some(scope_id),
                name: "helper".into(),
                span: Span::new(1, 0, 1, 6),
                context: ReferenceContext::Call,
                receiver: None,
            })
            .unwrap();

        resolve_file(&mut store, file_b).unwrap();
        assert!(!store.is_unresolved(reference_id));
        let resolved = store.resolved_target_of(reference_id);
        assert_eq!(resolved, Some(helper));
    }
}
