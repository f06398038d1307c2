//! The blast-radius planner (spec §4.5): given a set of changed files,
//! conservatively expands to every file whose resolution *could* shift —
//! direct referrers of the changed files' top-level symbol names, plus
//! anything importing from them — so incremental reindexing re-resolves
//! exactly the files it needs to and no more.

use std::collections::BTreeSet;

use canopy_core::types::Id;
use canopy_core::Store;

pub struct BlastRadius {
    /// The files passed in, unchanged.
    pub changed_files: BTreeSet<Id>,
    /// `changed_files` plus every file transitively affected by the change.
    pub affected_files: BTreeSet<Id>,
}

/// Computes the set of files whose resolution must be redone after
/// `changed_files` were reindexed (spec §4.5). A file is pulled in when it
/// references a top-level symbol owned by a changed file, or imports from
/// one of its paths.
pub fn compute_blast_radius(store: &Store, changed_files: &[Id]) -> BlastRadius {
    let changed: BTreeSet<Id> = changed_files.iter().copied().collect();
    let mut affected = changed.clone();

    let mut symbol_names = Vec::new();
    let mut sources = Vec::new();
    for &file_id in &changed {
        if let Some(file) = store.file(file_id) {
            sources.push(file.path.clone());
        }
        for symbol in store.symbols_by_file(file_id) {
            if symbol.parent_id.is_none() {
                symbol_names.push(symbol.name);
            }
        }
    }

    for file_id in store.files_referencing_symbols(&symbol_names) {
        affected.insert(file_id);
    }
    for source in &sources {
        for file_id in store.files_importing_source(source) {
            affected.insert(file_id);
        }
    }

    BlastRadius {
        changed_files: changed,
        affected_files: affected,
    }
}

/// Clears resolution data for every file in the blast radius so the next
/// resolution pass recomputes it from scratch (spec §4.5: "re-resolve, never
/// patch in place").
pub fn reset_affected_resolution(store: &mut Store, radius: &BlastRadius) -> canopy_core::CanopyResult<()> {
    let ids: Vec<Id> = radius.affected_files.iter().copied().collect();
    store.delete_resolution_data_for_files(&ids)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::store::batch_api::{Inserter, NewImport, NewReference, NewScope, NewSymbol};
    use canopy_core::store::extraction::NewFileRow;
    use canopy_core::types::{ImportKind, ReferenceContext, ScopeKind, Span, SymbolKind, Visibility};

    #[test]
    fn pulls_in_referencing_and_importing_files() {
        let mut store = Store::in_memory().unwrap();
        let lib_file = store
            .insert_file(&NewFileRow {
                path: "lib.rs",
                language: "rust",
                content_hash: "c1",
                line_count: 2,
                last_indexed_at: 0,
            })
            .unwrap();
        store
            .insert_symbol(NewSymbol {
                name: "widget".into(),
                kind: SymbolKind::Function,
                visibility: Visibility::Public,
                modifiers: vec![],
                span: Span::new(0, 0, 1, 0),
                file_id: Some(lib_file),
                parent_id: None,
                signature_hash: "h1".into(),
            })
            .unwrap();

        let caller_file = store
            .insert_file(&NewFileRow {
                path: "main.rs",
                language: "rust",
                content_hash: "c2",
                line_count: 2,
                last_indexed_at: 0,
            })
            .unwrap();
        let scope_id = store
            .insert_scope(NewScope {
                file_id: caller_file,
                kind: ScopeKind::File,
                span: Span::new(0, 0, 2, 0),
                parent_id: None,
                symbol_id: None,
            })
            .unwrap();
        store
            .insert_reference(NewReference {
                file_id: caller_file,
                scope_id: Some(scope_id),
                name: "widget".into(),
                span: Span::new(1, 0, 1, 6),
                context: ReferenceContext::Call,
                receiver: None,
            })
            .unwrap();

        let importer_file = store
            .insert_file(&NewFileRow {
                path: "other.rs",
                language: "rust",
                content_hash: "c3",
                line_count: 1,
                last_indexed_at: 0,
            })
            .unwrap();
        store
            .insert_import(NewImport {
                file_id: importer_file,
                scope_id,
                source: "lib.rs".into(),
                imported_name: None,
                local_alias: None,
                kind: ImportKind::Module,
            })
            .unwrap();

        let radius = compute_blast_radius(&store, &[lib_file]);
        assert!(radius.affected_files.contains(&lib_file));
        assert!(radius.affected_files.contains(&caller_file));
        assert!(radius.affected_files.contains(&importer_file));
    }
}
