//! Resolution-phase writes (spec §4.4) and the deletes that blast-radius
//! re-resolution issues before recomputing a symbol's or file's edges.

use rusqlite::params;

use super::Store;
use crate::error::StoreResult;
use crate::types::*;

impl Store {
    pub fn insert_resolved_reference(
        &self,
        reference_id: Id,
        target_symbol_id: Id,
        confidence: f64,
        kind: ResolutionKind,
    ) -> StoreResult<Id> {
        self.conn.execute(
            "INSERT INTO resolved_references (reference_id, target_symbol_id, confidence, kind)
             VALUES (?1, ?2, ?3, ?4)",
            params![reference_id, target_symbol_id, confidence, kind.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_call_edge(
        &self,
        caller_symbol_id: Id,
        callee_symbol_id: Id,
        file_id: Id,
        line: u32,
        col: u32,
    ) -> StoreResult<Id> {
        self.conn.execute(
            "INSERT INTO call_edges (caller_symbol_id, callee_symbol_id, file_id, line, col)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![caller_symbol_id, callee_symbol_id, file_id, line, col],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_implementation(
        &self,
        type_symbol_id: Id,
        interface_symbol_id: Id,
        kind: ImplementationKind,
        declaring_module_id: Option<Id>,
    ) -> StoreResult<Id> {
        self.conn.execute(
            "INSERT INTO implementations (type_symbol_id, interface_symbol_id, kind, declaring_module_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![type_symbol_id, interface_symbol_id, kind.as_str(), declaring_module_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_extension_binding(
        &self,
        member_symbol_id: Id,
        extended_type_expr: &str,
        extended_type_symbol_id: Option<Id>,
        kind: ExtensionKind,
        constraints: Option<&str>,
        is_default_impl: bool,
    ) -> StoreResult<Id> {
        self.conn.execute(
            "INSERT INTO extension_bindings (member_symbol_id, extended_type_expr, extended_type_symbol_id, kind, constraints, is_default_impl)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                member_symbol_id,
                extended_type_expr,
                extended_type_symbol_id,
                kind.as_str(),
                constraints,
                is_default_impl as i32,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_reexport(
        &self,
        file_id: Id,
        original_symbol_id: Id,
        exported_name: &str,
    ) -> StoreResult<Id> {
        self.conn.execute(
            "INSERT INTO reexports (file_id, original_symbol_id, exported_name) VALUES (?1, ?2, ?3)",
            params![file_id, original_symbol_id, exported_name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_type_composition(
        &self,
        composite_symbol_id: Id,
        component_symbol_id: Id,
        kind: CompositionKind,
    ) -> StoreResult<Id> {
        self.conn.execute(
            "INSERT INTO type_compositions (composite_symbol_id, component_symbol_id, kind) VALUES (?1, ?2, ?3)",
            params![composite_symbol_id, component_symbol_id, kind.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_annotation_resolved(&self, annotation_id: Id, resolved_symbol_id: Id) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE annotations SET resolved_symbol_id = ?2 WHERE id = ?1",
            params![annotation_id, resolved_symbol_id],
        )?;
        Ok(())
    }

    /// Clears every resolution row that originates from a reference/call site
    /// in `file_ids`, ahead of re-resolving those files (blast-radius re-run,
    /// spec §4.5).
    pub fn delete_resolution_data_for_files(&mut self, file_ids: &[Id]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        for &file_id in file_ids {
            tx.execute(
                "DELETE FROM resolved_references WHERE reference_id IN
                    (SELECT id FROM reference_sites WHERE file_id = ?1)",
                params![file_id],
            )?;
            tx.execute("DELETE FROM call_edges WHERE file_id = ?1", params![file_id])?;
            tx.execute(
                "DELETE FROM implementations WHERE type_symbol_id IN (SELECT id FROM symbols WHERE file_id = ?1)",
                params![file_id],
            )?;
            tx.execute(
                "DELETE FROM extension_bindings WHERE member_symbol_id IN (SELECT id FROM symbols WHERE file_id = ?1)",
                params![file_id],
            )?;
            tx.execute(
                "DELETE FROM type_compositions WHERE composite_symbol_id IN (SELECT id FROM symbols WHERE file_id = ?1)",
                params![file_id],
            )?;
            tx.execute("DELETE FROM reexports WHERE file_id = ?1", params![file_id])?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Clears resolution rows that *target* one of `symbol_ids` — used when a
    /// symbol's identity changes (signature hash differs) and downstream
    /// resolution pointing at it must be recomputed even though the
    /// referencing files themselves are untouched.
    pub fn delete_resolution_data_for_symbols(&mut self, symbol_ids: &[Id]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        for &symbol_id in symbol_ids {
            tx.execute(
                "DELETE FROM resolved_references WHERE target_symbol_id = ?1",
                params![symbol_id],
            )?;
            tx.execute(
                "DELETE FROM call_edges WHERE caller_symbol_id = ?1 OR callee_symbol_id = ?1",
                params![symbol_id],
            )?;
            tx.execute(
                "DELETE FROM implementations WHERE type_symbol_id = ?1 OR interface_symbol_id = ?1",
                params![symbol_id],
            )?;
            tx.execute(
                "DELETE FROM extension_bindings WHERE member_symbol_id = ?1 OR extended_type_symbol_id = ?1",
                params![symbol_id],
            )?;
            tx.execute(
                "DELETE FROM type_compositions WHERE composite_symbol_id = ?1 OR component_symbol_id = ?1",
                params![symbol_id],
            )?;
            tx.execute("DELETE FROM reexports WHERE original_symbol_id = ?1", params![symbol_id])?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Files containing at least one reference whose name could plausibly
    /// bind to any of `symbol_names` — the blast-radius planner's
    /// conservative fan-out step before running real resolution (spec §4.5).
    pub fn files_referencing_symbols(&self, symbol_names: &[String]) -> Vec<Id> {
        if symbol_names.is_empty() {
            return vec![];
        }
        let placeholders = symbol_names.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT DISTINCT file_id FROM reference_sites WHERE name IN ({placeholders})"
        );
        let mut stmt = self.conn.prepare(&sql).unwrap();
        let params: Vec<&dyn rusqlite::ToSql> =
            symbol_names.iter().map(|s| s as &dyn rusqlite::ToSql).collect();
        stmt.query_map(params.as_slice(), |row| row.get(0))
            .map(|rows| rows.filter_map(Result::ok).collect())
            .unwrap_or_default()
    }

    /// Files that import from `source` — the other half of blast-radius
    /// fan-out: a changed module can shift what a re-export or wildcard
    /// import exposes even without a direct name match (spec §4.5).
    pub fn files_importing_source(&self, source: &str) -> Vec<Id> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT file_id FROM imports WHERE source = ?1")
            .unwrap();
        stmt.query_map(params![source], |row| row.get(0))
            .map(|rows| rows.filter_map(Result::ok).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::super::batch_api::{Inserter, NewReference, NewScope, NewSymbol};
    use super::super::extraction::NewFileRow;
    use super::*;

    fn seed_two_symbols(store: &mut Store) -> (Id, Id, Id) {
        let file_id = store
            .insert_file(&NewFileRow {
                path: "a.rs",
                language: "rust",
                content_hash: "c1",
                line_count: 10,
                last_indexed_at: 0,
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
        let caller = store
            .insert_symbol(NewSymbol {
                name: "caller".into(),
                kind: SymbolKind::Function,
                visibility: Visibility::Public,
                modifiers: vec![],
                span: Span::new(0, 0, 2, 0),
                file_id: Some(file_id),
                parent_id: None,
                signature_hash: "h1".into(),
            })
            .unwrap();
        let callee = store
            .insert_symbol(NewSymbol {
                name: "callee".into(),
                kind: SymbolKind::Function,
                visibility: Visibility::Public,
                modifiers: vec![],
                span: Span::new(3, 0, 5, 0),
                file_id: Some(file_id),
                parent_id: None,
                signature_hash: "h2".into(),
            })
            .unwrap();
        let reference_id = store
            .insert_reference(NewReference {
                file_id,
                scope_id: Some(scope_id),
                name: "callee".into(),
                span: Span::new(1, 0, 1, 6),
                context: ReferenceContext::Call,
                receiver: None,
            })
            .unwrap();
        store
            .insert_resolved_reference(reference_id, callee, 1.0, ResolutionKind::Direct)
            .unwrap();
        store.insert_call_edge(caller, callee, file_id, 1, 0).unwrap();
        (file_id, caller, callee)
    }

    #[test]
    fn resolution_roundtrip() {
        let mut store = Store::in_memory().unwrap();
        let (_, caller, callee) = seed_two_symbols(&mut store);
        assert_eq!(store.call_edges_from(caller).len(), 1);
        assert_eq!(store.call_edges_to(callee).len(), 1);
        assert!(!store.unreferenced_symbol_ids().contains(&callee));
    }

    #[test]
    fn delete_resolution_data_for_files_clears_edges_but_keeps_symbols() {
        let mut store = Store::in_memory().unwrap();
        let (file_id, caller, callee) = seed_two_symbols(&mut store);
        store.delete_resolution_data_for_files(&[file_id]).unwrap();
        assert!(store.call_edges_from(caller).is_empty());
        assert!(store.symbol(callee).is_some());
    }

    #[test]
    fn delete_resolution_data_for_symbols_clears_both_directions() {
        let mut store = Store::in_memory().unwrap();
        let (_, caller, callee) = seed_two_symbols(&mut store);
        store.delete_resolution_data_for_symbols(&[callee]).unwrap();
        assert!(store.call_edges_from(caller).is_empty());
        assert!(store.call_edges_to(callee).is_empty());
    }

    #[test]
    fn files_referencing_symbols_finds_owning_file() {
        let mut store = Store::in_memory().unwrap();
        let (file_id, _, _) = seed_two_symbols(&mut store);
        let files = store.files_referencing_symbols(&["callee".to_string()]);
        assert_eq!(files, vec![file_id]);
        assert!(store.files_referencing_symbols(&[]).is_empty());
    }
}
