//! Direct (real-ID) extraction writes against `Store` itself — used both for
//! `insert_file`/`delete_file_data` (outside the per-file batch, spec §4.3
//! steps 2-3) and as the terminal `Inserter` impl that `commit_batch` drives
//! after remapping fake IDs (spec §4.3 step 7).

use rusqlite::params;

use super::batch_api::*;
use super::Store;
use crate::error::StoreResult;
use crate::types::*;

fn span_cols(span: &Span) -> (u32, u32, u32, u32) {
    (span.start_line, span.start_col, span.end_line, span.end_col)
}

impl Store {
    /// Insert a fresh File row, or return the id of an existing row for the
    /// same path (callers are expected to have already deleted its old
    /// extraction data via [`Store::delete_file_data`] when re-indexing).
    pub fn insert_file(&self, file: &NewFileRow) -> StoreResult<Id> {
        self.conn.execute(
            "INSERT INTO files (path, language, content_hash, line_count, last_indexed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(path) DO UPDATE SET
                language = excluded.language,
                content_hash = excluded.content_hash,
                line_count = excluded.line_count,
                last_indexed_at = excluded.last_indexed_at",
            params![
                file.path,
                file.language,
                file.content_hash,
                file.line_count,
                file.last_indexed_at,
            ],
        )?;
        let id: Id = self.conn.query_row(
            "SELECT id FROM files WHERE path = ?1",
            params![file.path],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn file_id_for_path(&self, path: &str) -> Option<Id> {
        self.conn
            .query_row("SELECT id FROM files WHERE path = ?1", params![path], |row| {
                row.get(0)
            })
            .ok()
    }

    /// Transactionally remove every row owned by this file, including
    /// resolution rows whose originating reference or targeted symbol lives
    /// there (spec §4.2 `delete_file_data`). Deletion order respects FK
    /// dependencies; `ON DELETE CASCADE` handles most of it, but resolution
    /// rows that *target* a symbol in this file (rather than being owned by
    /// it via FK) must be cleared explicitly first.
    pub fn delete_file_data(&mut self, file_id: Id) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM resolved_references WHERE target_symbol_id IN
                (SELECT id FROM symbols WHERE file_id = ?1)",
            params![file_id],
        )?;
        tx.execute(
            "DELETE FROM call_edges WHERE caller_symbol_id IN (SELECT id FROM symbols WHERE file_id = ?1)
                OR callee_symbol_id IN (SELECT id FROM symbols WHERE file_id = ?1)",
            params![file_id],
        )?;
        tx.execute(
            "DELETE FROM implementations WHERE type_symbol_id IN (SELECT id FROM symbols WHERE file_id = ?1)
                OR interface_symbol_id IN (SELECT id FROM symbols WHERE file_id = ?1)",
            params![file_id],
        )?;
        tx.execute(
            "DELETE FROM extension_bindings WHERE member_symbol_id IN (SELECT id FROM symbols WHERE file_id = ?1)
                OR extended_type_symbol_id IN (SELECT id FROM symbols WHERE file_id = ?1)",
            params![file_id],
        )?;
        tx.execute(
            "DELETE FROM type_compositions WHERE composite_symbol_id IN (SELECT id FROM symbols WHERE file_id = ?1)
                OR component_symbol_id IN (SELECT id FROM symbols WHERE file_id = ?1)",
            params![file_id],
        )?;
        tx.execute("DELETE FROM reexports WHERE file_id = ?1", params![file_id])?;
        // Extraction rows: cascades handle children of `symbols`/`scopes` once
        // the file row itself is removed, but we delete explicitly first so a
        // failure leaves the previous state intact rather than a half-deleted
        // file row.
        tx.execute(
            "DELETE FROM symbols WHERE file_id = ?1",
            params![file_id],
        )?;
        tx.execute("DELETE FROM scopes WHERE file_id = ?1", params![file_id])?;
        tx.execute("DELETE FROM files WHERE id = ?1", params![file_id])?;
        tx.commit()?;
        Ok(())
    }
}

/// File row input (kept separate from extraction's `Inserter` trait since
/// files are created before a per-file batch exists, spec §4.3 step 3).
pub struct NewFileRow<'a> {
    pub path: &'a str,
    pub language: &'a str,
    pub content_hash: &'a str,
    pub line_count: u32,
    pub last_indexed_at: i64,
}

impl Inserter for Store {
    fn insert_symbol(&mut self, value: NewSymbol) -> StoreResult<Id> {
        let (sl, sc, el, ec) = span_cols(&value.span);
        let modifiers_json = serde_json::to_string(&value.modifiers).unwrap_or_else(|_| "[]".into());
        self.conn.execute(
            "INSERT INTO symbols (name, kind, visibility, modifiers, start_line, start_col, end_line, end_col, file_id, parent_id, signature_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                value.name,
                value.kind.as_str(),
                value.visibility.as_str(),
                modifiers_json,
                sl,
                sc,
                el,
                ec,
                value.file_id,
                value.parent_id,
                value.signature_hash,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_symbol_fragment(&mut self, value: NewSymbolFragment) -> StoreResult<Id> {
        let (sl, sc, el, ec) = span_cols(&value.span);
        self.conn.execute(
            "INSERT INTO symbol_fragments (symbol_id, file_id, start_line, start_col, end_line, end_col, is_primary)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![value.symbol_id, value.file_id, sl, sc, el, ec, value.is_primary as i32],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_scope(&mut self, value: NewScope) -> StoreResult<Id> {
        let (sl, sc, el, ec) = span_cols(&value.span);
        self.conn.execute(
            "INSERT INTO scopes (file_id, kind, start_line, start_col, end_line, end_col, parent_id, symbol_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                value.file_id,
                value.kind.as_str(),
                sl,
                sc,
                el,
                ec,
                value.parent_id,
                value.symbol_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_reference(&mut self, value: NewReference) -> StoreResult<Id> {
        let (sl, sc, el, ec) = span_cols(&value.span);
        self.conn.execute(
            "INSERT INTO reference_sites (file_id, scope_id, name, start_line, start_col, end_line, end_col, context, receiver)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                value.file_id,
                value.scope_id,
                value.name,
                sl,
                sc,
                el,
                ec,
                value.context.as_str(),
                value.receiver,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_import(&mut self, value: NewImport) -> StoreResult<Id> {
        self.conn.execute(
            "INSERT INTO imports (file_id, source, imported_name, local_alias, kind, scope_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                value.file_id,
                value.source,
                value.imported_name,
                value.local_alias,
                value.kind.as_str(),
                value.scope_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_type_member(&mut self, value: NewTypeMember) -> StoreResult<Id> {
        self.conn.execute(
            "INSERT INTO type_members (symbol_id, name, kind, type_expr) VALUES (?1, ?2, ?3, ?4)",
            params![value.symbol_id, value.name, value.kind, value.type_expr],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_function_param(&mut self, value: NewFunctionParam) -> StoreResult<Id> {
        self.conn.execute(
            "INSERT INTO function_params (symbol_id, name, type_expr, ordinal, is_receiver, is_return_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                value.symbol_id,
                value.name,
                value.type_expr,
                value.ordinal,
                value.is_receiver as i32,
                value.is_return_value as i32,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_type_param(&mut self, value: NewTypeParam) -> StoreResult<Id> {
        self.conn.execute(
            "INSERT INTO type_params (symbol_id, name, bound, ordinal) VALUES (?1, ?2, ?3, ?4)",
            params![value.symbol_id, value.name, value.bound, value.ordinal],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_annotation(&mut self, value: NewAnnotation) -> StoreResult<Id> {
        self.conn.execute(
            "INSERT INTO annotations (symbol_id, name, arguments, resolved_symbol_id) VALUES (?1, ?2, ?3, ?4)",
            params![value.symbol_id, value.name, value.arguments, value.resolved_symbol_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn symbols_by_name(&self, name: &str) -> Vec<Symbol> {
        self.symbols_by_name_impl(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_symbol(file_id: Id) -> NewSymbol {
        NewSymbol {
            name: "foo".into(),
            kind: SymbolKind::Function,
            visibility: Visibility::Public,
            modifiers: vec![],
            span: Span::new(0, 0, 2, 0),
            file_id: Some(file_id),
            parent_id: None,
            signature_hash: "h1".into(),
        }
    }

    #[test]
    fn insert_file_then_symbol() {
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
        let sym_id = store.insert_symbol(sample_symbol(file_id)).unwrap();
        assert!(sym_id > 0);
        let found = store.symbols_by_name("foo");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_id, Some(file_id));
    }

    #[test]
    fn reindexing_same_path_updates_in_place() {
        let store = Store::in_memory().unwrap();
        let row = NewFileRow {
            path: "a.rs",
            language: "rust",
            content_hash: "c1",
            line_count: 10,
            last_indexed_at: 0,
        };
        let id1 = store.insert_file(&row).unwrap();
        let row2 = NewFileRow {
            content_hash: "c2",
            line_count: 20,
            last_indexed_at: 1,
            ..row
        };
        let id2 = store.insert_file(&row2).unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn delete_file_data_removes_owned_rows() {
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
        store.insert_symbol(sample_symbol(file_id)).unwrap();
        store.delete_file_data(file_id).unwrap();
        assert!(store.symbols_by_name("foo").is_empty());
        assert!(store.file_id_for_path("a.rs").is_none());
    }
}
