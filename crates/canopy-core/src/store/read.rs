//! Read surface consumed by `canopy-query` (spec §4.6). Every method here
//! returns committed state only; the pipeline's batch layers staged rows on
//! top for extraction-time reads (see [`super::Inserter::symbols_by_name`]).

use rusqlite::{params, Row};

use super::Store;
use crate::types::*;

fn row_to_file(row: &Row) -> rusqlite::Result<File> {
    Ok(File {
        id: row.get(0)?,
        path: row.get(1)?,
        language: row.get(2)?,
        content_hash: row.get(3)?,
        line_count: row.get(4)?,
        last_indexed_at: row.get(5)?,
    })
}

fn row_to_symbol(row: &Row) -> rusqlite::Result<Symbol> {
    let kind_str: String = row.get(2)?;
    let vis_str: String = row.get(3)?;
    let modifiers_json: String = row.get(4)?;
    Ok(Symbol {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: SymbolKind::parse(&kind_str).unwrap_or(SymbolKind::Variable),
        visibility: Visibility::parse(&vis_str).unwrap_or(Visibility::Private),
        modifiers: serde_json::from_str(&modifiers_json).unwrap_or_default(),
        span: Span::new(row.get(5)?, row.get(6)?, row.get(7)?, row.get(8)?),
        file_id: row.get(9)?,
        parent_id: row.get(10)?,
        signature_hash: row.get(11)?,
    })
}

fn row_to_scope(row: &Row) -> rusqlite::Result<Scope> {
    let kind_str: String = row.get(2)?;
    Ok(Scope {
        id: row.get(0)?,
        file_id: row.get(1)?,
        kind: ScopeKind::parse(&kind_str).unwrap_or(ScopeKind::Block),
        span: Span::new(row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?),
        parent_id: row.get(7)?,
        symbol_id: row.get(8)?,
    })
}

const SYMBOL_COLS: &str =
    "id, name, kind, visibility, modifiers, start_line, start_col, end_line, end_col, file_id, parent_id, signature_hash";

fn row_to_reference(row: &Row) -> rusqlite::Result<Reference> {
    let ctx_str: String = row.get(6)?;
    Ok(Reference {
        id: row.get(0)?,
        file_id: row.get(1)?,
        scope_id: row.get(2)?,
        name: row.get(3)?,
        span: Span::new(row.get(4)?, row.get(5)?, 0, 0),
        context: ReferenceContext::parse(&ctx_str).unwrap_or(ReferenceContext::Other),
        receiver: row.get(7)?,
    })
}

impl Store {
    pub(crate) fn symbols_by_name_impl(&self, name: &str) -> Vec<Symbol> {
        self.symbols_where("name = ?1", params![name])
    }

    fn symbols_where<P: rusqlite::Params>(&self, predicate: &str, p: P) -> Vec<Symbol> {
        let sql = format!("SELECT {SYMBOL_COLS} FROM symbols WHERE {predicate}");
        let mut stmt = match self.conn.prepare(&sql) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let rows = stmt.query_map(p, row_to_symbol);
        match rows {
            Ok(rows) => rows.filter_map(Result::ok).collect(),
            Err(_) => vec![],
        }
    }

    pub fn symbol(&self, id: Id) -> Option<Symbol> {
        self.symbols_where("id = ?1", params![id]).into_iter().next()
    }

    pub fn symbol_at_position(&self, file_id: Id, line: u32, col: u32) -> Vec<Symbol> {
        // Smallest enclosing span first: most specific symbol (e.g. a method
        // over its containing class) wins spec §4.6 `symbol_at`.
        let mut found = self.symbols_where(
            "file_id = ?1 AND start_line <= ?2 AND end_line >= ?2",
            params![file_id, line],
        );
        found.retain(|s| s.span.contains(line, col));
        found.sort_by_key(|s| {
            let lines = s.span.end_line.saturating_sub(s.span.start_line);
            lines
        });
        found
    }

    pub fn symbols_by_file(&self, file_id: Id) -> Vec<Symbol> {
        self.symbols_where("file_id = ?1", params![file_id])
    }

    pub fn symbols_by_kind(&self, kind: SymbolKind) -> Vec<Symbol> {
        self.symbols_where("kind = ?1", params![kind.as_str()])
    }

    /// `LIKE`-based name search; caller is responsible for translating globs
    /// into escaped `%`/`_` patterns (spec §4.6 `search`).
    pub fn symbols_like(&self, like_pattern: &str) -> Vec<Symbol> {
        self.symbols_where("name LIKE ?1 ESCAPE '\\'", params![like_pattern])
    }

    pub fn children_of(&self, parent_id: Id) -> Vec<Symbol> {
        self.symbols_where("parent_id = ?1", params![parent_id])
    }

    pub fn file(&self, id: Id) -> Option<File> {
        self.conn
            .query_row(
                "SELECT id, path, language, content_hash, line_count, last_indexed_at FROM files WHERE id = ?1",
                params![id],
                row_to_file,
            )
            .ok()
    }

    pub fn all_files(&self) -> Vec<File> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, path, language, content_hash, line_count, last_indexed_at FROM files")
            .unwrap();
        stmt.query_map([], row_to_file)
            .map(|rows| rows.filter_map(Result::ok).collect())
            .unwrap_or_default()
    }

    pub fn files_by_language(&self, language: &str) -> Vec<File> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, path, language, content_hash, line_count, last_indexed_at FROM files WHERE language = ?1",
            )
            .unwrap();
        stmt.query_map(params![language], row_to_file)
            .map(|rows| rows.filter_map(Result::ok).collect())
            .unwrap_or_default()
    }

    pub fn references_to(&self, target_symbol_id: Id) -> Vec<(Reference, ResolvedReference)> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT r.id, r.file_id, r.scope_id, r.name, r.start_line, r.start_col, r.context, r.receiver,
                        rr.id, rr.reference_id, rr.target_symbol_id, rr.confidence, rr.kind
                 FROM resolved_references rr
                 JOIN reference_sites r ON r.id = rr.reference_id
                 WHERE rr.target_symbol_id = ?1",
            )
            .unwrap();
        stmt.query_map(params![target_symbol_id], |row| {
            let reference = row_to_reference(row)?;
            let kind_str: String = row.get(12)?;
            let resolved = ResolvedReference {
                id: row.get(8)?,
                reference_id: row.get(9)?,
                target_symbol_id: row.get(10)?,
                confidence: row.get(11)?,
                kind: ResolutionKind::parse(&kind_str).unwrap_or(ResolutionKind::Heuristic),
            };
            Ok((reference, resolved))
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn references_in_file(&self, file_id: Id) -> Vec<Reference> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, file_id, scope_id, name, start_line, start_col, context, receiver FROM reference_sites WHERE file_id = ?1",
            )
            .unwrap();
        stmt.query_map(params![file_id], row_to_reference)
            .map(|rows| rows.filter_map(Result::ok).collect())
            .unwrap_or_default()
    }

    pub fn is_unresolved(&self, reference_id: Id) -> bool {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM resolved_references WHERE reference_id = ?1",
                params![reference_id],
                |row| row.get(0),
            )
            .unwrap_or(0);
        count == 0
    }

    /// The symbol a reference resolved to, if any (spec §4.4, used to derive
    /// `call_edges` from `resolved_references` for call-context sites).
    pub fn resolved_target_of(&self, reference_id: Id) -> Option<Id> {
        self.conn
            .query_row(
                "SELECT target_symbol_id FROM resolved_references WHERE reference_id = ?1",
                params![reference_id],
                |row| row.get(0),
            )
            .ok()
    }

    pub fn call_edges_from(&self, caller_symbol_id: Id) -> Vec<CallEdge> {
        self.call_edges_where("caller_symbol_id = ?1", params![caller_symbol_id])
    }

    pub fn call_edges_to(&self, callee_symbol_id: Id) -> Vec<CallEdge> {
        self.call_edges_where("callee_symbol_id = ?1", params![callee_symbol_id])
    }

    fn call_edges_where<P: rusqlite::Params>(&self, predicate: &str, p: P) -> Vec<CallEdge> {
        let sql = format!(
            "SELECT id, caller_symbol_id, callee_symbol_id, file_id, line, col FROM call_edges WHERE {predicate}"
        );
        let mut stmt = self.conn.prepare(&sql).unwrap();
        stmt.query_map(p, |row| {
            Ok(CallEdge {
                id: row.get(0)?,
                caller_symbol_id: row.get(1)?,
                callee_symbol_id: row.get(2)?,
                file_id: row.get(3)?,
                line: row.get(4)?,
                col: row.get(5)?,
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn implementations_of(&self, interface_symbol_id: Id) -> Vec<Implementation> {
        self.implementations_where("interface_symbol_id = ?1", params![interface_symbol_id])
    }

    pub fn implementations_by(&self, type_symbol_id: Id) -> Vec<Implementation> {
        self.implementations_where("type_symbol_id = ?1", params![type_symbol_id])
    }

    fn implementations_where<P: rusqlite::Params>(&self, predicate: &str, p: P) -> Vec<Implementation> {
        let sql = format!(
            "SELECT id, type_symbol_id, interface_symbol_id, kind, declaring_module_id FROM implementations WHERE {predicate}"
        );
        let mut stmt = self.conn.prepare(&sql).unwrap();
        stmt.query_map(p, |row| {
            let kind_str: String = row.get(3)?;
            Ok(Implementation {
                id: row.get(0)?,
                type_symbol_id: row.get(1)?,
                interface_symbol_id: row.get(2)?,
                kind: ImplementationKind::parse(&kind_str).unwrap_or(ImplementationKind::Implicit),
                declaring_module_id: row.get(4)?,
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn extension_bindings_for_member(&self, member_symbol_id: Id) -> Vec<ExtensionBinding> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, member_symbol_id, extended_type_expr, extended_type_symbol_id, kind, constraints, is_default_impl
                 FROM extension_bindings WHERE member_symbol_id = ?1",
            )
            .unwrap();
        stmt.query_map(params![member_symbol_id], |row| {
            let kind_str: String = row.get(4)?;
            let is_default: i64 = row.get(6)?;
            Ok(ExtensionBinding {
                id: row.get(0)?,
                member_symbol_id: row.get(1)?,
                extended_type_expr: row.get(2)?,
                extended_type_symbol_id: row.get(3)?,
                kind: ExtensionKind::parse(&kind_str).unwrap_or(ExtensionKind::Extension),
                constraints: row.get(5)?,
                is_default_impl: is_default != 0,
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn extension_bindings_for_type(&self, extended_type_symbol_id: Id) -> Vec<ExtensionBinding> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, member_symbol_id, extended_type_expr, extended_type_symbol_id, kind, constraints, is_default_impl
                 FROM extension_bindings WHERE extended_type_symbol_id = ?1",
            )
            .unwrap();
        stmt.query_map(params![extended_type_symbol_id], |row| {
            let kind_str: String = row.get(4)?;
            let is_default: i64 = row.get(6)?;
            Ok(ExtensionBinding {
                id: row.get(0)?,
                member_symbol_id: row.get(1)?,
                extended_type_expr: row.get(2)?,
                extended_type_symbol_id: row.get(3)?,
                kind: ExtensionKind::parse(&kind_str).unwrap_or(ExtensionKind::Extension),
                constraints: row.get(5)?,
                is_default_impl: is_default != 0,
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn reexports_of(&self, original_symbol_id: Id) -> Vec<Reexport> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, file_id, original_symbol_id, exported_name FROM reexports WHERE original_symbol_id = ?1")
            .unwrap();
        stmt.query_map(params![original_symbol_id], |row| {
            Ok(Reexport {
                id: row.get(0)?,
                file_id: row.get(1)?,
                original_symbol_id: row.get(2)?,
                exported_name: row.get(3)?,
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn reexports_in_file(&self, file_id: Id) -> Vec<Reexport> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, file_id, original_symbol_id, exported_name FROM reexports WHERE file_id = ?1")
            .unwrap();
        stmt.query_map(params![file_id], |row| {
            Ok(Reexport {
                id: row.get(0)?,
                file_id: row.get(1)?,
                original_symbol_id: row.get(2)?,
                exported_name: row.get(3)?,
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn type_compositions_of(&self, composite_symbol_id: Id) -> Vec<TypeComposition> {
        self.type_compositions_where("composite_symbol_id = ?1", params![composite_symbol_id])
    }

    pub fn type_compositions_by(&self, component_symbol_id: Id) -> Vec<TypeComposition> {
        self.type_compositions_where("component_symbol_id = ?1", params![component_symbol_id])
    }

    fn type_compositions_where<P: rusqlite::Params>(&self, predicate: &str, p: P) -> Vec<TypeComposition> {
        let sql = format!(
            "SELECT id, composite_symbol_id, component_symbol_id, kind FROM type_compositions WHERE {predicate}"
        );
        let mut stmt = self.conn.prepare(&sql).unwrap();
        stmt.query_map(p, |row| {
            let kind_str: String = row.get(3)?;
            Ok(TypeComposition {
                id: row.get(0)?,
                composite_symbol_id: row.get(1)?,
                component_symbol_id: row.get(2)?,
                kind: CompositionKind::parse(&kind_str).unwrap_or(CompositionKind::Compose),
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn scope(&self, id: Id) -> Option<Scope> {
        self.conn
            .query_row(
                "SELECT id, file_id, kind, start_line, start_col, end_line, end_col, parent_id, symbol_id FROM scopes WHERE id = ?1",
                params![id],
                row_to_scope,
            )
            .ok()
    }

    pub fn scopes_in_file(&self, file_id: Id) -> Vec<Scope> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, file_id, kind, start_line, start_col, end_line, end_col, parent_id, symbol_id FROM scopes WHERE file_id = ?1",
            )
            .unwrap();
        stmt.query_map(params![file_id], row_to_scope)
            .map(|rows| rows.filter_map(Result::ok).collect())
            .unwrap_or_default()
    }

    pub fn imports_in_file(&self, file_id: Id) -> Vec<Import> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, file_id, source, imported_name, local_alias, kind, scope_id FROM imports WHERE file_id = ?1")
            .unwrap();
        stmt.query_map(params![file_id], |row| {
            let kind_str: String = row.get(5)?;
            Ok(Import {
                id: row.get(0)?,
                file_id: row.get(1)?,
                source: row.get(2)?,
                imported_name: row.get(3)?,
                local_alias: row.get(4)?,
                kind: ImportKind::parse(&kind_str).unwrap_or(ImportKind::Module),
                scope_id: row.get(6)?,
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn imports_by_source(&self, source: &str) -> Vec<Import> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, file_id, source, imported_name, local_alias, kind, scope_id FROM imports WHERE source = ?1")
            .unwrap();
        stmt.query_map(params![source], |row| {
            let kind_str: String = row.get(5)?;
            Ok(Import {
                id: row.get(0)?,
                file_id: row.get(1)?,
                source: row.get(2)?,
                imported_name: row.get(3)?,
                local_alias: row.get(4)?,
                kind: ImportKind::parse(&kind_str).unwrap_or(ImportKind::Module),
                scope_id: row.get(6)?,
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn type_members_of(&self, symbol_id: Id) -> Vec<TypeMember> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, symbol_id, name, kind, type_expr FROM type_members WHERE symbol_id = ?1")
            .unwrap();
        stmt.query_map(params![symbol_id], |row| {
            Ok(TypeMember {
                id: row.get(0)?,
                symbol_id: row.get(1)?,
                name: row.get(2)?,
                kind: row.get(3)?,
                type_expr: row.get(4)?,
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn function_params_of(&self, symbol_id: Id) -> Vec<FunctionParam> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, symbol_id, name, type_expr, ordinal, is_receiver, is_return_value
                 FROM function_params WHERE symbol_id = ?1 ORDER BY ordinal",
            )
            .unwrap();
        stmt.query_map(params![symbol_id], |row| {
            let is_receiver: i64 = row.get(5)?;
            let is_return: i64 = row.get(6)?;
            Ok(FunctionParam {
                id: row.get(0)?,
                symbol_id: row.get(1)?,
                name: row.get(2)?,
                type_expr: row.get(3)?,
                ordinal: row.get(4)?,
                is_receiver: is_receiver != 0,
                is_return_value: is_return != 0,
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn type_params_of(&self, symbol_id: Id) -> Vec<TypeParam> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, symbol_id, name, bound, ordinal FROM type_params WHERE symbol_id = ?1 ORDER BY ordinal")
            .unwrap();
        stmt.query_map(params![symbol_id], |row| {
            Ok(TypeParam {
                id: row.get(0)?,
                symbol_id: row.get(1)?,
                name: row.get(2)?,
                bound: row.get(3)?,
                ordinal: row.get(4)?,
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    pub fn annotations_of(&self, symbol_id: Id) -> Vec<Annotation> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, symbol_id, name, arguments, resolved_symbol_id FROM annotations WHERE symbol_id = ?1")
            .unwrap();
        stmt.query_map(params![symbol_id], |row| {
            Ok(Annotation {
                id: row.get(0)?,
                symbol_id: row.get(1)?,
                name: row.get(2)?,
                arguments: row.get(3)?,
                resolved_symbol_id: row.get(4)?,
            })
        })
        .map(|rows| rows.filter_map(Result::ok).collect())
        .unwrap_or_default()
    }

    /// Symbol ids with zero incoming resolved references and zero call edges
    /// as callee, excluding container kinds (spec §4.6 `unused`).
    pub fn unreferenced_symbol_ids(&self) -> Vec<Id> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT s.id FROM symbols s
                 WHERE s.kind NOT IN ('package', 'module', 'namespace')
                 AND NOT EXISTS (SELECT 1 FROM resolved_references rr WHERE rr.target_symbol_id = s.id)
                 AND NOT EXISTS (SELECT 1 FROM call_edges ce WHERE ce.callee_symbol_id = s.id)",
            )
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .map(|rows| rows.filter_map(Result::ok).collect())
            .unwrap_or_default()
    }

    pub fn symbol_count(&self) -> i64 {
        self.conn
            .query_row("SELECT COUNT(*) FROM symbols", [], |row| row.get(0))
            .unwrap_or(0)
    }

    pub fn file_count(&self) -> i64 {
        self.conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
            .unwrap_or(0)
    }

    pub fn reference_count(&self) -> i64 {
        self.conn
            .query_row("SELECT COUNT(*) FROM reference_sites", [], |row| row.get(0))
            .unwrap_or(0)
    }

    pub fn unresolved_reference_count(&self) -> i64 {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM reference_sites r
                 WHERE NOT EXISTS (SELECT 1 FROM resolved_references rr WHERE rr.reference_id = r.id)",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0)
    }
}
