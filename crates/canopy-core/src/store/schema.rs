//! Schema installation (spec §4.2 `migrate()`).

use rusqlite::Connection;

use crate::error::StoreResult;

pub const SCHEMA_VERSION: u32 = 1;

/// Idempotent schema installation. Safe to call on every open; only adds
/// tables/indices, never drops data (spec §4.2).
pub fn migrate(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            path TEXT NOT NULL UNIQUE,
            language TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            line_count INTEGER NOT NULL,
            last_indexed_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_files_language ON files(language);

        CREATE TABLE IF NOT EXISTS symbols (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            visibility TEXT NOT NULL,
            modifiers TEXT NOT NULL DEFAULT '[]',
            start_line INTEGER NOT NULL,
            start_col INTEGER NOT NULL,
            end_line INTEGER NOT NULL,
            end_col INTEGER NOT NULL,
            file_id INTEGER REFERENCES files(id) ON DELETE CASCADE,
            parent_id INTEGER,
            signature_hash TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_symbols_file ON symbols(file_id);
        CREATE INDEX IF NOT EXISTS idx_symbols_parent ON symbols(parent_id);
        CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(name);
        CREATE INDEX IF NOT EXISTS idx_symbols_kind ON symbols(kind);

        CREATE TABLE IF NOT EXISTS symbol_fragments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            start_line INTEGER NOT NULL,
            start_col INTEGER NOT NULL,
            end_line INTEGER NOT NULL,
            end_col INTEGER NOT NULL,
            is_primary INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_fragments_symbol ON symbol_fragments(symbol_id);
        CREATE INDEX IF NOT EXISTS idx_fragments_file ON symbol_fragments(file_id);

        CREATE TABLE IF NOT EXISTS scopes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            start_line INTEGER NOT NULL,
            start_col INTEGER NOT NULL,
            end_line INTEGER NOT NULL,
            end_col INTEGER NOT NULL,
            parent_id INTEGER REFERENCES scopes(id) ON DELETE CASCADE,
            symbol_id INTEGER REFERENCES symbols(id) ON DELETE SET NULL
        );
        CREATE INDEX IF NOT EXISTS idx_scopes_file ON scopes(file_id);
        CREATE INDEX IF NOT EXISTS idx_scopes_parent ON scopes(parent_id);

        CREATE TABLE IF NOT EXISTS reference_sites (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            scope_id INTEGER REFERENCES scopes(id) ON DELETE SET NULL,
            name TEXT NOT NULL,
            start_line INTEGER NOT NULL,
            start_col INTEGER NOT NULL,
            end_line INTEGER NOT NULL,
            end_col INTEGER NOT NULL,
            context TEXT NOT NULL,
            receiver TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_refs_file ON reference_sites(file_id);
        CREATE INDEX IF NOT EXISTS idx_refs_name ON reference_sites(name);
        CREATE INDEX IF NOT EXISTS idx_refs_scope ON reference_sites(scope_id);

        CREATE TABLE IF NOT EXISTS imports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            source TEXT NOT NULL,
            imported_name TEXT,
            local_alias TEXT,
            kind TEXT NOT NULL,
            scope_id INTEGER NOT NULL REFERENCES scopes(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_imports_file ON imports(file_id);
        CREATE INDEX IF NOT EXISTS idx_imports_source ON imports(source);

        CREATE TABLE IF NOT EXISTS type_members (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            type_expr TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_type_members_symbol ON type_members(symbol_id);

        CREATE TABLE IF NOT EXISTS function_params (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            type_expr TEXT,
            ordinal INTEGER NOT NULL,
            is_receiver INTEGER NOT NULL DEFAULT 0,
            is_return_value INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_params_symbol ON function_params(symbol_id);

        CREATE TABLE IF NOT EXISTS type_params (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            bound TEXT,
            ordinal INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_type_params_symbol ON type_params(symbol_id);

        CREATE TABLE IF NOT EXISTS annotations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            arguments TEXT,
            resolved_symbol_id INTEGER REFERENCES symbols(id) ON DELETE SET NULL
        );
        CREATE INDEX IF NOT EXISTS idx_annotations_symbol ON annotations(symbol_id);

        CREATE TABLE IF NOT EXISTS resolved_references (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reference_id INTEGER NOT NULL REFERENCES reference_sites(id) ON DELETE CASCADE,
            target_symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            confidence REAL NOT NULL,
            kind TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_resolved_refs_reference ON resolved_references(reference_id);
        CREATE INDEX IF NOT EXISTS idx_resolved_refs_target ON resolved_references(target_symbol_id);

        CREATE TABLE IF NOT EXISTS call_edges (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            caller_symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            callee_symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            line INTEGER NOT NULL,
            col INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_call_edges_caller ON call_edges(caller_symbol_id);
        CREATE INDEX IF NOT EXISTS idx_call_edges_callee ON call_edges(callee_symbol_id);
        CREATE INDEX IF NOT EXISTS idx_call_edges_file ON call_edges(file_id);

        CREATE TABLE IF NOT EXISTS implementations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type_symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            interface_symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            declaring_module_id INTEGER REFERENCES symbols(id) ON DELETE SET NULL
        );
        CREATE INDEX IF NOT EXISTS idx_impl_type ON implementations(type_symbol_id);
        CREATE INDEX IF NOT EXISTS idx_impl_interface ON implementations(interface_symbol_id);

        CREATE TABLE IF NOT EXISTS extension_bindings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            member_symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            extended_type_expr TEXT NOT NULL,
            extended_type_symbol_id INTEGER REFERENCES symbols(id) ON DELETE SET NULL,
            kind TEXT NOT NULL,
            constraints TEXT,
            is_default_impl INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_ext_member ON extension_bindings(member_symbol_id);
        CREATE INDEX IF NOT EXISTS idx_ext_type ON extension_bindings(extended_type_symbol_id);

        CREATE TABLE IF NOT EXISTS reexports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            original_symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            exported_name TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_reexports_file ON reexports(file_id);

        CREATE TABLE IF NOT EXISTS type_compositions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            composite_symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            component_symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
            kind TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_comp_composite ON type_compositions(composite_symbol_id);
        CREATE INDEX IF NOT EXISTS idx_comp_component ON type_compositions(component_symbol_id);
        ",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        rusqlite::params![SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}
