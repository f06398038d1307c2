//! The `Inserter` contract shared between the real [`Store`](super::Store)
//! and the per-file extraction batch (spec §4.3 step 5, §9 "Fake-ID batch").
//!
//! A per-file batch stages extraction writes under negative fake IDs so that
//! intra-file FK references (a symbol's parent, a scope's owning symbol, a
//! reference's scope) are stable before anything is committed. Because the
//! batch implements the same `Inserter` trait as `Store`, the language
//! extraction program is written once against the trait and doesn't know or
//! care whether it's writing to a batch or directly to the database.

use crate::error::StoreResult;
use crate::types::*;

/// A symbol ready to be inserted; `id` is assigned by the `Inserter`.
#[derive(Debug, Clone)]
pub struct NewSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub visibility: Visibility,
    pub modifiers: Vec<String>,
    pub span: Span,
    pub file_id: Option<Id>,
    pub parent_id: Option<Id>,
    pub signature_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewSymbolFragment {
    pub symbol_id: Id,
    pub file_id: Id,
    pub span: Span,
    pub is_primary: bool,
}

#[derive(Debug, Clone)]
pub struct NewScope {
    pub file_id: Id,
    pub kind: ScopeKind,
    pub span: Span,
    pub parent_id: Option<Id>,
    pub symbol_id: Option<Id>,
}

#[derive(Debug, Clone)]
pub struct NewReference {
    pub file_id: Id,
    pub scope_id: Option<Id>,
    pub name: String,
    pub span: Span,
    pub context: ReferenceContext,
    pub receiver: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewImport {
    pub file_id: Id,
    pub source: String,
    pub imported_name: Option<String>,
    pub local_alias: Option<String>,
    pub kind: ImportKind,
    pub scope_id: Id,
}

#[derive(Debug, Clone)]
pub struct NewTypeMember {
    pub symbol_id: Id,
    pub name: String,
    pub kind: String,
    pub type_expr: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewFunctionParam {
    pub symbol_id: Id,
    pub name: String,
    pub type_expr: Option<String>,
    pub ordinal: u32,
    pub is_receiver: bool,
    pub is_return_value: bool,
}

#[derive(Debug, Clone)]
pub struct NewTypeParam {
    pub symbol_id: Id,
    pub name: String,
    pub bound: Option<String>,
    pub ordinal: u32,
}

#[derive(Debug, Clone)]
pub struct NewAnnotation {
    pub symbol_id: Id,
    pub name: String,
    pub arguments: Option<String>,
    pub resolved_symbol_id: Option<Id>,
}

/// Extraction-phase write surface. Implemented by both `Store` (direct,
/// real-ID commits) and by the pipeline's per-file batch (fake-ID staging).
pub trait Inserter {
    fn insert_symbol(&mut self, value: NewSymbol) -> StoreResult<Id>;
    fn insert_symbol_fragment(&mut self, value: NewSymbolFragment) -> StoreResult<Id>;
    fn insert_scope(&mut self, value: NewScope) -> StoreResult<Id>;
    fn insert_reference(&mut self, value: NewReference) -> StoreResult<Id>;
    fn insert_import(&mut self, value: NewImport) -> StoreResult<Id>;
    fn insert_type_member(&mut self, value: NewTypeMember) -> StoreResult<Id>;
    fn insert_function_param(&mut self, value: NewFunctionParam) -> StoreResult<Id>;
    fn insert_type_param(&mut self, value: NewTypeParam) -> StoreResult<Id>;
    fn insert_annotation(&mut self, value: NewAnnotation) -> StoreResult<Id>;

    /// Symbols visible to the extraction program so far, by name. Extraction
    /// reads transparently merge batch state with committed state (spec
    /// §4.3 step 6); `Store`'s implementation only ever sees committed state,
    /// which the batch's implementation layers its own staged rows on top of.
    fn symbols_by_name(&self, name: &str) -> Vec<Symbol>;
}
