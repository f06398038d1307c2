//! Fake-ID batch (spec §4.3 step 5, §9). Stages one file's extraction rows
//! under negative placeholder ids so intra-file foreign keys are stable
//! before anything reaches the database, then `commit` remaps every
//! placeholder to a real, store-assigned id in one transaction.

use std::collections::HashMap;

use canopy_core::store::batch_api::{
    Inserter, NewAnnotation, NewFunctionParam, NewImport, NewReference, NewScope, NewSymbol,
    NewSymbolFragment, NewTypeMember, NewTypeParam,
};
use canopy_core::types::{Id, Symbol};
use canopy_core::{Store, StoreResult};

/// Staged drafts with every fake id resolved relative to each other, but not
/// yet committed. Holds no borrow of the `Store` — separated out from
/// [`Batch`] specifically so a caller can drop the batch's read borrow before
/// taking the `&mut Store` that `commit_batch` needs.
#[derive(Default)]
pub struct StagedBatch {
    symbols: Vec<(Id, NewSymbol)>,
    fragments: Vec<(Id, NewSymbolFragment)>,
    scopes: Vec<(Id, NewScope)>,
    references: Vec<(Id, NewReference)>,
    imports: Vec<(Id, NewImport)>,
    type_members: Vec<(Id, NewTypeMember)>,
    function_params: Vec<(Id, NewFunctionParam)>,
    type_params: Vec<(Id, NewTypeParam)>,
    annotations: Vec<(Id, NewAnnotation)>,
}

impl StagedBatch {
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
            && self.fragments.is_empty()
            && self.scopes.is_empty()
            && self.references.is_empty()
            && self.imports.is_empty()
    }
}

pub struct Batch<'s> {
    store: &'s Store,
    next_fake_id: Id,
    staged: StagedBatch,
}

impl<'s> Batch<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self {
            store,
            next_fake_id: -1,
            staged: StagedBatch::default(),
        }
    }

    fn next_id(&mut self) -> Id {
        let id = self.next_fake_id;
        self.next_fake_id -= 1;
        id
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Releases this batch's borrow of `store`, handing back the plain staged
    /// drafts so the caller can take a `&mut Store` for [`commit_batch`].
    pub fn finish(self) -> StagedBatch {
        self.staged
    }
}

impl<'s> Inserter for Batch<'s> {
    fn insert_symbol(&mut self, value: NewSymbol) -> StoreResult<Id> {
        let id = self.next_id();
        self.staged.symbols.push((id, value));
        Ok(id)
    }

    fn insert_symbol_fragment(&mut self, value: NewSymbolFragment) -> StoreResult<Id> {
        let id = self.next_id();
        self.staged.fragments.push((id, value));
        Ok(id)
    }

    fn insert_scope(&mut self, value: NewScope) -> StoreResult<Id> {
        let id = self.next_id();
        self.staged.scopes.push((id, value));
        Ok(id)
    }

    fn insert_reference(&mut self, value: NewReference) -> StoreResult<Id> {
        let id = self.next_id();
        self.staged.references.push((id, value));
        Ok(id)
    }

    fn insert_import(&mut self, value: NewImport) -> StoreResult<Id> {
        let id = self.next_id();
        self.staged.imports.push((id, value));
        Ok(id)
    }

    fn insert_type_member(&mut self, value: NewTypeMember) -> StoreResult<Id> {
        let id = self.next_id();
        self.staged.type_members.push((id, value));
        Ok(id)
    }

    fn insert_function_param(&mut self, value: NewFunctionParam) -> StoreResult<Id> {
        let id = self.next_id();
        self.staged.function_params.push((id, value));
        Ok(id)
    }

    fn insert_type_param(&mut self, value: NewTypeParam) -> StoreResult<Id> {
        let id = self.next_id();
        self.staged.type_params.push((id, value));
        Ok(id)
    }

    fn insert_annotation(&mut self, value: NewAnnotation) -> StoreResult<Id> {
        let id = self.next_id();
        self.staged.annotations.push((id, value));
        Ok(id)
    }

    /// Merges staged symbols on top of committed ones (spec §4.3 step 6):
    /// extraction code resolving a forward reference within the same file
    /// must see symbols this same batch already staged.
    fn symbols_by_name(&self, name: &str) -> Vec<Symbol> {
        let mut found = self.store.symbols_by_name(name);
        found.extend(
            self.staged
                .symbols
                .iter()
                .filter(|(_, s)| s.name == name)
                .map(|(id, s)| Symbol {
                    id: *id,
                    name: s.name.clone(),
                    kind: s.kind,
                    visibility: s.visibility,
                    modifiers: s.modifiers.clone(),
                    span: s.span,
                    file_id: s.file_id,
                    parent_id: s.parent_id,
                    signature_hash: s.signature_hash.clone(),
                }),
        );
        found
    }
}

fn remap(id: Id, map: &HashMap<Id, Id>) -> Id {
    if id < 0 {
        *map.get(&id).expect("fake id committed before its dependents")
    } else {
        id
    }
}

fn remap_opt(id: Option<Id>, map: &HashMap<Id, Id>) -> Option<Id> {
    id.map(|id| remap(id, map))
}

/// Commit a batch's staged rows into `store`, remapping every fake id to the
/// real id the database assigned (spec §4.3 step 7). Drafts are committed in
/// FK-dependency order: symbols, then scopes (which may reference symbols),
/// then everything that references symbols/scopes.
pub fn commit_batch(store: &mut Store, batch: StagedBatch) -> StoreResult<usize> {
    let mut map: HashMap<Id, Id> = HashMap::new();
    let mut committed = 0usize;

    for (fake_id, mut draft) in batch.symbols {
        draft.parent_id = remap_opt(draft.parent_id, &map);
        let real_id = store.insert_symbol(draft)?;
        map.insert(fake_id, real_id);
        committed += 1;
    }
    for (fake_id, mut draft) in batch.scopes {
        draft.parent_id = remap_opt(draft.parent_id, &map);
        draft.symbol_id = remap_opt(draft.symbol_id, &map);
        let real_id = store.insert_scope(draft)?;
        map.insert(fake_id, real_id);
        committed += 1;
    }
    for (fake_id, mut draft) in batch.fragments {
        draft.symbol_id = remap(draft.symbol_id, &map);
        let real_id = store.insert_symbol_fragment(draft)?;
        map.insert(fake_id, real_id);
        committed += 1;
    }
    for (fake_id, mut draft) in batch.references {
        draft.scope_id = remap_opt(draft.scope_id, &map);
        let real_id = store.insert_reference(draft)?;
        map.insert(fake_id, real_id);
        committed += 1;
    }
    for (fake_id, mut draft) in batch.imports {
        draft.scope_id = remap(draft.scope_id, &map);
        let real_id = store.insert_import(draft)?;
        map.insert(fake_id, real_id);
        committed += 1;
    }
    for (fake_id, mut draft) in batch.type_members {
        draft.symbol_id = remap(draft.symbol_id, &map);
        let real_id = store.insert_type_member(draft)?;
        map.insert(fake_id, real_id);
        committed += 1;
    }
    for (fake_id, mut draft) in batch.function_params {
        draft.symbol_id = remap(draft.symbol_id, &map);
        let real_id = store.insert_function_param(draft)?;
        map.insert(fake_id, real_id);
        committed += 1;
    }
    for (fake_id, mut draft) in batch.type_params {
        draft.symbol_id = remap(draft.symbol_id, &map);
        let real_id = store.insert_type_param(draft)?;
        map.insert(fake_id, real_id);
        committed += 1;
    }
    for (fake_id, mut draft) in batch.annotations {
        draft.symbol_id = remap(draft.symbol_id, &map);
        draft.resolved_symbol_id = remap_opt(draft.resolved_symbol_id, &map);
        let real_id = store.insert_annotation(draft)?;
        map.insert(fake_id, real_id);
        committed += 1;
    }

    Ok(committed)
}
