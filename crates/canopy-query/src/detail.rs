//! `symbol_detail` (spec §4.6): a symbol plus every attached row in one
//! round trip.

use canopy_core::types::{Annotation, FunctionParam, Id, Symbol, TypeMember, TypeParam};
use canopy_core::Store;

pub struct SymbolDetail {
    pub symbol: Symbol,
    pub params: Vec<FunctionParam>,
    pub members: Vec<TypeMember>,
    pub type_params: Vec<TypeParam>,
    pub annotations: Vec<Annotation>,
}

pub fn symbol_detail(store: &Store, id: Id) -> Option<SymbolDetail> {
    let symbol = store.symbol(id)?;
    Some(SymbolDetail {
        params: store.function_params_of(id),
        members: store.type_members_of(id),
        type_params: store.type_params_of(id),
        annotations: store.annotations_of(id),
        symbol,
    })
}
