//! `type_hierarchy`/`implements_interfaces`/`extensions`/`reexports` (spec §4.6).

use canopy_core::types::{ExtensionBinding, Id, Implementation, Reexport, TypeComposition};
use canopy_core::Store;

pub struct TypeHierarchy {
    pub implements: Vec<Implementation>,
    pub implemented_by: Vec<Implementation>,
    pub composes: Vec<TypeComposition>,
    pub composed_by: Vec<TypeComposition>,
    pub extensions: Vec<ExtensionBinding>,
}

/// Everything a type symbol relates to: what it implements, what implements
/// it, what it's composed from/into, and extension members bound to it.
pub fn type_hierarchy(store: &Store, type_symbol_id: Id) -> TypeHierarchy {
    TypeHierarchy {
        implements: store.implementations_by(type_symbol_id),
        implemented_by: store.implementations_of(type_symbol_id),
        composes: store.type_compositions_of(type_symbol_id),
        composed_by: store.type_compositions_by(type_symbol_id),
        extensions: store.extension_bindings_for_type(type_symbol_id),
    }
}

/// The interfaces a type symbol implements (CLI `implements`; the inverse
/// direction from `implementations_of`, which answers "who implements this
/// interface").
pub fn implements_interfaces(store: &Store, type_symbol_id: Id) -> Vec<Implementation> {
    store.implementations_by(type_symbol_id)
}

pub fn reexports_of(store: &Store, original_symbol_id: Id) -> Vec<Reexport> {
    store.reexports_of(original_symbol_id)
}

pub fn reexports_in_file(store: &Store, file_id: Id) -> Vec<Reexport> {
    store.reexports_in_file(file_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::store::batch_api::{Inserter, NewSymbol};
    use canopy_core::store::extraction::NewFileRow;
    use canopy_core::types::{ImplementationKind, Span, SymbolKind, Visibility};

    fn make_symbol(store: &mut Store, file_id: Id, name: &str) -> Id {
        store
            .insert_symbol(NewSymbol {
                name: name.into(),
                kind: SymbolKind::Class,
                visibility: Visibility::Public,
                modifiers: vec![],
                span: Span::new(0, 0, 1, 0),
                file_id: Some(file_id),
                parent_id: None,
                signature_hash: format!("h-{name}"),
            })
            .unwrap()
    }

    #[test]
    fn hierarchy_collects_implementations_both_directions() {
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
        let interface = make_symbol(&mut store, file_id, "Greeter");
        let concrete = make_symbol(&mut store, file_id, "EnglishGreeter");
        store
            .insert_implementation(concrete, interface, ImplementationKind::Explicit, None)
            .unwrap();

        let concrete_view = type_hierarchy(&store, concrete);
        assert_eq!(concrete_view.implements.len(), 1);
        assert!(concrete_view.implemented_by.is_empty());

        let interface_view = type_hierarchy(&store, interface);
        assert_eq!(interface_view.implemented_by.len(), 1);
        assert!(interface_view.implements.is_empty());

        assert_eq!(implements_interfaces(&store, concrete).len(), 1);
        assert!(implements_interfaces(&store, interface).is_empty());
    }
}
