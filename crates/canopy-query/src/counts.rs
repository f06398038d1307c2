//! Reference-count decomposition shared by enumeration and analytical
//! queries (spec §4.6, §8 property 1: `ref_count = internal + external`).

use canopy_core::types::Id;
use canopy_core::Store;

#[derive(Debug, Clone, Copy, Default)]
pub struct RefCounts {
    pub internal: usize,
    pub external: usize,
}

impl RefCounts {
    pub fn total(&self) -> usize {
        self.internal + self.external
    }
}

/// A reference is "external" when its originating file differs from the
/// target symbol's owning file (spec §9: the hotspot ranking key).
pub fn ref_counts(store: &Store, symbol_id: Id, owning_file_id: Option<Id>) -> RefCounts {
    let mut counts = RefCounts::default();
    for (reference, _) in store.references_to(symbol_id) {
        match owning_file_id {
            Some(file_id) if reference.file_id == file_id => counts.internal += 1,
            _ => counts.external += 1,
        }
    }
    counts
}
