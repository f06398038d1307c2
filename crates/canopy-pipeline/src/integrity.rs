//! Index integrity upkeep (spec §6.3, §9): detects when the bundled
//! extraction/resolution query set has changed since the index was built
//! (forcing a full rebuild rather than a silently stale incremental one),
//! and removes rows for files that no longer exist on disk.

use std::path::Path;

use canopy_core::hash::ruleset_hash;
use canopy_core::types::Id;
use canopy_core::{CanopyResult, Store};
use canopy_parse::languages::SUPPORTED_LANGUAGES;
use canopy_parse::queries::query_source_for;

/// Hash of every bundled `.scm` query, keyed by language. Changes whenever a
/// query file changes, independent of any single file's content hash.
pub fn current_ruleset_hash() -> String {
    let entries = SUPPORTED_LANGUAGES
        .iter()
        .filter_map(|&lang| query_source_for(lang).map(|src| (lang, src)));
    ruleset_hash(entries)
}

/// True when the stored ruleset hash doesn't match the bundled queries — the
/// index was built with a different extraction ruleset and must be rebuilt
/// from scratch rather than incrementally reindexed.
pub fn ruleset_changed(store: &Store) -> bool {
    store.scripts_hash().as_deref() != Some(current_ruleset_hash().as_str())
}

/// Drops every row belonging to a file whose path no longer exists under
/// `root`, and records the current ruleset hash. Call once per indexing run,
/// after extraction/resolution.
pub fn reconcile(store: &mut Store, root: &Path) -> CanopyResult<usize> {
    let mut removed = 0;
    let stale: Vec<Id> = store
        .all_files()
        .into_iter()
        .filter(|f| !root.join(&f.path).exists())
        .map(|f| f.id)
        .collect();
    for file_id in stale {
        store.delete_file_data(file_id)?;
        removed += 1;
    }
    store.set_scripts_hash(&current_ruleset_hash())?;
    Ok(removed)
}
