//! Extraction/resolution orchestration: walking a repository, batching and
//! committing per-file extraction, resolving references store-wide, the
//! blast-radius planner, and index integrity upkeep (spec §4.3–§4.5, §6.3).

pub mod batch;
pub mod blast_radius;
pub mod cancel;
pub mod extraction;
pub mod integrity;
pub mod resolution;
pub mod walk;

pub use cancel::CancelSignal;
pub use extraction::{extract_repository, extract_repository_cancellable, extract_repository_filtered, ExtractionSummary};
pub use resolution::{resolve_repository, resolve_repository_cancellable, ResolutionSummary};

use std::path::Path;

use canopy_core::{CanopyResult, Store};

/// Full indexing pass (spec §4.3 + §4.4 + §6.3, the `canopy index` command's
/// engine): extract every changed file, resolve references store-wide, then
/// reconcile deleted files and record the ruleset hash.
pub fn index_repository(store: &mut Store, root: &Path) -> CanopyResult<IndexSummary> {
    index_repository_filtered(store, root, None)
}

/// As [`index_repository`], restricted to `languages` when given.
pub fn index_repository_filtered(
    store: &mut Store,
    root: &Path,
    languages: Option<&[String]>,
) -> CanopyResult<IndexSummary> {
    index_repository_cancellable(store, root, languages, None)
}

/// As [`index_repository_filtered`], checking `cancel` between files in both
/// the extraction and resolution phases.
pub fn index_repository_cancellable(
    store: &mut Store,
    root: &Path,
    languages: Option<&[String]>,
    cancel: Option<&CancelSignal>,
) -> CanopyResult<IndexSummary> {
    let extraction = extract_repository_cancellable(store, root, languages, cancel)?;
    let resolution = resolve_repository_cancellable(store, cancel)?;
    let files_removed = integrity::reconcile(store, root)?;

    Ok(IndexSummary {
        extraction,
        resolution,
        files_removed,
    })
}

pub struct IndexSummary {
    pub extraction: ExtractionSummary,
    pub resolution: ResolutionSummary,
    pub files_removed: usize,
}
