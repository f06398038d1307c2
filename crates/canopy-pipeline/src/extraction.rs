//! Per-file extraction orchestration (spec §4.3). File reads and hashing are
//! parallelized with `rayon`; the actual database commit is serialized,
//! since SQLite only has a single writer and `Store` isn't `Sync`.

use std::path::PathBuf;

use rayon::prelude::*;

use canopy_core::hash::content_hash;
use canopy_core::store::extraction::NewFileRow;
use canopy_core::{CanopyError, CanopyResult, Store};
use canopy_parse::bridge::{compile_query, ParserBridge};
use canopy_parse::extract::extract_file;
use canopy_parse::queries::query_source_for;

use crate::batch::{commit_batch, Batch};
use crate::cancel::CancelSignal;
use crate::walk::DiscoveredFile;

struct LoadedFile {
    path: PathBuf,
    language: &'static str,
    bytes: Vec<u8>,
    hash: String,
}

/// Read and hash every discovered file in parallel (spec §4.3 step 1).
fn load_files(discovered: Vec<DiscoveredFile>) -> Vec<LoadedFile> {
    discovered
        .into_par_iter()
        .filter_map(|d| {
            let bytes = std::fs::read(&d.path).ok()?;
            let hash = content_hash(&bytes);
            Some(LoadedFile {
                path: d.path,
                language: d.language,
                bytes,
                hash,
            })
        })
        .collect()
}

pub struct ExtractionSummary {
    pub files_scanned: usize,
    pub files_extracted: usize,
    pub files_skipped_unchanged: usize,
    pub files_failed: Vec<(String, String)>,
}

/// Extracts every changed file under `root` into `store` (spec §4.3). A file
/// whose content hash matches the stored row is skipped entirely — the
/// pipeline's primary incremental-reindex shortcut.
pub fn extract_repository(store: &mut Store, root: &std::path::Path) -> CanopyResult<ExtractionSummary> {
    extract_repository_filtered(store, root, None)
}

/// As [`extract_repository`], but restricted to `languages` when given
/// (spec §6.1 `index --languages`).
pub fn extract_repository_filtered(
    store: &mut Store,
    root: &std::path::Path,
    languages: Option<&[String]>,
) -> CanopyResult<ExtractionSummary> {
    extract_repository_cancellable(store, root, languages, None)
}

/// As [`extract_repository_filtered`], checking `cancel` before each file —
/// a cancelled run returns [`CanopyError::Cancelled`] with everything up to
/// that point already committed (spec §5: pipeline operations accept a
/// context-style cancel signal).
pub fn extract_repository_cancellable(
    store: &mut Store,
    root: &std::path::Path,
    languages: Option<&[String]>,
    cancel: Option<&CancelSignal>,
) -> CanopyResult<ExtractionSummary> {
    let mut discovered = crate::walk::walk_repository(root);
    if let Some(allowlist) = languages {
        discovered.retain(|f| allowlist.iter().any(|l| l == f.language));
    }
    let loaded = load_files(discovered);

    // A changed bundled query set invalidates every prior extraction, even
    // for files whose content hasn't moved — the content-hash skip below
    // would otherwise leave them extracted under rules that no longer exist.
    let force_reextract = crate::integrity::ruleset_changed(store);
    if force_reextract {
        tracing::info!("bundled query ruleset changed since last index, forcing full re-extraction");
    }

    let mut summary = ExtractionSummary {
        files_scanned: loaded.len(),
        files_extracted: 0,
        files_skipped_unchanged: 0,
        files_failed: Vec::new(),
    };

    let mut bridge = ParserBridge::new();
    for file in loaded {
        if cancel.is_some_and(|c| c.is_cancelled()) {
            return Err(CanopyError::Cancelled);
        }

        let rel_path = file
            .path
            .strip_prefix(root)
            .unwrap_or(&file.path)
            .to_string_lossy()
            .to_string();

        if let Some(existing) = store.file_id_for_path(&rel_path) {
            if !force_reextract && store.file(existing).is_some_and(|f| f.content_hash == file.hash) {
                summary.files_skipped_unchanged += 1;
                continue;
            }
            store.delete_file_data(existing)?;
        }

        match extract_one_file(store, &rel_path, file.language, &file.bytes, &mut bridge) {
            Ok(()) => summary.files_extracted += 1,
            Err(e) => summary.files_failed.push((rel_path, e.to_string())),
        }
    }

    // Record the ruleset this extraction ran under so the next run's
    // `ruleset_changed` check reflects reality even if `integrity::reconcile`
    // (normally run later in `index_repository_filtered`) never executes —
    // e.g. when a caller uses `extract_repository` on its own.
    store.set_scripts_hash(&crate::integrity::current_ruleset_hash())?;

    Ok(summary)
}

fn extract_one_file(
    store: &mut Store,
    rel_path: &str,
    language: &str,
    bytes: &[u8],
    bridge: &mut ParserBridge,
) -> CanopyResult<()> {
    let line_count = bytes.iter().filter(|&&b| b == b'\n').count() as u32 + 1;
    let file_id = store.insert_file(&NewFileRow {
        path: rel_path,
        language,
        content_hash: &content_hash(bytes),
        line_count,
        last_indexed_at: 0,
    })?;

    let tree = bridge
        .parse(language, bytes)
        .map_err(|e| CanopyError::ExtractionFailure {
            file: rel_path.to_string(),
            message: e.to_string(),
        })?;
    if canopy_parse::bridge::ParserBridge::has_errors(&tree) {
        tracing::warn!(file = rel_path, "parse produced error nodes");
    }

    let query_source = query_source_for(language)
        .ok_or_else(|| CanopyError::UnsupportedLanguage(language.to_string()))?;
    let query = compile_query(language, query_source).map_err(|e| CanopyError::QueryCompileError(e.to_string()))?;

    let mut batch = Batch::new(store);
    extract_file(&mut batch, &query, &tree, bytes, file_id)?;
    let staged = batch.finish();
    if !staged.is_empty() {
        commit_batch(store, staged)?;
    }
    Ok(())
}
