use std::path::PathBuf;

use canopy_core::{CanopyConfig, Store};
use canopy_output::{JsonFormatter, OutputFormatter, QueryEnvelope, TextFormatter};

use crate::cli_args::Format;

pub fn run(
    path: Option<PathBuf>,
    force: bool,
    languages: Option<Vec<String>>,
    scripts_dir: Option<PathBuf>,
    db: Option<PathBuf>,
    format: Format,
) -> i32 {
    let root = path.unwrap_or_else(|| PathBuf::from("."));
    let db_path = db.unwrap_or_else(|| CanopyConfig::default_db_path(&root));

    if scripts_dir.is_some() {
        tracing::warn!("--scripts-dir is accepted but the embedded query set is always used");
    }
    if force && db_path.exists() {
        if let Err(e) = std::fs::remove_file(&db_path) {
            return emit_error(format, e.to_string());
        }
    }

    let mut store = match Store::open(&db_path) {
        Ok(s) => s,
        Err(e) => return emit_error(format, e.to_string()),
    };

    let result = match &languages {
        Some(langs) => canopy_pipeline::index_repository_filtered(&mut store, &root, Some(langs)),
        None => canopy_pipeline::index_repository(&mut store, &root),
    };

    match result {
        Ok(summary) => {
            let payload = serde_json::json!({
                "files_scanned": summary.extraction.files_scanned,
                "files_extracted": summary.extraction.files_extracted,
                "files_skipped_unchanged": summary.extraction.files_skipped_unchanged,
                "files_failed": summary.extraction.files_failed,
                "references_resolved": summary.resolution.references_resolved,
                "call_edges_derived": summary.resolution.call_edges_derived,
                "files_removed": summary.files_removed,
            });
            let envelope = QueryEnvelope::ok("index", payload, None);
            print_envelope(format, &envelope);
            0
        }
        Err(e) => emit_error(format, e.to_string()),
    }
}

fn emit_error(format: Format, message: String) -> i32 {
    let envelope = QueryEnvelope::err("index", message);
    print_envelope(format, &envelope);
    1
}

fn print_envelope(format: Format, envelope: &QueryEnvelope) {
    let rendered = match format {
        Format::Json => JsonFormatter.format(envelope),
        Format::Text => TextFormatter.format(envelope),
    };
    if envelope.is_error() && format == Format::Text {
        eprintln!("{rendered}");
    } else {
        println!("{rendered}");
    }
}
