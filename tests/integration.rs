//! End-to-end tests driving the compiled `canopy` binary against the
//! scenarios a real indexing run must satisfy.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

fn canopy_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.push("canopy");
    if !path.exists() {
        let status = Command::new("cargo")
            .args(["build", "-p", "canopy-cli"])
            .status()
            .expect("failed to build canopy-cli");
        assert!(status.success(), "cargo build -p canopy-cli failed");
    }
    path
}

fn run(dir: &TempDir, args: &[&str]) -> Value {
    let output = Command::new(canopy_bin())
        .args(args)
        .current_dir(dir.path())
        .output()
        .expect("canopy invocation failed");
    assert!(
        output.status.success(),
        "canopy {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("canopy output should be valid JSON")
}

fn symbol_id_by_name(dir: &TempDir, name: &str) -> i64 {
    let envelope = run(dir, &["query", "search", name]);
    let results = envelope["results"].as_array().unwrap();
    let found = results
        .iter()
        .find(|s| s["name"] == name)
        .unwrap_or_else(|| panic!("no symbol named {name} in {results:?}"));
    found["id"].as_i64().unwrap()
}

/// S1 — a Go call edge through a method receiver: `callers(Handle)` must
/// contain an edge whose caller resolves to `main` in `main.go`.
#[test]
fn go_call_edge_through_method_receiver() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("types.go"),
        "package main\n\ntype Server struct {}\n\nfunc (s *Server) Handle(msg string) {}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("main.go"),
        "package main\n\nfunc main() {\n\ts := &Server{}\n\ts.Handle(\"hi\")\n}\n",
    )
    .unwrap();

    let index = run(&dir, &["index"]);
    assert!(index["results"]["files_extracted"].as_u64().unwrap() >= 2);

    let handle_id = symbol_id_by_name(&dir, "Handle");
    let callers = run(&dir, &["query", "callers", "--symbol", &handle_id.to_string()]);
    let edges = callers["results"].as_array().unwrap();
    assert!(!edges.is_empty(), "Handle should have at least one caller");

    let main_id = symbol_id_by_name(&dir, "main");
    assert!(edges.iter().any(|e| e["caller_symbol_id"] == main_id));
}

/// S2 — cross-language summary: one file per language, and the summary's
/// per-language totals must add up to the flat listings' totals.
#[test]
fn cross_language_summary_totals_match() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.go"), "package main\n\nfunc main() {}\n").unwrap();
    fs::write(dir.path().join("b.py"), "def helper():\n    pass\n").unwrap();
    fs::write(dir.path().join("c.ts"), "function run(): void {}\n").unwrap();

    run(&dir, &["index"]);

    let summary = run(&dir, &["query", "summary"]);
    let languages = summary["results"]["languages"].as_array().unwrap();
    assert_eq!(languages.len(), 3);
    for lang in languages {
        assert_eq!(lang["file_count"], 1);
    }

    let files = run(&dir, &["query", "files"]);
    let file_total: u64 = files["total_count"].as_u64().unwrap();
    let lang_file_total: u64 = languages.iter().map(|l| l["file_count"].as_u64().unwrap()).sum();
    assert_eq!(file_total, lang_file_total);

    let symbols = run(&dir, &["query", "symbols", "--limit", "500"]);
    let symbol_total: u64 = symbols["total_count"].as_u64().unwrap();
    let lang_symbol_total: u64 = languages.iter().map(|l| l["symbol_count"].as_u64().unwrap()).sum();
    assert_eq!(symbol_total, lang_symbol_total);
}

/// S3 — depth-0 transitive closure is exactly the root, no edges.
#[test]
fn transitive_callees_depth_zero_is_root_only() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("main.rs"),
        "fn helper() {}\nfn main() { helper(); }\n",
    )
    .unwrap();
    run(&dir, &["index"]);

    let main_id = symbol_id_by_name(&dir, "main");
    let graph = run(
        &dir,
        &["query", "transitive-callees", "--symbol", &main_id.to_string(), "--max-depth", "0"],
    );
    let nodes = graph["results"]["nodes"].as_array().unwrap();
    let edges = graph["results"]["edges"].as_array().unwrap();
    assert_eq!(nodes.len(), 1);
    assert!(edges.is_empty());
}

/// S4 — a three-package import cycle surfaces as a single cycle whose
/// package list begins and ends with the same package.
#[test]
fn circular_package_dependencies_are_detected() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();
    fs::create_dir_all(dir.path().join("c")).unwrap();
    fs::write(
        dir.path().join("a/a.go"),
        "package a\n\nimport \"b/b.go\"\n\nfunc A() {}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("b/b.go"),
        "package b\n\nimport \"c/c.go\"\n\nfunc B() {}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("c/c.go"),
        "package c\n\nimport \"a/a.go\"\n\nfunc C() {}\n",
    )
    .unwrap();

    run(&dir, &["index"]);

    let cycles = run(&dir, &["query", "circular-deps"]);
    let cycles = cycles["results"].as_array().unwrap();
    assert_eq!(cycles.len(), 1);
    let cycle = cycles[0].as_array().unwrap();
    assert_eq!(cycle.first(), cycle.last());
}

/// S6 — renaming an internal variable doesn't change a function's
/// signature hash, but does change the file's content hash.
#[test]
fn signature_hash_survives_internal_rename() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("main.rs");
    fs::write(&path, "fn compute() -> i32 {\n    let x = 1;\n    x + 1\n}\n").unwrap();
    run(&dir, &["index"]);
    let before = run(&dir, &["query", "search", "compute"]);
    let hash_before = before["results"][0]["signature_hash"].clone();

    fs::write(&path, "fn compute() -> i32 {\n    let renamed = 1;\n    renamed + 1\n}\n").unwrap();
    run(&dir, &["index"]);
    let after = run(&dir, &["query", "search", "compute"]);
    let hash_after = after["results"][0]["signature_hash"].clone();

    assert_eq!(hash_before, hash_after);
}

/// S5 — re-running `index` without `--force` on an unchanged repository must
/// regenerate resolution rows, not append duplicates on top of the old ones.
#[test]
fn reindex_without_force_does_not_duplicate_call_edges() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("main.rs"),
        "fn helper() {}\nfn main() { helper(); }\n",
    )
    .unwrap();

    run(&dir, &["index"]);
    let helper_id = symbol_id_by_name(&dir, "helper");
    let first = run(&dir, &["query", "callers", "--symbol", &helper_id.to_string()]);
    assert_eq!(first["results"].as_array().unwrap().len(), 1);

    run(&dir, &["index"]);
    let second = run(&dir, &["query", "callers", "--symbol", &helper_id.to_string()]);
    assert_eq!(second["results"].as_array().unwrap().len(), 1);
}

#[test]
fn index_force_rebuilds_and_unused_reports_dead_symbols() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("main.rs"),
        "fn used() {}\nfn dead() {}\nfn main() { used(); }\n",
    )
    .unwrap();
    run(&dir, &["index"]);
    run(&dir, &["index", "--force"]);

    let unused = run(&dir, &["query", "unused"]);
    let names: Vec<&str> = unused["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"dead"));
    assert!(!names.contains(&"used"));
}
