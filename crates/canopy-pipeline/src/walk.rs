//! Repository directory walk (spec §4.3 step 1): gitignore-aware discovery
//! of files in a supported language.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use canopy_parse::languages::detect_language;

pub struct DiscoveredFile {
    pub path: PathBuf,
    pub language: &'static str,
}

/// Walks `root`, returning every file whose extension maps to a supported
/// language. Respects `.gitignore` and a repo-local `.canopyignore`.
pub fn walk_repository(root: &Path) -> Vec<DiscoveredFile> {
    let mut files = Vec::new();
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .add_custom_ignore_filename(".canopyignore")
        .build();

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.into_path();
        if let Some(language) = detect_language(&path) {
            files.push(DiscoveredFile { path, language });
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_supported_source_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("src/lib.py"), "x = 1").unwrap();
        fs::write(dir.path().join("README.md"), "# hi").unwrap();

        let files = walk_repository(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.language == "rust"));
        assert!(files.iter().any(|f| f.language == "python"));
    }

    #[test]
    fn respects_canopyignore() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("vendor/lib.rs"), "fn f() {}").unwrap();
        fs::write(dir.path().join("app.rs"), "fn g() {}").unwrap();
        fs::write(dir.path().join(".canopyignore"), "vendor/\n").unwrap();

        let files = walk_repository(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("app.rs"));
    }
}
