//! Language registry: extension → language id → tree-sitter grammar (spec
//! §4.1). Ten languages, matching the SPEC_FULL.md language coverage table.

use tree_sitter::Language;

/// Canonical lowercase language identifiers used throughout extraction,
/// the store's `files.language` column, and CLI `--language` filters.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "rust",
    "python",
    "go",
    "typescript",
    "javascript",
    "java",
    "c",
    "cpp",
    "csharp",
    "ruby",
];

pub fn detect_language(path: &std::path::Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "rs" => Some("rust"),
        "py" | "pyi" => Some("python"),
        "go" => Some("go"),
        "ts" | "mts" | "cts" => Some("typescript"),
        "tsx" => Some("typescript"),
        "js" | "mjs" | "cjs" | "jsx" => Some("javascript"),
        "java" => Some("java"),
        "c" | "h" => Some("c"),
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => Some("cpp"),
        "cs" => Some("csharp"),
        "rb" => Some("ruby"),
        _ => None,
    }
}

pub fn grammar_for(language: &str) -> Option<Language> {
    Some(match language {
        "rust" => tree_sitter_rust::LANGUAGE.into(),
        "python" => tree_sitter_python::LANGUAGE.into(),
        "go" => tree_sitter_go::LANGUAGE.into(),
        "typescript" => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        "javascript" => tree_sitter_javascript::LANGUAGE.into(),
        "java" => tree_sitter_java::LANGUAGE.into(),
        "c" => tree_sitter_c::LANGUAGE.into(),
        "cpp" => tree_sitter_cpp::LANGUAGE.into(),
        "csharp" => tree_sitter_c_sharp::LANGUAGE.into(),
        "ruby" => tree_sitter_ruby::LANGUAGE.into(),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn detects_every_supported_extension() {
        let cases = [
            ("a.rs", "rust"),
            ("a.py", "python"),
            ("a.go", "go"),
            ("a.ts", "typescript"),
            ("a.tsx", "typescript"),
            ("a.js", "javascript"),
            ("a.jsx", "javascript"),
            ("a.java", "java"),
            ("a.c", "c"),
            ("a.h", "c"),
            ("a.cpp", "cpp"),
            ("a.hpp", "cpp"),
            ("a.cs", "csharp"),
            ("a.rb", "ruby"),
        ];
        for (path, expected) in cases {
            assert_eq!(detect_language(Path::new(path)), Some(expected), "{path}");
        }
    }

    #[test]
    fn unknown_extension_is_none() {
        assert_eq!(detect_language(Path::new("a.toml")), None);
    }

    #[test]
    fn every_supported_language_has_a_grammar() {
        for lang in SUPPORTED_LANGUAGES {
            assert!(grammar_for(lang).is_some(), "{lang}");
        }
    }
}
