//! Per-language tree-sitter queries. One `.scm` file per language, sharing a
//! common capture-name taxonomy (`def.<kind>`, `def.<kind>.name`, `ref.call`,
//! `ref.field_access`, `ref.type_annotation`) so [`crate::extract`] and
//! [`crate::resolve`] stay language-agnostic.

const RUST: &str = include_str!("rust.scm");
const PYTHON: &str = include_str!("python.scm");
const GO: &str = include_str!("go.scm");
const TYPESCRIPT: &str = include_str!("typescript.scm");
const JAVASCRIPT: &str = include_str!("javascript.scm");
const JAVA: &str = include_str!("java.scm");
const C: &str = include_str!("c.scm");
const CPP: &str = include_str!("cpp.scm");
const CSHARP: &str = include_str!("csharp.scm");
const RUBY: &str = include_str!("ruby.scm");

pub fn query_source_for(language: &str) -> Option<&'static str> {
    Some(match language {
        "rust" => RUST,
        "python" => PYTHON,
        "go" => GO,
        "typescript" => TYPESCRIPT,
        "javascript" => JAVASCRIPT,
        "java" => JAVA,
        "c" => C,
        "cpp" => CPP,
        "csharp" => CSHARP,
        "ruby" => RUBY,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::SUPPORTED_LANGUAGES;

    #[test]
    fn every_supported_language_has_query_source() {
        for lang in SUPPORTED_LANGUAGES {
            assert!(query_source_for(lang).is_some(), "{lang}");
        }
    }
}
