//! The parser/runtime bridge (spec §4.1): a thin, stable surface the
//! extraction and resolution interpreters drive without touching
//! `tree-sitter` directly. Re-exports `detect_language` from
//! [`crate::languages`] so callers only need one `use`.

use std::path::Path;

use tree_sitter::{Node, Parser, Query, Tree};

pub use crate::languages::detect_language;
use crate::languages::grammar_for;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("failed to set grammar for {0}")]
    GrammarSet(String),
    #[error("parse produced no tree")]
    ParseFailed,
    #[error("query compile error: {0}")]
    QueryCompile(String),
}

/// Owns a single reusable `tree_sitter::Parser`; grammar is swapped per call
/// since one pipeline worker parses files of many languages in sequence.
pub struct ParserBridge {
    parser: Parser,
}

impl ParserBridge {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    pub fn parse(&mut self, language: &str, source: &[u8]) -> Result<Tree, BridgeError> {
        let grammar =
            grammar_for(language).ok_or_else(|| BridgeError::UnsupportedLanguage(language.to_string()))?;
        self.parser
            .set_language(&grammar)
            .map_err(|_| BridgeError::GrammarSet(language.to_string()))?;
        self.parser.parse(source, None).ok_or(BridgeError::ParseFailed)
    }

    /// True if the parse produced any ERROR nodes (spec §4.1 `has_errors`,
    /// feeds `ParseWarning`).
    pub fn has_errors(tree: &Tree) -> bool {
        tree.root_node().has_error()
    }
}

impl Default for ParserBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile a tree-sitter S-expression query against `language`'s grammar.
pub fn compile_query(language: &str, source: &str) -> Result<Query, BridgeError> {
    let grammar =
        grammar_for(language).ok_or_else(|| BridgeError::UnsupportedLanguage(language.to_string()))?;
    Query::new(&grammar, source).map_err(|e| BridgeError::QueryCompile(e.to_string()))
}

/// UTF-8 text for `node`, tolerant of invalid byte ranges (spec §4.1
/// `node_text`: never panics on malformed source).
pub fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Named child of `node` by grammar field name (spec §4.1 `child_by_field`).
pub fn child_by_field<'a>(node: Node<'a>, field: &str) -> Option<Node<'a>> {
    node.child_by_field_name(field)
}

pub fn path_extension_language(path: &Path) -> Option<&'static str> {
    detect_language(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rust_source() {
        let mut bridge = ParserBridge::new();
        let tree = bridge.parse("rust", b"fn main() {}").unwrap();
        assert!(!ParserBridge::has_errors(&tree));
    }

    #[test]
    fn flags_syntax_errors() {
        let mut bridge = ParserBridge::new();
        let tree = bridge.parse("rust", b"fn main( {{{ ").unwrap();
        assert!(ParserBridge::has_errors(&tree));
    }

    #[test]
    fn unsupported_language_errors() {
        let mut bridge = ParserBridge::new();
        let err = bridge.parse("cobol", b"").unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedLanguage(_)));
    }

    #[test]
    fn node_text_reads_function_name() {
        let mut bridge = ParserBridge::new();
        let src = b"fn foo() {}";
        let tree = bridge.parse("rust", src).unwrap();
        let root = tree.root_node();
        let func = root.child(0).unwrap();
        let name = child_by_field(func, "name").unwrap();
        assert_eq!(node_text(name, src), "foo");
    }
}
