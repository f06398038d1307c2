//! Tree-sitter parsing and the generic query-driven extraction/resolution
//! interpreter shared by all ten supported languages (spec §4.1, §4.3, §4.4).

pub mod bridge;
pub mod extract;
pub mod languages;
pub mod queries;
pub mod resolve;

pub use bridge::{compile_query, detect_language, BridgeError, ParserBridge};
pub use languages::SUPPORTED_LANGUAGES;
