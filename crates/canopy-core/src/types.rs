//! The extraction/resolution data model (spec §3).
//!
//! All identifiers are monotonically assigned 64-bit integers. Positions are
//! zero-based; spans are half-open `[start, end)` on both line and column.

use serde::{Deserialize, Serialize};

pub type Id = i64;

/// A zero-based, half-open source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// True if `(line, col)` falls within this span (end-exclusive).
    pub fn contains(&self, line: u32, col: u32) -> bool {
        if line < self.start_line || line > self.end_line {
            return false;
        }
        if line == self.start_line && col < self.start_col {
            return false;
        }
        if line == self.end_line && col >= self.end_col {
            return false;
        }
        true
    }

    /// True if `other` is nested within (or equal to) this span.
    pub fn contains_span(&self, other: &Span) -> bool {
        (self.start_line, self.start_col) <= (other.start_line, other.start_col)
            && (other.end_line, other.end_col) <= (self.end_line, self.end_col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub line: u32,
    pub col: u32,
}

/// A single indexed source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: Id,
    pub path: String,
    pub language: String,
    pub content_hash: String,
    pub line_count: u32,
    pub last_indexed_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Struct,
    Interface,
    Trait,
    Enum,
    Variable,
    Constant,
    Field,
    Parameter,
    Package,
    Module,
    Namespace,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
            SymbolKind::Interface => "interface",
            SymbolKind::Trait => "trait",
            SymbolKind::Enum => "enum",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Field => "field",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Package => "package",
            SymbolKind::Module => "module",
            SymbolKind::Namespace => "namespace",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "function" => SymbolKind::Function,
            "method" => SymbolKind::Method,
            "class" => SymbolKind::Class,
            "struct" => SymbolKind::Struct,
            "interface" => SymbolKind::Interface,
            "trait" => SymbolKind::Trait,
            "enum" => SymbolKind::Enum,
            "variable" => SymbolKind::Variable,
            "constant" => SymbolKind::Constant,
            "field" => SymbolKind::Field,
            "parameter" => SymbolKind::Parameter,
            "package" => SymbolKind::Package,
            "module" => SymbolKind::Module,
            "namespace" => SymbolKind::Namespace,
            _ => return None,
        })
    }

    /// Kinds excluded from `unused()` (spec §4.6).
    pub fn is_container_kind(&self) -> bool {
        matches!(
            self,
            SymbolKind::Package | SymbolKind::Module | SymbolKind::Namespace
        )
    }

    /// Kinds the blast-radius planner and package graph treat as packages (spec §4.6).
    pub fn is_package_like(&self) -> bool {
        self.is_container_kind()
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Package,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Package => "package",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "public" => Visibility::Public,
            "private" => Visibility::Private,
            "protected" => Visibility::Protected,
            "package" => Visibility::Package,
            _ => return None,
        })
    }
}

/// A named, kinded declaration. A symbol with `file = None` is a virtual or
/// aggregate entity (e.g. a package with no single declaring file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub id: Id,
    pub name: String,
    pub kind: SymbolKind,
    pub visibility: Visibility,
    /// Sorted alphabetically before hashing/storage (deterministic serialization, §4.3 step 8).
    pub modifiers: Vec<String>,
    pub span: Span,
    pub file_id: Option<Id>,
    pub parent_id: Option<Id>,
    pub signature_hash: String,
}

/// Attaches a symbol to an additional (file, span) location — partial
/// class/struct declarations split across files (spec §3, §9 Open Question).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolFragment {
    pub id: Id,
    pub symbol_id: Id,
    pub file_id: Id,
    pub span: Span,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    File,
    Function,
    Class,
    Block,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::File => "file",
            ScopeKind::Function => "function",
            ScopeKind::Class => "class",
            ScopeKind::Block => "block",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "file" => ScopeKind::File,
            "function" => ScopeKind::Function,
            "class" => ScopeKind::Class,
            "block" => ScopeKind::Block,
            _ => return None,
        })
    }
}

/// A lexical scope. Scopes of a file form a tree rooted at a `File`-kind scope;
/// nested spans strictly contain child spans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    pub id: Id,
    pub file_id: Id,
    pub kind: ScopeKind,
    pub span: Span,
    pub parent_id: Option<Id>,
    pub symbol_id: Option<Id>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceContext {
    Call,
    FieldAccess,
    TypeAnnotation,
    /// A heritage-clause reference (`extends`/`implements`/`impl ... for`):
    /// names the interface/trait a type declares conformance to, with
    /// `receiver` holding the conforming type's own name.
    Implements,
    Other,
}

impl ReferenceContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceContext::Call => "call",
            ReferenceContext::FieldAccess => "field_access",
            ReferenceContext::TypeAnnotation => "type_annotation",
            ReferenceContext::Implements => "implements",
            ReferenceContext::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "call" => ReferenceContext::Call,
            "field_access" => ReferenceContext::FieldAccess,
            "type_annotation" => ReferenceContext::TypeAnnotation,
            "implements" => ReferenceContext::Implements,
            "other" => ReferenceContext::Other,
            _ => return None,
        })
    }
}

/// A raw identifier use site, before resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub id: Id,
    pub file_id: Id,
    pub scope_id: Option<Id>,
    pub name: String,
    pub span: Span,
    pub context: ReferenceContext,
    /// For `field_access`/`call` references of the form `receiver.method(...)`,
    /// the textual receiver expression, when statically simple enough to capture.
    pub receiver: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Module,
    Member,
    Builtin,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Module => "module",
            ImportKind::Member => "member",
            ImportKind::Builtin => "builtin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "module" => ImportKind::Module,
            "member" => ImportKind::Member,
            "builtin" => ImportKind::Builtin,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
    pub id: Id,
    pub file_id: Id,
    pub source: String,
    pub imported_name: Option<String>,
    pub local_alias: Option<String>,
    pub kind: ImportKind,
    pub scope_id: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeMember {
    pub id: Id,
    pub symbol_id: Id,
    pub name: String,
    pub kind: String,
    pub type_expr: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionParam {
    pub id: Id,
    pub symbol_id: Id,
    pub name: String,
    pub type_expr: Option<String>,
    /// Dense, starting at 0.
    pub ordinal: u32,
    pub is_receiver: bool,
    pub is_return_value: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeParam {
    pub id: Id,
    pub symbol_id: Id,
    pub name: String,
    pub bound: Option<String>,
    pub ordinal: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Id,
    pub symbol_id: Id,
    pub name: String,
    pub arguments: Option<String>,
    pub resolved_symbol_id: Option<Id>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    Direct,
    Heuristic,
    Import,
}

impl ResolutionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionKind::Direct => "direct",
            ResolutionKind::Heuristic => "heuristic",
            ResolutionKind::Import => "import",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "direct" => ResolutionKind::Direct,
            "heuristic" => ResolutionKind::Heuristic,
            "import" => ResolutionKind::Import,
            _ => return None,
        })
    }
}

/// A reference resolved to a candidate definition. A reference may have zero
/// or more resolved targets; "unresolved" is a valid state (absence of rows).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedReference {
    pub id: Id,
    pub reference_id: Id,
    pub target_symbol_id: Id,
    pub confidence: f64,
    pub kind: ResolutionKind,
}

/// A single call-site edge. Not deduplicated by site: every call site that
/// resolves produces its own edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEdge {
    pub id: Id,
    pub caller_symbol_id: Id,
    pub callee_symbol_id: Id,
    pub file_id: Id,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationKind {
    Implicit,
    Explicit,
}

impl ImplementationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImplementationKind::Implicit => "implicit",
            ImplementationKind::Explicit => "explicit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "implicit" => ImplementationKind::Implicit,
            "explicit" => ImplementationKind::Explicit,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Implementation {
    pub id: Id,
    pub type_symbol_id: Id,
    pub interface_symbol_id: Id,
    pub kind: ImplementationKind,
    pub declaring_module_id: Option<Id>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    Extension,
    Impl,
    DefaultMethod,
}

impl ExtensionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionKind::Extension => "extension",
            ExtensionKind::Impl => "impl",
            ExtensionKind::DefaultMethod => "default_method",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "extension" => ExtensionKind::Extension,
            "impl" => ExtensionKind::Impl,
            "default_method" => ExtensionKind::DefaultMethod,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionBinding {
    pub id: Id,
    pub member_symbol_id: Id,
    pub extended_type_expr: String,
    pub extended_type_symbol_id: Option<Id>,
    pub kind: ExtensionKind,
    pub constraints: Option<String>,
    pub is_default_impl: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reexport {
    pub id: Id,
    pub file_id: Id,
    pub original_symbol_id: Id,
    pub exported_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionKind {
    Inherit,
    Mixin,
    Embed,
    Compose,
}

impl CompositionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositionKind::Inherit => "inherit",
            CompositionKind::Mixin => "mixin",
            CompositionKind::Embed => "embed",
            CompositionKind::Compose => "compose",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "inherit" => CompositionKind::Inherit,
            "mixin" => CompositionKind::Mixin,
            "embed" => CompositionKind::Embed,
            "compose" => CompositionKind::Compose,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeComposition {
    pub id: Id,
    pub composite_symbol_id: Id,
    pub component_symbol_id: Id,
    pub kind: CompositionKind,
}
