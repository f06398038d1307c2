use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "canopy", version, about = "Semantic code-analysis engine: extract, resolve, and query polyglot source repositories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the default `<repo-root>/.canopy/index.db` location
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index (or re-index) a repository
    Index {
        /// Repository root (default: current directory)
        path: Option<PathBuf>,
        /// Discard the existing index and rebuild from scratch
        #[arg(long)]
        force: bool,
        /// Restrict indexing to these languages (comma-separated)
        #[arg(long, value_delimiter = ',')]
        languages: Option<Vec<String>>,
        /// Load extract/resolve scripts from a directory instead of the embedded set
        #[arg(long)]
        scripts_dir: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Run a query against an existing index
    Query {
        #[command(subcommand)]
        query: QueryCommand,

        #[command(flatten)]
        list: ListArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Text,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    Name,
    Kind,
    File,
    RefCount,
    ExternalRefCount,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    Asc,
    Desc,
}

/// Shared flags on list/enumeration subcommands (spec §6.1).
#[derive(clap::Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
    #[arg(long, value_enum, default_value = "name")]
    pub sort: SortArg,
    #[arg(long, value_enum, default_value = "asc")]
    pub order: OrderArg,
}

/// Either a `<file> <line> <col>` triple or a `--symbol <id>` — the two
/// equivalent ways to name a symbol on position-based subcommands (spec
/// §6.1).
#[derive(clap::Args, Debug, Clone)]
pub struct SymbolRef {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub col: Option<u32>,
    #[arg(long)]
    pub symbol: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum QueryCommand {
    /// The narrowest symbol enclosing a source position
    SymbolAt { file: String, line: u32, col: u32 },
    /// The definition a reference at a position resolves to
    Definition { file: String, line: u32, col: u32 },
    /// Every reference to a symbol
    References {
        #[command(flatten)]
        target: SymbolRef,
    },
    /// Direct callers of a symbol
    Callers {
        #[command(flatten)]
        target: SymbolRef,
    },
    /// Direct callees of a symbol
    Callees {
        #[command(flatten)]
        target: SymbolRef,
    },
    /// Types that implement an interface
    Implementations {
        #[command(flatten)]
        target: SymbolRef,
    },
    /// Interfaces a type implements
    Implements {
        #[command(flatten)]
        target: SymbolRef,
    },
    /// Callers reachable within a depth
    TransitiveCallers {
        #[command(flatten)]
        target: SymbolRef,
        #[arg(long, default_value_t = 1)]
        max_depth: i64,
    },
    /// Callees reachable within a depth
    TransitiveCallees {
        #[command(flatten)]
        target: SymbolRef,
        #[arg(long, default_value_t = 1)]
        max_depth: i64,
    },
    /// A symbol plus its parameters, members, type parameters, and annotations
    SymbolDetail {
        #[command(flatten)]
        target: SymbolRef,
    },
    /// The scope chain enclosing a source position, innermost first
    ScopeAt { file: String, line: u32, col: u32 },
    /// A type's implements/implemented-by/composes/composed-by/extensions
    TypeHierarchy {
        #[command(flatten)]
        target: SymbolRef,
    },
    /// Extension members bound to a type
    Extensions {
        #[command(flatten)]
        target: SymbolRef,
    },
    /// Re-exports of a symbol
    Reexports {
        #[command(flatten)]
        target: SymbolRef,
    },
    /// List symbols, filtered/sorted/paginated
    Symbols {
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        file_path_prefix: Option<String>,
    },
    /// Glob-search symbols by name
    Search {
        pattern: String,
        #[arg(long)]
        kind: Option<String>,
    },
    /// List indexed files
    Files {
        #[arg(long)]
        language: Option<String>,
    },
    /// List top-level packages/modules/namespaces
    Packages,
    /// Repository-wide summary
    Summary {
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Per-package file/symbol counts
    PackageSummary { package_id: i64 },
    /// Packages a package imports from
    Deps { package_id: i64 },
    /// Packages that import from a package
    Dependents { package_id: i64 },
    /// The full package import graph
    PackageGraph,
    /// Strongly connected components of the package graph
    CircularDeps,
    /// Symbols with zero resolved references
    Unused,
    /// Top symbols by external reference count
    Hotspots {
        #[arg(long, default_value_t = 10)]
        n: usize,
    },
}
