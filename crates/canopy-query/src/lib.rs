//! The query engine (spec §4.6): position lookup, symbol detail, type and
//! call-graph traversal, package-level dependency analysis, and the
//! analytical rollups (`unused`, `hotspots`, `project_summary`).

pub mod analytical;
pub mod callgraph;
pub mod counts;
pub mod deps;
pub mod detail;
pub mod enumeration;
pub mod filter;
pub mod hierarchy;
pub mod position;

pub use analytical::{hotspots, project_summary, unused, Hotspot, ProjectSummary};
pub use callgraph::{callees, callers, transitive_callees, transitive_callers, TransitiveGraph};
pub use counts::{ref_counts, RefCounts};
pub use deps::{circular_dependencies, package_dependency_graph, package_summary, PackageEdge, PackageSummary};
pub use detail::{symbol_detail, SymbolDetail};
pub use enumeration::{search_symbols, symbols};
pub use filter::{glob_to_like, Page, Paginated, SortField, SortOrder, SymbolFilter};
pub use hierarchy::{implements_interfaces, reexports_in_file, reexports_of, type_hierarchy, TypeHierarchy};
pub use position::{definition_at, scope_at, symbol_at};
