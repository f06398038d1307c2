//! Shared filter, sort, and pagination types (spec §4.6 enumeration).

use canopy_core::types::{Id, SymbolKind, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Kind,
    File,
    RefCount,
    ExternalRefCount,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "name" => SortField::Name,
            "kind" => SortField::Kind,
            "file" => SortField::File,
            "ref_count" => SortField::RefCount,
            "external_ref_count" => SortField::ExternalRefCount,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => return None,
        })
    }
}

/// `offset ≥ 0`, `limit ∈ [0, 500]` (spec §4.6). `limit=0` returns no items
/// but `total_count` is still computed against the full match set.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self { offset: 0, limit: 50 }
    }
}

impl Page {
    pub const MAX_LIMIT: usize = 500;

    pub fn clamped(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: limit.min(Self::MAX_LIMIT),
        }
    }

    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        if self.limit == 0 {
            return vec![];
        }
        items.iter().skip(self.offset).take(self.limit).cloned().collect()
    }
}

pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total_count: usize,
}

/// Filter predicates for `symbols`/`search_symbols` (spec §4.6). Every field
/// is optional; an unset field doesn't constrain the result.
#[derive(Debug, Clone, Default)]
pub struct SymbolFilter {
    pub kinds: Option<Vec<SymbolKind>>,
    pub visibility: Option<Visibility>,
    pub modifiers: Vec<String>,
    pub file_id: Option<Id>,
    pub parent_id: Option<Id>,
    /// Normalized with a trailing separator before matching (spec §4.6).
    pub file_path_prefix: Option<String>,
    pub min_ref_count: Option<usize>,
    pub max_ref_count: Option<usize>,
}

/// Translates a glob into a `LIKE` pattern: escapes literal `%`/`_` first,
/// then maps `*` to the SQL wildcard (spec §4.6, §8 property 9).
pub fn glob_to_like(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len());
    for ch in glob.chars() {
        match ch {
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            '*' => out.push('%'),
            other => out.push(other),
        }
    }
    out
}
