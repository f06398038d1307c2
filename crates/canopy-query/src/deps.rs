//! `package_dependency_graph`/`circular_dependencies` (spec §4.6, §8
//! scenario S4): file imports aggregated into package-level edges, and
//! Tarjan's algorithm over that graph to surface cycles.

use std::collections::HashMap;

use canopy_core::types::{Id, SymbolKind};
use canopy_core::Store;

#[derive(Debug, Clone, Copy)]
pub struct PackageEdge {
    pub from_pkg: Id,
    pub to_pkg: Id,
    pub count: usize,
}

/// The top-level package/module/namespace symbol declared in each file, if
/// any. Files without one don't participate in the package graph.
fn file_packages(store: &Store) -> HashMap<Id, Id> {
    let mut map = HashMap::new();
    for file in store.all_files() {
        for symbol in store.symbols_by_file(file.id) {
            if symbol.parent_id.is_none() && symbol.kind.is_package_like() {
                map.insert(file.id, symbol.id);
                break;
            }
        }
    }
    map
}

/// Aggregates every file's imports into package-to-package edges with
/// counts. An import's `source` is matched against a file path to find the
/// imported package (spec §4.5's same source/path convention).
pub fn package_dependency_graph(store: &Store) -> Vec<PackageEdge> {
    let packages = file_packages(store);
    let files_by_path: HashMap<String, Id> = store.all_files().into_iter().map(|f| (f.path, f.id)).collect();

    let mut counts: HashMap<(Id, Id), usize> = HashMap::new();
    for (&file_id, &from_pkg) in &packages {
        for import in store.imports_in_file(file_id) {
            let Some(&target_file) = files_by_path.get(&import.source) else {
                continue;
            };
            let Some(&to_pkg) = packages.get(&target_file) else {
                continue;
            };
            if to_pkg == from_pkg {
                continue;
            }
            *counts.entry((from_pkg, to_pkg)).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|((from_pkg, to_pkg), count)| PackageEdge { from_pkg, to_pkg, count })
        .collect()
}

#[derive(Debug, Clone)]
pub struct PackageSummary {
    pub package_symbol_id: Id,
    pub file_count: usize,
    pub symbol_count: usize,
    pub language: String,
}

/// File/symbol counts for a single package (CLI `package-summary`). Returns
/// `None` if `package_symbol_id` doesn't name a known package.
pub fn package_summary(store: &Store, package_symbol_id: Id) -> Option<PackageSummary> {
    let packages = file_packages(store);
    let files: Vec<Id> = packages
        .iter()
        .filter(|(_, &pkg)| pkg == package_symbol_id)
        .map(|(&file, _)| file)
        .collect();
    if files.is_empty() {
        return None;
    }
    let language = store.file(files[0]).map(|f| f.language).unwrap_or_default();
    let symbol_count = files.iter().map(|&f| store.symbols_by_file(f).len()).sum();
    Some(PackageSummary {
        package_symbol_id,
        file_count: files.len(),
        symbol_count,
        language,
    })
}

fn adjacency(edges: &[PackageEdge]) -> HashMap<Id, Vec<Id>> {
    let mut map: HashMap<Id, Vec<Id>> = HashMap::new();
    for edge in edges {
        map.entry(edge.from_pkg).or_default().push(edge.to_pkg);
    }
    map
}

/// Strongly connected components of size > 1 in the package graph, each
/// returned as an explicit cycle path with the starting package repeated at
/// the end (spec §4.6, §8 scenario S4).
pub fn circular_dependencies(store: &Store) -> Vec<Vec<Id>> {
    let edges = package_dependency_graph(store);
    let adj = adjacency(&edges);
    let sccs = tarjan_sccs(&adj);
    sccs.into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| cycle_path(&adj, &scc))
        .collect()
}

struct Tarjan<'a> {
    adj: &'a HashMap<Id, Vec<Id>>,
    index: HashMap<Id, usize>,
    low_link: HashMap<Id, usize>,
    on_stack: HashMap<Id, bool>,
    stack: Vec<Id>,
    next_index: usize,
    sccs: Vec<Vec<Id>>,
}

impl<'a> Tarjan<'a> {
    fn strong_connect(&mut self, node: Id) {
        self.index.insert(node, self.next_index);
        self.low_link.insert(node, self.next_index);
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack.insert(node, true);

        for &next in self.adj.get(&node).into_iter().flatten() {
            if !self.index.contains_key(&next) {
                self.strong_connect(next);
                let next_low = self.low_link[&next];
                let entry = self.low_link.get_mut(&node).unwrap();
                *entry = (*entry).min(next_low);
            } else if *self.on_stack.get(&next).unwrap_or(&false) {
                let next_index = self.index[&next];
                let entry = self.low_link.get_mut(&node).unwrap();
                *entry = (*entry).min(next_index);
            }
        }

        if self.low_link[&node] == self.index[&node] {
            let mut scc = Vec::new();
            loop {
                let member = self.stack.pop().unwrap();
                self.on_stack.insert(member, false);
                scc.push(member);
                if member == node {
                    break;
                }
            }
            self.sccs.push(scc);
        }
    }
}

fn tarjan_sccs(adj: &HashMap<Id, Vec<Id>>) -> Vec<Vec<Id>> {
    let mut nodes: Vec<Id> = adj.keys().copied().collect();
    for targets in adj.values() {
        nodes.extend(targets);
    }
    nodes.sort_unstable();
    nodes.dedup();

    let mut tarjan = Tarjan {
        adj,
        index: HashMap::new(),
        low_link: HashMap::new(),
        on_stack: HashMap::new(),
        stack: Vec::new(),
        next_index: 0,
        sccs: Vec::new(),
    };
    for node in nodes {
        if !tarjan.index.contains_key(&node) {
            tarjan.strong_connect(node);
        }
    }
    tarjan.sccs
}

/// Walks a path through `scc` back to its own start, using only edges
/// within the component — guaranteed to exist since the component is
/// strongly connected.
fn cycle_path(adj: &HashMap<Id, Vec<Id>>, scc: &[Id]) -> Vec<Id> {
    use std::collections::HashSet;
    let members: HashSet<Id> = scc.iter().copied().collect();
    let start = scc[0];
    let mut path = vec![start];
    let mut on_path: HashSet<Id> = HashSet::from([start]);

    fn dfs(
        node: Id,
        start: Id,
        adj: &HashMap<Id, Vec<Id>>,
        members: &HashSet<Id>,
        on_path: &mut HashSet<Id>,
        path: &mut Vec<Id>,
    ) -> bool {
        for &next in adj.get(&node).into_iter().flatten() {
            if !members.contains(&next) {
                continue;
            }
            if next == start && path.len() > 1 {
                path.push(start);
                return true;
            }
            if on_path.contains(&next) {
                continue;
            }
            path.push(next);
            on_path.insert(next);
            if dfs(next, start, adj, members, on_path, path) {
                return true;
            }
            path.pop();
            on_path.remove(&next);
        }
        false
    }

    dfs(start, start, adj, &members, &mut on_path, &mut path);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::store::batch_api::{Inserter, NewImport, NewScope, NewSymbol};
    use canopy_core::store::extraction::NewFileRow;
    use canopy_core::types::{ImportKind, ScopeKind, Span, Visibility};

    fn package_file(store: &mut Store, path: &str, pkg_name: &str) -> (Id, Id) {
        let file_id = store
            .insert_file(&NewFileRow {
                path,
                language: "go",
                content_hash: "c",
                line_count: 5,
                last_indexed_at: 0,
            })
            .unwrap();
        let pkg_id = store
            .insert_symbol(NewSymbol {
                name: pkg_name.into(),
                kind: SymbolKind::Package,
                visibility: Visibility::Public,
                modifiers: vec![],
                span: Span::new(0, 0, 1, 0),
                file_id: Some(file_id),
                parent_id: None,
                signature_hash: format!("h-{pkg_name}"),
            })
            .unwrap();
        (file_id, pkg_id)
    }

    fn import_from(store: &mut Store, importer: Id, source: &str) {
        let scope_id = store
            .insert_scope(NewScope {
                file_id: importer,
                kind: ScopeKind::File,
                span: Span::new(0, 0, 5, 0),
                parent_id: None,
                symbol_id: None,
            })
            .unwrap();
        store
            .insert_import(NewImport {
                file_id: importer,
                scope_id,
                source: source.into(),
                imported_name: None,
                local_alias: None,
                kind: ImportKind::Module,
            })
            .unwrap();
    }

    #[test]
    fn three_way_cycle_is_detected() {
        let mut store = Store::in_memory().unwrap();
        let (a_file, a_pkg) = package_file(&mut store, "a/a.go", "a");
        let (b_file, b_pkg) = package_file(&mut store, "b/b.go", "b");
        let (c_file, c_pkg) = package_file(&mut store, "c/c.go", "c");
        import_from(&mut store, a_file, "b/b.go");
        import_from(&mut store, b_file, "c/c.go");
        import_from(&mut store, c_file, "a/a.go");

        let cycles = circular_dependencies(&store);
        assert_eq!(cycles.len(), 1);
        let cycle = &cycles[0];
        assert_eq!(cycle.first(), cycle.last());
        let members: std::collections::HashSet<Id> = cycle.iter().copied().collect();
        assert!(members.contains(&a_pkg) && members.contains(&b_pkg) && members.contains(&c_pkg));
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let mut store = Store::in_memory().unwrap();
        let (a_file, _) = package_file(&mut store, "a/a.go", "a");
        let (_b_file, _) = package_file(&mut store, "b/b.go", "b");
        import_from(&mut store, a_file, "b/b.go");

        assert!(circular_dependencies(&store).is_empty());
    }

    #[test]
    fn package_summary_counts_files_and_symbols() {
        let mut store = Store::in_memory().unwrap();
        let (_a_file, a_pkg) = package_file(&mut store, "a/a.go", "a");
        let summary = package_summary(&store, a_pkg).unwrap();
        assert_eq!(summary.file_count, 1);
        assert_eq!(summary.language, "go");
        assert!(package_summary(&store, 99999).is_none());
    }
}
