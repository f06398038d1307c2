//! `callers`/`callees` and their transitive closures (spec §4.6, §8 property 4:
//! depth 1 must equal the direct result).

use std::collections::{HashSet, VecDeque};

use canopy_core::types::{CallEdge, Id};
use canopy_core::{CanopyError, CanopyResult, Store};

const MAX_DEPTH: u32 = 100;

pub fn callers(store: &Store, callee_symbol_id: Id) -> Vec<CallEdge> {
    store.call_edges_to(callee_symbol_id)
}

pub fn callees(store: &Store, caller_symbol_id: Id) -> Vec<CallEdge> {
    store.call_edges_from(caller_symbol_id)
}

/// A BFS traversal result (spec §4.6: `{root, nodes with depth, edges}`).
pub struct TransitiveGraph {
    pub root: Id,
    pub nodes: Vec<(Id, u32)>,
    pub edges: Vec<(Id, Id)>,
}

impl TransitiveGraph {
    /// Node ids at depth 1 — must equal the direct callers/callees result
    /// (spec §8 property 4).
    pub fn depth_one(&self) -> Vec<Id> {
        self.nodes.iter().filter(|(_, d)| *d == 1).map(|(id, _)| *id).collect()
    }
}

/// Callers reachable within `max_depth` hops, breadth-first. `max_depth == 0`
/// returns only `root`. Depths beyond [`MAX_DEPTH`] are silently capped.
pub fn transitive_callers(store: &Store, root: Id, max_depth: i64) -> CanopyResult<TransitiveGraph> {
    transitive(store, root, max_depth, Direction::Callers)
}

pub fn transitive_callees(store: &Store, root: Id, max_depth: i64) -> CanopyResult<TransitiveGraph> {
    transitive(store, root, max_depth, Direction::Callees)
}

enum Direction {
    Callers,
    Callees,
}

fn transitive(store: &Store, root: Id, max_depth: i64, direction: Direction) -> CanopyResult<TransitiveGraph> {
    if max_depth < 0 {
        return Err(CanopyError::QueryInvalidArgument(format!(
            "max_depth must be non-negative, got {max_depth}"
        )));
    }
    let max_depth = (max_depth as u32).min(MAX_DEPTH);

    let mut visited: HashSet<Id> = HashSet::from([root]);
    let mut nodes = vec![(root, 0u32)];
    let mut edges = Vec::new();
    let mut frontier = VecDeque::from([(root, 0u32)]);

    while let Some((node, depth)) = frontier.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let incident = match direction {
            Direction::Callers => store.call_edges_to(node),
            Direction::Callees => store.call_edges_from(node),
        };
        for edge in incident {
            let next = match direction {
                Direction::Callers => edge.caller_symbol_id,
                Direction::Callees => edge.callee_symbol_id,
            };
            edges.push(match direction {
                Direction::Callers => (next, node),
                Direction::Callees => (node, next),
            });
            if visited.insert(next) {
                nodes.push((next, depth + 1));
                frontier.push_back((next, depth + 1));
            }
        }
    }
    Ok(TransitiveGraph { root, nodes, edges })
}
