//! A directed graph stored as flat adjacency plus side property maps.
//!
//! Node and edge properties never own each other; nodes are indices into
//! the adjacency arena and properties live in insertion-ordered side
//! maps so that iteration (and therefore planning output) is
//! deterministic.

use fxhash::FxHasher;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::BuildHasherDefault;

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Directed edge id: `(from, to)`.
pub type EdgeId = (usize, usize);

/// Fixed integer rescaling of edge costs for the external GTSP solver:
/// three decimal digits survive the rounding.
pub const COST_SCALE: f64 = 1000.0;

/// Sentinel for a missing edge in the exported adjacency matrix.
pub const NO_EDGE: i32 = i32::MAX;

/// Round a cost to the solver's integer scale, saturating at the
/// missing-edge sentinel.
#[must_use]
pub fn cost_to_milli(cost: f64) -> i32 {
    let scaled = (cost * COST_SCALE).round();
    if scaled >= NO_EDGE as f64 {
        NO_EDGE
    } else {
        scaled as i32
    }
}

/// Inverse of [`cost_to_milli`], for reporting.
#[must_use]
pub fn milli_to_cost(milli: i32) -> f64 {
    milli as f64 / COST_SCALE
}

/// A directed graph with per-node and per-edge properties.
#[derive(Clone, Debug)]
pub struct Graph<N, E> {
    adjacency: Vec<FxIndexMap<usize, f64>>,
    node_properties: FxIndexMap<usize, N>,
    edge_properties: FxIndexMap<EdgeId, E>,
    start_idx: Option<usize>,
    goal_idx: Option<usize>,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Graph<N, E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            adjacency: Vec::new(),
            node_properties: FxIndexMap::default(),
            edge_properties: FxIndexMap::default(),
            start_idx: None,
            goal_idx: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edge_properties.len()
    }

    /// Append a node; ids are dense and never reused.
    pub fn add_node(&mut self, property: N) -> usize {
        let id = self.adjacency.len();
        self.adjacency.push(FxIndexMap::default());
        self.node_properties.insert(id, property);
        id
    }

    /// Insert a directed edge with its traversal cost. Existing edges
    /// are overwritten.
    pub fn add_edge(&mut self, edge: EdgeId, property: E, cost: f64) -> bool {
        let (from, to) = edge;
        if from >= self.len() || to >= self.len() || from == to {
            return false;
        }
        self.adjacency[from].insert(to, cost);
        self.edge_properties.insert(edge, property);
        true
    }

    #[inline]
    pub fn node_property(&self, id: usize) -> Option<&N> {
        self.node_properties.get(&id)
    }

    #[inline]
    pub fn edge_property(&self, edge: &EdgeId) -> Option<&E> {
        self.edge_properties.get(edge)
    }

    #[inline]
    pub fn edge_cost(&self, edge: &EdgeId) -> Option<f64> {
        self.adjacency.get(edge.0).and_then(|m| m.get(&edge.1)).copied()
    }

    pub fn neighbors(&self, id: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.adjacency
            .get(id)
            .into_iter()
            .flat_map(|m| m.iter().map(|(n, c)| (*n, *c)))
    }

    /// Iterate node ids with their properties in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (usize, &N)> {
        self.node_properties.iter().map(|(id, p)| (*id, p))
    }

    /// Iterate edge ids with their properties in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&EdgeId, &E)> {
        self.edge_properties.iter()
    }

    #[inline]
    pub fn set_start(&mut self, id: usize) {
        self.start_idx = Some(id);
    }

    #[inline]
    pub fn set_goal(&mut self, id: usize) {
        self.goal_idx = Some(id);
    }

    #[inline]
    pub fn start_idx(&self) -> Option<usize> {
        self.start_idx
    }

    #[inline]
    pub fn goal_idx(&self) -> Option<usize> {
        self.goal_idx
    }

    /// Shortest path by edge cost, or `None` when `to` is unreachable.
    #[must_use]
    pub fn solve_dijkstra(&self, from: usize, to: usize) -> Option<Vec<usize>> {
        if from >= self.len() || to >= self.len() {
            return None;
        }

        let mut best: FxIndexMap<usize, (usize, f64)> = FxIndexMap::default();
        best.insert(from, (usize::MAX, 0.0));
        let mut queue = BinaryHeap::new();
        queue.push(QueueEntry {
            cost: 0.0,
            node: from,
        });

        while let Some(QueueEntry { cost, node }) = queue.pop() {
            if node == to {
                return Some(reconstruct_path(&best, to));
            }
            if best.get(&node).is_some_and(|(_, c)| cost > *c) {
                continue;
            }
            for (neighbor, edge_cost) in self.neighbors(node) {
                let candidate = cost + edge_cost;
                let improved = match best.get(&neighbor) {
                    Some((_, existing)) => candidate < *existing,
                    None => true,
                };
                if improved {
                    best.insert(neighbor, (node, candidate));
                    queue.push(QueueEntry {
                        cost: candidate,
                        node: neighbor,
                    });
                }
            }
        }
        None
    }

    /// Dense adjacency matrix in solver milli-units; missing edges carry
    /// [`NO_EDGE`].
    #[must_use]
    pub fn adjacency_matrix(&self) -> Vec<Vec<i32>> {
        let n = self.len();
        let mut matrix = vec![vec![NO_EDGE; n]; n];
        for (from, neighbors) in self.adjacency.iter().enumerate() {
            for (to, cost) in neighbors {
                matrix[from][*to] = cost_to_milli(*cost);
            }
        }
        matrix
    }
}

fn reconstruct_path(best: &FxIndexMap<usize, (usize, f64)>, to: usize) -> Vec<usize> {
    let mut path = vec![to];
    let mut at = to;
    while let Some((parent, _)) = best.get(&at) {
        if *parent == usize::MAX {
            break;
        }
        path.push(*parent);
        at = *parent;
    }
    path.reverse();
    path
}

/// Min-heap entry ordered by cost; ties break on the node id so queue
/// order is deterministic.
struct QueueEntry {
    cost: f64,
    node: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}
