//! Generalized TSP solving over the exported integer adjacency matrix.
//!
//! The planner talks to solvers only through `(matrix, clusters)`; the
//! matrix carries milli-unit costs with [`NO_EDGE`](crate::graph::NO_EDGE)
//! sentinels, so swapping in an external solver is a drop-in change. The
//! bundled solver enumerates small instances exactly and otherwise runs
//! seeded greedy restarts with pairwise order exchanges; node choices
//! within a fixed cluster order are always optimal (layered shortest
//! path around the cycle).

use crate::error::{CoverageError, Result};
use crate::graph::NO_EDGE;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A Generalized TSP solver: find a cyclic node sequence visiting each
/// cluster exactly once with minimum summed edge weight.
pub trait GtspSolver {
    fn solve(&self, matrix: &[Vec<i32>], clusters: &[Vec<usize>]) -> Result<Vec<usize>>;
}

/// Instances with at most this many clusters are solved exactly.
const EXACT_CLUSTER_LIMIT: usize = 8;

const SENTINEL: i64 = NO_EDGE as i64;

/// The bundled deterministic solver. With a fixed seed the returned
/// cycle is bitwise reproducible.
#[derive(Clone, Copy, Debug)]
pub struct DefaultGtspSolver {
    pub seed: u64,
    pub restarts: usize,
}

impl Default for DefaultGtspSolver {
    fn default() -> Self {
        Self {
            seed: 0,
            restarts: 8,
        }
    }
}

impl DefaultGtspSolver {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

impl GtspSolver for DefaultGtspSolver {
    fn solve(&self, matrix: &[Vec<i32>], clusters: &[Vec<usize>]) -> Result<Vec<usize>> {
        let m = clusters.len();
        let n = matrix.len();
        if m == 0 || clusters.iter().any(Vec::is_empty) {
            return Err(CoverageError::SolverFailed);
        }
        if clusters.iter().flatten().any(|&id| id >= n) {
            return Err(CoverageError::SolverFailed);
        }
        if m == 1 {
            return Ok(vec![clusters[0][0]]);
        }

        let best = if m <= EXACT_CLUSTER_LIMIT {
            solve_exact(matrix, clusters)
        } else {
            solve_heuristic(matrix, clusters, self.seed, self.restarts)
        };

        let (cost, cycle) = best.ok_or(CoverageError::SolverFailed)?;
        // One sentinel edge is the forced cycle closure from goal back to
        // start; a second one means the tour is genuinely disconnected.
        if cost >= 2 * SENTINEL {
            return Err(CoverageError::SolverFailed);
        }
        debug!("gtsp tour cost {cost} over {m} clusters");
        Ok(cycle)
    }
}

/// Enumerate all cluster orders (first cluster pinned against cyclic
/// symmetry).
fn solve_exact(matrix: &[Vec<i32>], clusters: &[Vec<usize>]) -> Option<(i64, Vec<usize>)> {
    let m = clusters.len();
    let mut order: Vec<usize> = (1..m).collect();
    let mut best: Option<(i64, Vec<usize>)> = None;

    permute(&mut order, 0, &mut |suffix| {
        let mut full = Vec::with_capacity(m);
        full.push(0);
        full.extend_from_slice(suffix);
        if let Some((cost, cycle)) = best_nodes_for_order(matrix, clusters, &full) {
            if best.as_ref().map_or(true, |(c, _)| cost < *c) {
                best = Some((cost, cycle));
            }
        }
    });
    best
}

fn permute(items: &mut Vec<usize>, at: usize, visit: &mut impl FnMut(&[usize])) {
    if at == items.len() {
        visit(items);
        return;
    }
    for i in at..items.len() {
        items.swap(at, i);
        permute(items, at + 1, visit);
        items.swap(at, i);
    }
}

/// Seeded greedy restarts with pairwise cluster-order exchanges.
fn solve_heuristic(
    matrix: &[Vec<i32>],
    clusters: &[Vec<usize>],
    seed: u64,
    restarts: usize,
) -> Option<(i64, Vec<usize>)> {
    let m = clusters.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut best: Option<(i64, Vec<usize>)> = None;

    for _ in 0..restarts.max(1) {
        let mut order: Vec<usize> = (0..m).collect();
        order[1..].shuffle(&mut rng);

        let mut current = best_nodes_for_order(matrix, clusters, &order)?;
        loop {
            let mut improved = false;
            'swaps: for i in 1..m {
                for j in (i + 1)..m {
                    order.swap(i, j);
                    if let Some(candidate) = best_nodes_for_order(matrix, clusters, &order) {
                        if candidate.0 < current.0 {
                            current = candidate;
                            improved = true;
                            continue 'swaps;
                        }
                    }
                    order.swap(i, j);
                }
            }
            if !improved {
                break;
            }
        }

        if best.as_ref().map_or(true, |(c, _)| current.0 < *c) {
            best = Some(current);
        }
    }
    best
}

/// Optimal node selection for a fixed cluster order: a layered shortest
/// path around the cycle, tried from every node of the first cluster.
fn best_nodes_for_order(
    matrix: &[Vec<i32>],
    clusters: &[Vec<usize>],
    order: &[usize],
) -> Option<(i64, Vec<usize>)> {
    let cost = |from: usize, to: usize| -> i64 { matrix[from][to] as i64 };
    let mut best: Option<(i64, Vec<usize>)> = None;

    for &start in &clusters[order[0]] {
        // dp: per node of the current layer, (cost so far, predecessor
        // chain).
        let mut layer: Vec<(usize, i64, Vec<usize>)> = vec![(start, 0, vec![start])];
        for &cluster in &order[1..] {
            let mut next_layer: Vec<(usize, i64, Vec<usize>)> = Vec::new();
            for &node in &clusters[cluster] {
                let mut best_entry: Option<(i64, Vec<usize>)> = None;
                for (prev, acc, chain) in &layer {
                    let candidate = acc + cost(*prev, node);
                    if best_entry.as_ref().map_or(true, |(c, _)| candidate < *c) {
                        let mut chain = chain.clone();
                        chain.push(node);
                        best_entry = Some((candidate, chain));
                    }
                }
                if let Some((c, chain)) = best_entry {
                    next_layer.push((node, c, chain));
                }
            }
            if next_layer.is_empty() {
                return None;
            }
            layer = next_layer;
        }
        for (last, acc, chain) in &layer {
            let total = acc + cost(*last, start);
            if best.as_ref().map_or(true, |(c, _)| total < *c) {
                best = Some((total, chain.clone()));
            }
        }
    }
    best
}
