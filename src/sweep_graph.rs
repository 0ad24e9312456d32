//! The clustered sweep-plan graph and its GTSP solve.
//!
//! Every decomposition cell becomes one cluster of candidate sweeps;
//! edges carry the obstacle-avoiding shortest path from one sweep's end
//! to another's start. The sweep's own traversal cost is folded into its
//! outgoing edges so a plain edge-weight GTSP accumulates sweep costs
//! correctly. The base graph is immutable once created; solving clones
//! it and injects start and goal as singleton clusters.

use crate::cost::PathCostFunction;
use crate::error::{CoverageError, Result};
use crate::graph::{EdgeId, Graph};
use crate::gtsp::GtspSolver;
use crate::point::Point;
use crate::polygon::Polygon;
use crate::sweep::compute_cell_sweeps;
use crate::visibility::compute_visibility_polygon;
use crate::visibility_graph::VisibilityGraph;
use log::{info, warn};

/// A candidate sweep (or an injected start/goal waypoint).
#[derive(Clone, Debug)]
pub struct NodeProperty {
    /// The sweep path, or a single start/goal waypoint.
    pub waypoints: Vec<Point>,
    /// User path cost of `waypoints`.
    pub cost: f64,
    /// Cluster id; cells come first, start and goal follow.
    pub cluster: usize,
    /// One visibility polygon if the sweep starts where it ends,
    /// otherwise one per endpoint.
    pub visibility_polygons: Vec<Polygon>,
}

impl NodeProperty {
    fn front(&self) -> &Point {
        &self.waypoints[0]
    }

    fn back(&self) -> &Point {
        &self.waypoints[self.waypoints.len() - 1]
    }

    fn front_visibility(&self) -> &Polygon {
        &self.visibility_polygons[0]
    }

    fn back_visibility(&self) -> &Polygon {
        &self.visibility_polygons[self.visibility_polygons.len() - 1]
    }

    /// Conservative dominance check: some other candidate in the same
    /// cluster covers the cell cheaper even after stitching its
    /// endpoints to this one's.
    fn is_non_optimal(
        &self,
        visibility_graph: &VisibilityGraph,
        candidates: &[NodeProperty],
        path_cost: &PathCostFunction,
    ) -> bool {
        if self.waypoints.is_empty() {
            warn!("sweep candidate without waypoints");
            return false;
        }
        for other in candidates {
            if other.cluster != self.cluster || other.waypoints.is_empty() {
                continue;
            }
            let Ok(front_path) = visibility_graph.solve(
                self.front(),
                self.front_visibility(),
                other.front(),
                other.front_visibility(),
            ) else {
                continue;
            };
            let Ok(back_path) = visibility_graph.solve(
                other.back(),
                other.back_visibility(),
                self.back(),
                self.back_visibility(),
            ) else {
                continue;
            };
            if path_cost(&front_path) + other.cost + path_cost(&back_path) < self.cost {
                return true;
            }
        }
        false
    }
}

/// Shortest path between two nodes' facing endpoints.
#[derive(Clone, Debug)]
pub struct EdgeProperty {
    pub waypoints: Vec<Point>,
    pub cost: f64,
}

pub struct SweepPlanGraph {
    graph: Graph<NodeProperty, EdgeProperty>,
    visibility_graph: VisibilityGraph,
    path_cost: PathCostFunction,
    sweep_distance: f64,
    num_clusters: usize,
}

impl SweepPlanGraph {
    /// Build the base graph over the decomposition cells.
    ///
    /// Cells whose sweep planning fails are dropped with a warning;
    /// `EmptyDecomposition` when nothing survives. Broken geometric
    /// invariants surface as `InternalInvariant`.
    pub fn create(
        cells: &[Polygon],
        visibility_graph: VisibilityGraph,
        path_cost: PathCostFunction,
        sweep_distance: f64,
    ) -> Result<Self> {
        Self::create_impl(cells, visibility_graph, path_cost, sweep_distance, true)
    }

    fn create_impl(
        cells: &[Polygon],
        visibility_graph: VisibilityGraph,
        path_cost: PathCostFunction,
        sweep_distance: f64,
        prune: bool,
    ) -> Result<Self> {
        let mut this = Self {
            graph: Graph::new(),
            visibility_graph,
            path_cost,
            sweep_distance,
            num_clusters: 0,
        };

        let mut total_candidates = 0usize;
        for (cell_id, cell) in cells.iter().enumerate() {
            let shrunk = shrink_cell(cell, sweep_distance);
            let sweeps = match compute_cell_sweeps(&shrunk, sweep_distance) {
                Ok(sweeps) => sweeps,
                Err(e @ CoverageError::InternalInvariant(_)) => return Err(e),
                Err(e) => {
                    warn!("dropping cell {cell_id}: {e}");
                    continue;
                }
            };
            if sweeps.is_empty() {
                warn!("dropping cell {cell_id}: no sweep candidate is y-monotone");
                continue;
            }
            total_candidates += sweeps.len();

            let cluster = this.num_clusters;
            let mut candidates = Vec::with_capacity(sweeps.len());
            for waypoints in sweeps {
                match this.node_with_visibility(cluster, waypoints) {
                    Ok(node) => candidates.push(node),
                    Err(e) => warn!("dropping sweep candidate in cell {cell_id}: {e}"),
                }
            }
            if candidates.is_empty() {
                warn!("dropping cell {cell_id}: no usable sweep candidate");
                continue;
            }

            // One-pass pruning against the full pre-prune candidate
            // list; the cheapest candidate can never be dominated.
            let kept: Vec<NodeProperty> = if prune {
                candidates
                    .iter()
                    .filter(|node| {
                        !node.is_non_optimal(&this.visibility_graph, &candidates, &this.path_cost)
                    })
                    .cloned()
                    .collect()
            } else {
                candidates
            };

            for node in kept {
                this.insert_node(node);
            }
            this.num_clusters += 1;
        }

        if this.graph.is_empty() {
            return Err(CoverageError::EmptyDecomposition);
        }
        info!(
            "sweep plan graph: {} nodes ({} pruned), {} edges, {} clusters",
            this.graph.len(),
            total_candidates - this.graph.len(),
            this.graph.num_edges(),
            this.num_clusters
        );
        Ok(this)
    }

    #[inline]
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.graph.len()
    }

    #[inline]
    pub fn graph(&self) -> &Graph<NodeProperty, EdgeProperty> {
        &self.graph
    }

    /// Solve the coverage GTSP between `start` and `goal`.
    ///
    /// Works on a clone of the base graph; the base graph is reusable
    /// across calls.
    pub fn solve(
        &self,
        start: &Point,
        goal: &Point,
        solver: &dyn GtspSolver,
    ) -> Result<Vec<Point>> {
        if self.graph.is_empty() {
            return Err(CoverageError::EmptyDecomposition);
        }
        let polygon = self.visibility_graph.polygon();
        for point in [start, goal] {
            if polygon.in_hole_interior(point) {
                return Err(CoverageError::OutsideRegion);
            }
        }

        let mut graph = self.graph.clone();
        let start_node = self.node_with_visibility(self.num_clusters, vec![start.clone()])?;
        let goal_node = self.node_with_visibility(self.num_clusters + 1, vec![goal.clone()])?;

        let start_id = graph.add_node(start_node);
        graph.set_start(start_id);
        self.wire_edges(&mut graph, start_id);
        let goal_id = graph.add_node(goal_node);
        graph.set_goal(goal_id);
        self.wire_edges(&mut graph, goal_id);

        let matrix = graph.adjacency_matrix();
        let clusters = collect_clusters(&graph, self.num_clusters + 2)?;
        let solution = solver.solve(&matrix, &clusters)?;

        if solution.len() != clusters.len() {
            return Err(CoverageError::MalformedSolution(format!(
                "cycle length {} for {} clusters",
                solution.len(),
                clusters.len()
            )));
        }
        let at = solution
            .iter()
            .position(|&id| id == start_id)
            .ok_or_else(|| {
                CoverageError::MalformedSolution("start node missing from cycle".into())
            })?;
        let mut ordered: Vec<usize> = Vec::with_capacity(solution.len());
        ordered.extend_from_slice(&solution[at..]);
        ordered.extend_from_slice(&solution[..at]);
        if ordered.last() != Some(&goal_id) {
            return Err(CoverageError::MalformedSolution(
                "goal node is not at the end of the cycle".into(),
            ));
        }

        self.waypoints_for_solution(&graph, &ordered)
    }

    /// Concatenate node sweeps and edge connectors along the tour.
    fn waypoints_for_solution(
        &self,
        graph: &Graph<NodeProperty, EdgeProperty>,
        solution: &[usize],
    ) -> Result<Vec<Point>> {
        let mut waypoints: Vec<Point> = Vec::new();
        if solution.is_empty() {
            return Ok(waypoints);
        }
        for i in 0..solution.len() - 1 {
            let edge: EdgeId = (solution[i], solution[i + 1]);
            let node = graph.node_property(edge.0).ok_or_else(|| {
                CoverageError::MalformedSolution("cycle visits an unknown node".into())
            })?;
            let connector = graph.edge_property(&edge).ok_or_else(|| {
                CoverageError::MalformedSolution("cycle uses a nonexistent edge".into())
            })?;
            waypoints.extend(node.waypoints.iter().cloned());
            // Connector endpoints coincide with the adjacent sweeps.
            if connector.waypoints.len() > 2 {
                waypoints
                    .extend(connector.waypoints[1..connector.waypoints.len() - 1].iter().cloned());
            }
            if i == solution.len() - 2 {
                if let Some(last) = connector.waypoints.last() {
                    waypoints.push(last.clone());
                }
            }
        }
        Ok(waypoints)
    }

    /// Build a node, projecting stray endpoints onto the region and
    /// attaching endpoint visibility polygons.
    fn node_with_visibility(&self, cluster: usize, waypoints: Vec<Point>) -> Result<NodeProperty> {
        let polygon = self.visibility_graph.polygon();
        let mut waypoints = waypoints;
        if waypoints.is_empty() {
            return Err(CoverageError::InternalInvariant(
                "node without waypoints".into(),
            ));
        }
        let last = waypoints.len() - 1;
        for index in [0, last] {
            if !polygon.point_in_polygon(&waypoints[index]) {
                waypoints[index] = polygon.project_on_hull(&waypoints[index]);
            }
        }

        let front_vis = compute_visibility_polygon(polygon, &waypoints[0])?;
        let visibility_polygons = if waypoints[0] == waypoints[last] {
            vec![front_vis]
        } else {
            vec![
                front_vis,
                compute_visibility_polygon(polygon, &waypoints[last])?,
            ]
        };

        let cost = (self.path_cost)(&waypoints);
        Ok(NodeProperty {
            waypoints,
            cost,
            cluster,
            visibility_polygons,
        })
    }

    /// Append-edge pass for a freshly added node: connect it with every
    /// earlier node in both directions where the cluster rules allow.
    fn insert_node(&mut self, node: NodeProperty) -> usize {
        let mut graph = std::mem::take(&mut self.graph);
        let id = graph.add_node(node);
        self.wire_edges(&mut graph, id);
        self.graph = graph;
        id
    }

    fn wire_edges(&self, graph: &mut Graph<NodeProperty, EdgeProperty>, new_id: usize) {
        for adjacent in 0..graph.len() {
            if adjacent == new_id {
                continue;
            }
            for edge in [(new_id, adjacent), (adjacent, new_id)] {
                if !is_connected(graph, edge) {
                    continue;
                }
                let (Some(from), Some(to)) =
                    (graph.node_property(edge.0), graph.node_property(edge.1))
                else {
                    continue;
                };
                let path = match self.visibility_graph.solve(
                    from.back(),
                    from.back_visibility(),
                    to.front(),
                    to.front_visibility(),
                ) {
                    Ok(path) => path,
                    Err(e) => {
                        warn!("dropping edge {edge:?}: {e}");
                        continue;
                    }
                };
                let path_only_cost = (self.path_cost)(&path);
                let edge_cost = from.cost + path_only_cost;
                graph.add_edge(
                    edge,
                    EdgeProperty {
                        waypoints: path,
                        cost: path_only_cost,
                    },
                    edge_cost,
                );
            }
        }
    }

    /// Serialize the base graph to the little-endian blob layout.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        push_u64(&mut buf, self.graph.len() as u64);
        for (_, node) in self.graph.nodes() {
            push_u64(&mut buf, node.cluster as u64);
            push_f64(&mut buf, node.cost);
            push_u64(&mut buf, node.visibility_polygons.len() as u64);
            for polygon in &node.visibility_polygons {
                push_u64(&mut buf, polygon.len() as u64);
                for vertex in polygon.vertices() {
                    push_point(&mut buf, vertex);
                }
            }
            push_u64(&mut buf, node.waypoints.len() as u64);
            for waypoint in &node.waypoints {
                push_point(&mut buf, waypoint);
            }
        }
        push_u64(&mut buf, self.graph.num_edges() as u64);
        for (edge, property) in self.graph.edges() {
            push_u64(&mut buf, edge.0 as u64);
            push_u64(&mut buf, edge.1 as u64);
            push_f64(&mut buf, self.graph.edge_cost(edge).unwrap_or(f64::INFINITY));
            push_u64(&mut buf, property.waypoints.len() as u64);
            for waypoint in &property.waypoints {
                push_point(&mut buf, waypoint);
            }
        }
        buf
    }

    /// Rebuild a base graph from [`Self::to_bytes`] output.
    pub fn from_bytes(
        bytes: &[u8],
        visibility_graph: VisibilityGraph,
        path_cost: PathCostFunction,
        sweep_distance: f64,
    ) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let mut graph: Graph<NodeProperty, EdgeProperty> = Graph::new();

        let node_count = reader.read_u64()? as usize;
        let mut num_clusters = 0usize;
        for _ in 0..node_count {
            let cluster = reader.read_u64()? as usize;
            let cost = reader.read_f64()?;
            let polygon_count = reader.read_u64()? as usize;
            let mut visibility_polygons = Vec::with_capacity(polygon_count);
            for _ in 0..polygon_count {
                let vertex_count = reader.read_u64()? as usize;
                let mut vertices = Vec::with_capacity(vertex_count);
                for _ in 0..vertex_count {
                    vertices.push(reader.read_point()?);
                }
                visibility_polygons.push(Polygon::new(vertices));
            }
            let waypoint_count = reader.read_u64()? as usize;
            let mut waypoints = Vec::with_capacity(waypoint_count);
            for _ in 0..waypoint_count {
                waypoints.push(reader.read_point()?);
            }
            if waypoints.is_empty() || visibility_polygons.is_empty() {
                return Err(CoverageError::InvalidGeometry(
                    "serialized node without waypoints".into(),
                ));
            }
            num_clusters = num_clusters.max(cluster + 1);
            graph.add_node(NodeProperty {
                waypoints,
                cost,
                cluster,
                visibility_polygons,
            });
        }

        let edge_count = reader.read_u64()? as usize;
        for _ in 0..edge_count {
            let from = reader.read_u64()? as usize;
            let to = reader.read_u64()? as usize;
            let cost = reader.read_f64()?;
            let waypoint_count = reader.read_u64()? as usize;
            let mut waypoints = Vec::with_capacity(waypoint_count);
            for _ in 0..waypoint_count {
                waypoints.push(reader.read_point()?);
            }
            let same_cluster = match (graph.node_property(from), graph.node_property(to)) {
                (Some(a), Some(b)) => a.cluster == b.cluster,
                _ => {
                    return Err(CoverageError::InvalidGeometry(
                        "serialized edge references unknown nodes".into(),
                    ))
                }
            };
            if same_cluster {
                return Err(CoverageError::InvalidGeometry(
                    "serialized edge connects one cluster to itself".into(),
                ));
            }
            let path_only_cost = (path_cost)(&waypoints);
            graph.add_edge(
                (from, to),
                EdgeProperty {
                    waypoints,
                    cost: path_only_cost,
                },
                cost,
            );
        }

        Ok(Self {
            graph,
            visibility_graph,
            path_cost,
            sweep_distance,
            num_clusters,
        })
    }

    #[inline]
    pub fn sweep_distance(&self) -> f64 {
        self.sweep_distance
    }
}

/// Connectivity rules: clusters differ, nothing enters the start,
/// nothing leaves the goal, and start never connects straight to goal.
fn is_connected(graph: &Graph<NodeProperty, EdgeProperty>, edge: EdgeId) -> bool {
    let (Some(from), Some(to)) = (graph.node_property(edge.0), graph.node_property(edge.1)) else {
        return false;
    };
    from.cluster != to.cluster
        && graph.goal_idx() != Some(edge.0)
        && graph.start_idx() != Some(edge.1)
        && !(graph.start_idx() == Some(edge.0) && graph.goal_idx() == Some(edge.1))
}

/// Clamp the inward shrink to the cell size and fall back to the
/// original outline when offsetting collapses.
fn shrink_cell(cell: &Polygon, sweep_distance: f64) -> Polygon {
    let offset = match cell.bbox() {
        Some(bbox) => sweep_distance.min(bbox.diagonal() / 4.0),
        None => sweep_distance,
    };
    match cell.compute_offset_polygon(offset) {
        Ok(shrunk) => shrunk,
        Err(e) => {
            warn!("cannot shrink cell, sweeping the full outline: {e}");
            cell.clone()
        }
    }
}

fn collect_clusters(
    graph: &Graph<NodeProperty, EdgeProperty>,
    expected: usize,
) -> Result<Vec<Vec<usize>>> {
    let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); expected];
    for (id, node) in graph.nodes() {
        let slot = clusters.get_mut(node.cluster).ok_or_else(|| {
            CoverageError::InternalInvariant("cluster ids are not consecutive".into())
        })?;
        slot.push(id);
    }
    if clusters.iter().any(Vec::is_empty) {
        return Err(CoverageError::InternalInvariant(
            "empty cluster in sweep plan graph".into(),
        ));
    }
    Ok(clusters)
}

fn push_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_f64(buf: &mut Vec<u8>, value: f64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_point(buf: &mut Vec<u8>, point: &Point) {
    let v = point.to_dvec2();
    push_f64(buf, v.x);
    push_f64(buf, v.y);
}

struct Reader<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, at: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.at.checked_add(len).filter(|e| *e <= self.bytes.len());
        let end = end.ok_or_else(|| {
            CoverageError::InvalidGeometry("truncated graph blob".into())
        })?;
        let slice = &self.bytes[self.at..end];
        self.at = end;
        Ok(slice)
    }

    fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    fn read_f64(&mut self) -> Result<f64> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(f64::from_le_bytes(buf))
    }

    fn read_point(&mut self) -> Result<Point> {
        let x = self.read_f64()?;
        let y = self.read_f64()?;
        Point::from_f64(x, y).ok_or_else(|| {
            CoverageError::InvalidGeometry("non-finite waypoint in graph blob".into())
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bcd::compute_bcd;
    use crate::cost::{euclidean_path_cost_fn, euclidean_segment_cost_fn};
    use crate::direction::Direction;
    use crate::gtsp::DefaultGtspSolver;
    use crate::polygon::PolygonWithHoles;

    fn square_with_hole() -> PolygonWithHoles {
        PolygonWithHoles::new(
            Polygon::from_f64(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap(),
            vec![Polygon::from_f64(&[(0.4, 0.4), (0.6, 0.4), (0.6, 0.6), (0.4, 0.6)]).unwrap()],
        )
        .unwrap()
    }

    fn build(pwh: &PolygonWithHoles, prune: bool) -> SweepPlanGraph {
        let cells = compute_bcd(pwh, &Direction::from((1, 0))).unwrap();
        let visibility_graph = VisibilityGraph::new(pwh.clone(), euclidean_segment_cost_fn());
        SweepPlanGraph::create_impl(
            &cells,
            visibility_graph,
            euclidean_path_cost_fn(),
            0.3,
            prune,
        )
        .unwrap()
    }

    #[test]
    fn test_create_clusters_per_cell() {
        let graph = build(&square_with_hole(), true);
        assert_eq!(graph.num_clusters(), 4);
        assert!(graph.num_nodes() >= graph.num_clusters());
    }

    #[test]
    fn test_edges_cross_clusters_only() {
        let graph = build(&square_with_hole(), true);
        for (edge, _) in graph.graph().edges() {
            let from = graph.graph().node_property(edge.0).unwrap();
            let to = graph.graph().node_property(edge.1).unwrap();
            assert_ne!(from.cluster, to.cluster);
        }
    }

    #[test]
    fn test_pruning_keeps_cheapest_candidate() {
        let pruned = build(&square_with_hole(), true);
        let unpruned = build(&square_with_hole(), false);
        assert!(pruned.num_nodes() <= unpruned.num_nodes());

        // Per cluster, the cheapest candidate must survive pruning.
        for cluster in 0..pruned.num_clusters() {
            let min_pruned = pruned
                .graph()
                .nodes()
                .filter(|(_, n)| n.cluster == cluster)
                .map(|(_, n)| n.cost)
                .fold(f64::INFINITY, f64::min);
            let min_unpruned = unpruned
                .graph()
                .nodes()
                .filter(|(_, n)| n.cluster == cluster)
                .map(|(_, n)| n.cost)
                .fold(f64::INFINITY, f64::min);
            assert!((min_pruned - min_unpruned).abs() < 1e-9);
        }
    }

    #[test]
    fn test_pruning_preserves_optimal_tour_cost() {
        let pruned = build(&square_with_hole(), true);
        let unpruned = build(&square_with_hole(), false);
        let start = Point::from_f64(0.0, 0.0).unwrap();
        let goal = Point::from_f64(1.0, 1.0).unwrap();
        let solver = DefaultGtspSolver::default();
        let a = pruned.solve(&start, &goal, &solver).unwrap();
        let b = unpruned.solve(&start, &goal, &solver).unwrap();
        let cost = |w: &[Point]| crate::cost::euclidean_path_cost(w);
        // Identical up to the solver's milli-unit rounding.
        assert!(cost(&a) <= cost(&b) + 0.05);
    }

    #[test]
    fn test_solve_anchors_start_and_goal() {
        let graph = build(&square_with_hole(), true);
        let start = Point::from_f64(0.05, 0.05).unwrap();
        let goal = Point::from_f64(0.95, 0.95).unwrap();
        let solver = DefaultGtspSolver::default();
        let waypoints = graph.solve(&start, &goal, &solver).unwrap();
        assert_eq!(waypoints.first(), Some(&start));
        assert_eq!(waypoints.last(), Some(&goal));
        assert!(waypoints.len() > 4);
    }

    #[test]
    fn test_solve_rejects_point_in_hole() {
        let graph = build(&square_with_hole(), true);
        let start = Point::from_f64(0.05, 0.05).unwrap();
        let in_hole = Point::from_f64(0.5, 0.5).unwrap();
        let solver = DefaultGtspSolver::default();
        assert!(matches!(
            graph.solve(&start, &in_hole, &solver),
            Err(CoverageError::OutsideRegion)
        ));
    }

    #[test]
    fn test_solve_projects_outside_start() {
        let graph = build(&square_with_hole(), true);
        let outside = Point::from_f64(-0.5, 0.5).unwrap();
        let goal = Point::from_f64(0.95, 0.95).unwrap();
        let solver = DefaultGtspSolver::default();
        let waypoints = graph.solve(&outside, &goal, &solver).unwrap();
        // The start is projected onto the hull.
        assert_eq!(waypoints.first(), Some(&Point::from_f64(0.0, 0.5).unwrap()));
    }

    #[test]
    fn test_blob_round_trip() {
        let graph = build(&square_with_hole(), true);
        let bytes = graph.to_bytes();
        let restored = SweepPlanGraph::from_bytes(
            &bytes,
            VisibilityGraph::new(square_with_hole(), euclidean_segment_cost_fn()),
            euclidean_path_cost_fn(),
            graph.sweep_distance(),
        )
        .unwrap();
        assert_eq!(restored.num_nodes(), graph.num_nodes());
        assert_eq!(restored.num_clusters(), graph.num_clusters());
        assert_eq!(restored.graph().num_edges(), graph.graph().num_edges());
        assert_eq!(restored.to_bytes(), bytes);
    }

    #[test]
    fn test_blob_rejects_truncation() {
        let graph = build(&square_with_hole(), true);
        let bytes = graph.to_bytes();
        let result = SweepPlanGraph::from_bytes(
            &bytes[..bytes.len() / 2],
            VisibilityGraph::new(square_with_hole(), euclidean_segment_cost_fn()),
            euclidean_path_cost_fn(),
            graph.sweep_distance(),
        );
        assert!(matches!(result, Err(CoverageError::InvalidGeometry(_))));
    }
}
