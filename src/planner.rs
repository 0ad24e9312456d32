//! Top-level stripmap coverage planner.
//!
//! `setup` decomposes the work area and builds the sweep-plan graph
//! once; each `solve` call injects a start/goal pair into a clone of
//! that graph and runs the GTSP. With a fixed seed the whole pipeline is
//! deterministic.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::bcd::{
    compute_bcd, compute_best_bcd, compute_best_trapezoidal_decomposition,
    compute_trapezoidal_decomposition,
};
use crate::cost::{
    euclidean_path_cost_fn, euclidean_segment_cost_fn, PathCostFunction, SegmentCostFunction,
};
use crate::direction::Direction;
use crate::error::{CoverageError, Result};
use crate::gtsp::DefaultGtspSolver;
use crate::line::Segment;
use crate::point::{collinear, Point};
use crate::polygon::{Polygon, PolygonWithHoles};
use crate::sensor::SensorModel;
use crate::sweep_graph::SweepPlanGraph;
use crate::visibility_graph::VisibilityGraph;
use log::warn;
use num_traits::{Signed, Zero};
use std::sync::Arc;

/// Which cell decomposition `setup` runs.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecompositionType {
    Trapezoidal,
    #[default]
    Bcd,
    BestTrapezoidal,
    BestBcd,
}

/// Planner configuration.
pub struct Settings {
    pub polygon: PolygonWithHoles,
    pub path_cost_fn: PathCostFunction,
    pub segment_cost_fn: SegmentCostFunction,
    pub sensor_model: Arc<dyn SensorModel>,
    pub decomposition_type: DecompositionType,
    /// Prepend a lap along the outer boundary at `wall_distance`.
    pub sweep_around_obstacles: bool,
    pub wall_distance: f64,
    /// Push shared edges of rectangular cells outward so adjacent
    /// sweeps overlap.
    pub offset_rectangular_cells: bool,
    /// Seed forwarded to the GTSP solver.
    pub seed: u64,
}

impl Settings {
    /// Euclidean costs, plain BCD, no boundary lap.
    #[must_use]
    pub fn new(polygon: PolygonWithHoles, sensor_model: Arc<dyn SensorModel>) -> Self {
        Self {
            polygon,
            path_cost_fn: euclidean_path_cost_fn(),
            segment_cost_fn: euclidean_segment_cost_fn(),
            sensor_model,
            decomposition_type: DecompositionType::default(),
            sweep_around_obstacles: false,
            wall_distance: 0.0,
            offset_rectangular_cells: false,
            seed: 0,
        }
    }
}

/// Plans a sweep-coverage path over a polygon with holes.
pub struct PolygonStripmapPlanner {
    settings: Settings,
    decomposition: Vec<Polygon>,
    decomposition_adjacency: Vec<Vec<usize>>,
    sweep_plan_graph: Option<SweepPlanGraph>,
    solver: DefaultGtspSolver,
}

impl PolygonStripmapPlanner {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let solver = DefaultGtspSolver::new(settings.seed);
        Self {
            settings,
            decomposition: Vec::new(),
            decomposition_adjacency: Vec::new(),
            sweep_plan_graph: None,
            solver,
        }
    }

    /// Decompose the polygon and precompute the sweep-plan graph.
    pub fn setup(&mut self) -> Result<()> {
        let polygon = self.settings.polygon.clone();
        let along_x = Direction::from((1, 0));
        self.decomposition = match self.settings.decomposition_type {
            DecompositionType::Trapezoidal => {
                compute_trapezoidal_decomposition(&polygon, &along_x)?
            }
            DecompositionType::Bcd => compute_bcd(&polygon, &along_x)?,
            DecompositionType::BestTrapezoidal => {
                compute_best_trapezoidal_decomposition(&polygon)?.0
            }
            DecompositionType::BestBcd => compute_best_bcd(&polygon)?.0,
        };

        self.update_decomposition_adjacency();
        if self.settings.offset_rectangular_cells {
            self.offset_rectangular_cells();
        }

        let sweep_distance = self.settings.sensor_model.sweep_distance();
        if !(sweep_distance > 0.0) {
            return Err(CoverageError::InvalidGeometry(
                "sensor model yields a non-positive sweep distance".into(),
            ));
        }

        let visibility_graph =
            VisibilityGraph::new(polygon.clone(), self.settings.segment_cost_fn.clone());
        self.sweep_plan_graph = Some(SweepPlanGraph::create(
            &self.decomposition,
            visibility_graph,
            self.settings.path_cost_fn.clone(),
            sweep_distance,
        )?);
        Ok(())
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.sweep_plan_graph.is_some()
    }

    #[inline]
    pub fn get_decomposition(&self) -> &[Polygon] {
        &self.decomposition
    }

    /// Neighbor lists per decomposition cell; filled by `setup`.
    #[inline]
    pub fn decomposition_adjacency(&self) -> &[Vec<usize>] {
        &self.decomposition_adjacency
    }

    /// Plan the coverage path from `start` to `goal`.
    pub fn solve(&self, start: &Point, goal: &Point) -> Result<Vec<Point>> {
        let graph = self.sweep_plan_graph.as_ref().ok_or_else(|| {
            CoverageError::InternalInvariant("solve called before setup".into())
        })?;
        let mut waypoints = graph.solve(start, goal, &self.solver)?;
        if self.settings.sweep_around_obstacles {
            self.sweep_around_obstacles(&mut waypoints)?;
        }
        Ok(waypoints)
    }

    /// Recompute which cells share a boundary stretch. Returns whether
    /// every cell has at least one neighbor.
    pub fn update_decomposition_adjacency(&mut self) -> bool {
        let n = self.decomposition.len();
        self.decomposition_adjacency = vec![Vec::new(); n];
        for a in 0..n {
            for b in (a + 1)..n {
                if cells_adjacent(&self.decomposition[a], &self.decomposition[b]) {
                    self.decomposition_adjacency[a].push(b);
                    self.decomposition_adjacency[b].push(a);
                }
            }
        }
        n < 2 || self.decomposition_adjacency.iter().all(|adj| !adj.is_empty())
    }

    /// Push the shared edges of rectangular cells outward by the sensor
    /// overlap margin, so sweeps of adjacent cells observe the seam from
    /// both sides.
    pub fn offset_rectangular_cells(&mut self) {
        let margin =
            self.settings.sensor_model.lateral_footprint() - self.settings.sensor_model.sweep_distance();
        if margin <= 0.0 {
            return;
        }
        let original = self.decomposition.clone();
        for (id, cell) in self.decomposition.iter_mut().enumerate() {
            if !is_rectangle(cell) {
                continue;
            }
            let shared: Vec<usize> = (0..cell.len())
                .filter(|&e| {
                    original
                        .iter()
                        .enumerate()
                        .any(|(other_id, other)| other_id != id && edge_on_cell(&cell.edge(e), other))
                })
                .collect();
            if shared.is_empty() {
                continue;
            }
            match offset_rectangle_edges(cell, &shared, margin) {
                Some(offset) => *cell = offset,
                None => warn!("cannot offset rectangular cell {id}"),
            }
        }
    }

    /// Insert a boundary lap at wall distance right after the start so
    /// every outer edge is observed at close range.
    fn sweep_around_obstacles(&self, waypoints: &mut Vec<Point>) -> Result<()> {
        let hull = self.settings.polygon.boundary();
        let lap_ring = hull.compute_offset_polygon(self.settings.wall_distance)?;
        let Some(first) = waypoints.first().cloned() else {
            return Ok(());
        };

        let nearest = (0..lap_ring.len())
            .min_by(|&a, &b| {
                lap_ring
                    .vertex(a)
                    .squared_distance(&first)
                    .cmp(&lap_ring.vertex(b).squared_distance(&first))
            })
            .unwrap_or(0);
        let lap = lap_ring.rotated_to_start(nearest);

        let mut spliced = Vec::with_capacity(waypoints.len() + lap.len() + 1);
        spliced.push(first);
        spliced.extend(lap.vertices().iter().cloned());
        spliced.push(lap.vertex(0).clone());
        spliced.extend(waypoints.iter().skip(1).cloned());
        spliced.dedup();
        *waypoints = spliced;
        Ok(())
    }

    /// Serialize the precomputed sweep-plan graph.
    pub fn serialize_graph(&self) -> Result<Vec<u8>> {
        self.sweep_plan_graph
            .as_ref()
            .map(SweepPlanGraph::to_bytes)
            .ok_or_else(|| CoverageError::InternalInvariant("setup not run".into()))
    }

    /// Replace the sweep-plan graph with a previously serialized one.
    /// The polygon and cost settings must match the serialized graph.
    pub fn load_graph(&mut self, bytes: &[u8]) -> Result<()> {
        let visibility_graph = VisibilityGraph::new(
            self.settings.polygon.clone(),
            self.settings.segment_cost_fn.clone(),
        );
        let sweep_distance = self.settings.sensor_model.sweep_distance();
        self.sweep_plan_graph = Some(SweepPlanGraph::from_bytes(
            bytes,
            visibility_graph,
            self.settings.path_cost_fn.clone(),
            sweep_distance,
        )?);
        Ok(())
    }
}

/// Two cells are adjacent when some edge pair overlaps in more than a
/// point.
fn cells_adjacent(a: &Polygon, b: &Polygon) -> bool {
    for i in 0..a.len() {
        let ea = a.edge(i);
        for j in 0..b.len() {
            if segments_overlap(&ea, &b.edge(j)) {
                return true;
            }
        }
    }
    false
}

fn segments_overlap(a: &Segment, b: &Segment) -> bool {
    if !collinear(a.start(), a.end(), b.start()) || !collinear(a.start(), a.end(), b.end()) {
        return false;
    }
    let dir = a.end() - a.start();
    let t0 = (b.start() - a.start()).dot(&dir);
    let t1 = (b.end() - a.start()).dot(&dir);
    let len2 = dir.dot(&dir);
    let (lo, hi) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
    // Positive-length intersection of [0, len2] and [lo, hi].
    lo < len2 && hi.is_positive()
}

fn edge_on_cell(edge: &Segment, cell: &Polygon) -> bool {
    (0..cell.len()).any(|j| segments_overlap(edge, &cell.edge(j)))
}

fn is_rectangle(cell: &Polygon) -> bool {
    if cell.len() != 4 {
        return false;
    }
    (0..4).all(|i| {
        let e1 = cell.edge(i);
        let e2 = cell.edge(i + 1);
        let d1 = e1.end() - e1.start();
        let d2 = e2.end() - e2.start();
        d1.dot(&d2).is_zero()
    })
}

/// Move the listed edges of a rectangle outward by `margin`; pure vertex
/// arithmetic, no clipping needed.
fn offset_rectangle_edges(cell: &Polygon, edges: &[usize], margin: f64) -> Option<Polygon> {
    let mut vertices: Vec<Point> = cell.vertices().to_vec();
    let n = vertices.len();
    for &e in edges {
        let a = cell.vertex(e).to_dvec2();
        let b = cell.vertex(e + 1).to_dvec2();
        let direction = (b - a).normalize_or_zero();
        if direction == bevy_math::DVec2::ZERO {
            return None;
        }
        // Right-hand normal points out of a counter-clockwise ring.
        let outward = bevy_math::DVec2::new(direction.y, -direction.x) * margin;
        let shift = Point::from_f64(outward.x, outward.y)?;
        let moved_a = &vertices[e % n] + &shift;
        let moved_b = &vertices[(e + 1) % n] + &shift;
        vertices[e % n] = moved_a;
        vertices[(e + 1) % n] = moved_b;
    }
    Some(Polygon::new(vertices))
}
