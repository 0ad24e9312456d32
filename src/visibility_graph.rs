//! Shortest obstacle-avoiding paths between points in the work region.
//!
//! The precomputed graph spans the corners a taut path can bend around:
//! concave outer-boundary vertices and convex hole vertices. Query
//! points are wired into a clone of the graph through their visibility
//! polygons, then the route is found with Dijkstra.

use crate::cost::SegmentCostFunction;
use crate::error::{CoverageError, Result};
use crate::graph::Graph;
use crate::point::{orient2d, Orientation, Point};
use crate::polygon::{PointLocation, Polygon, PolygonWithHoles};

pub struct VisibilityGraph {
    polygon: PolygonWithHoles,
    segment_cost: SegmentCostFunction,
    graph: Graph<Point, ()>,
}

impl VisibilityGraph {
    /// Precompute the corner graph of `polygon`.
    #[must_use]
    pub fn new(polygon: PolygonWithHoles, segment_cost: SegmentCostFunction) -> Self {
        let mut graph = Graph::new();
        for corner in corner_vertices(&polygon) {
            graph.add_node(corner);
        }
        let ids: Vec<usize> = graph.nodes().map(|(id, _)| id).collect();
        for (a_pos, &a) in ids.iter().enumerate() {
            for &b in &ids[a_pos + 1..] {
                let (pa, pb) = match (graph.node_property(a), graph.node_property(b)) {
                    (Some(pa), Some(pb)) => (pa.clone(), pb.clone()),
                    _ => continue,
                };
                if polygon.segment_in_region(&pa, &pb) {
                    let cost = (segment_cost)(&pa, &pb);
                    graph.add_edge((a, b), (), cost);
                    graph.add_edge((b, a), (), cost);
                }
            }
        }
        Self {
            polygon,
            segment_cost,
            graph,
        }
    }

    #[inline]
    pub fn polygon(&self) -> &PolygonWithHoles {
        &self.polygon
    }

    #[inline]
    pub fn num_corners(&self) -> usize {
        self.graph.len()
    }

    /// Shortest path from `from` to `to`, given their visibility
    /// polygons. The result starts at `from` and ends at `to`.
    pub fn solve(
        &self,
        from: &Point,
        from_visibility: &Polygon,
        to: &Point,
        to_visibility: &Polygon,
    ) -> Result<Vec<Point>> {
        if from == to || from_visibility.contains_point(to) != PointLocation::Outside {
            return Ok(vec![from.clone(), to.clone()]);
        }

        // Wire the query points into a throwaway copy of the graph.
        let mut graph = self.graph.clone();
        let corner_ids: Vec<usize> = graph.nodes().map(|(id, _)| id).collect();
        let from_id = graph.add_node(from.clone());
        let to_id = graph.add_node(to.clone());
        for id in corner_ids {
            let Some(corner) = graph.node_property(id).cloned() else {
                continue;
            };
            if from_visibility.contains_point(&corner) != PointLocation::Outside {
                let cost = (self.segment_cost)(from, &corner);
                graph.add_edge((from_id, id), (), cost);
            }
            if to_visibility.contains_point(&corner) != PointLocation::Outside {
                let cost = (self.segment_cost)(&corner, to);
                graph.add_edge((id, to_id), (), cost);
            }
        }

        let ids = graph
            .solve_dijkstra(from_id, to_id)
            .ok_or(CoverageError::Unreachable)?;
        let mut path = Vec::with_capacity(ids.len());
        for id in ids {
            let point = graph
                .node_property(id)
                .cloned()
                .ok_or_else(|| CoverageError::InternalInvariant("path node vanished".into()))?;
            path.push(point);
        }
        Ok(path)
    }
}

/// Vertices a taut path can wrap around: every ring vertex whose
/// neighbour triple turns clockwise (reflex on the boundary, convex on a
/// clockwise hole).
fn corner_vertices(polygon: &PolygonWithHoles) -> Vec<Point> {
    let mut corners = Vec::new();
    for ring in polygon.rings() {
        let n = ring.len();
        for i in 0..n {
            let prev = ring.vertex(i + n - 1);
            let v = ring.vertex(i);
            let next = ring.vertex(i + 1);
            if orient2d(prev, v, next) == Orientation::Clockwise {
                corners.push(v.clone());
            }
        }
    }
    corners
}
