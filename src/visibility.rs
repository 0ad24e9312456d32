//! Visibility polygons inside a polygon with holes.
//!
//! The classic rotational sweep: every ring vertex is a candidate, a
//! candidate is kept when the open sight segment stays inside the
//! region, and silhouette vertices spawn an extra window point where the
//! sight ray lands behind them. All predicates are exact; the result is
//! a counter-clockwise star-shaped ring around the query point.

use crate::error::{CoverageError, Result};
use crate::point::{orient2d, Orientation, Point, Scalar};
use crate::polygon::{PointLocation, Polygon, PolygonWithHoles};
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

/// Compute the visibility polygon of `query` inside `pwh`.
///
/// `query` may lie on the boundary (projected start and goal points do);
/// `OutsideRegion` if it is outside or inside a hole.
pub fn compute_visibility_polygon(pwh: &PolygonWithHoles, query: &Point) -> Result<Polygon> {
    let location = pwh.location(query);
    if location == PointLocation::Outside {
        return Err(CoverageError::OutsideRegion);
    }

    let rings: Vec<&Polygon> = pwh.rings().collect();

    let mut candidates: Vec<(Point, usize, usize)> = Vec::new();
    for (ring_id, ring) in rings.iter().enumerate() {
        for (i, v) in ring.vertices().iter().enumerate() {
            if v != query && pwh.segment_in_region(query, v) {
                candidates.push((v.clone(), ring_id, i));
            }
        }
    }
    candidates.sort_by(|a, b| angular_cmp(query, &a.0, &b.0));

    let mut output: Vec<Point> = Vec::new();
    let mut i = 0;
    while i < candidates.len() {
        // One group per direction from the query point.
        let mut j = i + 1;
        while j < candidates.len()
            && angular_cmp(query, &candidates[i].0, &candidates[j].0) == Ordering::Equal
        {
            j += 1;
        }
        let mut group: Vec<&(Point, usize, usize)> = candidates[i..j].iter().collect();
        group.sort_by(|a, b| {
            query
                .squared_distance(&a.0)
                .cmp(&query.squared_distance(&b.0))
        });

        let nearest = &group[0].0;
        let ring = rings[group[0].1];
        let index = group[0].2;
        let n = ring.len();
        let prev = ring.vertex(index + n - 1);
        let next = ring.vertex(index + 1);
        let s_prev = orient2d(query, nearest, prev);
        let s_next = orient2d(query, nearest, next);
        let has_cw = s_prev == Orientation::Clockwise || s_next == Orientation::Clockwise;
        let has_ccw =
            s_prev == Orientation::CounterClockwise || s_next == Orientation::CounterClockwise;

        if has_cw && !has_ccw {
            // Silhouette whose wall lies before this angle: the boundary
            // leaves the near vertex and jumps out to the window.
            for c in &group {
                output.push(c.0.clone());
            }
            if let Some(window) = cast_window(&rings, query, nearest) {
                output.push(window);
            }
        } else if has_ccw && !has_cw {
            // Wall begins after this angle: enter from the window.
            if let Some(window) = cast_window(&rings, query, nearest) {
                output.push(window);
            }
            for c in group.iter().rev() {
                output.push(c.0.clone());
            }
        } else {
            // The boundary crosses the sight ray here.
            for c in &group {
                output.push(c.0.clone());
            }
        }
        i = j;
    }

    if location == PointLocation::OnBoundary {
        insert_boundary_query(pwh, query, &mut output);
    }

    let cleaned = crate::clip::cleanup_ring(&output).ok_or_else(|| {
        CoverageError::InternalInvariant("visibility polygon degenerated".into())
    })?;
    Ok(Polygon::new(cleaned))
}

/// First boundary point hit by the ray `query → through` strictly beyond
/// `through`.
fn cast_window(rings: &[&Polygon], query: &Point, through: &Point) -> Option<Point> {
    let d = through - query;
    let one = Scalar::from_integer(1.into());
    let mut best_t: Option<Scalar> = None;
    for ring in rings {
        for i in 0..ring.len() {
            let edge = ring.edge(i);
            let e = edge.end() - edge.start();
            let denom = d.cross(&e);
            if denom.is_zero() {
                continue;
            }
            let aq = edge.start() - query;
            let t = aq.cross(&e) / &denom;
            let s = aq.cross(&d) / &denom;
            if s.is_negative() || s > one || t <= one {
                continue;
            }
            if best_t.as_ref().map_or(true, |b| t < *b) {
                best_t = Some(t);
            }
        }
    }
    best_t.map(|t| query + &(&d * &t))
}

/// A boundary query point is itself a vertex of its visibility polygon;
/// splice it into the angular gap left by the exterior cone.
fn insert_boundary_query(pwh: &PolygonWithHoles, query: &Point, output: &mut Vec<Point>) {
    let Some(d_out) = exterior_direction(pwh, query) else {
        return;
    };
    let probe = query + &d_out;
    let slot = output
        .iter()
        .position(|p| angular_cmp(query, &probe, p) == Ordering::Less)
        .unwrap_or(output.len());
    output.insert(slot, query.clone());
}

/// A direction pointing strictly out of the region from a boundary
/// point, as a vector.
fn exterior_direction(pwh: &PolygonWithHoles, query: &Point) -> Option<Point> {
    for ring in pwh.rings() {
        let n = ring.len();
        for i in 0..n {
            if ring.vertex(i) == query {
                let prev = ring.vertex(i + n - 1);
                let next = ring.vertex(i + 1);
                let out_in = edge_exterior_normal(prev, query);
                let out_out = edge_exterior_normal(query, next);
                return if orient2d(prev, query, next) == Orientation::Clockwise {
                    // Reflex corner: the exterior cone is convex, the sum
                    // of the two edge normals falls inside it.
                    Some(&out_in + &out_out)
                } else {
                    Some(out_out)
                };
            }
        }
        for i in 0..n {
            let edge = ring.edge(i);
            if edge.interior_contains(query) {
                return Some(edge_exterior_normal(edge.start(), edge.end()));
            }
        }
    }
    None
}

/// Right-hand normal of `a → b`; for counter-clockwise boundaries (and
/// clockwise holes) that side is exterior to the region.
fn edge_exterior_normal(a: &Point, b: &Point) -> Point {
    let e = b - a;
    Point::new(e.y().clone(), -e.x())
}

/// Counter-clockwise angular order around `q`, starting along `+x`.
/// `Equal` means same direction (distance is ignored).
fn angular_cmp(q: &Point, a: &Point, b: &Point) -> Ordering {
    let u = a - q;
    let v = b - q;
    let half_u = angular_half(&u);
    let half_v = angular_half(&v);
    if half_u != half_v {
        return half_u.cmp(&half_v);
    }
    let cross = u.cross(&v);
    if cross.is_positive() {
        Ordering::Less
    } else if cross.is_negative() {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// 0 for the half-plane swept first (angles in `[0, π)`), 1 for the
/// rest.
#[inline]
fn angular_half(u: &Point) -> u8 {
    let y = u.y();
    if y.is_positive() || (y.is_zero() && u.x().is_positive()) {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn unit_square() -> PolygonWithHoles {
        PolygonWithHoles::from_boundary(
            Polygon::from_f64(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap(),
        )
        .unwrap()
    }

    fn square_with_hole() -> PolygonWithHoles {
        PolygonWithHoles::new(
            Polygon::from_f64(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap(),
            vec![Polygon::from_f64(&[(0.4, 0.4), (0.6, 0.4), (0.6, 0.6), (0.4, 0.6)]).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn test_convex_interior_sees_everything() {
        let pwh = unit_square();
        let q = Point::from_f64(0.5, 0.5).unwrap();
        let vis = compute_visibility_polygon(&pwh, &q).unwrap();
        assert_eq!(vis.area2(), pwh.boundary().area2());
        assert_eq!(vis.len(), 4);
    }

    #[test]
    fn test_outside_query_fails() {
        let pwh = unit_square();
        let q = Point::from_f64(2.0, 0.5).unwrap();
        assert_eq!(
            compute_visibility_polygon(&pwh, &q),
            Err(CoverageError::OutsideRegion)
        );
        let holed = square_with_hole();
        let in_hole = Point::from_f64(0.5, 0.5).unwrap();
        assert_eq!(
            compute_visibility_polygon(&holed, &in_hole),
            Err(CoverageError::OutsideRegion)
        );
    }

    #[test]
    fn test_hole_casts_shadow() {
        let pwh = square_with_hole();
        let q = Point::from_f64(0.2, 0.5).unwrap();
        let vis = compute_visibility_polygon(&pwh, &q).unwrap();

        // The far hole corners are occluded.
        let far = Point::from_f64(0.6, 0.4).unwrap();
        assert!(!vis.vertices().contains(&far));
        // The silhouette rays land on the right wall at y = 0.1 and 0.9.
        let has_window = |x: f64, y: f64| {
            vis.vertices()
                .iter()
                .any(|v| v.to_dvec2().distance(bevy_math::DVec2::new(x, y)) < 1e-9)
        };
        assert!(has_window(1.0, 0.1));
        assert!(has_window(1.0, 0.9));
        // Strictly smaller than the free region.
        assert!(vis.area2() < pwh.area2());
        assert!(vis.is_counterclockwise());
    }

    #[test]
    fn test_boundary_query_is_part_of_its_polygon() {
        let l_shape = PolygonWithHoles::from_boundary(
            Polygon::from_f64(&[
                (0.0, 0.0),
                (2.0, 0.0),
                (2.0, 1.0),
                (1.0, 1.0),
                (1.0, 2.0),
                (0.0, 2.0),
            ])
            .unwrap(),
        )
        .unwrap();
        // Every vertex of the L sees the whole L from its corner.
        let q = Point::from_f64(0.0, 0.0).unwrap();
        let vis = compute_visibility_polygon(&l_shape, &q).unwrap();
        assert_eq!(vis.area2(), l_shape.area2());
        assert!(vis.vertices().contains(&q));
    }

    #[test]
    fn test_boundary_edge_query() {
        let pwh = unit_square();
        let q = Point::from_f64(0.5, 0.0).unwrap();
        let vis = compute_visibility_polygon(&pwh, &q).unwrap();
        // The query sits on a square edge; the visibility region is the
        // full square and the query vertex merges into the bottom edge.
        assert_eq!(vis.area2(), pwh.boundary().area2());
    }
}
