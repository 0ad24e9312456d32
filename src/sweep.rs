//! Boustrophedon sweep plans for a single y-monotone cell.
//!
//! A rectangular sweep mask is moved across the cell in exact
//! arithmetic; each mask intersection contributes the contour stretch
//! between the previous and the current sweep line. Masks are inflated
//! by a small slack so that rational-to-float boundary noise never
//! produces grazing intersections.

use crate::clip::{cleanup_ring, clip_ring_rect};
use crate::direction::Rotation;
use crate::error::{CoverageError, Result};
use crate::line::Segment;
use crate::math::{distance_to_segment, is_approx_y_monotone};
use crate::point::{Point, Scalar};
use crate::polygon::{Polygon, MASK_SLACK};
use log::debug;

/// Margin for the corner-coverage test at the first and last sweep.
const COVERAGE_SLACK: f64 = MASK_SLACK + 1e-3;

/// Cells flatter than this fraction of the sweep spacing get a single
/// sweep along their first edge.
const NARROW_FRACTION: f64 = 0.01;

/// Tolerance of the y-monotonicity precondition.
const Y_MONOTONE_TOLERANCE: f64 = 1e-9;

/// Compute one boustrophedon waypoint sequence over `cell`.
///
/// The plan starts at `start_vertex` and walks the contour with the
/// given handedness; sweeps are spaced evenly, at most
/// `max_sweep_distance` apart, and run parallel to the edge leaving
/// `start_vertex`.
pub fn compute_sweep(
    cell: &Polygon,
    max_sweep_distance: f64,
    start_vertex: usize,
    counter_clockwise: bool,
) -> Result<Vec<Point>> {
    if cell.len() < 3 {
        return Err(CoverageError::InvalidCell(
            "cell has fewer than three vertices".into(),
        ));
    }
    if !cell.is_simple() {
        return Err(CoverageError::InvalidCell("cell is not strictly simple".into()));
    }
    if max_sweep_distance <= 0.0 {
        return Err(CoverageError::InvalidCell(
            "sweep distance must be positive".into(),
        ));
    }

    // Contour copy starting at the requested vertex; a clockwise plan
    // walks the reversed contour from the same vertex.
    let contour = cell.rotated_to_start(start_vertex);
    let contour = if counter_clockwise {
        contour
    } else {
        let reversed = contour.reversed();
        reversed.rotated_to_start(reversed.len() - 1)
    };

    // Frame with the start vertex at the origin and the first edge along
    // +x, so sweeps are horizontal.
    let origin = contour.vertex(0).clone();
    let translated = contour.translated(&-&origin);
    let first_edge_dir = translated
        .edge(0)
        .direction()
        .ok_or_else(|| CoverageError::InvalidCell("degenerate first edge".into()))?;
    let rotation = Rotation::to_direction(&first_edge_dir);
    let frame = translated.rotated(&rotation.inverse());

    let to_world = |p: &Point| &rotation.apply(p) + &origin;

    let frame_f64: Vec<_> = frame.vertices().iter().map(Point::to_dvec2).collect();
    if !is_approx_y_monotone(&frame_f64, Y_MONOTONE_TOLERANCE) {
        return Err(CoverageError::NotYMonotone);
    }

    let bbox = frame
        .bbox()
        .ok_or_else(|| CoverageError::InvalidCell("empty cell".into()))?;
    let polygon_length = bbox.height();

    // Narrow cells collapse to a single sweep along the first edge.
    if polygon_length < NARROW_FRACTION * max_sweep_distance {
        return Ok(vec![
            to_world(frame.vertex(0)),
            to_world(frame.vertex(1)),
        ]);
    }

    let num_sweeps = (polygon_length / max_sweep_distance).ceil() as usize + 1;
    let sweep_distance = polygon_length / (num_sweeps - 1) as f64;
    let step = Scalar::from_float(sweep_distance)
        .ok_or_else(|| CoverageError::InvalidCell("sweep distance is not finite".into()))?;

    let x_min = Scalar::from_float(bbox.min.x - MASK_SLACK)
        .ok_or_else(|| CoverageError::InvalidCell("cell bounds are not finite".into()))?;
    let x_max = Scalar::from_float(bbox.max.x + MASK_SLACK)
        .ok_or_else(|| CoverageError::InvalidCell("cell bounds are not finite".into()))?;
    let slack = Scalar::new(1.into(), 1_000_000.into());
    let (mut y_lo, mut y_hi) = if counter_clockwise {
        let base = Scalar::from_float(bbox.min.y)
            .ok_or_else(|| CoverageError::InvalidCell("cell bounds are not finite".into()))?;
        (&base - &slack, &base + &step + &slack)
    } else {
        let base = Scalar::from_float(bbox.max.y)
            .ok_or_else(|| CoverageError::InvalidCell("cell bounds are not finite".into()))?;
        (&base - &step - &slack, &base + &slack)
    };

    let mut sweep_is_cc = counter_clockwise;
    let mut waypoints: Vec<Point> = Vec::new();

    for i in 0..num_sweeps - 1 {
        let pieces: Vec<Vec<Point>> = clip_ring_rect(frame.vertices(), &x_min, &x_max, &y_lo, &y_hi)
            .iter()
            .filter_map(|p| cleanup_ring(p))
            .collect();
        if pieces.len() != 1 {
            return Err(CoverageError::InternalInvariant(format!(
                "sweep mask intersection produced {} pieces",
                pieces.len()
            )));
        }
        let mut intersection = Polygon::new(pieces.into_iter().next().unwrap_or_default());
        if intersection.is_counterclockwise() != sweep_is_cc {
            intersection.reverse();
        }
        let n = intersection.len();

        // The two lowest vertices bound the previous sweep line, the two
        // highest the current one.
        let (bot, sec_bot) = two_extreme_vertices(&intersection, true);
        let (top, sec_top) = two_extreme_vertices(&intersection, false);
        let bottom_edge = find_edge_between(&intersection, bot, sec_bot).ok_or_else(|| {
            CoverageError::InternalInvariant("mask intersection has no bottom sweep edge".into())
        })?;
        let top_edge = find_edge_between(&intersection, top, sec_top).ok_or_else(|| {
            CoverageError::InternalInvariant("mask intersection has no top sweep edge".into())
        })?;

        let (prev_sweep, current_sweep) = if counter_clockwise {
            (bottom_edge, top_edge)
        } else {
            (top_edge, bottom_edge)
        };

        // The first sweep walks extra contour backwards until the far
        // end of the current sweep is within reach.
        if i == 0 {
            let mut start_edges = vec![prev_sweep];
            let target = intersection.vertex(current_sweep + 1).clone();
            while !is_covered(&target, &intersection, &start_edges, sweep_distance)
                && start_edges.len() < n
            {
                let back = start_edges[start_edges.len() - 1];
                start_edges.push((back + n - 1) % n);
            }
            for edge in start_edges.iter().rev() {
                waypoints.push(intersection.vertex(*edge).clone());
            }
            waypoints.push(intersection.vertex(start_edges[0] + 1).clone());
        }

        let mut e = prev_sweep;
        loop {
            e = (e + 1) % n;
            if e == (current_sweep + 1) % n {
                break;
            }
            waypoints.push(intersection.vertex(e + 1).clone());
        }

        // Mirror of the first-sweep corner fix at the final sweep.
        if i == num_sweeps - 2 {
            let mut last_edges = vec![current_sweep];
            let source = intersection.vertex(prev_sweep).clone();
            while !is_covered(&source, &intersection, &last_edges, sweep_distance)
                && last_edges.len() < n
            {
                let forward = last_edges[last_edges.len() - 1];
                last_edges.push((forward + 1) % n);
            }
            for edge in last_edges.iter().skip(1) {
                waypoints.push(intersection.vertex(*edge + 1).clone());
            }
        }

        if counter_clockwise {
            y_lo = &y_lo + &step;
            y_hi = &y_hi + &step;
        } else {
            y_lo = &y_lo - &step;
            y_hi = &y_hi - &step;
        }
        sweep_is_cc = !sweep_is_cc;
    }

    Ok(waypoints.iter().map(to_world).collect())
}

/// All candidate sweeps of a cell: every start vertex in both
/// orientations. Candidates that are not y-monotone in their frame are
/// dropped; real failures propagate.
pub fn compute_cell_sweeps(cell: &Polygon, max_sweep_distance: f64) -> Result<Vec<Vec<Point>>> {
    let mut sweeps = Vec::with_capacity(2 * cell.len());
    for start in 0..cell.len() {
        for counter_clockwise in [true, false] {
            match compute_sweep(cell, max_sweep_distance, start, counter_clockwise) {
                Ok(waypoints) => sweeps.push(waypoints),
                Err(CoverageError::NotYMonotone) => {
                    debug!("dropping sweep candidate at vertex {start}: not y-monotone");
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(sweeps)
}

/// Indices of the two vertices with extreme y (smallest when `lowest`).
fn two_extreme_vertices(polygon: &Polygon, lowest: bool) -> (usize, usize) {
    let better = |a: &Point, b: &Point| if lowest { a.y() < b.y() } else { a.y() > b.y() };
    let mut first = 0;
    let mut second = 1;
    if better(polygon.vertex(1), polygon.vertex(0)) {
        std::mem::swap(&mut first, &mut second);
    }
    for i in 2..polygon.len() {
        let v = polygon.vertex(i);
        if better(v, polygon.vertex(first)) {
            second = first;
            first = i;
        } else if better(v, polygon.vertex(second)) {
            second = i;
        }
    }
    (first, second)
}

/// The edge connecting vertices `a` and `b`, in either direction.
fn find_edge_between(polygon: &Polygon, a: usize, b: usize) -> Option<usize> {
    let n = polygon.len();
    if (a + 1) % n == b {
        Some(a)
    } else if (b + 1) % n == a {
        Some(b)
    } else {
        None
    }
}

/// Whether `p` lies within one sweep spacing (plus margin) of any of the
/// given contour edges.
fn is_covered(p: &Point, polygon: &Polygon, edges: &[usize], sweep_distance: f64) -> bool {
    let pv = p.to_dvec2();
    edges.iter().any(|&e| {
        let seg: Segment = polygon.edge(e);
        distance_to_segment(pv, seg.start().to_dvec2(), seg.end().to_dvec2())
            < sweep_distance + COVERAGE_SLACK
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use bevy_math::DVec2;

    fn unit_square() -> Polygon {
        Polygon::from_f64(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap()
    }

    fn ys(waypoints: &[Point]) -> Vec<f64> {
        let mut levels: Vec<f64> = waypoints.iter().map(|p| p.to_dvec2().y).collect();
        levels.sort_by(f64::total_cmp);
        levels.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        levels
    }

    #[test]
    fn test_unit_square_six_sweeps() {
        let waypoints = compute_sweep(&unit_square(), 0.2, 0, true).unwrap();
        let levels = ys(&waypoints);
        assert_eq!(levels.len(), 6);
        // Interior levels carry the mask inflation slack.
        for (level, expected) in levels.iter().zip([0.0, 0.2, 0.4, 0.6, 0.8, 1.0]) {
            assert!((level - expected).abs() < 1e-5);
        }
        // Boustrophedon alternation: two waypoints per level, starting
        // at the start vertex.
        assert_eq!(waypoints.len(), 12);
        assert_eq!(waypoints[0], Point::from_f64(0.0, 0.0).unwrap());
        assert_eq!(waypoints[1], Point::from_f64(1.0, 0.0).unwrap());
    }

    #[test]
    fn test_clockwise_sweep_runs_along_left_wall() {
        let waypoints = compute_sweep(&unit_square(), 0.2, 0, false).unwrap();
        assert_eq!(waypoints[0], Point::from_f64(0.0, 0.0).unwrap());
        // The clockwise contour from vertex 0 leaves along the left
        // wall, so the sweeps are vertical and the levels lie in x.
        let mut levels: Vec<f64> = waypoints.iter().map(|p| p.to_dvec2().x).collect();
        levels.sort_by(f64::total_cmp);
        levels.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        assert_eq!(levels.len(), 6);
    }

    #[test]
    fn test_sweep_covers_cell() {
        // Every interior sample lies within s/2 + eps of some segment.
        let cell = Polygon::from_f64(&[(0.0, 0.0), (2.0, 0.0), (2.5, 1.5), (0.0, 1.0)]).unwrap();
        let s = 0.4;
        let waypoints = compute_sweep(&cell, s, 0, true).unwrap();
        assert!(waypoints.len() >= 4);

        let segments: Vec<(DVec2, DVec2)> = waypoints
            .windows(2)
            .map(|w| (w[0].to_dvec2(), w[1].to_dvec2()))
            .collect();
        for ix in 0..50 {
            for iy in 0..30 {
                let p = Point::from_f64(0.05 * ix as f64, 0.05 * iy as f64).unwrap();
                if cell.contains_point(&p) == crate::polygon::PointLocation::Outside {
                    continue;
                }
                let pv = p.to_dvec2();
                let d = segments
                    .iter()
                    .map(|(a, b)| distance_to_segment(pv, *a, *b))
                    .fold(f64::INFINITY, f64::min);
                assert!(
                    d <= s / 2.0 + 1e-6,
                    "point {pv:?} is {d} away from the sweep"
                );
            }
        }
    }

    #[test]
    fn test_sweep_endpoints_on_boundary() {
        let cell = Polygon::from_f64(&[(0.0, 0.0), (3.0, 0.0), (3.0, 2.0), (0.0, 2.0)]).unwrap();
        let waypoints = compute_sweep(&cell, 0.5, 1, true).unwrap();
        let first = waypoints.first().unwrap();
        let last = waypoints.last().unwrap();
        for p in [first, last] {
            assert_eq!(
                cell.contains_point(p),
                crate::polygon::PointLocation::OnBoundary
            );
        }
    }

    #[test]
    fn test_narrow_cell_single_sweep() {
        let sliver =
            Polygon::from_f64(&[(0.0, 0.0), (5.0, 0.0), (5.0, 0.001), (0.0, 0.001)]).unwrap();
        let waypoints = compute_sweep(&sliver, 1.0, 0, true).unwrap();
        assert_eq!(waypoints.len(), 2);
        assert_eq!(waypoints[0], Point::from_f64(0.0, 0.0).unwrap());
        assert_eq!(waypoints[1], Point::from_f64(5.0, 0.0).unwrap());
    }

    #[test]
    fn test_not_y_monotone_candidate_rejected() {
        // W-shaped cell: monotone along x only when swept from a side
        // edge; from the zigzag edge frames it fails.
        let w = Polygon::from_f64(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (3.0, 0.5),
            (1.0, 0.5),
            (0.0, 2.0),
        ])
        .unwrap();
        let mut rejected = 0;
        for start in 0..w.len() {
            if compute_sweep(&w, 0.5, start, true) == Err(CoverageError::NotYMonotone) {
                rejected += 1;
            }
        }
        assert!(rejected > 0);
    }

    #[test]
    fn test_invalid_cell() {
        let line = Polygon::from_f64(&[(0.0, 0.0), (1.0, 0.0)]).unwrap();
        assert!(matches!(
            compute_sweep(&line, 0.5, 0, true),
            Err(CoverageError::InvalidCell(_))
        ));
    }

    #[test]
    fn test_candidate_enumeration() {
        let square = unit_square();
        let sweeps = compute_cell_sweeps(&square, 0.25).unwrap();
        // Two orientations per start vertex, and the square is monotone
        // in every frame.
        assert_eq!(sweeps.len(), 8);
        for sweep in &sweeps {
            assert!(sweep.len() >= 2);
        }
    }
}
