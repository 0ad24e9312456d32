//! Boustrophedon cellular decomposition.
//!
//! Choset, Howie. "Coverage of known spaces: The boustrophedon cellular
//! decomposition." Autonomous Robots 9.3 (2000): 247-253.
//!
//! The sweep line moves along +x over an exactly-rotated copy of the
//! region. Events are the region vertices in lexicographic `(x, y)`
//! order; that order doubles as a symbolic tilt, so sweep-parallel edges
//! need no special casing. Each open cell tracks its floor and ceiling
//! edge plus the vertex chains accumulated along them; closing a cell
//! stitches the chains with the sweep-line hits and keeps the result
//! only if it survives [`cleanup_ring`].

use crate::clip::cleanup_ring;
use crate::direction::{Direction, Rotation};
use crate::error::{CoverageError, Result};
use crate::line::Segment;
use crate::math::is_approx_y_monotone;
use crate::point::{Point, Scalar};
use crate::polygon::{Polygon, PolygonWithHoles};
use log::warn;
use num_traits::{Signed, Zero};

/// Tolerance for the approximate y-monotonicity test.
pub(crate) const Y_MONOTONE_TOLERANCE: f64 = 1e-9;

/// Decompose into y-monotone cells with sweep direction `dir`.
pub fn compute_bcd(pwh: &PolygonWithHoles, dir: &Direction) -> Result<Vec<Polygon>> {
    decompose(pwh, dir, false)
}

/// Decompose into trapezoids: cells additionally close at every chain
/// vertex, yielding a vertical decomposition in the rotated frame.
pub fn compute_trapezoidal_decomposition(
    pwh: &PolygonWithHoles,
    dir: &Direction,
) -> Result<Vec<Polygon>> {
    decompose(pwh, dir, true)
}

fn decompose(pwh: &PolygonWithHoles, dir: &Direction, trapezoidal: bool) -> Result<Vec<Polygon>> {
    let rotation = Rotation::to_direction(dir);
    let frame = pwh.transformed(&rotation.inverse());
    let cells = sweep_decompose(&frame, trapezoidal)?;
    Ok(cells.iter().map(|c| c.rotated(&rotation)).collect())
}

/// Decompose along every perpendicular edge direction and keep the
/// decomposition minimizing the summed [`min_altitude`] of its cells.
pub fn compute_best_bcd(pwh: &PolygonWithHoles) -> Result<(Vec<Polygon>, Direction)> {
    best_decomposition(pwh, compute_bcd)
}

/// Best-direction variant of
/// [`compute_trapezoidal_decomposition`].
pub fn compute_best_trapezoidal_decomposition(
    pwh: &PolygonWithHoles,
) -> Result<(Vec<Polygon>, Direction)> {
    best_decomposition(pwh, compute_trapezoidal_decomposition)
}

fn best_decomposition(
    pwh: &PolygonWithHoles,
    decompose_fn: fn(&PolygonWithHoles, &Direction) -> Result<Vec<Polygon>>,
) -> Result<(Vec<Polygon>, Direction)> {
    let mut best: Option<(Vec<Polygon>, Direction, f64)> = None;
    let mut last_error = CoverageError::EmptyDecomposition;
    for dir in pwh.find_perp_edge_directions() {
        let cells = match decompose_fn(pwh, &dir) {
            Ok(cells) => cells,
            Err(e) => {
                warn!("decomposition failed for one direction: {e}");
                last_error = e;
                continue;
            }
        };
        let altitude_sum: f64 = cells.iter().map(min_altitude).sum();
        if best
            .as_ref()
            .map_or(true, |(_, _, score)| altitude_sum < *score)
        {
            best = Some((cells, dir, altitude_sum));
        }
    }
    best.map(|(cells, dir, _)| (cells, dir)).ok_or(last_error)
}

/// The smallest sweep extent of `cell` over its own edge directions,
/// counting only directions in which the rotated cell is y-monotone.
/// Infinite when no direction qualifies.
#[must_use]
pub fn min_altitude(cell: &Polygon) -> f64 {
    let mut min = f64::INFINITY;
    for dir in cell.edge_directions() {
        let frame = cell.rotated(&Rotation::to_direction(&dir).inverse());
        let vertices: Vec<_> = frame.vertices().iter().map(Point::to_dvec2).collect();
        if !is_approx_y_monotone(&vertices, Y_MONOTONE_TOLERANCE) {
            continue;
        }
        if let Some(bbox) = frame.bbox() {
            min = min.min(bbox.height());
        }
    }
    min
}

struct OpenCell {
    floor: Segment,
    ceiling: Segment,
    floor_chain: Vec<Point>,
    ceiling_chain: Vec<Point>,
}

impl OpenCell {
    fn new(floor: Segment, ceiling: Segment, floor_seed: Point, ceiling_seed: Point) -> Self {
        Self {
            floor,
            ceiling,
            floor_chain: vec![floor_seed],
            ceiling_chain: vec![ceiling_seed],
        }
    }

    /// Vertical span test at the event point; strict because rings never
    /// touch each other or themselves.
    fn contains_vertically(&self, v: &Point) -> bool {
        let floor_y = eval_at(&self.floor, v.x(), true);
        let ceiling_y = eval_at(&self.ceiling, v.x(), false);
        floor_y.y() < v.y() && v.y() < ceiling_y.y()
    }

    fn close(self, floor_pt: Point, ceiling_pt: Point, closed: &mut Vec<Polygon>) {
        let mut ring = self.floor_chain;
        if ring.last() != Some(&floor_pt) {
            ring.push(floor_pt);
        }
        if ring.last() != Some(&ceiling_pt) {
            ring.push(ceiling_pt);
        }
        ring.extend(self.ceiling_chain.into_iter().rev());
        if let Some(cleaned) = cleanup_ring(&ring) {
            closed.push(Polygon::new(cleaned));
        }
    }
}

/// Point on an active edge at sweep position `x`. Sweep-parallel edges
/// only exist for one event column; the cell-facing endpoint stands in
/// for them.
fn eval_at(edge: &Segment, x: &Scalar, take_upper: bool) -> Point {
    match edge.point_at_x(x) {
        Some(p) => p,
        None => {
            let start_upper = edge.start().y() > edge.end().y();
            if start_upper == take_upper {
                edge.start().clone()
            } else {
                edge.end().clone()
            }
        }
    }
}

/// Active edges run from their lexicographically smaller endpoint.
fn lex_edge(v: &Point, other: &Point) -> Segment {
    if v.lex_cmp(other).is_lt() {
        Segment::new(v.clone(), other.clone())
    } else {
        Segment::new(other.clone(), v.clone())
    }
}

/// Sweep the rotated region left to right.
pub(crate) fn sweep_decompose(pwh: &PolygonWithHoles, trapezoidal: bool) -> Result<Vec<Polygon>> {
    if pwh.area2().is_zero() {
        return Err(CoverageError::Degenerate);
    }

    let rings: Vec<&Polygon> = pwh.rings().collect();
    let mut events: Vec<(usize, usize)> = Vec::new();
    for (ring_id, ring) in rings.iter().enumerate() {
        for i in 0..ring.len() {
            events.push((ring_id, i));
        }
    }
    events.sort_by(|a, b| {
        rings[a.0]
            .vertex(a.1)
            .lex_cmp(rings[b.0].vertex(b.1))
            .then(a.cmp(b))
    });

    let mut open: Vec<OpenCell> = Vec::new();
    let mut closed: Vec<Polygon> = Vec::new();

    for (ring_id, i) in events {
        let ring = rings[ring_id];
        let n = ring.len();
        let v = ring.vertex(i);
        let prev = ring.vertex(i + n - 1);
        let next = ring.vertex(i + 1);
        let prev_after = v.lex_cmp(prev).is_lt();
        let next_after = v.lex_cmp(next).is_lt();

        match (prev_after, next_after) {
            (true, true) => {
                // Both neighbours ahead of the sweep: an opening event.
                let d_prev = prev - v;
                let d_next = next - v;
                let (low, high) = if d_prev.cross(&d_next).is_positive() {
                    (prev, next)
                } else {
                    (next, prev)
                };
                let e_low = lex_edge(v, low);
                let e_high = lex_edge(v, high);

                if let Some(idx) = open.iter().position(|c| c.contains_vertically(v)) {
                    // The vertex splits the cell it falls into.
                    let cell = open.swap_remove(idx);
                    let floor_pt = eval_at(&cell.floor, v.x(), true);
                    let ceiling_pt = eval_at(&cell.ceiling, v.x(), false);
                    let lower = OpenCell::new(
                        cell.floor.clone(),
                        e_low,
                        floor_pt.clone(),
                        v.clone(),
                    );
                    let upper = OpenCell::new(
                        e_high,
                        cell.ceiling.clone(),
                        v.clone(),
                        ceiling_pt.clone(),
                    );
                    cell.close(floor_pt, ceiling_pt, &mut closed);
                    open.push(lower);
                    open.push(upper);
                } else {
                    open.push(OpenCell::new(e_low, e_high, v.clone(), v.clone()));
                }
            }
            (false, false) => {
                // Both neighbours behind: a closing event.
                let both = open.iter().position(|c| {
                    c.floor.end() == v && c.ceiling.end() == v
                });
                if let Some(idx) = both {
                    let cell = open.swap_remove(idx);
                    cell.close(v.clone(), v.clone(), &mut closed);
                    continue;
                }

                let low_idx = open.iter().position(|c| c.ceiling.end() == v);
                let high_idx = open.iter().position(|c| c.floor.end() == v);
                let (Some(low_idx), Some(high_idx)) = (low_idx, high_idx) else {
                    return Err(CoverageError::InternalInvariant(
                        "closing event without matching open cells".into(),
                    ));
                };
                // Remove the later index first to keep the other valid.
                let (first, second) = if low_idx > high_idx {
                    (low_idx, high_idx)
                } else {
                    (high_idx, low_idx)
                };
                let a = open.swap_remove(first);
                let b = open.swap_remove(second);
                let (cell_low, cell_high) = if a.ceiling.end() == v { (a, b) } else { (b, a) };

                let floor_pt = eval_at(&cell_low.floor, v.x(), true);
                let ceiling_pt = eval_at(&cell_high.ceiling, v.x(), false);
                let merged = OpenCell::new(
                    cell_low.floor.clone(),
                    cell_high.ceiling.clone(),
                    floor_pt.clone(),
                    ceiling_pt.clone(),
                );
                cell_low.close(floor_pt, v.clone(), &mut closed);
                cell_high.close(v.clone(), ceiling_pt, &mut closed);
                open.push(merged);
            }
            _ => {
                // One edge ends here, the other continues: extend or, in
                // trapezoidal mode, cut.
                let outgoing_neighbor = if prev_after { prev } else { next };
                let outgoing = lex_edge(v, outgoing_neighbor);

                if let Some(idx) = open.iter().position(|c| c.floor.end() == v) {
                    if trapezoidal {
                        let cell = open.swap_remove(idx);
                        let ceiling_pt = eval_at(&cell.ceiling, v.x(), false);
                        open.push(OpenCell::new(
                            outgoing,
                            cell.ceiling.clone(),
                            v.clone(),
                            ceiling_pt.clone(),
                        ));
                        cell.close(v.clone(), ceiling_pt, &mut closed);
                    } else {
                        let cell = &mut open[idx];
                        cell.floor_chain.push(v.clone());
                        cell.floor = outgoing;
                    }
                } else if let Some(idx) = open.iter().position(|c| c.ceiling.end() == v) {
                    if trapezoidal {
                        let cell = open.swap_remove(idx);
                        let floor_pt = eval_at(&cell.floor, v.x(), true);
                        open.push(OpenCell::new(
                            cell.floor.clone(),
                            outgoing,
                            floor_pt.clone(),
                            v.clone(),
                        ));
                        cell.close(floor_pt, v.clone(), &mut closed);
                    } else {
                        let cell = &mut open[idx];
                        cell.ceiling_chain.push(v.clone());
                        cell.ceiling = outgoing;
                    }
                } else {
                    return Err(CoverageError::InternalInvariant(
                        "chain event without a matching open cell".into(),
                    ));
                }
            }
        }
    }

    if !open.is_empty() {
        return Err(CoverageError::InternalInvariant(
            "sweep finished with open cells".into(),
        ));
    }
    if closed.is_empty() {
        return Err(CoverageError::EmptyDecomposition);
    }
    Ok(closed)
}

#[cfg(test)]
mod test {
    use super::*;

    fn pwh(boundary: &[(f64, f64)], holes: &[&[(f64, f64)]]) -> PolygonWithHoles {
        PolygonWithHoles::new(
            Polygon::from_f64(boundary).unwrap(),
            holes
                .iter()
                .map(|h| Polygon::from_f64(h).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn area2_sum(cells: &[Polygon]) -> Scalar {
        cells.iter().map(Polygon::area2).sum()
    }

    #[test]
    fn test_unit_square_single_cell() {
        let square = pwh(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], &[]);
        let cells = compute_bcd(&square, &Direction::from((1, 0))).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].area2(), square.area2());
    }

    /// Unit square with an exact [2/5, 3/5] square hole.
    fn holed_unit_square() -> PolygonWithHoles {
        let fifth = |n: i64| Scalar::new(n.into(), 5.into());
        let hole = Polygon::new(vec![
            Point::new(fifth(2), fifth(2)),
            Point::new(fifth(3), fifth(2)),
            Point::new(fifth(3), fifth(3)),
            Point::new(fifth(2), fifth(3)),
        ]);
        PolygonWithHoles::new(
            Polygon::from_f64(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap(),
            vec![hole],
        )
        .unwrap()
    }

    #[test]
    fn test_square_with_hole() {
        let region = holed_unit_square();
        let cells = compute_bcd(&region, &Direction::from((1, 0))).unwrap();
        assert!(cells.len() >= 2);
        // Exact partition: cell areas sum to 1 - 1/25.
        let total = area2_sum(&cells) / Scalar::from_integer(2.into());
        assert_eq!(total, Scalar::new(24.into(), 25.into()));
        // Every cell is y-monotone in the sweep frame.
        for cell in &cells {
            let vs: Vec<_> = cell.vertices().iter().map(Point::to_dvec2).collect();
            assert!(is_approx_y_monotone(&vs, Y_MONOTONE_TOLERANCE));
        }
    }

    #[test]
    fn test_l_shape_splits_at_reflex_corner() {
        let l_shape = pwh(
            &[
                (0.0, 0.0),
                (2.0, 0.0),
                (2.0, 1.0),
                (1.0, 1.0),
                (1.0, 2.0),
                (0.0, 2.0),
            ],
            &[],
        );
        let cells = compute_bcd(&l_shape, &Direction::from((1, 0))).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(area2_sum(&cells), l_shape.area2());
        // Split runs along x = 1.
        for cell in &cells {
            let bbox = cell.bbox().unwrap();
            assert!(bbox.min.x >= 1.0 - 1e-12 || bbox.max.x <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_degenerate_input() {
        let flat = pwh(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)], &[]);
        assert_eq!(
            compute_bcd(&flat, &Direction::from((1, 0))),
            Err(CoverageError::Degenerate)
        );
    }

    #[test]
    fn test_vertical_sweep_direction() {
        // Along +y every horizontal cut of the L is connected, so the
        // reflex corner only extends the single open cell.
        let l_shape = pwh(
            &[
                (0.0, 0.0),
                (2.0, 0.0),
                (2.0, 1.0),
                (1.0, 1.0),
                (1.0, 2.0),
                (0.0, 2.0),
            ],
            &[],
        );
        let cells = compute_bcd(&l_shape, &Direction::from((0, 1))).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(area2_sum(&cells), l_shape.area2());
        assert_eq!(cells[0].len(), 6);
    }

    #[test]
    fn test_trapezoidal_partitions_area() {
        let region = holed_unit_square();
        let cells =
            compute_trapezoidal_decomposition(&region, &Direction::from((1, 0))).unwrap();
        assert!(cells.len() >= 2);
        let total = area2_sum(&cells) / Scalar::from_integer(2.into());
        assert_eq!(total, Scalar::new(24.into(), 25.into()));
    }

    #[test]
    fn test_best_bcd_prefers_low_altitude() {
        // A long thin slab: sweeping across the short side minimizes the
        // altitude sum.
        let slab = pwh(&[(0.0, 0.0), (10.0, 0.0), (10.0, 1.0), (0.0, 1.0)], &[]);
        let (cells, dir) = compute_best_bcd(&slab).unwrap();
        assert_eq!(cells.len(), 1);
        // Perpendicular-to-edge directions include (1, 0) and (0, 1);
        // the winner sweeps along x so the altitude is the short side.
        assert!(dir.dy().is_zero() || dir.dx().is_zero());
        assert!((min_altitude(&cells[0]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_altitude_rotated_cell() {
        let diamond =
            Polygon::from_f64(&[(1.0, 0.0), (2.0, 1.0), (1.0, 2.0), (0.0, 1.0)]).unwrap();
        let altitude = min_altitude(&diamond);
        // Sweeping along a diamond edge spans sqrt(2).
        assert!((altitude - 2.0_f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_cells_cover_square_exactly() {
        // Union-by-area check on a notched polygon.
        let notched = pwh(
            &[
                (0.0, 0.0),
                (4.0, 0.0),
                (4.0, 3.0),
                (3.0, 3.0),
                (3.0, 1.0),
                (2.0, 1.0),
                (2.0, 3.0),
                (0.0, 3.0),
            ],
            &[],
        );
        let cells = compute_bcd(&notched, &Direction::from((1, 0))).unwrap();
        assert_eq!(area2_sum(&cells), notched.area2());
        // The notch reaches the top rim, so its left wall splits the slab
        // while its right wall merely extends the bottom cell.
        assert_eq!(cells.len(), 2);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]
            #[test]
            fn bcd_partitions_square_with_rect_hole(
                hx in 1i64..6,
                hy in 1i64..6,
                hw in 1i64..3,
                hh in 1i64..3,
            ) {
                let boundary = Polygon::new(vec![
                    Point::from((0, 0)),
                    Point::from((10, 0)),
                    Point::from((10, 10)),
                    Point::from((0, 10)),
                ]);
                let hole = Polygon::new(vec![
                    Point::from((hx, hy)),
                    Point::from((hx + hw, hy)),
                    Point::from((hx + hw, hy + hh)),
                    Point::from((hx, hy + hh)),
                ]);
                let region = PolygonWithHoles::new(boundary, vec![hole]).unwrap();
                let cells = compute_bcd(&region, &Direction::from((1, 0))).unwrap();

                // Exact partition of the free area.
                prop_assert_eq!(area2_sum(&cells), region.area2());
                for cell in &cells {
                    let vs: Vec<_> = cell.vertices().iter().map(Point::to_dvec2).collect();
                    prop_assert!(is_approx_y_monotone(&vs, Y_MONOTONE_TOLERANCE));
                }
            }
        }
    }
}
