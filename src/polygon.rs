use crate::clip::{cleanup_ring, clip_ring_halfplane, is_strictly_simple, ring_area2};
use crate::direction::{Direction, Rotation};
use crate::error::{CoverageError, Result};
use crate::line::{Line, Segment};
use crate::math::Aabb;
use crate::point::{collinear, orient2d, Orientation, Point, Scalar};
use log::debug;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

/// Numerical slack absorbed by offset masks, in work-area units.
pub(crate) const MASK_SLACK: f64 = 1e-6;

/// Where a point falls relative to a region or ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointLocation {
    Inside,
    OnBoundary,
    Outside,
}

/// A simple polygon stored as a cyclic vertex list.
///
/// Orientation is not fixed by this type; [`PolygonWithHoles`] enforces
/// counter-clockwise boundaries and clockwise holes on construction, and
/// the sweep planner works on deliberately reversed copies.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    #[inline]
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Build from `f64` coordinate pairs; `None` if any coordinate is not
    /// finite.
    pub fn from_f64(coords: &[(f64, f64)]) -> Option<Self> {
        let vertices = coords
            .iter()
            .map(|&(x, y)| Point::from_f64(x, y))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { vertices })
    }

    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn vertex(&self, i: usize) -> &Point {
        &self.vertices[i % self.vertices.len()]
    }

    /// The directed edge from vertex `i` to vertex `i + 1`.
    #[inline]
    #[must_use]
    pub fn edge(&self, i: usize) -> Segment {
        let n = self.vertices.len();
        Segment::new(self.vertices[i % n].clone(), self.vertices[(i + 1) % n].clone())
    }

    /// Twice the signed area; positive for counter-clockwise rings.
    #[inline]
    #[must_use]
    pub fn area2(&self) -> Scalar {
        ring_area2(&self.vertices)
    }

    /// Unsigned area as `f64`.
    #[must_use]
    pub fn area(&self) -> f64 {
        (self.area2().abs() / BigRational::from_integer(2.into()))
            .to_f64()
            .unwrap_or(0.0)
    }

    #[inline]
    #[must_use]
    pub fn is_counterclockwise(&self) -> bool {
        self.area2().is_positive()
    }

    pub fn reverse(&mut self) {
        self.vertices.reverse();
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut p = self.clone();
        p.reverse();
        p
    }

    /// Copy with vertex `start` first, preserving cyclic order.
    #[must_use]
    pub fn rotated_to_start(&self, start: usize) -> Self {
        let n = self.vertices.len();
        let mut vertices = Vec::with_capacity(n);
        for k in 0..n {
            vertices.push(self.vertices[(start + k) % n].clone());
        }
        Self { vertices }
    }

    #[inline]
    #[must_use]
    pub fn is_simple(&self) -> bool {
        is_strictly_simple(&self.vertices)
    }

    #[must_use]
    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let expected = if self.is_counterclockwise() {
            Orientation::Clockwise
        } else {
            Orientation::CounterClockwise
        };
        (0..n).all(|i| {
            orient2d(
                &self.vertices[i],
                &self.vertices[(i + 1) % n],
                &self.vertices[(i + 2) % n],
            ) != expected
        })
    }

    /// Merge duplicate and collinear consecutive vertices in place.
    pub fn simplify(&mut self) {
        let mut out: Vec<Point> = Vec::with_capacity(self.vertices.len());
        for p in &self.vertices {
            if out.last() != Some(p) {
                out.push(p.clone());
            }
        }
        while out.len() > 1 && out.first() == out.last() {
            out.pop();
        }
        let mut changed = true;
        while changed && out.len() >= 3 {
            changed = false;
            let mut i = 0;
            while i < out.len() && out.len() >= 3 {
                let n = out.len();
                let prev = &out[(i + n - 1) % n];
                let next = &out[(i + 1) % n];
                if prev == next || collinear(prev, &out[i], next) {
                    out.remove(i);
                    changed = true;
                } else {
                    i += 1;
                }
            }
        }
        self.vertices = out;
    }

    #[inline]
    pub fn bbox(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter())
    }

    #[must_use]
    pub fn rotated(&self, rotation: &Rotation) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| rotation.apply(p)).collect(),
        }
    }

    #[must_use]
    pub fn translated(&self, offset: &Point) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| p + offset).collect(),
        }
    }

    /// Exact point-in-ring test by crossing count.
    #[must_use]
    pub fn contains_point(&self, p: &Point) -> PointLocation {
        let n = self.vertices.len();
        if n < 3 {
            return PointLocation::Outside;
        }
        let mut crossings = 0usize;
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            if Segment::new(a.clone(), b.clone()).contains_point(p) {
                return PointLocation::OnBoundary;
            }
            let a_above = a.y() > p.y();
            let b_above = b.y() > p.y();
            if a_above != b_above {
                // The edge spans the horizontal through p; count it if
                // the crossing lies strictly to the right.
                let t = (p.y() - a.y()) / (b.y() - a.y());
                let x = a.x() + &t * (b.x() - a.x());
                if x > *p.x() {
                    crossings += 1;
                }
            }
        }
        if crossings % 2 == 1 {
            PointLocation::Inside
        } else {
            PointLocation::Outside
        }
    }

    /// Closest point on the ring boundary.
    #[must_use]
    pub fn project_point(&self, p: &Point) -> Point {
        let mut best = self.vertices[0].clone();
        let mut best_d = best.squared_distance(p);
        for i in 0..self.vertices.len() {
            let candidate = self.edge(i).project_point(p);
            let d = candidate.squared_distance(p);
            if d < best_d {
                best_d = d;
                best = candidate;
            }
        }
        best
    }

    /// Distinct edge directions, deduplicated by collinearity, together
    /// with their negations.
    #[must_use]
    pub fn edge_directions(&self) -> Vec<Direction> {
        let mut directions: Vec<Direction> = Vec::new();
        for i in 0..self.vertices.len() {
            if let Some(d) = self.edge(i).direction() {
                if !directions.iter().any(|known| known.is_collinear(&d)) {
                    directions.push(d);
                }
            }
        }
        let opposites: Vec<Direction> = directions.iter().map(Direction::opposite).collect();
        directions.extend(opposites);
        directions
    }

    /// Shift edge `edge_id` inward by `offset`, re-clipping the polygon
    /// behind the shifted edge. The polygon must be simple and
    /// counter-clockwise.
    pub fn offset_edge(&self, edge_id: usize, offset: f64) -> Result<Polygon> {
        if self.vertices.len() < 3 || !self.is_simple() {
            return Err(CoverageError::InvalidGeometry(
                "offset edge needs a simple polygon".into(),
            ));
        }
        if !self.is_counterclockwise() {
            return Err(CoverageError::InvalidGeometry(
                "offset edge needs a counter-clockwise polygon".into(),
            ));
        }
        if offset <= 0.0 {
            return Ok(self.clone());
        }

        // Work in a frame where the edge source is the origin and the
        // edge runs along +x; inward is then +y.
        let ring = self.rotated_to_start(edge_id);
        let origin = ring.vertices[0].clone();
        let translated = ring.translated(&-&origin);
        let edge_dir = match translated.edge(0).direction() {
            Some(d) => d,
            None => {
                return Err(CoverageError::InvalidGeometry(
                    "degenerate edge".into(),
                ))
            }
        };
        let rotation = Rotation::to_direction(&edge_dir);
        let frame = translated.rotated(&rotation.inverse());

        let bbox = frame.bbox().ok_or_else(|| {
            CoverageError::InvalidGeometry("empty polygon".into())
        })?;
        let mut band_top = offset + MASK_SLACK;
        if 0.5 * bbox.max.y <= band_top {
            band_top = 0.5 * bbox.max.y - MASK_SLACK;
            debug!("offset too large for edge {edge_id}, re-adjusting");
        }
        if band_top <= 0.0 {
            return Err(CoverageError::OffsetCollapsed);
        }
        let top = Point::from_f64(0.0, band_top).ok_or(CoverageError::OffsetCollapsed)?;

        // The removed band spans the full x-range, so subtracting it is a
        // single half-plane clip above the band top.
        let keep_above = Line::new(
            top.clone(),
            Point::new(top.x() + &Scalar::from_integer(1.into()), top.y().clone()),
        );
        let kept: Vec<Vec<Point>> = clip_ring_halfplane(frame.vertices(), &keep_above)
            .iter()
            .filter_map(|piece| cleanup_ring(piece))
            .collect();
        if kept.len() != 1 {
            debug!(
                "offsetting edge {edge_id} left {} pieces instead of one",
                kept.len()
            );
            return Err(CoverageError::OffsetCollapsed);
        }

        let back = Polygon::new(kept.into_iter().next().unwrap_or_default())
            .rotated(&rotation)
            .translated(&origin);
        Ok(back)
    }

    /// Inward offset of every edge by `offset`, realized as successive
    /// edge-band subtractions. `OffsetCollapsed` when an edge vanishes.
    pub fn compute_offset_polygon(&self, offset: f64) -> Result<Polygon> {
        let mut current = self.clone();
        for i in 0..self.vertices.len() {
            let original_edge = self.edge(i);
            // The matching edge keeps its supporting line until it is
            // offset itself.
            let found = (0..current.len()).find(|&j| {
                let e = current.edge(j);
                collinear(original_edge.start(), original_edge.end(), e.start())
                    && collinear(original_edge.start(), original_edge.end(), e.end())
            });
            let j = found.ok_or(CoverageError::OffsetCollapsed)?;
            current = current.offset_edge(j, offset)?;
        }
        Ok(current)
    }
}

/// A work area: one counter-clockwise outer boundary and zero or more
/// clockwise holes, pairwise disjoint and strictly inside the boundary.
/// Collinear vertices are merged on construction.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonWithHoles {
    boundary: Polygon,
    holes: Vec<Polygon>,
}

impl PolygonWithHoles {
    /// Validate and normalize the boundary and holes.
    ///
    /// A zero-area boundary is accepted so that decomposition can report
    /// it as [`CoverageError::Degenerate`]; everything else that breaks
    /// the container invariants is [`CoverageError::InvalidGeometry`].
    pub fn new(boundary: Polygon, holes: Vec<Polygon>) -> Result<Self> {
        let mut boundary = boundary;
        boundary.simplify();

        if boundary.area2().is_zero() {
            if holes.is_empty() {
                return Ok(Self {
                    boundary,
                    holes: Vec::new(),
                });
            }
            return Err(CoverageError::InvalidGeometry(
                "zero-area boundary with holes".into(),
            ));
        }

        if !boundary.is_simple() {
            return Err(CoverageError::InvalidGeometry(
                "outer boundary is not simple".into(),
            ));
        }
        if !boundary.is_counterclockwise() {
            boundary.reverse();
        }

        let mut normalized: Vec<Polygon> = Vec::with_capacity(holes.len());
        for mut hole in holes {
            hole.simplify();
            if hole.len() < 3 || hole.area2().is_zero() || !hole.is_simple() {
                return Err(CoverageError::InvalidGeometry("degenerate hole".into()));
            }
            if hole.is_counterclockwise() {
                hole.reverse();
            }
            if hole
                .vertices()
                .iter()
                .any(|v| boundary.contains_point(v) != PointLocation::Inside)
            {
                return Err(CoverageError::InvalidGeometry(
                    "hole not strictly inside the boundary".into(),
                ));
            }
            if rings_touch(&boundary, &hole) {
                return Err(CoverageError::InvalidGeometry(
                    "hole touches the boundary".into(),
                ));
            }
            for other in &normalized {
                if rings_touch(other, &hole)
                    || hole
                        .vertices()
                        .iter()
                        .any(|v| other.contains_point(v) != PointLocation::Outside)
                    || other
                        .vertices()
                        .iter()
                        .any(|v| hole.contains_point(v) != PointLocation::Outside)
                {
                    return Err(CoverageError::InvalidGeometry(
                        "holes are not pairwise disjoint".into(),
                    ));
                }
            }
            normalized.push(hole);
        }

        Ok(Self {
            boundary,
            holes: normalized,
        })
    }

    /// A work area without holes.
    pub fn from_boundary(boundary: Polygon) -> Result<Self> {
        Self::new(boundary, Vec::new())
    }

    #[inline]
    pub fn boundary(&self) -> &Polygon {
        &self.boundary
    }

    #[inline]
    pub fn holes(&self) -> &[Polygon] {
        &self.holes
    }

    /// All rings, boundary first.
    pub fn rings(&self) -> impl Iterator<Item = &Polygon> {
        std::iter::once(&self.boundary).chain(self.holes.iter())
    }

    /// Exact area of the region (boundary minus holes). Holes are stored
    /// clockwise, so their signed areas subtract.
    #[must_use]
    pub fn area2(&self) -> Scalar {
        self.rings().map(Polygon::area2).sum()
    }

    #[inline]
    pub fn bbox(&self) -> Option<Aabb> {
        self.boundary.bbox()
    }

    /// Locate `p` relative to the closed region minus hole interiors.
    #[must_use]
    pub fn location(&self, p: &Point) -> PointLocation {
        match self.boundary.contains_point(p) {
            PointLocation::Outside => return PointLocation::Outside,
            PointLocation::OnBoundary => return PointLocation::OnBoundary,
            PointLocation::Inside => {}
        }
        for hole in &self.holes {
            match hole.contains_point(p) {
                PointLocation::Inside => return PointLocation::Outside,
                PointLocation::OnBoundary => return PointLocation::OnBoundary,
                PointLocation::Outside => {}
            }
        }
        PointLocation::Inside
    }

    /// True iff `p` is in the closed region minus hole interiors.
    #[inline]
    #[must_use]
    pub fn point_in_polygon(&self, p: &Point) -> bool {
        self.location(p) != PointLocation::Outside
    }

    /// True iff `p` is strictly inside some hole.
    #[must_use]
    pub fn in_hole_interior(&self, p: &Point) -> bool {
        self.holes
            .iter()
            .any(|h| h.contains_point(p) == PointLocation::Inside)
    }

    /// Closest point on the outer boundary.
    #[inline]
    #[must_use]
    pub fn project_on_hull(&self, p: &Point) -> Point {
        self.boundary.project_point(p)
    }

    /// Distinct edge directions over boundary and holes, with negations.
    #[must_use]
    pub fn find_edge_directions(&self) -> Vec<Direction> {
        let mut directions: Vec<Direction> = Vec::new();
        for ring in self.rings() {
            for i in 0..ring.len() {
                if let Some(d) = ring.edge(i).direction() {
                    if !directions.iter().any(|known| known.is_collinear(&d)) {
                        directions.push(d);
                    }
                }
            }
        }
        let opposites: Vec<Direction> = directions.iter().map(Direction::opposite).collect();
        directions.extend(opposites);
        directions
    }

    /// [`Self::find_edge_directions`] turned by a quarter rotation; these
    /// seed the decomposition direction search.
    #[must_use]
    pub fn find_perp_edge_directions(&self) -> Vec<Direction> {
        self.find_edge_directions()
            .iter()
            .map(Direction::perpendicular)
            .collect()
    }

    /// Rotate the region so that `dir`-aligned edges become horizontal
    /// (the inverse of the rotation taking `(1, 0)` to `dir`).
    #[must_use]
    pub fn rotate(&self, dir: &Direction) -> Self {
        let rotation = Rotation::to_direction(dir).inverse();
        self.transformed(&rotation)
    }

    #[must_use]
    pub fn transformed(&self, rotation: &Rotation) -> Self {
        Self {
            boundary: self.boundary.rotated(rotation),
            holes: self.holes.iter().map(|h| h.rotated(rotation)).collect(),
        }
    }

    /// The visibility polygon of `p`; `OutsideRegion` unless `p` lies in
    /// the closed region.
    pub fn compute_visibility_polygon(&self, p: &Point) -> Result<Polygon> {
        crate::visibility::compute_visibility_polygon(self, p)
    }

    /// Inward offset of the outer boundary. Regions with holes cannot be
    /// offset this way.
    pub fn compute_offset_polygon(&self, offset: f64) -> Result<PolygonWithHoles> {
        if !self.holes.is_empty() {
            return Err(CoverageError::InvalidGeometry(
                "cannot offset a region with holes".into(),
            ));
        }
        let boundary = self.boundary.compute_offset_polygon(offset)?;
        PolygonWithHoles::from_boundary(boundary)
    }

    /// True iff the closed segment `a → b` stays inside the region.
    ///
    /// Exact: the segment may run along the boundary, but may not cross
    /// it nor leave through a vertex.
    #[must_use]
    pub fn segment_in_region(&self, a: &Point, b: &Point) -> bool {
        if !self.point_in_polygon(a) || !self.point_in_polygon(b) {
            return false;
        }
        if a == b {
            return true;
        }
        if !self.direction_enters_region(a, b) || !self.direction_enters_region(b, a) {
            return false;
        }

        let sight = Segment::new(a.clone(), b.clone());
        for ring in self.rings() {
            for i in 0..ring.len() {
                if ring.edge(i).properly_intersects(&sight) {
                    return false;
                }
            }
        }

        // A vertex in the open segment blocks sight when the boundary
        // crosses the sight line there. Collinear vertex runs are judged
        // by the ring neighbours on each side of the run.
        for ring in self.rings() {
            let n = ring.len();
            let on_sight: Vec<bool> = ring
                .vertices()
                .iter()
                .map(|v| sight.interior_contains(v))
                .collect();
            if on_sight.iter().all(|x| !x) {
                continue;
            }
            for start in 0..n {
                if !on_sight[start] || on_sight[(start + n - 1) % n] {
                    continue;
                }
                let mut end = start;
                while on_sight[(end + 1) % n] {
                    end = (end + 1) % n;
                }
                let before = ring.vertex(start + n - 1);
                let after = ring.vertex(end + 1);
                let s1 = orient2d(a, b, before);
                let s2 = orient2d(a, b, after);
                let crossing = matches!(
                    (s1, s2),
                    (Orientation::Clockwise, Orientation::CounterClockwise)
                        | (Orientation::CounterClockwise, Orientation::Clockwise)
                );
                if crossing {
                    return false;
                }
            }
        }
        true
    }

    /// Whether leaving `from` towards `towards` immediately stays in the
    /// closed region. Only boundary points constrain the answer.
    fn direction_enters_region(&self, from: &Point, towards: &Point) -> bool {
        for ring in self.rings() {
            let n = ring.len();
            for i in 0..n {
                if ring.vertex(i) == from {
                    let prev = ring.vertex(i + n - 1);
                    let next = ring.vertex(i + 1);
                    let o_in = orient2d(prev, from, towards);
                    let o_out = orient2d(from, next, towards);
                    return if orient2d(prev, from, next) == Orientation::CounterClockwise {
                        // Convex corner: inside both edge half-planes.
                        o_in != Orientation::Clockwise && o_out != Orientation::Clockwise
                    } else {
                        // Reflex corner: inside either half-plane.
                        o_in != Orientation::Clockwise || o_out != Orientation::Clockwise
                    };
                }
            }
            for i in 0..n {
                let e = ring.edge(i);
                if e.interior_contains(from) {
                    return orient2d(e.start(), e.end(), towards) != Orientation::Clockwise;
                }
            }
        }
        // Interior point; every direction is fine.
        true
    }
}

fn rings_touch(a: &Polygon, b: &Polygon) -> bool {
    for i in 0..a.len() {
        let ea = a.edge(i);
        for j in 0..b.len() {
            let eb = b.edge(j);
            if ea.properly_intersects(&eb)
                || ea.contains_point(eb.start())
                || ea.contains_point(eb.end())
                || eb.contains_point(ea.start())
                || eb.contains_point(ea.end())
            {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod test {
    use super::*;

    pub(crate) fn square() -> Polygon {
        Polygon::from_f64(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap()
    }

    fn square_with_hole() -> PolygonWithHoles {
        let hole =
            Polygon::from_f64(&[(0.4, 0.4), (0.6, 0.4), (0.6, 0.6), (0.4, 0.6)]).unwrap();
        PolygonWithHoles::new(square(), vec![hole]).unwrap()
    }

    #[test]
    fn test_construction_orients_rings() {
        let pwh = square_with_hole();
        assert!(pwh.boundary().is_counterclockwise());
        assert!(!pwh.holes()[0].is_counterclockwise());
    }

    #[test]
    fn test_construction_merges_collinear() {
        let boundary = Polygon::from_f64(&[
            (0.0, 0.0),
            (0.5, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
        ])
        .unwrap();
        let pwh = PolygonWithHoles::from_boundary(boundary).unwrap();
        assert_eq!(pwh.boundary().len(), 4);
    }

    #[test]
    fn test_construction_rejects_bowtie() {
        let bowtie =
            Polygon::from_f64(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]).unwrap();
        assert!(matches!(
            PolygonWithHoles::from_boundary(bowtie),
            Err(CoverageError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_construction_accepts_degenerate_boundary() {
        let flat = Polygon::from_f64(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]).unwrap();
        let pwh = PolygonWithHoles::from_boundary(flat).unwrap();
        assert!(pwh.area2().is_zero());
    }

    #[test]
    fn test_construction_rejects_hole_outside() {
        let hole =
            Polygon::from_f64(&[(2.0, 2.0), (3.0, 2.0), (3.0, 3.0), (2.0, 3.0)]).unwrap();
        assert!(PolygonWithHoles::new(square(), vec![hole]).is_err());
    }

    #[test]
    fn test_area_subtracts_holes() {
        // Exact decimal coordinates: the hole spans [2/5, 3/5] squared.
        let fifth = |n: i64| Scalar::new(n.into(), 5.into());
        let hole = Polygon::new(vec![
            Point::new(fifth(2), fifth(2)),
            Point::new(fifth(3), fifth(2)),
            Point::new(fifth(3), fifth(3)),
            Point::new(fifth(2), fifth(3)),
        ]);
        let pwh = PolygonWithHoles::new(square(), vec![hole]).unwrap();
        let area = pwh.area2() / Scalar::from_integer(2.into());
        assert_eq!(area, Scalar::new(24.into(), 25.into()));
    }

    #[test]
    fn test_point_location() {
        let pwh = square_with_hole();
        let inside = Point::from_f64(0.2, 0.2).unwrap();
        let in_hole = Point::from_f64(0.5, 0.5).unwrap();
        let on_hole_rim = Point::from_f64(0.4, 0.5).unwrap();
        let outside = Point::from_f64(2.0, 0.5).unwrap();
        assert_eq!(pwh.location(&inside), PointLocation::Inside);
        assert_eq!(pwh.location(&in_hole), PointLocation::Outside);
        assert!(pwh.in_hole_interior(&in_hole));
        assert_eq!(pwh.location(&on_hole_rim), PointLocation::OnBoundary);
        assert_eq!(pwh.location(&outside), PointLocation::Outside);
    }

    #[test]
    fn test_project_on_hull() {
        let pwh = square_with_hole();
        let p = Point::from_f64(1.5, 0.5).unwrap();
        assert_eq!(pwh.project_on_hull(&p), Point::from_f64(1.0, 0.5).unwrap());
    }

    #[test]
    fn test_edge_directions_deduplicate() {
        let pwh = square_with_hole();
        // Boundary and hole edges are all axis-aligned: two lines, four
        // directions with negations.
        assert_eq!(pwh.find_edge_directions().len(), 4);
    }

    #[test]
    fn test_segment_in_region() {
        let pwh = square_with_hole();
        let a = Point::from_f64(0.1, 0.1).unwrap();
        let b = Point::from_f64(0.9, 0.1).unwrap();
        let c = Point::from_f64(0.9, 0.9).unwrap();
        assert!(pwh.segment_in_region(&a, &b));
        // Straight across the hole.
        assert!(!pwh.segment_in_region(&a, &c));
        // Along the boundary.
        let c0 = Point::from_f64(0.0, 0.0).unwrap();
        let c1 = Point::from_f64(1.0, 0.0).unwrap();
        assert!(pwh.segment_in_region(&c0, &c1));
        // Grazing the hole corner is allowed; sight passes tangent.
        let d = Point::from_f64(0.2, 0.6).unwrap();
        let e = Point::from_f64(0.4, 0.8).unwrap();
        assert!(pwh.segment_in_region(&d, &e));
    }

    #[test]
    fn test_offset_edge_shrinks_square() {
        let p = square();
        let shrunk = p.offset_edge(0, 0.25).unwrap();
        let bb = shrunk.bbox().unwrap();
        assert!((bb.min.y - (0.25 + MASK_SLACK)).abs() < 1e-9);
        assert!((bb.max.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_compute_offset_polygon() {
        let p = Polygon::from_f64(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]).unwrap();
        let shrunk = p.compute_offset_polygon(1.0).unwrap();
        let bb = shrunk.bbox().unwrap();
        assert!((bb.width() - 8.0).abs() < 1e-4);
        assert!((bb.height() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_offset_edge_collapse_splits_u_shape() {
        // Removing a deep band along the U's bottom edge would cut the
        // polygon into its two arms.
        let u = Polygon::from_f64(&[
            (0.0, 0.0),
            (5.0, 0.0),
            (5.0, 3.0),
            (4.0, 3.0),
            (4.0, 1.0),
            (1.0, 1.0),
            (1.0, 3.0),
            (0.0, 3.0),
        ])
        .unwrap();
        assert_eq!(u.offset_edge(0, 2.0), Err(CoverageError::OffsetCollapsed));
    }
}
