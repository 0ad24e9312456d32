use crate::direction::Direction;
use crate::point::{orient2d, Orientation, Point, Scalar};
use num_traits::{Signed, Zero};

/// A closed segment between two exact points.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    start: Point,
    end: Point,
}

impl Segment {
    #[inline]
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn start(&self) -> &Point {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &Point {
        &self.end
    }

    #[inline]
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end.clone(),
            end: self.start.clone(),
        }
    }

    /// `None` for a degenerate segment.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        Direction::from_points(&self.start, &self.end)
    }

    #[inline]
    #[must_use]
    pub fn squared_length(&self) -> Scalar {
        self.start.squared_distance(&self.end)
    }

    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// True if `p` lies on the closed segment.
    #[must_use]
    pub fn contains_point(&self, p: &Point) -> bool {
        if orient2d(&self.start, &self.end, p) != Orientation::Collinear {
            return false;
        }
        let d = &self.end - &self.start;
        let t = (p - &self.start).dot(&d);
        !t.is_negative() && t <= d.dot(&d)
    }

    /// True if `p` lies strictly between the endpoints.
    #[must_use]
    pub fn interior_contains(&self, p: &Point) -> bool {
        self.contains_point(p) && *p != self.start && *p != self.end
    }

    /// True if the open interiors of the two segments cross in a single
    /// point.
    #[must_use]
    pub fn properly_intersects(&self, other: &Segment) -> bool {
        let o1 = orient2d(&self.start, &self.end, &other.start);
        let o2 = orient2d(&self.start, &self.end, &other.end);
        let o3 = orient2d(&other.start, &other.end, &self.start);
        let o4 = orient2d(&other.start, &other.end, &self.end);
        o1 != o2
            && o3 != o4
            && o1 != Orientation::Collinear
            && o2 != Orientation::Collinear
            && o3 != Orientation::Collinear
            && o4 != Orientation::Collinear
    }

    /// The point on the segment at the given x coordinate, or `None` if
    /// the segment is vertical or does not span `x`.
    #[must_use]
    pub fn point_at_x(&self, x: &Scalar) -> Option<Point> {
        let (x1, x2) = (self.start.x(), self.end.x());
        if x1 == x2 {
            return None;
        }
        let (lo, hi) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
        if x < lo || x > hi {
            return None;
        }
        let t = (x - x1) / (x2 - x1);
        let y = self.start.y() + &t * (self.end.y() - self.start.y());
        Some(Point::new(x.clone(), y))
    }

    /// The closest point on the closed segment to `p` (exact).
    #[must_use]
    pub fn project_point(&self, p: &Point) -> Point {
        let d = &self.end - &self.start;
        let len2 = d.dot(&d);
        if len2.is_zero() {
            return self.start.clone();
        }
        let t = (p - &self.start).dot(&d) / &len2;
        if t.is_negative() {
            self.start.clone()
        } else if t > Scalar::from_integer(1.into()) {
            self.end.clone()
        } else {
            &self.start + &(&d * &t)
        }
    }

    #[inline]
    #[must_use]
    pub fn squared_distance_to_point(&self, p: &Point) -> Scalar {
        self.project_point(p).squared_distance(p)
    }
}

/// An oriented infinite line through two points; the counter-clockwise
/// side of `a → b` is its left.
#[derive(Clone, Debug)]
pub struct Line {
    a: Point,
    b: Point,
}

impl Line {
    /// `a` and `b` must differ.
    #[inline]
    pub fn new(a: Point, b: Point) -> Self {
        debug_assert!(a != b);
        Self { a, b }
    }

    #[inline]
    pub fn a(&self) -> &Point {
        &self.a
    }

    #[inline]
    pub fn b(&self) -> &Point {
        &self.b
    }

    /// Which side of the line `p` falls on; `CounterClockwise` is left.
    #[inline]
    #[must_use]
    pub fn side(&self, p: &Point) -> Orientation {
        orient2d(&self.a, &self.b, p)
    }

    /// Position of `p` along the line direction, for ordering points that
    /// lie on the line.
    #[inline]
    #[must_use]
    pub fn parameter(&self, p: &Point) -> Scalar {
        (p - &self.a).dot(&(&self.b - &self.a))
    }

    /// Intersection of this line with the supporting line of `p → q`.
    /// `None` when parallel.
    #[must_use]
    pub fn intersect_supporting(&self, p: &Point, q: &Point) -> Option<Point> {
        let d_seg = q - p;
        let d_line = &self.b - &self.a;
        let denom = d_seg.cross(&d_line);
        if denom.is_zero() {
            return None;
        }
        let t = (&self.a - p).cross(&d_line) / denom;
        Some(p + &(&d_seg * &t))
    }
}
