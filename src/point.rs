use bevy_math::DVec2;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use std::ops::{Add, Mul, Neg, Sub};

/// The exact coordinate type all predicates operate on.
pub type Scalar = BigRational;

/// An exact rational point in the plane.
///
/// All geometric predicates (orientation, intersection, sweep-event
/// ordering) are evaluated on `Point` without rounding. Conversion to
/// [`DVec2`] is only performed for bounding boxes, tolerance tests and
/// final waypoint output.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    x: Scalar,
    y: Scalar,
}

impl Point {
    #[inline]
    pub fn new(x: Scalar, y: Scalar) -> Self {
        Self { x, y }
    }

    /// Build a point from finite `f64` coordinates. The conversion is
    /// exact; `None` if either coordinate is NaN or infinite.
    pub fn from_f64(x: f64, y: f64) -> Option<Self> {
        Some(Self {
            x: BigRational::from_float(x)?,
            y: BigRational::from_float(y)?,
        })
    }

    #[inline]
    pub fn zero() -> Self {
        Self {
            x: Scalar::zero(),
            y: Scalar::zero(),
        }
    }

    #[inline]
    pub fn x(&self) -> &Scalar {
        &self.x
    }

    #[inline]
    pub fn y(&self) -> &Scalar {
        &self.y
    }

    /// Round to `f64` coordinates.
    #[inline]
    #[must_use]
    pub fn to_dvec2(&self) -> DVec2 {
        DVec2::new(
            self.x.to_f64().unwrap_or(f64::NAN),
            self.y.to_f64().unwrap_or(f64::NAN),
        )
    }

    /// 2D cross product, treating both points as vectors from the origin.
    #[inline]
    #[must_use]
    pub fn cross(&self, other: &Point) -> Scalar {
        &self.x * &other.y - &self.y * &other.x
    }

    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Point) -> Scalar {
        &self.x * &other.x + &self.y * &other.y
    }

    #[inline]
    #[must_use]
    pub fn squared_distance(&self, other: &Point) -> Scalar {
        let dx = &other.x - &self.x;
        let dy = &other.y - &self.y;
        &dx * &dx + &dy * &dy
    }

    /// Exact lexicographic comparison, x first then y. This is the sweep
    /// event order; it doubles as the symbolic tilt that orders vertices
    /// of sweep-parallel edges.
    #[inline]
    #[must_use]
    pub fn lex_cmp(&self, other: &Point) -> std::cmp::Ordering {
        self.x.cmp(&other.x).then_with(|| self.y.cmp(&other.y))
    }

    /// Exact midpoint.
    #[must_use]
    pub fn midpoint(&self, other: &Point) -> Point {
        let two = BigRational::from_integer(BigInt::from(2));
        Point::new((&self.x + &other.x) / &two, (&self.y + &other.y) / &two)
    }
}

impl From<(i64, i64)> for Point {
    #[inline]
    fn from((x, y): (i64, i64)) -> Self {
        Self {
            x: BigRational::from_integer(BigInt::from(x)),
            y: BigRational::from_integer(BigInt::from(y)),
        }
    }
}

impl Add<&Point> for &Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: &Point) -> Point {
        Point::new(&self.x + &rhs.x, &self.y + &rhs.y)
    }
}

impl Sub<&Point> for &Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: &Point) -> Point {
        Point::new(&self.x - &rhs.x, &self.y - &rhs.y)
    }
}

impl Neg for &Point {
    type Output = Point;

    #[inline]
    fn neg(self) -> Point {
        Point::new(-&self.x, -&self.y)
    }
}

impl Mul<&Scalar> for &Point {
    type Output = Point;

    #[inline]
    fn mul(self, rhs: &Scalar) -> Point {
        Point::new(&self.x * rhs, &self.y * rhs)
    }
}

/// Result of the exact orientation predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    Collinear,
    CounterClockwise,
}

/// Exact orientation of the ordered triple `(a, b, c)`.
#[must_use]
pub fn orient2d(a: &Point, b: &Point, c: &Point) -> Orientation {
    let det = (b - a).cross(&(c - a));
    if det.is_zero() {
        Orientation::Collinear
    } else if det.is_positive() {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

/// Whether `a`, `b` and `c` lie on one line.
#[inline]
#[must_use]
pub fn collinear(a: &Point, b: &Point, c: &Point) -> bool {
    orient2d(a, b, c) == Orientation::Collinear
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_f64_is_exact() {
        let p = Point::from_f64(0.5, -0.25).unwrap();
        assert_eq!(p.to_dvec2(), DVec2::new(0.5, -0.25));
        assert!(Point::from_f64(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_orientation() {
        let a = Point::from((0, 0));
        let b = Point::from((1, 0));
        let c = Point::from((1, 1));
        assert_eq!(orient2d(&a, &b, &c), Orientation::CounterClockwise);
        assert_eq!(orient2d(&c, &b, &a), Orientation::Clockwise);
        assert_eq!(
            orient2d(&a, &b, &Point::from((2, 0))),
            Orientation::Collinear
        );
    }

    #[test]
    fn test_lex_cmp_orders_by_x_then_y() {
        let a = Point::from((0, 5));
        let b = Point::from((1, 0));
        let c = Point::from((1, 2));
        assert!(a.lex_cmp(&b).is_lt());
        assert!(b.lex_cmp(&c).is_lt());
        assert!(c.lex_cmp(&c).is_eq());
    }

    #[test]
    fn test_midpoint() {
        let a = Point::from((0, 0));
        let b = Point::from((3, 1));
        let m = a.midpoint(&b);
        assert_eq!(m, Point::from_f64(1.5, 0.5).unwrap());
    }
}
