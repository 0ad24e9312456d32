use crate::point::{Point, Scalar};
use num_bigint::BigInt;
use num_rational::{BigRational, Ratio};
use num_traits::{One, Signed, ToPrimitive, Zero};

/// A direction in the plane: a nonzero vector up to positive scaling.
///
/// `d` and `-d` are distinct directions.
#[derive(Clone, Debug)]
pub struct Direction {
    dx: Scalar,
    dy: Scalar,
}

impl Direction {
    /// `None` if the vector is zero.
    pub fn new(dx: Scalar, dy: Scalar) -> Option<Self> {
        if dx.is_zero() && dy.is_zero() {
            None
        } else {
            Some(Self { dx, dy })
        }
    }

    /// Direction of the vector `from → to`. `None` if the points coincide.
    pub fn from_points(from: &Point, to: &Point) -> Option<Self> {
        let v = to - from;
        Self::new(v.x().clone(), v.y().clone())
    }

    #[inline]
    pub fn dx(&self) -> &Scalar {
        &self.dx
    }

    #[inline]
    pub fn dy(&self) -> &Scalar {
        &self.dy
    }

    #[inline]
    #[must_use]
    pub fn opposite(&self) -> Self {
        Self {
            dx: -&self.dx,
            dy: -&self.dy,
        }
    }

    /// The direction rotated by a quarter turn counter-clockwise.
    #[inline]
    #[must_use]
    pub fn perpendicular(&self) -> Self {
        Self {
            dx: -&self.dy,
            dy: self.dx.clone(),
        }
    }

    /// True when the two directions span the same line, regardless of
    /// sense.
    #[inline]
    #[must_use]
    pub fn is_collinear(&self, other: &Direction) -> bool {
        (&self.dx * &other.dy - &self.dy * &other.dx).is_zero()
    }

    /// True when the two directions point the same way.
    #[must_use]
    pub fn same_direction(&self, other: &Direction) -> bool {
        self.is_collinear(other) && (&self.dx * &other.dx + &self.dy * &other.dy).is_positive()
    }
}

impl From<(i64, i64)> for Direction {
    fn from((dx, dy): (i64, i64)) -> Self {
        assert!(dx != 0 || dy != 0, "zero direction");
        Self {
            dx: BigRational::from_integer(BigInt::from(dx)),
            dy: BigRational::from_integer(BigInt::from(dy)),
        }
    }
}

/// An exact rational rotation, `cos² + sin² = 1`.
///
/// Built from a direction via a Pythagorean half-angle approximation: the
/// rotation sends `(1, 0)` close to the direction (within the `f64`
/// approximation of `tan(θ/2)`) while staying perfectly orthogonal, so
/// the inverse is the transpose and rotating forth and back is the exact
/// identity. Axis-aligned directions map exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct Rotation {
    cos: Scalar,
    sin: Scalar,
}

impl Rotation {
    #[must_use]
    pub fn identity() -> Self {
        Self {
            cos: Scalar::one(),
            sin: Scalar::zero(),
        }
    }

    /// The rotation taking `(1, 0)` (approximately) onto `dir`.
    #[must_use]
    pub fn to_direction(dir: &Direction) -> Self {
        if dir.dy.is_zero() {
            return if dir.dx.is_positive() {
                Self::identity()
            } else {
                Self {
                    cos: -Scalar::one(),
                    sin: Scalar::zero(),
                }
            };
        }
        if dir.dx.is_zero() {
            let one = Scalar::one();
            return if dir.dy.is_positive() {
                Self {
                    cos: Scalar::zero(),
                    sin: one,
                }
            } else {
                Self {
                    cos: Scalar::zero(),
                    sin: -one,
                }
            };
        }

        let angle = dir
            .dy
            .to_f64()
            .unwrap_or(0.0)
            .atan2(dir.dx.to_f64().unwrap_or(1.0));
        Self::from_half_angle_tangent((angle / 2.0).tan())
    }

    /// Rational rotation from `t = tan(θ/2)`:
    /// `sin θ = 2pq / (p² + q²)`, `cos θ = (q² − p²) / (p² + q²)`.
    fn from_half_angle_tangent(t: f64) -> Self {
        let ratio = Ratio::<i64>::approximate_float(t).unwrap_or_else(|| Ratio::new(0, 1));
        let p = BigInt::from(*ratio.numer());
        let q = BigInt::from(*ratio.denom());
        let p2 = &p * &p;
        let q2 = &q * &q;
        let denom = &p2 + &q2;
        Self {
            cos: BigRational::new(&q2 - &p2, denom.clone()),
            sin: BigRational::new(BigInt::from(2) * p * q, denom),
        }
    }

    #[inline]
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            cos: self.cos.clone(),
            sin: -&self.sin,
        }
    }

    #[must_use]
    pub fn apply(&self, p: &Point) -> Point {
        Point::new(
            &self.cos * p.x() - &self.sin * p.y(),
            &self.sin * p.x() + &self.cos * p.y(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use num_traits::One;

    #[test]
    fn test_axis_aligned_rotations_are_exact() {
        let up = Rotation::to_direction(&Direction::from((0, 1)));
        let p = up.apply(&Point::from((1, 0)));
        assert_eq!(p, Point::from((0, 1)));

        let left = Rotation::to_direction(&Direction::from((-1, 0)));
        assert_eq!(left.apply(&Point::from((2, 0))), Point::from((-2, 0)));
    }

    #[test]
    fn test_rotation_is_orthogonal() {
        let r = Rotation::to_direction(&Direction::from((3, 4)));
        let unit = &r.cos * &r.cos + &r.sin * &r.sin;
        assert!(unit.is_one());
    }

    #[test]
    fn test_round_trip_is_identity() {
        let r = Rotation::to_direction(&Direction::from((2, 7)));
        let p = Point::from((5, -3));
        assert_eq!(r.inverse().apply(&r.apply(&p)), p);
    }

    #[test]
    fn test_rotation_lands_near_direction() {
        let r = Rotation::to_direction(&Direction::from((1, 1)));
        let p = r.apply(&Point::from((1, 0))).to_dvec2();
        let inv_sqrt2 = 1.0 / 2.0_f64.sqrt();
        assert!((p.x - inv_sqrt2).abs() < 1e-6);
        assert!((p.y - inv_sqrt2).abs() < 1e-6);
    }

    #[test]
    fn test_same_direction_distinguishes_sense() {
        let d = Direction::from((1, 2));
        assert!(d.same_direction(&Direction::from((2, 4))));
        assert!(!d.same_direction(&d.opposite()));
        assert!(d.is_collinear(&d.opposite()));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rotation_round_trips_exactly(
                dx in -50i64..50,
                dy in -50i64..50,
                px in -100i64..100,
                py in -100i64..100,
            ) {
                prop_assume!(dx != 0 || dy != 0);
                let rotation = Rotation::to_direction(&Direction::from((dx, dy)));
                let point = Point::from((px, py));
                prop_assert_eq!(
                    rotation.inverse().apply(&rotation.apply(&point)),
                    point
                );
            }

            #[test]
            fn rotation_stays_orthogonal(dx in -50i64..50, dy in -50i64..50) {
                prop_assume!(dx != 0 || dy != 0);
                let rotation = Rotation::to_direction(&Direction::from((dx, dy)));
                let unit = &rotation.cos * &rotation.cos + &rotation.sin * &rotation.sin;
                prop_assert!(unit.is_one());
            }
        }
    }
}
