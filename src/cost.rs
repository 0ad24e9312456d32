//! First-class cost callables over waypoint sequences.

use crate::point::Point;
use std::sync::Arc;

/// Cost of a full waypoint sequence.
pub type PathCostFunction = Arc<dyn Fn(&[Point]) -> f64>;

/// Cost of travelling one segment.
pub type SegmentCostFunction = Arc<dyn Fn(&Point, &Point) -> f64>;

/// Sum of euclidean segment lengths along `path`.
#[must_use]
pub fn euclidean_path_cost(path: &[Point]) -> f64 {
    path.windows(2)
        .map(|w| euclidean_segment_cost(&w[0], &w[1]))
        .sum()
}

/// Euclidean distance between two waypoints.
#[must_use]
pub fn euclidean_segment_cost(from: &Point, to: &Point) -> f64 {
    from.to_dvec2().distance(to.to_dvec2())
}

/// The default path cost callable.
#[must_use]
pub fn euclidean_path_cost_fn() -> PathCostFunction {
    Arc::new(euclidean_path_cost)
}

/// The default segment cost callable.
#[must_use]
pub fn euclidean_segment_cost_fn() -> SegmentCostFunction {
    Arc::new(euclidean_segment_cost)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_euclidean_path_cost() {
        let path = [
            Point::from((0, 0)),
            Point::from((3, 0)),
            Point::from((3, 4)),
        ];
        assert_eq!(euclidean_path_cost(&path), 7.0);
        assert_eq!(euclidean_path_cost(&path[..1]), 0.0);
        assert_eq!(euclidean_path_cost(&[]), 0.0);
    }

    #[test]
    fn test_custom_callable() {
        let hop_count: PathCostFunction = Arc::new(|path| path.len().saturating_sub(1) as f64);
        let path = [Point::from((0, 0)), Point::from((9, 9))];
        assert_eq!(hop_count(&path), 1.0);
    }
}
