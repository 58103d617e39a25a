// Pixel-space geometry used to measure body inclination

use crate::models::pose::{Point2D, PostureError, PostureResult};

/// Euclidean distance between two points
pub fn distance(p1: Point2D, p2: Point2D) -> f64 {
    ((p2.x - p1.x).powi(2) + (p2.y - p1.y).powi(2)).sqrt()
}

/// Angle in degrees of triangle `p1, p2, p3` by the law of cosines
///
/// With `a = |p2 p3|`, `b = |p1 p3|`, `c = |p1 p2|` this evaluates
/// `acos((b² + c² - a²) / 2bc)`, the angle between `p1→p2` and `p1→p3`.
/// Fails with `DegenerateGeometry` when `b * c == 0`.
pub fn angle_at_vertex(p1: Point2D, p2: Point2D, p3: Point2D) -> PostureResult<f64> {
    let a = distance(p2, p3);
    let b = distance(p1, p3);
    let c = distance(p1, p2);

    let denominator = 2.0 * b * c;
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(PostureError::DegenerateGeometry);
    }

    // Rounding can push the cosine just outside [-1, 1]
    let cosine = ((b * b + c * c - a * a) / denominator).clamp(-1.0, 1.0);
    if cosine.is_nan() {
        return Err(PostureError::DegenerateGeometry);
    }

    Ok(cosine.acos().to_degrees())
}
