//! Scalar metrics derived from landmark positions.

use crate::Point;

/// Interior angle at `vertex` formed by the rays towards `a` and `c`, in
/// degrees within `[0, 180]`.
pub fn joint_angle(a: Point, vertex: Point, c: Point) -> f32 {
    let radians = (c.y - vertex.y).atan2(c.x - vertex.x) - (a.y - vertex.y).atan2(a.x - vertex.x);
    let angle = radians.to_degrees().abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Euclidean distance in the image plane.
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Absolute vertical separation between two points.
pub fn vertical_gap(a: Point, b: Point) -> f32 {
    (a.y - b.y).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn straight_limb_is_180_degrees() {
        let angle = joint_angle(Point::new(0.0, 0.0), Point::new(0.5, 0.0), Point::new(1.0, 0.0));
        assert!((angle - 180.0).abs() < EPS);
    }

    #[test]
    fn right_angle() {
        let angle = joint_angle(Point::new(0.0, 0.0), Point::new(0.5, 0.0), Point::new(0.5, 0.5));
        assert!((angle - 90.0).abs() < EPS);
    }

    #[test]
    fn reflex_difference_folds_back_into_range() {
        // atan2 difference here is 270 degrees before folding.
        let angle = joint_angle(Point::new(0.0, -1.0), Point::new(0.0, 0.0), Point::new(-1.0, 0.0));
        assert!((angle - 90.0).abs() < EPS);
        assert!((0.0..=180.0).contains(&angle));
    }

    #[test]
    fn symmetric_in_outer_points() {
        let a = Point::new(0.21, 0.33);
        let b = Point::new(0.40, 0.52);
        let c = Point::new(0.77, 0.18);
        assert!((joint_angle(a, b, c) - joint_angle(c, b, a)).abs() < EPS);
    }

    #[test]
    fn invariant_under_translation() {
        let a = Point::new(0.21, 0.33);
        let b = Point::new(0.40, 0.52);
        let c = Point::new(0.77, 0.18);
        let shift = |p: Point| Point::new(p.x + 0.13, p.y - 0.27);
        let moved = joint_angle(shift(a), shift(b), shift(c));
        assert!((joint_angle(a, b, c) - moved).abs() < EPS);
    }

    #[test]
    fn distances() {
        assert!((distance(Point::new(0.0, 0.0), Point::new(0.3, 0.4)) - 0.5).abs() < EPS);
        assert!((vertical_gap(Point::new(0.9, 0.2), Point::new(0.1, 0.35)) - 0.15).abs() < EPS);
    }
}
