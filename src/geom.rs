//! Planar geometry helpers.
//!
//! Angles are radians, counter-clockwise from the +x axis.

use std::f64::consts::{PI, TAU};

pub use glam::DVec2;

/// Velocity below which an actor counts as stopped.
pub const MIN_VEL_ERR: f64 = 5.0;

/// Heading tolerance used by alignment checks (half a degree).
pub const MAX_DIR_ERR: f64 = 0.5 * PI / 180.0;

/// Gain applied to angular error when steering towards a heading.
pub const TURN_GAIN: f64 = 10.0;

/// Signed shortest rotation from `reference` to `angle`, in `(-PI, PI]`.
#[must_use]
pub fn angle_diff(reference: f64, angle: f64) -> f64 {
    let d = (angle - reference).rem_euclid(TAU);
    if d > PI { d - TAU } else { d }
}

/// Normalises an angle into `[0, TAU)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Direction of a vector. The zero vector points along +x.
#[must_use]
pub fn heading_of(v: DVec2) -> f64 {
    v.y.atan2(v.x)
}

/// Vector with the given magnitude and heading.
#[must_use]
pub fn from_polar(magnitude: f64, angle: f64) -> DVec2 {
    DVec2::new(magnitude * angle.cos(), magnitude * angle.sin())
}

/// Turn command that steers `dir` towards `target`, clamped to `[-1, 1]`,
/// together with the signed error it was derived from.
#[must_use]
pub fn steer(dir: f64, target: f64) -> (f64, f64) {
    let diff = angle_diff(dir, target);
    ((TURN_GAIN * diff).clamp(-1.0, 1.0), diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_angle_diff_wraps() {
        assert_relative_eq!(angle_diff(0.1, TAU - 0.1), -0.2, epsilon = 1e-12);
        assert_relative_eq!(angle_diff(TAU - 0.1, 0.1), 0.2, epsilon = 1e-12);
        assert_relative_eq!(angle_diff(0.0, PI), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_heading_and_polar_agree() {
        let v = from_polar(3.0, 1.0);
        assert_relative_eq!(v.length(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(heading_of(v), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_steer_saturates() {
        let (turn, diff) = steer(0.0, PI / 2.0);
        assert_relative_eq!(turn, 1.0);
        assert_relative_eq!(diff, PI / 2.0);
        let (turn, _) = steer(0.0, -0.01);
        assert_relative_eq!(turn, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(-PI / 2.0), 1.5 * PI, epsilon = 1e-12);
    }
}
