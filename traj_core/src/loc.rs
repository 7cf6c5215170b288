//! # Localisation types
//!
//! This module defines the pose type used throughout the library. A pose is
//! a position and heading in the field frame, with the heading measured as
//! the angle to the positive field X axis.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use util::maths::{ang_lerp_rad, norm_angle_rad};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and heading in the field frame) of the robot.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// The position in the field frame.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// The heading of the robot body, measured as the angle to the positive
    /// field X axis, in the range [-pi, pi).
    ///
    /// Units: radians
    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// Create a new pose, normalising the heading into [-pi, pi).
    pub fn new(position_m: Vector2<f64>, heading_rad: f64) -> Self {
        Self {
            position_m,
            heading_rad: norm_angle_rad(heading_rad),
        }
    }

    /// Interpolate between this pose and `end`.
    ///
    /// The position is blended linearly and the heading along the shortest
    /// arc. `t = 0` gives `self`, `t = 1` gives `end`.
    pub fn lerp(&self, end: &Pose, t: f64) -> Self {
        Self {
            position_m: self.position_m + (end.position_m - self.position_m) * t,
            heading_rad: ang_lerp_rad(self.heading_rad, end.heading_rad, t),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lerp() {
        let a = Pose::new(Vector2::new(0.0, 0.0), 0.0);
        let b = Pose::new(Vector2::new(2.0, 4.0), 1.0);

        let mid = a.lerp(&b, 0.5);

        assert!((mid.position_m[0] - 1.0).abs() < 1e-12);
        assert!((mid.position_m[1] - 2.0).abs() < 1e-12);
        assert!((mid.heading_rad - 0.5).abs() < 1e-12);

        // Endpoints
        assert!((a.lerp(&b, 0.0).heading_rad - a.heading_rad).abs() < 1e-12);
        assert!((a.lerp(&b, 1.0).heading_rad - b.heading_rad).abs() < 1e-12);
        assert_eq!(a.lerp(&b, 1.0).position_m, b.position_m);
    }

    #[test]
    fn test_lerp_wraps_heading() {
        let a = Pose::new(Vector2::zeros(), 3.0);
        let b = Pose::new(Vector2::zeros(), -3.0);

        // The short way round from 3.0 to -3.0 passes through pi, not zero
        let mid = a.lerp(&b, 0.5);
        assert!(mid.heading_rad.abs() > 3.0);
    }
}
