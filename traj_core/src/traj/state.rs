//! Trajectory state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::kin::WheelState;
use crate::loc::Pose;
use util::maths::ang_lerp_rad;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single state along a trajectory.
///
/// States are produced by trajectory generation and sampled by the control
/// loop. Within a trajectory states are ordered by non-decreasing time, the
/// first state sits at time zero, and every state carries the same number of
/// wheel states (fixed by the drivetrain topology).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryState {
    /// Time since the start of the trajectory.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// The target pose of the robot.
    pub pose: Pose,

    /// Linear velocity along the path tangent.
    ///
    /// Units: meters/second
    pub velocity_ms: f64,

    /// Linear acceleration along the path tangent.
    ///
    /// Units: meters/second^2
    pub accel_mss: f64,

    /// Angular velocity of the body heading.
    ///
    /// Units: radians/second
    pub ang_vel_rads: f64,

    /// Curvature of the path at this state.
    ///
    /// Units: 1/meters
    pub curv_m: f64,

    /// Target state of each wheel.
    pub wheel_states: Vec<WheelState>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryState {
    /// Linearly interpolate between this state and `end`.
    ///
    /// Scalar quantities are blended linearly; the pose heading and wheel
    /// angles are blended along the shortest arc. `t = 0` gives `self`,
    /// `t = 1` gives `end`. Both states must carry the same number of wheel
    /// states, which holds for any two states of one trajectory.
    pub fn interpolate(&self, end: &TrajectoryState, t: f64) -> TrajectoryState {
        let wheel_states = self
            .wheel_states
            .iter()
            .zip(end.wheel_states.iter())
            .map(|(a, b)| WheelState {
                speed_ms: a.speed_ms + (b.speed_ms - a.speed_ms) * t,
                angle_rad: ang_lerp_rad(a.angle_rad, b.angle_rad, t),
            })
            .collect();

        TrajectoryState {
            time_s: self.time_s + (end.time_s - self.time_s) * t,
            pose: self.pose.lerp(&end.pose, t),
            velocity_ms: self.velocity_ms + (end.velocity_ms - self.velocity_ms) * t,
            accel_mss: self.accel_mss + (end.accel_mss - self.accel_mss) * t,
            ang_vel_rads: self.ang_vel_rads + (end.ang_vel_rads - self.ang_vel_rads) * t,
            curv_m: self.curv_m + (end.curv_m - self.curv_m) * t,
            wheel_states,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector2;

    fn state(time_s: f64, x_m: f64, vel_ms: f64) -> TrajectoryState {
        TrajectoryState {
            time_s,
            pose: Pose::new(Vector2::new(x_m, 0.0), 0.0),
            velocity_ms: vel_ms,
            accel_mss: 0.0,
            ang_vel_rads: 0.0,
            curv_m: 0.0,
            wheel_states: vec![
                WheelState {
                    speed_ms: vel_ms,
                    angle_rad: 0.0,
                };
                2
            ],
        }
    }

    #[test]
    fn test_interpolate_midpoint() {
        let a = state(0.0, 0.0, 1.0);
        let b = state(2.0, 4.0, 3.0);

        let mid = a.interpolate(&b, 0.5);

        assert!((mid.time_s - 1.0).abs() < 1e-12);
        assert!((mid.pose.position_m[0] - 2.0).abs() < 1e-12);
        assert!((mid.velocity_ms - 2.0).abs() < 1e-12);
        assert!((mid.wheel_states[0].speed_ms - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_interpolate_is_convex() {
        let a = state(0.0, 0.0, 1.0);
        let b = state(2.0, 4.0, 3.0);

        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let s = a.interpolate(&b, t);
            assert!(s.velocity_ms >= 1.0 - 1e-12 && s.velocity_ms <= 3.0 + 1e-12);
            assert!(s.time_s >= -1e-12 && s.time_s <= 2.0 + 1e-12);
        }
    }
}
