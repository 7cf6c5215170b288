//! Differential (two wheel) drivetrain kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{ChassisSpeeds, WheelState};
use crate::robot_config::ConfigError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of wheels on a differential drivetrain.
pub const NUM_DIFF_WHEELS: usize = 2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematics of a differential drivetrain: two driven wheel sets either
/// side of the body, no independent steering.
///
/// Wheel order is `[left, right]`. A differential drivetrain cannot
/// translate laterally, so the `vy` component of chassis speeds is ignored
/// and wheel angles are always zero (wheels roll along the body X axis).
#[derive(Debug, Clone)]
pub struct DiffKin {
    /// Distance between the left and right wheel contact points.
    ///
    /// Units: meters
    track_width_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DiffKin {
    /// Create the kinematics for the given track width.
    ///
    /// A non-positive or non-finite track width makes the geometry
    /// non-invertible and is rejected with `ConfigError::InvalidTrackWidth`.
    pub fn new(track_width_m: f64) -> Result<Self, ConfigError> {
        if !track_width_m.is_finite() || track_width_m <= 0.0 {
            return Err(ConfigError::InvalidTrackWidth(track_width_m));
        }

        Ok(Self { track_width_m })
    }

    /// Get the track width in meters.
    pub fn track_width_m(&self) -> f64 {
        self.track_width_m
    }

    /// Calculate the wheel states required to achieve the given chassis
    /// speeds. This is the inverse kinematics problem.
    pub(crate) fn to_wheel_states(&self, speeds: &ChassisSpeeds) -> Vec<WheelState> {
        let left_ms = speeds.vx_ms - speeds.omega_rads * self.track_width_m / 2.0;
        let right_ms = speeds.vx_ms + speeds.omega_rads * self.track_width_m / 2.0;

        vec![
            WheelState {
                speed_ms: left_ms,
                angle_rad: 0.0,
            },
            WheelState {
                speed_ms: right_ms,
                angle_rad: 0.0,
            },
        ]
    }

    /// Calculate the chassis speeds produced by the given wheel states.
    /// This is the forward kinematics problem.
    pub(crate) fn to_chassis_speeds(&self, wheel_states: &[WheelState]) -> ChassisSpeeds {
        let left_ms = wheel_states[0].speed_ms;
        let right_ms = wheel_states[1].speed_ms;

        ChassisSpeeds {
            vx_ms: (left_ms + right_ms) / 2.0,
            vy_ms: 0.0,
            omega_rads: (right_ms - left_ms) / self.track_width_m,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
