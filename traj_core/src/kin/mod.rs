//! # Drivetrain kinematics module
//!
//! This module converts between chassis-level speeds (the combined
//! translational and rotational velocity of the robot body) and individual
//! wheel states (a speed and a rolling-direction angle per wheel).
//!
//! Two drivetrain geometries are supported, selected once when the
//! [`crate::robot_config::RobotConfig`] is constructed:
//!
//! - [`SwerveKin`] - four independently steered and driven modules
//! - [`DiffKin`] - two driven wheels with no independent steering
//!
//! Both are wrapped by the [`Kinematics`] enum so the rest of the library is
//! independent of which geometry is in use.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod desaturate;
mod diff;
mod swerve;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use desaturate::*;
pub use diff::*;
pub use swerve::*;

use crate::robot_config::Topology;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The velocity of the robot body, expressed in the robot body frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChassisSpeeds {
    /// Velocity along the body X (forward) axis.
    ///
    /// Units: meters/second
    pub vx_ms: f64,

    /// Velocity along the body Y (left) axis.
    ///
    /// Units: meters/second
    pub vy_ms: f64,

    /// Angular velocity about the body Z (up) axis, following the right hand
    /// rule so that positive rates turn the robot to the left.
    ///
    /// Units: radians/second
    pub omega_rads: f64,
}

/// The state of a single wheel.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelState {
    /// Signed speed of the wheel's contact point along its rolling direction.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Heading of the wheel's rolling direction in the robot body frame.
    ///
    /// Units: radians
    pub angle_rad: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Drivetrain kinematics capability.
///
/// A tagged variant over the supported drivetrain geometries. Constructed
/// once at robot config time, after which the conversion functions cannot
/// fail.
#[derive(Debug, Clone)]
pub enum Kinematics {
    /// Four independently steered and driven modules.
    Swerve(SwerveKin),

    /// Two driven wheels, no independent steering.
    Diff(DiffKin),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisSpeeds {
    /// Return the magnitude of the translational component of the speeds.
    pub fn trans_norm_ms(&self) -> f64 {
        self.vx_ms.hypot(self.vy_ms)
    }
}

impl Kinematics {
    /// Get the topology of this drivetrain.
    pub fn topology(&self) -> Topology {
        match self {
            Kinematics::Swerve(_) => Topology::Holonomic,
            Kinematics::Diff(_) => Topology::Differential,
        }
    }

    /// Get the number of wheels this drivetrain has.
    ///
    /// This is fixed by the topology: 4 for holonomic, 2 for differential.
    pub fn num_wheels(&self) -> usize {
        match self {
            Kinematics::Swerve(_) => NUM_SWERVE_MODULES,
            Kinematics::Diff(_) => NUM_DIFF_WHEELS,
        }
    }

    /// Convert chassis speeds into the wheel states which produce them.
    ///
    /// The returned vector always has [`Kinematics::num_wheels`] elements.
    pub fn to_wheel_states(&self, speeds: &ChassisSpeeds) -> Vec<WheelState> {
        match self {
            Kinematics::Swerve(k) => k.to_wheel_states(speeds),
            Kinematics::Diff(k) => k.to_wheel_states(speeds),
        }
    }

    /// Convert wheel states back into chassis speeds.
    ///
    /// The slice must contain [`Kinematics::num_wheels`] elements, which is
    /// guaranteed for any slice produced by [`Kinematics::to_wheel_states`]
    /// on the same drivetrain.
    pub fn to_chassis_speeds(&self, wheel_states: &[WheelState]) -> ChassisSpeeds {
        debug_assert_eq!(wheel_states.len(), self.num_wheels());

        match self {
            Kinematics::Swerve(k) => k.to_chassis_speeds(wheel_states),
            Kinematics::Diff(k) => k.to_chassis_speeds(wheel_states),
        }
    }
}
