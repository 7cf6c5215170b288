//! Parameters structure for the robot configuration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::Topology;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing the robot's drivetrain, as loaded from a parameter
/// file. Validated into a [`super::RobotConfig`] by
/// [`super::RobotConfig::from_params`].
#[derive(Debug, Clone, Deserialize)]
pub struct RobotConfigParams {
    // ---- GEOMETRY ----

    /// The drivetrain topology.
    pub topology: Topology,

    /// The positions of the swerve module steer axes in the robot body
    /// frame. Required for the `Holonomic` topology, ignored otherwise.
    ///
    /// Units: meters,
    /// Frame: Robot body
    pub module_pos_m_rb: Option<Vec<[f64; 2]>>,

    /// The distance between the left and right wheel contact points.
    /// Required for the `Differential` topology, ignored otherwise.
    ///
    /// Units: meters
    pub track_width_m: Option<f64>,

    // ---- CAPABILITIES ----

    /// Maximum speed of a single wheel module.
    ///
    /// Units: meters/second
    pub max_module_speed_ms: f64,

    /// Maximum linear velocity of the chassis.
    ///
    /// Units: meters/second
    pub max_vel_ms: f64,

    /// Maximum linear acceleration of the chassis.
    ///
    /// Units: meters/second^2
    pub max_acc_mss: f64,

    /// Maximum angular velocity of the chassis.
    ///
    /// Units: radians/second
    pub max_ang_vel_rads: f64,

    /// Maximum angular acceleration of the chassis.
    ///
    /// Units: radians/second^2
    pub max_ang_acc_radss: f64,
}
