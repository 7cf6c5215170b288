//! # Trajectory generation module
//!
//! Generation converts a validated path and robot configuration into the
//! final state sequence. It runs as a pipeline of pure transforms over a
//! sampled point sequence:
//!
//! 1. `sample_path` - discretise the path into dense points carrying
//!    position, heading, curvature and a velocity ceiling each.
//! 2. `forward_pass` - sweep start to end, limiting each point to the
//!    velocity reachable from its predecessor under the acceleration
//!    and wheel speed limits.
//! 3. `reverse_pass` - sweep end to start, limiting each point to the
//!    velocity from which the goal end velocity remains reachable.
//! 4. `time_integrate` - trapezoidal integration of the finished
//!    velocity profile into timestamps, plus derivation of the
//!    remaining state quantities and the event schedule.
//!
//! Each pass depends on the completed output of the previous one over the
//! whole sequence, so generation is strictly sequential.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod accel_pass;
mod sample_path;
mod time_integrate;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector2;

// Internal
use crate::kin::{desaturate_wheel_speeds, ChassisSpeeds, DesatMode};
use crate::loc::Pose;
use crate::path::{ActionHandle, Path, PathConstraints, PathError};
use crate::robot_config::RobotConfig;
use crate::traj::TrajectoryState;
use util::maths::ang_dist_rad;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Arc lengths below this are treated as zero: they contribute no velocity
/// change and no elapsed time, rather than dividing by zero.
const DELTA_S_EPS_M: f64 = 1e-9;

/// Velocities below this are treated as zero when used as divisors.
const VEL_EPS_MS: f64 = 1e-9;

/// Curvatures below this magnitude are treated as straight, i.e. imposing
/// no centripetal velocity limit.
const CURV_EPS_M: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single sampled point along the path, carrying everything the
/// acceleration passes and the time integrator need.
#[derive(Debug, Clone)]
pub(crate) struct SampledPoint {
    /// Position in the field frame.
    ///
    /// Units: meters
    pub pos_m: Vector2<f64>,

    /// Direction of travel (heading of the path tangent).
    ///
    /// Units: radians
    pub tangent_rad: f64,

    /// Target body heading. Equal to the tangent for differential
    /// drivetrains, interpolated between rotation targets for holonomic
    /// ones.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Signed curvature of the path. Positive curvature turns left.
    ///
    /// Units: 1/meters
    pub curv_m: f64,

    /// Arc length from the previous sampled point (zero for the first).
    ///
    /// Units: meters
    pub delta_s_m: f64,

    /// Fraction of the total arc length covered at this point, in [0, 1].
    pub progress: f64,

    /// Spatial rate of change of the body heading, used to derive the
    /// rotational component of the chassis speeds from the linear velocity.
    ///
    /// Units: radians/meter
    pub dtheta_ds_radm: f64,

    /// Velocity ceiling from the active constraints and the centripetal
    /// acceleration limit.
    ///
    /// Units: meters/second
    pub max_vel_ms: f64,

    /// The constraints active at this point.
    pub constraints: PathConstraints,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised during trajectory generation.
#[derive(Debug, thiserror::Error)]
pub enum TrajGenError {
    /// The path cannot be turned into a trajectory. No partially built
    /// trajectory is returned.
    #[error("The path is invalid: {0}")]
    InvalidPath(#[from] PathError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate the state sequence and event schedule for the given path.
pub(crate) fn generate_states(
    path: &Path,
    config: &RobotConfig,
    starting_speeds: &ChassisSpeeds,
    starting_heading_rad: f64,
    desat_mode: DesatMode,
) -> Result<(Vec<TrajectoryState>, Vec<(f64, ActionHandle)>), TrajGenError> {
    path.validate()?;

    let points = sample_path::sample_path(path, config, starting_heading_rad);

    // A path whose waypoints are all coincident has no arc length to
    // profile: the trajectory is a single stationary state.
    if points.len() < 2 {
        debug!("Path has no arc length, emitting a single stationary state");
        return Ok(stationary_trajectory(&points[0], path, config));
    }

    let total_m: f64 = points.iter().map(|p| p.delta_s_m).sum();
    debug!(
        "Sampled {} points over {:.3} m of path",
        points.len(),
        total_m
    );

    let mut vel_ms = accel_pass::forward_pass(
        &points,
        config,
        starting_speeds,
        starting_heading_rad,
        desat_mode,
    );

    accel_pass::reverse_pass(
        &points,
        &mut vel_ms,
        config,
        path.goal_end_state.velocity_ms,
        desat_mode,
    );

    let (states, event_cmds) =
        time_integrate::time_integrate(&points, &vel_ms, config, path, desat_mode);

    debug!(
        "Generated {} states, total time {:.3} s, {} scheduled events",
        states.len(),
        states[states.len() - 1].time_s,
        event_cmds.len()
    );

    Ok((states, event_cmds))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the chassis speeds corresponding to the given linear velocity at a
/// point.
///
/// The translation is the velocity along the path tangent expressed in the
/// body frame (for differential drivetrains the heading equals the tangent,
/// so the lateral component is zero). The rotational component follows from
/// the spatial heading rate: `omega = v * dtheta/ds`.
fn chassis_speeds_at(point: &SampledPoint, vel_ms: f64) -> ChassisSpeeds {
    let drift_rad = ang_dist_rad(point.heading_rad, point.tangent_rad);

    ChassisSpeeds {
        vx_ms: vel_ms * drift_rad.cos(),
        vy_ms: vel_ms * drift_rad.sin(),
        omega_rads: vel_ms * point.dtheta_ds_radm,
    }
}

/// Clip a candidate velocity at a point through wheel speed desaturation,
/// returning the largest feasible linear velocity.
fn desat_vel(
    point: &SampledPoint,
    vel_ms: f64,
    config: &RobotConfig,
    desat_mode: DesatMode,
) -> f64 {
    let desired = chassis_speeds_at(point, vel_ms);

    let max_trans_ms = config.max_vel_ms.min(point.constraints.max_vel_ms);
    let max_rot_rads = config
        .max_ang_vel_rads
        .min(point.constraints.max_ang_vel_rads);

    let (scaled, _) = desaturate_wheel_speeds(
        config.kin(),
        &desired,
        config.max_module_speed_ms,
        max_trans_ms,
        max_rot_rads,
        desat_mode,
    );

    scaled.trans_norm_ms()
}

/// Build the single-state trajectory for a degenerate (zero length) path.
fn stationary_trajectory(
    point: &SampledPoint,
    path: &Path,
    config: &RobotConfig,
) -> (Vec<TrajectoryState>, Vec<(f64, ActionHandle)>) {
    let wheel_states = config.kin().to_wheel_states(&ChassisSpeeds::default());

    let state = TrajectoryState {
        time_s: 0.0,
        pose: Pose::new(point.pos_m, point.heading_rad),
        velocity_ms: 0.0,
        accel_mss: 0.0,
        ang_vel_rads: 0.0,
        curv_m: 0.0,
        wheel_states,
    };

    let events = path
        .event_markers
        .iter()
        .map(|marker| (0.0, marker.action.clone()))
        .collect();

    (vec![state], events)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
