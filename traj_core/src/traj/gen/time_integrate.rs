//! Time integration
//!
//! The final stage of generation: convert the finished velocity-per-distance
//! profile into absolute timestamps, derive the remaining state quantities
//! (acceleration, angular velocity, wheel states) and map event markers to
//! times.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{chassis_speeds_at, SampledPoint, DELTA_S_EPS_M, VEL_EPS_MS};
use crate::kin::{desaturate_wheel_speeds, DesatMode};
use crate::loc::Pose;
use crate::path::{ActionHandle, Path};
use crate::robot_config::RobotConfig;
use crate::traj::TrajectoryState;
use util::maths::{ang_dist_rad, lin_map};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert the finished velocity profile into the final state sequence and
/// the `(time, action handle)` event schedule.
///
/// Timestamps come from trapezoidal integration,
/// `dt = ds / avg(v[i-1], v[i])`, with zero length steps and zero average
/// velocities contributing zero elapsed time. Acceleration and angular
/// velocity are derived by forward finite differencing, so each state
/// carries the rate over the segment towards its successor and the final
/// state carries zero.
pub(super) fn time_integrate(
    points: &[SampledPoint],
    vel_ms: &[f64],
    config: &RobotConfig,
    path: &Path,
    desat_mode: DesatMode,
) -> (Vec<TrajectoryState>, Vec<(f64, ActionHandle)>) {
    let num = points.len();

    // ---- TIMESTAMPS ----

    let mut time_s = vec![0.0; num];
    for i in 1..num {
        let delta_s_m = points[i].delta_s_m;
        let avg_vel_ms = 0.5 * (vel_ms[i - 1] + vel_ms[i]);

        let dt_s = if delta_s_m <= DELTA_S_EPS_M || avg_vel_ms <= VEL_EPS_MS {
            0.0
        } else {
            delta_s_m / avg_vel_ms
        };

        time_s[i] = time_s[i - 1] + dt_s;
    }

    // ---- STATES ----

    let mut states = Vec::with_capacity(num);
    for i in 0..num {
        let desired = chassis_speeds_at(&points[i], vel_ms[i]);

        let max_trans_ms = config.max_vel_ms.min(points[i].constraints.max_vel_ms);
        let max_rot_rads = config
            .max_ang_vel_rads
            .min(points[i].constraints.max_ang_vel_rads);

        let (_, wheel_states) = desaturate_wheel_speeds(
            config.kin(),
            &desired,
            config.max_module_speed_ms,
            max_trans_ms,
            max_rot_rads,
            desat_mode,
        );

        states.push(TrajectoryState {
            time_s: time_s[i],
            pose: Pose::new(points[i].pos_m, points[i].heading_rad),
            velocity_ms: vel_ms[i],
            accel_mss: 0.0,
            ang_vel_rads: 0.0,
            curv_m: points[i].curv_m,
            wheel_states,
        });
    }

    // Forward difference the profile for the derived rates
    for i in 0..num - 1 {
        let dt_s = time_s[i + 1] - time_s[i];
        if dt_s <= 0.0 {
            continue;
        }

        states[i].accel_mss = (vel_ms[i + 1] - vel_ms[i]) / dt_s;
        states[i].ang_vel_rads =
            ang_dist_rad(points[i].heading_rad, points[i + 1].heading_rad) / dt_s;
    }

    // ---- EVENTS ----

    let mut event_cmds: Vec<(f64, ActionHandle)> = path
        .event_markers
        .iter()
        .map(|marker| {
            (
                time_at_progress(points, &time_s, marker.pos),
                marker.action.clone(),
            )
        })
        .collect();

    event_cmds.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    (states, event_cmds)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a fractional arc position onto a trajectory time by interpolating
/// between the bracketing samples.
fn time_at_progress(points: &[SampledPoint], time_s: &[f64], pos: f64) -> f64 {
    let idx = points.partition_point(|p| p.progress < pos);

    if idx == 0 {
        return time_s[0];
    }
    if idx >= points.len() {
        return time_s[time_s.len() - 1];
    }

    let p_lo = points[idx - 1].progress;
    let p_hi = points[idx].progress;

    if p_hi - p_lo <= std::f64::EPSILON {
        return time_s[idx];
    }

    lin_map((p_lo, p_hi), (time_s[idx - 1], time_s[idx]), pos)
}
