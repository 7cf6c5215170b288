//! Forward and reverse acceleration passes
//!
//! The two sweeps which turn the per-point velocity ceilings into a profile
//! that is simultaneously reachable from the start and safely decelerable
//! to the goal end velocity. This is the standard two pass velocity
//! smoothing algorithm for acceleration bounded paths with position
//! dependent speed ceilings: the forward sweep enforces
//! `v[i]^2 <= v[i-1]^2 + 2*a*ds` and the reverse sweep the mirror image,
//! with every candidate additionally clipped through wheel speed
//! desaturation so no individual wheel is ever asked to exceed its limit.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{desat_vel, SampledPoint, DELTA_S_EPS_M};
use crate::kin::{ChassisSpeeds, DesatMode};
use crate::robot_config::RobotConfig;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Sweep the points start to end, establishing the velocity reachable at
/// each point from the starting speeds under the acceleration, constraint
/// and wheel speed limits.
///
/// This pass only establishes an upper bound reachable from the start - it
/// never reduces feasibility elsewhere.
pub(super) fn forward_pass(
    points: &[SampledPoint],
    config: &RobotConfig,
    starting_speeds: &ChassisSpeeds,
    starting_heading_rad: f64,
    desat_mode: DesatMode,
) -> Vec<f64> {
    let mut vel_ms = vec![0.0; points.len()];

    // The starting chassis speeds are robot-relative: rotate them into the
    // field frame, then project onto the path tangent at the first point.
    // Motion against the direction of travel cannot help the profile, so
    // negative projections clamp to zero.
    let heading = starting_heading_rad;
    let field_vx_ms =
        starting_speeds.vx_ms * heading.cos() - starting_speeds.vy_ms * heading.sin();
    let field_vy_ms =
        starting_speeds.vx_ms * heading.sin() + starting_speeds.vy_ms * heading.cos();

    let tangent = points[0].tangent_rad;
    let proj_ms = field_vx_ms * tangent.cos() + field_vy_ms * tangent.sin();

    let start_cap_ms = points[0].max_vel_ms.min(config.max_vel_ms);
    let candidate_ms = clamp(&proj_ms, &0.0, &start_cap_ms);
    vel_ms[0] = desat_vel(&points[0], candidate_ms, config, desat_mode);

    for i in 1..points.len() {
        let delta_s_m = points[i].delta_s_m;
        let max_acc_mss = points[i].constraints.max_acc_mss.min(config.max_acc_mss);

        // Velocity reachable from the previous point. A zero length step
        // contributes zero velocity change.
        let reachable_ms = if delta_s_m <= DELTA_S_EPS_M {
            vel_ms[i - 1]
        } else {
            (vel_ms[i - 1].powi(2) + 2.0 * max_acc_mss * delta_s_m).sqrt()
        };

        let candidate_ms = reachable_ms
            .min(points[i].max_vel_ms)
            .min(config.max_vel_ms);

        vel_ms[i] = desat_vel(&points[i], candidate_ms, config, desat_mode);
    }

    vel_ms
}

/// Sweep the points end to start, lowering the forward profile wherever the
/// goal end velocity could not otherwise be reached within the deceleration
/// limits.
///
/// The terminal velocity is the lesser of the forward profile's final value
/// and the path's goal end velocity. The result is the pointwise minimum of
/// the two sweeps: this pass never increases any velocity.
pub(super) fn reverse_pass(
    points: &[SampledPoint],
    vel_ms: &mut [f64],
    config: &RobotConfig,
    goal_end_vel_ms: f64,
    desat_mode: DesatMode,
) {
    let last = points.len() - 1;

    let terminal_ms = vel_ms[last].min(goal_end_vel_ms.max(0.0));
    vel_ms[last] = vel_ms[last].min(desat_vel(&points[last], terminal_ms, config, desat_mode));

    for i in (0..last).rev() {
        let delta_s_m = points[i + 1].delta_s_m;
        let max_acc_mss = points[i].constraints.max_acc_mss.min(config.max_acc_mss);

        // Velocity from which the next point's velocity can be reached by
        // braking over the step
        let limit_ms = if delta_s_m <= DELTA_S_EPS_M {
            vel_ms[i + 1]
        } else {
            (vel_ms[i + 1].powi(2) + 2.0 * max_acc_mss * delta_s_m).sqrt()
        };

        let candidate_ms = vel_ms[i].min(limit_ms);
        vel_ms[i] = vel_ms[i].min(desat_vel(&points[i], candidate_ms, config, desat_mode));
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::kin::{DiffKin, Kinematics};
    use crate::path::{GoalEndState, Path, PathConstraints};
    use crate::traj::gen::sample_path::sample_path;
    use nalgebra::Vector2;

    fn config() -> RobotConfig {
        RobotConfig::new(
            Kinematics::Diff(DiffKin::new(0.5).unwrap()),
            100.0,
            3.0,
            2.0,
            20.0,
            40.0,
        )
        .unwrap()
    }

    fn straight_points() -> Vec<SampledPoint> {
        let path = Path::new(
            vec![Vector2::new(0.0, 0.0), Vector2::new(4.0, 0.0)],
            PathConstraints {
                max_vel_ms: 3.0,
                max_acc_mss: 2.0,
                max_ang_vel_rads: 20.0,
                max_ang_acc_radss: 40.0,
            },
            GoalEndState {
                velocity_ms: 0.0,
                heading_rad: 0.0,
            },
            0.05,
        );
        sample_path(&path, &config(), 0.0)
    }

    #[test]
    fn test_forward_pass_respects_accel_limit() {
        let points = straight_points();
        let vel = forward_pass(
            &points,
            &config(),
            &ChassisSpeeds::default(),
            0.0,
            DesatMode::ScaleBoth,
        );

        assert!(vel[0].abs() < 1e-9);
        for i in 1..vel.len() {
            let reachable =
                (vel[i - 1].powi(2) + 2.0 * 2.0 * points[i].delta_s_m).sqrt();
            assert!(vel[i] <= reachable + 1e-9);
        }
    }

    #[test]
    fn test_backwards_start_speed_clamps_to_zero() {
        let points = straight_points();
        let vel = forward_pass(
            &points,
            &config(),
            &ChassisSpeeds {
                vx_ms: -2.0,
                vy_ms: 0.0,
                omega_rads: 0.0,
            },
            0.0,
            DesatMode::ScaleBoth,
        );

        assert!(vel[0].abs() < 1e-9);
    }

    #[test]
    fn test_reverse_pass_reaches_goal_velocity() {
        let points = straight_points();
        let config = config();
        let mut vel = forward_pass(
            &points,
            &config,
            &ChassisSpeeds::default(),
            0.0,
            DesatMode::ScaleBoth,
        );

        reverse_pass(&points, &mut vel, &config, 1.0, DesatMode::ScaleBoth);

        // Terminal velocity is the goal velocity (reachable here)
        assert!((vel.last().unwrap() - 1.0).abs() < 1e-9);

        // Braking feasibility holds everywhere
        for i in 0..vel.len() - 1 {
            let limit =
                (vel[i + 1].powi(2) + 2.0 * 2.0 * points[i + 1].delta_s_m).sqrt();
            assert!(vel[i] <= limit + 1e-9);
        }
    }
}
