//! Path sampling
//!
//! The first stage of generation: discretise the path into a dense ordered
//! point sequence and attach to each point everything the acceleration
//! passes need - heading, curvature, arc position, the active constraints
//! and the velocity ceiling they imply.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use std::f64::consts::PI;

// Internal
use super::{SampledPoint, CURV_EPS_M, DELTA_S_EPS_M};
use crate::path::Path;
use crate::robot_config::{RobotConfig, Topology};
use util::maths::{ang_dist_rad, ang_lerp_rad, norm_angle_rad};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Sample the path into a dense point sequence.
///
/// Points are spaced at most `path.point_sep_m` apart along each waypoint
/// segment, with the spacing within a segment kept regular so that waypoints
/// always land exactly on a sample. Coincident waypoints are skipped; a path
/// whose waypoints all coincide collapses to a single sample.
pub(super) fn sample_path(
    path: &Path,
    config: &RobotConfig,
    starting_heading_rad: f64,
) -> Vec<SampledPoint> {
    // ---- DENSIFY ----

    let mut positions: Vec<Vector2<f64>> = vec![path.points_m[0]];

    for w in path.points_m.windows(2) {
        let diff = w[1] - w[0];
        let dist_m = diff.norm();

        // Skip zero length segments rather than dividing by zero
        if dist_m <= DELTA_S_EPS_M {
            continue;
        }

        let num_sub = ((dist_m / path.point_sep_m).ceil() as usize).max(1);
        let step = diff / num_sub as f64;

        for k in 1..=num_sub {
            positions.push(w[0] + step * k as f64);
        }
    }

    let num = positions.len();

    // ---- ARC LENGTH ----

    let mut cum_s_m = vec![0.0; num];
    for i in 1..num {
        cum_s_m[i] = cum_s_m[i - 1] + (positions[i] - positions[i - 1]).norm();
    }
    let total_m = cum_s_m[num - 1];

    // Degenerate path: a single stationary sample
    if num < 2 || total_m <= DELTA_S_EPS_M {
        return vec![SampledPoint {
            pos_m: positions[0],
            tangent_rad: norm_angle_rad(starting_heading_rad),
            heading_rad: norm_angle_rad(starting_heading_rad),
            curv_m: 0.0,
            delta_s_m: 0.0,
            progress: 0.0,
            dtheta_ds_radm: 0.0,
            max_vel_ms: 0.0,
            constraints: path.global_constraints,
        }];
    }

    // ---- TANGENTS AND CURVATURE ----

    let mut tangent_rad = vec![0.0; num];
    for i in 0..num - 1 {
        let diff = positions[i + 1] - positions[i];
        tangent_rad[i] = diff[1].atan2(diff[0]);
    }
    tangent_rad[num - 1] = tangent_rad[num - 2];

    let mut curv_m = vec![0.0; num];
    for i in 1..num - 1 {
        curv_m[i] = menger_curvature(&positions[i - 1], &positions[i], &positions[i + 1]);
    }

    // ---- HEADINGS ----

    let heading_rad = match config.topology() {
        Topology::Differential => tangent_rad.clone(),
        Topology::Holonomic => {
            interp_holonomic_headings(path, &cum_s_m, total_m, starting_heading_rad)
        }
    };

    // ---- ASSEMBLE ----

    let mut points = Vec::with_capacity(num);
    for i in 0..num {
        let progress = cum_s_m[i] / total_m;
        let constraints = path.constraints_at(progress);

        // Centripetal limit: v^2 * curv <= a_max
        let mut max_vel_ms = constraints.max_vel_ms;
        if curv_m[i].abs() > CURV_EPS_M {
            max_vel_ms = max_vel_ms.min((constraints.max_acc_mss / curv_m[i].abs()).sqrt());
        }

        // Spatial heading rate via central difference
        let lo = if i == 0 { 0 } else { i - 1 };
        let hi = if i == num - 1 { num - 1 } else { i + 1 };
        let span_m = cum_s_m[hi] - cum_s_m[lo];
        let dtheta_ds_radm = if span_m <= DELTA_S_EPS_M {
            0.0
        } else {
            ang_dist_rad(heading_rad[lo], heading_rad[hi]) / span_m
        };

        points.push(SampledPoint {
            pos_m: positions[i],
            tangent_rad: tangent_rad[i],
            heading_rad: heading_rad[i],
            curv_m: curv_m[i],
            delta_s_m: if i == 0 {
                0.0
            } else {
                cum_s_m[i] - cum_s_m[i - 1]
            },
            progress,
            dtheta_ds_radm,
            max_vel_ms,
            constraints,
        });
    }

    points
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Signed curvature of the circle through three points (Menger curvature).
///
/// Positive curvature turns to the left. Collinear or coincident points give
/// zero.
fn menger_curvature(a: &Vector2<f64>, b: &Vector2<f64>, c: &Vector2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    let bc = c - b;

    let cross = ab[0] * ac[1] - ab[1] * ac[0];
    let denom = ab.norm() * ac.norm() * bc.norm();

    if denom <= DELTA_S_EPS_M {
        return 0.0;
    }

    2.0 * cross / denom
}

/// Interpolate the body heading profile for a holonomic drivetrain.
///
/// Between each pair of bracketing rotation targets the heading sweeps the
/// shortest arc with a cosine ease, `t2 = (1 - cos(t * pi)) / 2`, where `t`
/// is the fractional index progress between the two targets. Before the
/// first target the starting heading acts as the previous target; after the
/// last target the final heading holds. The path's goal end heading is
/// appended as a final target so the profile always finishes there.
fn interp_holonomic_headings(
    path: &Path,
    cum_s_m: &[f64],
    total_m: f64,
    starting_heading_rad: f64,
) -> Vec<f64> {
    let num = cum_s_m.len();

    // Map each target's fractional position onto the index of the first
    // sample at or beyond it
    let mut targets: Vec<(usize, f64)> = path
        .rotation_targets
        .iter()
        .map(|t| {
            let idx = cum_s_m
                .partition_point(|s| s / total_m < t.pos)
                .min(num - 1);
            (idx, norm_angle_rad(t.heading_rad))
        })
        .collect();
    targets.push((num - 1, norm_angle_rad(path.goal_end_state.heading_rad)));

    let mut headings = Vec::with_capacity(num);

    let mut prev_idx = 0usize;
    let mut prev_heading_rad = norm_angle_rad(starting_heading_rad);
    let mut next = 0usize;

    for i in 0..num {
        // Advance to the next rotation target at or after this index
        while next < targets.len() && targets[next].0 < i {
            prev_idx = targets[next].0;
            prev_heading_rad = targets[next].1;
            next += 1;
        }

        if next >= targets.len() {
            // No targets remain: the last known heading holds
            headings.push(prev_heading_rad);
            continue;
        }

        let (next_idx, next_heading_rad) = targets[next];
        if next_idx <= prev_idx {
            headings.push(next_heading_rad);
            continue;
        }

        let t = (i - prev_idx) as f64 / (next_idx - prev_idx) as f64;
        let t2 = (1.0 - (t * PI).cos()) / 2.0;
        headings.push(ang_lerp_rad(prev_heading_rad, next_heading_rad, t2));
    }

    headings
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::kin::{DiffKin, Kinematics};
    use crate::path::{GoalEndState, PathConstraints};

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

    fn constraints() -> PathConstraints {
        PathConstraints {
            max_vel_ms: 3.0,
            max_acc_mss: 2.0,
            max_ang_vel_rads: 20.0,
            max_ang_acc_radss: 40.0,
        }
    }

    fn path(points_m: Vec<Vector2<f64>>) -> Path {
        Path::new(
            points_m,
            constraints(),
            GoalEndState {
                velocity_ms: 0.0,
                heading_rad: 0.0,
            },
            0.05,
        )
    }

    #[test]
    fn test_spacing_bound() {
        let path = path(vec![Vector2::new(0.0, 0.0), Vector2::new(1.23, 0.71)]);
        let points = sample_path(&path, &config(), 0.0);

        assert!(points.len() > 2);
        for point in points.iter().skip(1) {
            assert!(point.delta_s_m <= 0.05 + 1e-9);
            assert!(point.delta_s_m > 0.0);
        }

        // Progress covers [0, 1] exactly
        assert_eq!(points[0].progress, 0.0);
        assert_eq!(points.last().unwrap().progress, 1.0);
    }

    #[test]
    fn test_straight_has_no_curvature() {
        let path = path(vec![Vector2::new(0.0, 0.0), Vector2::new(4.0, 0.0)]);
        let points = sample_path(&path, &config(), 0.0);

        for point in &points {
            assert!(point.curv_m.abs() < 1e-9);
            // Unconstrained by the centripetal term
            assert!((point.max_vel_ms - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_corner_curvature_spike() {
        let path = path(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
        ]);
        let points = sample_path(&path, &config(), 0.0);

        let max_curv = points.iter().map(|p| p.curv_m.abs()).fold(0.0, f64::max);
        assert!(max_curv > 10.0);

        // The corner point's ceiling is pulled below the straight ceiling
        let min_ceiling = points
            .iter()
            .map(|p| p.max_vel_ms)
            .fold(std::f64::INFINITY, f64::min);
        assert!(min_ceiling < 0.5);
    }

    #[test]
    fn test_corner_turns_left_is_positive() {
        let left = path(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
        ]);
        let right = path(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, -1.0),
        ]);

        let max_left = sample_path(&left, &config(), 0.0)
            .iter()
            .map(|p| p.curv_m)
            .fold(0.0, f64::max);
        let min_right = sample_path(&right, &config(), 0.0)
            .iter()
            .map(|p| p.curv_m)
            .fold(0.0, f64::min);

        assert!(max_left > 0.0);
        assert!(min_right < 0.0);
    }

    #[test]
    fn test_waypoints_land_on_samples() {
        let path = path(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.03, 0.0),
            Vector2::new(1.03, 2.11),
        ]);
        let points = sample_path(&path, &config(), 0.0);

        for waypoint in &path.points_m {
            assert!(points
                .iter()
                .any(|p| (p.pos_m - waypoint).norm() < 1e-9));
        }
    }

    #[test]
    fn test_degenerate_path_single_sample() {
        let path = path(vec![Vector2::new(2.0, 2.0), Vector2::new(2.0, 2.0)]);
        let points = sample_path(&path, &config(), 1.0);

        assert_eq!(points.len(), 1);
        assert!((points[0].heading_rad - 1.0).abs() < 1e-9);
        assert_eq!(points[0].max_vel_ms, 0.0);
    }
}
