//! Wheel speed desaturation
//!
//! When a demanded chassis speed would drive one or more wheels above the
//! physical module speed limit, the demand must be scaled down rather than
//! letting the drivetrain clip individual wheels (which would distort the
//! direction of travel). Desaturation preserves the ratios between wheel
//! speeds, only reducing their common magnitude.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{ChassisSpeeds, Kinematics, WheelState};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Speeds below this magnitude are treated as zero to avoid division by
/// near-zero values when computing scale factors.
const SPEED_EPS_MS: f64 = 1e-9;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the rotational component of the chassis speeds is treated when the
/// demand must be scaled down.
///
/// This choice is always explicit: callers must state whether heading
/// tracking or translation accuracy has priority when the drivetrain
/// saturates.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum DesatMode {
    /// Scale the rotational component together with the translational one,
    /// preserving the overall motion shape. After scaling no wheel exceeds
    /// the module speed limit.
    ScaleBoth,

    /// Hold the rotational component fixed and scale only the translation.
    /// Heading tracking is preserved at the cost of path tracking, and
    /// wheels may remain above the module limit if the rotation demand
    /// alone saturates them.
    PreserveRotation,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Scale the given chassis speed demand so that no wheel exceeds the module
/// speed limit, preserving the direction of motion.
///
/// The translational component is first clamped to `max_trans_ms` and the
/// rotational component to `max_rot_rads`. If the largest resulting wheel
/// speed exceeds `max_module_speed_ms` the demand is scaled by a single
/// uniform factor (no iterative refinement) according to `mode`, and the
/// wheel states are recomputed from the scaled demand.
///
/// Returns the scaled chassis speeds and the wheel states they produce.
pub fn desaturate_wheel_speeds(
    kin: &Kinematics,
    desired: &ChassisSpeeds,
    max_module_speed_ms: f64,
    max_trans_ms: f64,
    max_rot_rads: f64,
    mode: DesatMode,
) -> (ChassisSpeeds, Vec<WheelState>) {
    let mut speeds = *desired;

    // Clamp the translation magnitude, preserving its direction
    let trans_ms = speeds.trans_norm_ms();
    if trans_ms > max_trans_ms && trans_ms > SPEED_EPS_MS {
        let scale = max_trans_ms / trans_ms;
        speeds.vx_ms *= scale;
        speeds.vy_ms *= scale;
    }

    // Clamp the rotation rate
    speeds.omega_rads = clamp(&speeds.omega_rads, &-max_rot_rads, &max_rot_rads);

    let wheel_states = kin.to_wheel_states(&speeds);

    // Find the fastest wheel
    let largest_ms = wheel_states
        .iter()
        .map(|ws| ws.speed_ms.abs())
        .fold(0.0, f64::max);

    if largest_ms <= max_module_speed_ms || largest_ms <= SPEED_EPS_MS {
        return (speeds, wheel_states);
    }

    // Scale the demand down so the fastest wheel sits exactly on the limit
    let scale = max_module_speed_ms / largest_ms;

    speeds.vx_ms *= scale;
    speeds.vy_ms *= scale;
    if let DesatMode::ScaleBoth = mode {
        speeds.omega_rads *= scale;
    }

    let wheel_states = kin.to_wheel_states(&speeds);

    (speeds, wheel_states)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::kin::DiffKin;
    use crate::kin::SwerveKin;
    use nalgebra::Vector2;

    const EPSILON: f64 = 1e-9;

    fn swerve() -> Kinematics {
        Kinematics::Swerve(
            SwerveKin::new([
                Vector2::new(0.3, 0.3),
                Vector2::new(0.3, -0.3),
                Vector2::new(-0.3, 0.3),
                Vector2::new(-0.3, -0.3),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_no_scaling_below_limit() {
        let kin = swerve();
        let desired = ChassisSpeeds {
            vx_ms: 1.0,
            vy_ms: 0.0,
            omega_rads: 0.0,
        };

        let (speeds, _) = desaturate_wheel_speeds(
            &kin, &desired, 4.0, 10.0, 10.0, DesatMode::ScaleBoth,
        );

        assert_eq!(speeds, desired);
    }

    #[test]
    fn test_scale_both_caps_wheels_and_preserves_ratios() {
        let kin = swerve();
        let desired = ChassisSpeeds {
            vx_ms: 5.0,
            vy_ms: 1.0,
            omega_rads: 3.0,
        };

        let before = kin.to_wheel_states(&desired);
        let (speeds, after) = desaturate_wheel_speeds(
            &kin, &desired, 2.0, 100.0, 100.0, DesatMode::ScaleBoth,
        );

        // No wheel above the module limit
        for ws in &after {
            assert!(ws.speed_ms.abs() <= 2.0 + EPSILON);
        }

        // Ratios between wheel speeds are preserved, and directions unchanged
        let scale = after[0].speed_ms / before[0].speed_ms;
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((a.speed_ms - b.speed_ms * scale).abs() < 1e-6);
            assert!((a.angle_rad - b.angle_rad).abs() < 1e-6);
        }

        // The whole demand scaled uniformly
        assert!((speeds.vx_ms / desired.vx_ms - scale).abs() < 1e-6);
        assert!((speeds.omega_rads / desired.omega_rads - scale).abs() < 1e-6);
    }

    #[test]
    fn test_preserve_rotation_holds_omega() {
        let kin = swerve();
        let desired = ChassisSpeeds {
            vx_ms: 5.0,
            vy_ms: 0.0,
            omega_rads: 1.0,
        };

        let (speeds, _) = desaturate_wheel_speeds(
            &kin, &desired, 2.0, 100.0, 100.0, DesatMode::PreserveRotation,
        );

        assert!((speeds.omega_rads - 1.0).abs() < EPSILON);
        assert!(speeds.vx_ms < desired.vx_ms);
    }

    #[test]
    fn test_translation_and_rotation_clamps() {
        let kin = Kinematics::Diff(DiffKin::new(0.5).unwrap());
        let desired = ChassisSpeeds {
            vx_ms: 10.0,
            vy_ms: 0.0,
            omega_rads: -8.0,
        };

        let (speeds, _) = desaturate_wheel_speeds(
            &kin, &desired, 100.0, 3.0, 2.0, DesatMode::ScaleBoth,
        );

        assert!((speeds.vx_ms - 3.0).abs() < EPSILON);
        assert!((speeds.omega_rads - (-2.0)).abs() < EPSILON);
    }
}
