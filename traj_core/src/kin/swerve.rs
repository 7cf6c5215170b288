//! Swerve (four module) drivetrain kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{DMatrix, DVector, Vector2};

// Internal
use super::{ChassisSpeeds, WheelState};
use crate::robot_config::ConfigError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of modules on a swerve drivetrain.
pub const NUM_SWERVE_MODULES: usize = 4;

/// Singular values of the inverse kinematics matrix below this threshold
/// mean the module layout cannot be inverted.
const SINGULARITY_EPS: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematics of a swerve drivetrain with four independently steered and
/// driven modules.
///
/// The inverse kinematics matrix maps `[vx, vy, omega]` onto the body-frame
/// velocity components of each module's contact point. The forward matrix is
/// its Moore-Penrose pseudoinverse, computed once at construction so that a
/// degenerate module layout is rejected up front rather than discovered
/// during trajectory generation.
#[derive(Debug, Clone)]
pub struct SwerveKin {
    /// Positions of the module steer axes in the robot body frame.
    ///
    /// Units: meters,
    /// Frame: Robot body
    module_pos_m_rb: [Vector2<f64>; NUM_SWERVE_MODULES],

    /// Inverse kinematics matrix (2N x 3).
    ik: DMatrix<f64>,

    /// Forward kinematics matrix (3 x 2N), pseudoinverse of `ik`.
    fk: DMatrix<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveKin {
    /// Create the kinematics for the given module layout.
    ///
    /// The layout must span the plane, i.e. the modules must not all sit at
    /// a single point, otherwise the rotational component of the chassis
    /// speeds cannot be recovered from wheel states and
    /// `ConfigError::DegenerateModuleLayout` is returned.
    pub fn new(module_pos_m_rb: [Vector2<f64>; NUM_SWERVE_MODULES]) -> Result<Self, ConfigError> {
        // Build the inverse kinematics matrix. The contact point velocity of
        // module i is:
        //     v_i = [vx - omega * y_i, vy + omega * x_i]
        let mut rows = Vec::with_capacity(2 * NUM_SWERVE_MODULES * 3);
        for pos in module_pos_m_rb.iter() {
            rows.extend_from_slice(&[1.0, 0.0, -pos[1]]);
            rows.extend_from_slice(&[0.0, 1.0, pos[0]]);
        }
        let ik = DMatrix::from_row_slice(2 * NUM_SWERVE_MODULES, 3, &rows);

        // Reject layouts in which the matrix loses rank before attempting
        // the pseudoinverse
        let svd = ik.clone().svd(true, true);
        let min_singular = svd
            .singular_values
            .iter()
            .cloned()
            .fold(std::f64::INFINITY, f64::min);

        if min_singular < SINGULARITY_EPS {
            return Err(ConfigError::DegenerateModuleLayout(min_singular));
        }

        let fk = svd
            .pseudo_inverse(SINGULARITY_EPS)
            .map_err(|_| ConfigError::DegenerateModuleLayout(min_singular))?;

        Ok(Self {
            module_pos_m_rb,
            ik,
            fk,
        })
    }

    /// Positions of the module steer axes in the robot body frame.
    pub fn module_positions_m_rb(&self) -> &[Vector2<f64>; NUM_SWERVE_MODULES] {
        &self.module_pos_m_rb
    }

    /// Calculate the module states required to achieve the given chassis
    /// speeds. This is the inverse kinematics problem.
    pub(crate) fn to_wheel_states(&self, speeds: &ChassisSpeeds) -> Vec<WheelState> {
        let chassis = DVector::from_column_slice(&[speeds.vx_ms, speeds.vy_ms, speeds.omega_rads]);
        let components = &self.ik * chassis;

        let mut states = Vec::with_capacity(NUM_SWERVE_MODULES);
        for i in 0..NUM_SWERVE_MODULES {
            let vx = components[2 * i];
            let vy = components[2 * i + 1];

            states.push(WheelState {
                speed_ms: vx.hypot(vy),
                angle_rad: vy.atan2(vx),
            });
        }

        states
    }

    /// Calculate the chassis speeds produced by the given module states.
    /// This is the forward kinematics problem, solved in the least squares
    /// sense via the precomputed pseudoinverse.
    pub(crate) fn to_chassis_speeds(&self, wheel_states: &[WheelState]) -> ChassisSpeeds {
        let mut components = DVector::zeros(2 * NUM_SWERVE_MODULES);
        for (i, ws) in wheel_states.iter().enumerate().take(NUM_SWERVE_MODULES) {
            components[2 * i] = ws.speed_ms * ws.angle_rad.cos();
            components[2 * i + 1] = ws.speed_ms * ws.angle_rad.sin();
        }

        let chassis = &self.fk * components;

        ChassisSpeeds {
            vx_ms: chassis[0],
            vy_ms: chassis[1],
            omega_rads: chassis[2],
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
