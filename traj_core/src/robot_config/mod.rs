//! # Robot configuration module
//!
//! The robot configuration describes the physical drivetrain to the
//! trajectory generator: its topology, the capability limits of the chassis
//! and of individual wheel modules, and the kinematics used to convert
//! between chassis speeds and wheel states.
//!
//! A configuration is validated when it is constructed. In particular a
//! malformed kinematics description (wrong wheel count for the topology,
//! non-invertible geometry) is rejected here with a [`ConfigError`], never
//! part way through trajectory generation.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
pub use params::RobotConfigParams;

use crate::kin::{DiffKin, Kinematics, SwerveKin, NUM_SWERVE_MODULES};
use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Description of the robot's physical drivetrain and capability limits.
#[derive(Debug, Clone)]
pub struct RobotConfig {
    /// The drivetrain kinematics capability.
    kin: Kinematics,

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

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Drivetrain topology category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Independently steerable and driven wheels (4 modules).
    Holonomic,

    /// Two driven wheel sets, no independent steering.
    Differential,
}

/// Possible errors raised while constructing a [`RobotConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Expected {expected} wheel positions for this topology, found {found}")]
    WheelCountMismatch { expected: usize, found: usize },

    #[error(
        "The module layout is degenerate and cannot be inverted \
         (smallest singular value {0:.3e})"
    )]
    DegenerateModuleLayout(f64),

    #[error("Track width must be positive and finite, got {0}")]
    InvalidTrackWidth(f64),

    #[error("Capability limit {name} must be positive and finite, got {value}")]
    InvalidCapability { name: &'static str, value: f64 },

    #[error("Missing parameter {0} for the selected topology")]
    MissingParam(&'static str),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotConfig {
    /// Create a new configuration from an already built kinematics
    /// capability and the chassis capability limits.
    ///
    /// All limits must be positive and finite.
    pub fn new(
        kin: Kinematics,
        max_module_speed_ms: f64,
        max_vel_ms: f64,
        max_acc_mss: f64,
        max_ang_vel_rads: f64,
        max_ang_acc_radss: f64,
    ) -> Result<Self, ConfigError> {
        check_capability("max_module_speed_ms", max_module_speed_ms)?;
        check_capability("max_vel_ms", max_vel_ms)?;
        check_capability("max_acc_mss", max_acc_mss)?;
        check_capability("max_ang_vel_rads", max_ang_vel_rads)?;
        check_capability("max_ang_acc_radss", max_ang_acc_radss)?;

        Ok(Self {
            kin,
            max_module_speed_ms,
            max_vel_ms,
            max_acc_mss,
            max_ang_vel_rads,
            max_ang_acc_radss,
        })
    }

    /// Build a configuration from a loaded parameter struct.
    ///
    /// The parameters must describe a kinematics geometry consistent with
    /// the selected topology: 4 module positions for `Holonomic`, a track
    /// width for `Differential`.
    pub fn from_params(params: &RobotConfigParams) -> Result<Self, ConfigError> {
        let kin = match params.topology {
            Topology::Holonomic => {
                let positions = params
                    .module_pos_m_rb
                    .as_ref()
                    .ok_or(ConfigError::MissingParam("module_pos_m_rb"))?;

                if positions.len() != NUM_SWERVE_MODULES {
                    return Err(ConfigError::WheelCountMismatch {
                        expected: NUM_SWERVE_MODULES,
                        found: positions.len(),
                    });
                }

                let mut pos = [Vector2::zeros(); NUM_SWERVE_MODULES];
                for (i, p) in positions.iter().enumerate() {
                    pos[i] = Vector2::new(p[0], p[1]);
                }

                Kinematics::Swerve(SwerveKin::new(pos)?)
            }
            Topology::Differential => {
                let track_width_m = params
                    .track_width_m
                    .ok_or(ConfigError::MissingParam("track_width_m"))?;

                Kinematics::Diff(DiffKin::new(track_width_m)?)
            }
        };

        Self::new(
            kin,
            params.max_module_speed_ms,
            params.max_vel_ms,
            params.max_acc_mss,
            params.max_ang_vel_rads,
            params.max_ang_acc_radss,
        )
    }

    /// Get the drivetrain topology.
    pub fn topology(&self) -> Topology {
        self.kin.topology()
    }

    /// Get the drivetrain kinematics capability.
    pub fn kin(&self) -> &Kinematics {
        &self.kin
    }

    /// Get the number of wheels on the drivetrain.
    pub fn num_wheels(&self) -> usize {
        self.kin.num_wheels()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_capability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidCapability { name, value });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn holonomic_params() -> RobotConfigParams {
        RobotConfigParams {
            topology: Topology::Holonomic,
            module_pos_m_rb: Some(vec![
                [0.3, 0.3],
                [0.3, -0.3],
                [-0.3, 0.3],
                [-0.3, -0.3],
            ]),
            track_width_m: None,
            max_module_speed_ms: 4.5,
            max_vel_ms: 4.0,
            max_acc_mss: 3.0,
            max_ang_vel_rads: 6.0,
            max_ang_acc_radss: 10.0,
        }
    }

    #[test]
    fn test_from_params_holonomic() {
        let config = RobotConfig::from_params(&holonomic_params()).unwrap();
        assert_eq!(config.topology(), Topology::Holonomic);
        assert_eq!(config.num_wheels(), 4);
    }

    #[test]
    fn test_from_params_differential() {
        let mut params = holonomic_params();
        params.topology = Topology::Differential;
        params.track_width_m = Some(0.55);

        let config = RobotConfig::from_params(&params).unwrap();
        assert_eq!(config.topology(), Topology::Differential);
        assert_eq!(config.num_wheels(), 2);
    }

    #[test]
    fn test_wheel_count_mismatch_rejected() {
        let mut params = holonomic_params();
        params.module_pos_m_rb = Some(vec![[0.3, 0.3], [0.3, -0.3]]);

        assert!(matches!(
            RobotConfig::from_params(&params),
            Err(ConfigError::WheelCountMismatch {
                expected: 4,
                found: 2
            })
        ));
    }

    #[test]
    fn test_missing_track_width_rejected() {
        let mut params = holonomic_params();
        params.topology = Topology::Differential;
        params.track_width_m = None;

        assert!(matches!(
            RobotConfig::from_params(&params),
            Err(ConfigError::MissingParam("track_width_m"))
        ));
    }

    #[test]
    fn test_invalid_capability_rejected() {
        let mut params = holonomic_params();
        params.max_acc_mss = 0.0;

        assert!(matches!(
            RobotConfig::from_params(&params),
            Err(ConfigError::InvalidCapability {
                name: "max_acc_mss",
                ..
            })
        ));
    }
}
