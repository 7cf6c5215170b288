//! # Trajectory generation core library
//!
//! This library converts a geometric path (waypoints, constraint zones and
//! optional heading targets) plus a description of the robot's drivetrain
//! into a time-parameterised, kinematically feasible trajectory. The
//! trajectory is a sequence of states (pose, velocity, angular velocity and
//! per-wheel speeds) which a control loop samples at arbitrary elapsed time
//! to produce motor demands.
//!
//! Generation is a single synchronous computation performed once, ahead of
//! execution. The resulting [`traj::Trajectory`] is immutable and may be read
//! concurrently without synchronisation.
//!
//! The generation pipeline is:
//!     1. Sample the path into a dense point sequence (position, heading,
//!        curvature, velocity ceiling).
//!     2. Forward acceleration pass - enforce velocities reachable from the
//!        start under the acceleration and wheel speed limits.
//!     3. Reverse acceleration pass - enforce velocities from which the goal
//!        end velocity can be reached under the same limits.
//!     4. Time integration - convert the velocity profile into timestamps
//!        and derive the remaining state quantities.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod kin;
pub mod loc;
pub mod path;
pub mod robot_config;
pub mod traj;

// ---------------------------------------------------------------------------
// REEXPORTS
// ---------------------------------------------------------------------------

pub use kin::{ChassisSpeeds, DesatMode, DiffKin, Kinematics, SwerveKin, WheelState};
pub use loc::Pose;
pub use path::{
    ActionHandle, ConstraintZone, EventMarker, GoalEndState, Path, PathConstraints, PathError,
    RotationTarget,
};
pub use robot_config::{ConfigError, RobotConfig, RobotConfigParams, Topology};
pub use traj::{Trajectory, TrajectoryState, TrajError, TrajGenError};
