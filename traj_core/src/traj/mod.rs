//! # Trajectory module
//!
//! A trajectory is the time-parameterised result of generation: an ordered,
//! immutable sequence of [`TrajectoryState`]s plus a time-sorted schedule of
//! `(time, action handle)` events. Once built a trajectory is never mutated,
//! so it may be read concurrently - for example by a control loop thread and
//! a telemetry thread - without synchronisation.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod gen;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use gen::TrajGenError;
pub use state::TrajectoryState;

use crate::kin::{ChassisSpeeds, DesatMode};
use crate::loc::Pose;
use crate::path::{ActionHandle, Path};
use crate::robot_config::RobotConfig;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A time-parameterised, kinematically feasible trajectory.
#[derive(Debug, Clone)]
pub struct Trajectory {
    /// The ordered state sequence. Never empty, ordered by non-decreasing
    /// time, first state at time zero.
    states: Vec<TrajectoryState>,

    /// The `(time, action handle)` schedule, sorted by time.
    event_cmds: Vec<(f64, ActionHandle)>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised when accessing a trajectory.
#[derive(Debug, thiserror::Error)]
pub enum TrajError {
    /// The requested state index does not exist. This is a programmer error
    /// in the caller - indices are never silently clamped.
    #[error("State index {index} is out of range for a trajectory of {len} states")]
    OutOfRange { index: usize, len: usize },

    /// Attempted to build a trajectory with no states.
    #[error("A trajectory must contain at least one state")]
    NoStates,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Generate a new trajectory for the given path.
    ///
    /// This is the main entry point of the library. Generation is a single
    /// synchronous computation: the path is sampled into a dense point
    /// sequence, the forward and reverse acceleration passes establish a
    /// feasible velocity profile, and time integration produces the final
    /// state sequence.
    ///
    /// # Arguments
    /// - `path`: the path to follow
    /// - `config`: the robot's drivetrain description
    /// - `starting_speeds`: the robot-relative chassis speeds at the start
    /// - `starting_heading_rad`: the field-relative body heading at the start
    /// - `desat_mode`: how rotation is treated when wheel speeds saturate
    pub fn generate(
        path: &Path,
        config: &RobotConfig,
        starting_speeds: &ChassisSpeeds,
        starting_heading_rad: f64,
        desat_mode: DesatMode,
    ) -> Result<Self, TrajGenError> {
        let (states, event_cmds) =
            gen::generate_states(path, config, starting_speeds, starting_heading_rad, desat_mode)?;

        Ok(Self { states, event_cmds })
    }

    /// Create a trajectory from pre-generated states, with no scheduled
    /// events.
    ///
    /// Returns `TrajError::NoStates` if the state sequence is empty.
    pub fn from_states(states: Vec<TrajectoryState>) -> Result<Self, TrajError> {
        Self::from_states_and_events(states, Vec::new())
    }

    /// Create a trajectory from pre-generated states and a pre-computed
    /// event schedule.
    ///
    /// The events are sorted by time. Returns `TrajError::NoStates` if the
    /// state sequence is empty.
    pub fn from_states_and_events(
        states: Vec<TrajectoryState>,
        mut event_cmds: Vec<(f64, ActionHandle)>,
    ) -> Result<Self, TrajError> {
        if states.is_empty() {
            return Err(TrajError::NoStates);
        }

        event_cmds.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(Self { states, event_cmds })
    }

    /// Get all of the states in the trajectory.
    pub fn get_states(&self) -> &[TrajectoryState] {
        &self.states
    }

    /// Get the state at the given index.
    ///
    /// An out of range index signals an integration bug in the caller, so it
    /// is surfaced as an error rather than being clamped.
    pub fn get_state(&self, index: usize) -> Result<&TrajectoryState, TrajError> {
        self.states.get(index).ok_or(TrajError::OutOfRange {
            index,
            len: self.states.len(),
        })
    }

    /// Get the initial state of the trajectory.
    pub fn get_initial_state(&self) -> &TrajectoryState {
        &self.states[0]
    }

    /// Get the final state of the trajectory.
    pub fn get_end_state(&self) -> &TrajectoryState {
        &self.states[self.states.len() - 1]
    }

    /// Get the total run time of the trajectory in seconds.
    pub fn get_total_time_s(&self) -> f64 {
        self.get_end_state().time_s
    }

    /// Get the pose of the robot at the start of the trajectory.
    pub fn get_initial_pose(&self) -> Pose {
        self.get_initial_state().pose
    }

    /// Get the `(time, action handle)` schedule, sorted by time.
    pub fn get_event_cmds(&self) -> &[(f64, ActionHandle)] {
        &self.event_cmds
    }

    /// Get the target state at the given time along the trajectory.
    ///
    /// The time is defensively clamped to the trajectory's covered range:
    /// times before the start return the initial state and times after the
    /// end return the end state, since callers routinely sample outside the
    /// range (before execution starts, after it completes). Sampling exactly
    /// on a stored timestamp returns that state unmodified; between
    /// timestamps the bracketing states are interpolated.
    pub fn sample(&self, time_s: f64) -> TrajectoryState {
        let first = self.get_initial_state();
        let last = self.get_end_state();

        if time_s <= first.time_s {
            return first.clone();
        }
        if time_s >= last.time_s {
            return last.clone();
        }

        // Index of the first state at or after the requested time. The
        // clamps above guarantee 0 < idx < len.
        let idx = self
            .states
            .partition_point(|state| state.time_s < time_s);

        let hi = &self.states[idx];
        if hi.time_s == time_s {
            return hi.clone();
        }

        let lo = &self.states[idx - 1];
        let dt_s = hi.time_s - lo.time_s;
        if dt_s <= 0.0 {
            return hi.clone();
        }

        lo.interpolate(hi, (time_s - lo.time_s) / dt_s)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::kin::WheelState;
    use nalgebra::Vector2;

    fn state(time_s: f64, x_m: f64, vel_ms: f64) -> TrajectoryState {
        TrajectoryState {
            time_s,
            pose: Pose::new(Vector2::new(x_m, 0.0), 0.0),
            velocity_ms: vel_ms,
            accel_mss: 0.0,
            ang_vel_rads: 0.0,
            curv_m: 0.0,
            wheel_states: vec![
                WheelState {
                    speed_ms: vel_ms,
                    angle_rad: 0.0,
                };
                2
            ],
        }
    }

    fn three_state_traj() -> Trajectory {
        Trajectory::from_states(vec![
            state(0.0, 0.0, 0.0),
            state(1.0, 1.0, 2.0),
            state(2.0, 3.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_states_rejected() {
        assert!(matches!(
            Trajectory::from_states(Vec::new()),
            Err(TrajError::NoStates)
        ));
    }

    #[test]
    fn test_get_state_out_of_range() {
        let traj = three_state_traj();

        assert!(traj.get_state(2).is_ok());
        assert!(matches!(
            traj.get_state(3),
            Err(TrajError::OutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_sample_exact_timestamps() {
        let traj = three_state_traj();

        // Sampling on a stored timestamp returns that state unmodified
        for i in 0..3 {
            let expected = traj.get_state(i).unwrap();
            assert_eq!(&traj.sample(expected.time_s), expected);
        }
    }

    #[test]
    fn test_sample_clamps() {
        let traj = three_state_traj();

        assert_eq!(&traj.sample(-1.0), traj.get_initial_state());
        assert_eq!(&traj.sample(traj.get_total_time_s() + 5.0), traj.get_end_state());
    }

    #[test]
    fn test_sample_interpolates() {
        let traj = three_state_traj();

        let s = traj.sample(0.5);
        assert!((s.time_s - 0.5).abs() < 1e-12);
        assert!((s.pose.position_m[0] - 0.5).abs() < 1e-12);
        assert!((s.velocity_ms - 1.0).abs() < 1e-12);

        // Values lie within the convex combination of the bracketing states
        let s = traj.sample(1.5);
        assert!(s.velocity_ms >= 0.0 && s.velocity_ms <= 2.0);
        assert!(s.pose.position_m[0] >= 1.0 && s.pose.position_m[0] <= 3.0);
    }

    #[test]
    fn test_sample_is_idempotent() {
        let traj = three_state_traj();
        assert_eq!(traj.sample(0.7), traj.sample(0.7));
    }

    #[test]
    fn test_events_sorted() {
        let events = vec![
            (2.0, ActionHandle("late".into())),
            (0.5, ActionHandle("early".into())),
        ];
        let traj = Trajectory::from_states_and_events(
            vec![state(0.0, 0.0, 0.0), state(2.0, 1.0, 0.0)],
            events,
        )
        .unwrap();

        let cmds = traj.get_event_cmds();
        assert_eq!(cmds[0].1, ActionHandle("early".into()));
        assert_eq!(cmds[1].1, ActionHandle("late".into()));
    }
}
