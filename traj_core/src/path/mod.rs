//! # Path module
//!
//! This module defines the path consumed by the trajectory generator: an
//! ordered sequence of waypoints, the kinematic constraints that apply along
//! it, optional heading targets for holonomic drivetrains, and event markers
//! whose actions an external scheduler will run against trajectory time.
//!
//! Authoring and editing of paths is out of scope for this library - a path
//! arrives fully formed (for example deserialised from a planner's output)
//! and is only validated here.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A path defining the desired trajectory of the robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    /// The ordered waypoint positions in the field frame.
    ///
    /// Units: meters
    pub points_m: Vec<Vector2<f64>>,

    /// The constraints applying wherever no constraint zone is active.
    pub global_constraints: PathConstraints,

    /// Zones along the path with their own constraints. Where zones overlap
    /// the innermost (shortest) zone wins.
    pub constraint_zones: Vec<ConstraintZone>,

    /// Heading targets along the path, ordered by position. Only used for
    /// holonomic drivetrains; differential drivetrains always face along the
    /// path tangent.
    pub rotation_targets: Vec<RotationTarget>,

    /// Markers whose actions the external scheduler should run when the
    /// trajectory reaches them.
    pub event_markers: Vec<EventMarker>,

    /// The state the robot should be in when it reaches the end of the path.
    pub goal_end_state: GoalEndState,

    /// Maximum separation between sampled points along the path.
    ///
    /// Units: meters
    pub point_sep_m: f64,
}

/// Kinematic constraints applying along a path or within a zone of it.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConstraints {
    /// Maximum linear velocity.
    ///
    /// Units: meters/second
    pub max_vel_ms: f64,

    /// Maximum linear acceleration.
    ///
    /// Units: meters/second^2
    pub max_acc_mss: f64,

    /// Maximum angular velocity.
    ///
    /// Units: radians/second
    pub max_ang_vel_rads: f64,

    /// Maximum angular acceleration.
    ///
    /// Units: radians/second^2
    pub max_ang_acc_radss: f64,
}

/// A sub-range of the path with its own constraints.
///
/// Positions are fractions of the path's total arc length in [0, 1].
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct ConstraintZone {
    /// Fractional position at which the zone begins.
    pub min_pos: f64,

    /// Fractional position at which the zone ends.
    pub max_pos: f64,

    /// The constraints applying within the zone.
    pub constraints: PathConstraints,
}

/// A desired body heading at a fractional position along the path.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct RotationTarget {
    /// Fractional position of the target along the path in [0, 1].
    pub pos: f64,

    /// The desired body heading.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// A marker at a fractional position along the path whose action should be
/// run when the trajectory reaches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMarker {
    /// Fractional position of the marker along the path in [0, 1].
    pub pos: f64,

    /// The action to run.
    pub action: ActionHandle,
}

/// An opaque handle identifying an action to run.
///
/// Resolving the handle to actual behaviour is the job of the external
/// scheduler; this library only carries handles through to the trajectory's
/// event schedule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionHandle(pub String);

/// The state the robot should be in when it reaches the end of the path.
///
/// The end velocity is an explicit, mandatory field: the reverse
/// acceleration pass always decelerates towards it and never assumes an
/// implicit default.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct GoalEndState {
    /// Velocity at the end of the path.
    ///
    /// Units: meters/second
    pub velocity_ms: f64,

    /// Body heading at the end of the path.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised while validating a path.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("A path must contain at least two waypoints, found {0}")]
    TooFewPoints(usize),

    #[error("Point separation must be positive, got {0}")]
    InvalidPointSep(f64),

    #[error("Constraint zone range [{min_pos}, {max_pos}] is invalid")]
    InvalidZoneRange { min_pos: f64, max_pos: f64 },

    #[error("Fractional position {0} is outside [0, 1]")]
    InvalidFractionalPos(f64),

    #[error("Rotation targets must be ordered by position")]
    UnorderedRotationTargets,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Path {
    /// Create a new path between the given waypoints with constraints
    /// applying over its whole length and no rotation targets or event
    /// markers.
    pub fn new(
        points_m: Vec<Vector2<f64>>,
        global_constraints: PathConstraints,
        goal_end_state: GoalEndState,
        point_sep_m: f64,
    ) -> Self {
        Self {
            points_m,
            global_constraints,
            constraint_zones: Vec::new(),
            rotation_targets: Vec::new(),
            event_markers: Vec::new(),
            goal_end_state,
            point_sep_m,
        }
    }

    /// Validate the path.
    ///
    /// Checks that there are enough waypoints to form at least one segment,
    /// that the sampling separation is usable, that zone ranges are sane and
    /// that rotation targets are ordered.
    pub fn validate(&self) -> Result<(), PathError> {
        if self.points_m.len() < 2 {
            return Err(PathError::TooFewPoints(self.points_m.len()));
        }

        if !self.point_sep_m.is_finite() || self.point_sep_m <= 0.0 {
            return Err(PathError::InvalidPointSep(self.point_sep_m));
        }

        for zone in &self.constraint_zones {
            if !(0.0..=1.0).contains(&zone.min_pos)
                || !(0.0..=1.0).contains(&zone.max_pos)
                || zone.min_pos > zone.max_pos
            {
                return Err(PathError::InvalidZoneRange {
                    min_pos: zone.min_pos,
                    max_pos: zone.max_pos,
                });
            }
        }

        for target in &self.rotation_targets {
            if !(0.0..=1.0).contains(&target.pos) {
                return Err(PathError::InvalidFractionalPos(target.pos));
            }
        }

        for marker in &self.event_markers {
            if !(0.0..=1.0).contains(&marker.pos) {
                return Err(PathError::InvalidFractionalPos(marker.pos));
            }
        }

        let sorted = self
            .rotation_targets
            .windows(2)
            .all(|w| w[0].pos <= w[1].pos);
        if !sorted {
            return Err(PathError::UnorderedRotationTargets);
        }

        Ok(())
    }

    /// Get the constraints active at the given fractional position along the
    /// path.
    ///
    /// Where constraint zones overlap the innermost (shortest) zone wins;
    /// outside all zones the global constraints apply.
    pub fn constraints_at(&self, pos: f64) -> PathConstraints {
        let mut active = self.global_constraints;
        let mut active_span = std::f64::INFINITY;

        for zone in &self.constraint_zones {
            if pos >= zone.min_pos && pos <= zone.max_pos {
                let span = zone.max_pos - zone.min_pos;
                if span < active_span {
                    active = zone.constraints;
                    active_span = span;
                }
            }
        }

        active
    }

    /// Return the length of the path in meters.
    ///
    /// If the path has fewer than two points `None` is returned.
    pub fn get_length(&self) -> Option<f64> {
        if self.points_m.len() < 2 {
            return None;
        }

        Some(
            self.points_m
                .windows(2)
                .map(|w| (w[1] - w[0]).norm())
                .sum(),
        )
    }

    /// Get the number of waypoints in the path.
    pub fn get_num_points(&self) -> usize {
        self.points_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_m.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn constraints(max_vel_ms: f64) -> PathConstraints {
        PathConstraints {
            max_vel_ms,
            max_acc_mss: 2.0,
            max_ang_vel_rads: 6.0,
            max_ang_acc_radss: 10.0,
        }
    }

    fn straight_path() -> Path {
        Path::new(
            vec![Vector2::new(0.0, 0.0), Vector2::new(4.0, 0.0)],
            constraints(3.0),
            GoalEndState {
                velocity_ms: 0.0,
                heading_rad: 0.0,
            },
            0.05,
        )
    }

    #[test]
    fn test_validate_ok() {
        assert!(straight_path().validate().is_ok());
    }

    #[test]
    fn test_too_few_points() {
        let mut path = straight_path();
        path.points_m.truncate(1);
        assert!(matches!(path.validate(), Err(PathError::TooFewPoints(1))));

        path.points_m.clear();
        assert!(matches!(path.validate(), Err(PathError::TooFewPoints(0))));
    }

    #[test]
    fn test_invalid_zone_rejected() {
        let mut path = straight_path();
        path.constraint_zones.push(ConstraintZone {
            min_pos: 0.8,
            max_pos: 0.2,
            constraints: constraints(1.0),
        });

        assert!(matches!(
            path.validate(),
            Err(PathError::InvalidZoneRange { .. })
        ));
    }

    #[test]
    fn test_unordered_targets_rejected() {
        let mut path = straight_path();
        path.rotation_targets = vec![
            RotationTarget {
                pos: 0.7,
                heading_rad: 0.0,
            },
            RotationTarget {
                pos: 0.3,
                heading_rad: 1.0,
            },
        ];

        assert!(matches!(
            path.validate(),
            Err(PathError::UnorderedRotationTargets)
        ));
    }

    #[test]
    fn test_innermost_zone_wins() {
        let mut path = straight_path();
        path.constraint_zones = vec![
            ConstraintZone {
                min_pos: 0.0,
                max_pos: 1.0,
                constraints: constraints(2.0),
            },
            ConstraintZone {
                min_pos: 0.4,
                max_pos: 0.6,
                constraints: constraints(1.0),
            },
        ];

        assert!((path.constraints_at(0.5).max_vel_ms - 1.0).abs() < 1e-12);
        assert!((path.constraints_at(0.1).max_vel_ms - 2.0).abs() < 1e-12);
        // Outside all zones the global constraints apply
        path.constraint_zones.remove(0);
        assert!((path.constraints_at(0.1).max_vel_ms - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_get_length() {
        assert!((straight_path().get_length().unwrap() - 4.0).abs() < 1e-12);

        let mut path = straight_path();
        path.points_m.truncate(1);
        assert!(path.get_length().is_none());
    }
}
