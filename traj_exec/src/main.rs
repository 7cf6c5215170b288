//! Main trajectory generation executable entry point.
//!
//! This executable demonstrates the full generation pipeline:
//!
//!     - Initialise the session and logging
//!     - Load the robot configuration parameters
//!     - Load a path (from a JSON file given on the command line, or a
//!       built-in demonstration path)
//!     - Generate the trajectory
//!     - Archive the state sequence and event schedule into the session
//!       directory for later inspection and plotting
//!
//! The generated trajectory itself is transient - it is recomputed per
//! execution from the path and robot config, the archives exist purely for
//! analysis.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::info;
use nalgebra::Vector2;
use serde::Serialize;
use std::env;

// Internal
use traj_core::{
    ActionHandle, ChassisSpeeds, ConstraintZone, DesatMode, EventMarker, GoalEndState, Path,
    PathConstraints, RobotConfig, RobotConfigParams, RotationTarget, Trajectory,
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A flattened trajectory state for CSV archiving. Wheel states are carried
/// in the JSON archive instead, as their count varies with topology.
#[derive(Serialize)]
struct StateRecord {
    time_s: f64,
    x_m: f64,
    y_m: f64,
    heading_rad: f64,
    velocity_ms: f64,
    accel_mss: f64,
    ang_vel_rads: f64,
    curv_m: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("traj_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Trajectory Generation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let config_params: RobotConfigParams =
        util::params::load("robot_config.toml").wrap_err("Could not load robot config params")?;

    let config = RobotConfig::from_params(&config_params)
        .wrap_err("Robot config params are invalid")?;

    info!(
        "Robot config loaded: {:?} topology, {} wheels",
        config.topology(),
        config.num_wheels()
    );

    // ---- LOAD PATH ----

    let path = match env::args().nth(1) {
        Some(file) => {
            info!("Loading path from {:?}", file);
            let path_str = std::fs::read_to_string(&file)
                .wrap_err_with(|| format!("Could not read the path file {:?}", file))?;
            serde_json::from_str(&path_str)
                .wrap_err_with(|| format!("Could not parse the path file {:?}", file))?
        }
        None => {
            info!("No path file given, using the demonstration path");
            demo_path()
        }
    };

    // ---- GENERATE ----

    let traj = Trajectory::generate(
        &path,
        &config,
        &ChassisSpeeds::default(),
        0.0,
        DesatMode::ScaleBoth,
    )
    .wrap_err("Failed to generate the trajectory")?;

    info!("Trajectory generated:");
    info!("    {} states", traj.get_states().len());
    info!("    total time: {:.3} s", traj.get_total_time_s());
    info!("    {} scheduled events", traj.get_event_cmds().len());

    for (time_s, action) in traj.get_event_cmds() {
        info!("    event {:?} at {:.3} s", action, time_s);
    }

    // ---- ARCHIVE ----

    archive_trajectory(&session, &traj)?;

    session.save("trajectory.json", &traj.get_states());
    session.save("events.json", &traj.get_event_cmds());

    info!("Archives written, exiting");

    Ok(())
}

/// Write the trajectory's state sequence as a CSV archive in the session.
fn archive_trajectory(session: &Session, traj: &Trajectory) -> Result<(), Report> {
    let mut archiver = Archiver::from_path(session, "trajectory.csv")
        .map_err(|e| eyre!("Could not create the trajectory archive: {}", e))?;

    for state in traj.get_states() {
        archiver
            .serialise(StateRecord {
                time_s: state.time_s,
                x_m: state.pose.position_m[0],
                y_m: state.pose.position_m[1],
                heading_rad: state.pose.heading_rad,
                velocity_ms: state.velocity_ms,
                accel_mss: state.accel_mss,
                ang_vel_rads: state.ang_vel_rads,
                curv_m: state.curv_m,
            })
            .map_err(|e| eyre!("Could not serialise a trajectory state: {}", e))?;
    }

    Ok(())
}

/// Build the demonstration path: an S shaped drive with a slow zone around
/// the middle corner, a half turn of heading over the drive, and a pair of
/// event markers.
fn demo_path() -> Path {
    let mut path = Path::new(
        vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(4.0, 3.0),
            Vector2::new(8.0, 3.0),
        ],
        PathConstraints {
            max_vel_ms: 4.0,
            max_acc_mss: 3.0,
            max_ang_vel_rads: 6.0,
            max_ang_acc_radss: 12.0,
        },
        GoalEndState {
            velocity_ms: 0.0,
            heading_rad: std::f64::consts::PI,
        },
        0.05,
    );

    // Slow zone covering the middle leg
    path.constraint_zones = vec![ConstraintZone {
        min_pos: 0.35,
        max_pos: 0.65,
        constraints: PathConstraints {
            max_vel_ms: 1.5,
            max_acc_mss: 3.0,
            max_ang_vel_rads: 6.0,
            max_ang_acc_radss: 12.0,
        },
    }];

    // Half turn of body heading over the course of the drive (only
    // meaningful for holonomic drivetrains)
    path.rotation_targets = vec![
        RotationTarget {
            pos: 0.5,
            heading_rad: std::f64::consts::FRAC_PI_2,
        },
        RotationTarget {
            pos: 1.0,
            heading_rad: std::f64::consts::PI,
        },
    ];

    path.event_markers = vec![
        EventMarker {
            pos: 0.25,
            action: ActionHandle("arm_down".into()),
        },
        EventMarker {
            pos: 0.9,
            action: ActionHandle("start_intake".into()),
        },
    ];

    path
}
