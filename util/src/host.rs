//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory of the software installation.
///
/// The root is read from the `TRAJ_SW_ROOT` environment variable, which must
/// be set before any executable is run. Parameter files and session
/// directories are located relative to this root.
pub fn get_traj_sw_root() -> Result<PathBuf, std::env::VarError> {
    let root = std::env::var("TRAJ_SW_ROOT")?;

    Ok(PathBuf::from(root))
}
