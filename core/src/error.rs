use std::{io, path::PathBuf};

use thiserror::Error;

/// Reasons a launch request is refused or fails. None of these are fatal to
/// the launcher itself.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no active document; open a file from your project first")]
    NoActiveDocument,
    #[error(
        "the active document is not inside any workspace root; open your project as a workspace folder"
    )]
    NoWorkspaceRoot,
    #[error(
        "you have reached your max concurrent LÖVE instances ({max}); raise maxInstances or enable overwrite in your config"
    )]
    CapacityExceeded { max: u32 },
    #[error("engine executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),
    #[error("failed to spawn engine: {0}")]
    SpawnFailed(#[source] io::Error),
}

impl LaunchError {
    /// Error code used in session responses.
    pub fn code(&self) -> i32 {
        match self {
            LaunchError::NoActiveDocument => -32001,
            LaunchError::NoWorkspaceRoot => -32002,
            LaunchError::CapacityExceeded { .. } => -32003,
            LaunchError::ExecutableNotFound(_) => -32004,
            LaunchError::SpawnFailed(_) => -32005,
        }
    }
}
