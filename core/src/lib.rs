pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod ipc;
pub mod paths;
pub mod platform;
pub mod registry;
pub mod session;
pub mod supervisor;

pub use error::LaunchError;
pub use session::Session;
pub use supervisor::{LaunchSupervisor, OsSpawner, Spawner};

use launch_api::WorkspaceRoot;
use std::path::{Path, PathBuf};

/// Turn plain directories into workspace roots, naming each after its last
/// component. An empty list falls back to `cwd`.
pub fn workspace_roots(dirs: &[PathBuf], cwd: &Path) -> Vec<WorkspaceRoot> {
    if dirs.is_empty() {
        return vec![root_for(cwd)];
    }
    dirs.iter().map(|dir| root_for(dir)).collect()
}

fn root_for(dir: &Path) -> WorkspaceRoot {
    let path = paths::normalize(dir);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    WorkspaceRoot::new(name, path)
}
