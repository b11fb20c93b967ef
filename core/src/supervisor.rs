use std::{io, path::Path, path::PathBuf};

use launch_api::{InstanceInfo, LaunchConfig, LaunchReport, WorkspaceRoot};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::{
    error::LaunchError,
    events::{
        EventBus, INSTANCE_EXITED, INSTANCE_KILL_REQUESTED, INSTANCE_LAUNCHED, WORKSPACE_SAVE_ALL,
    },
    paths::locate_game_dir,
    platform::{Invocation, Platform},
    registry::{InstanceRegistry, ProcessHandle},
};

/// Starts processes for the supervisor.
pub trait Spawner {
    fn spawn(&self, invocation: &Invocation) -> Result<ProcessHandle, LaunchError>;
}

/// Spawns real OS processes through tokio.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSpawner;

impl Spawner for OsSpawner {
    fn spawn(&self, invocation: &Invocation) -> Result<ProcessHandle, LaunchError> {
        let child = invocation.command().spawn().map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                LaunchError::ExecutableNotFound(PathBuf::from(invocation.program()))
            } else {
                LaunchError::SpawnFailed(err)
            }
        })?;
        let id = child.id().ok_or_else(|| {
            LaunchError::SpawnFailed(io::Error::other("process exited before reporting a pid"))
        })?;
        Ok(ProcessHandle::new(id, child))
    }
}

/// Owns the spawned engine instances of one editor session and decides
/// whether and how a new one is started.
pub struct LaunchSupervisor<S = OsSpawner> {
    platform: Platform,
    spawner: S,
    registry: InstanceRegistry,
    events: EventBus,
}

impl LaunchSupervisor<OsSpawner> {
    pub fn new() -> Self {
        Self::with_spawner(Platform::current(), OsSpawner)
    }
}

impl Default for LaunchSupervisor<OsSpawner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Spawner> LaunchSupervisor<S> {
    pub fn with_spawner(platform: Platform, spawner: S) -> Self {
        Self {
            platform,
            spawner,
            registry: InstanceRegistry::new(),
            events: EventBus::new(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut InstanceRegistry {
        &mut self.registry
    }

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn instances(&self) -> Vec<InstanceInfo> {
        self.registry.list()
    }

    /// Drop instances that have exited, returning their pids.
    pub fn reconcile(&mut self) -> Vec<u32> {
        let exited = self.registry.reap();
        for (pid, status) in &exited {
            if status.success() {
                info!(pid, "instance exited");
            } else {
                warn!(pid, %status, "instance exited with failure; check the engine path and name");
            }
            self.events
                .publish(INSTANCE_EXITED, json!({"pid": pid, "code": status.code()}));
        }
        exited.into_iter().map(|(pid, _)| pid).collect()
    }

    /// Launch the engine for the project containing `active_file`.
    pub fn launch(
        &mut self,
        active_file: Option<&Path>,
        roots: &[WorkspaceRoot],
        config: &LaunchConfig,
    ) -> Result<LaunchReport, LaunchError> {
        self.reconcile();

        let active_file = active_file.ok_or(LaunchError::NoActiveDocument)?;
        let location = locate_game_dir(roots, active_file, &config.entry_file)
            .ok_or(LaunchError::NoWorkspaceRoot)?;
        debug!(
            root = %location.root.name,
            path = %location.root.path.display(),
            "resolved workspace root"
        );
        let game_dir = location.game_dir;

        if self.registry.len() >= config.max_instances as usize && !config.overwrite_on_launch {
            warn!(
                running = self.registry.len(),
                max = config.max_instances,
                "instance limit reached"
            );
            return Err(LaunchError::CapacityExceeded {
                max: config.max_instances,
            });
        }

        if config.save_all_before_launch {
            self.events.publish(WORKSPACE_SAVE_ALL, json!({}));
        }

        if config.overwrite_on_launch {
            for pid in self.registry.kill_all() {
                debug!(pid, "kill requested");
                self.events
                    .publish(INSTANCE_KILL_REQUESTED, json!({"pid": pid}));
            }
        }

        let invocation = self.platform.invocation(config, &game_dir);
        let handle = self.spawner.spawn(&invocation).inspect_err(|err| {
            warn!(?invocation, "spawn failed: {err}");
        })?;
        let pid = handle.id;
        self.registry.insert(handle);

        info!(pid, game_dir = %game_dir.display(), "launched instance");
        self.events.publish(
            INSTANCE_LAUNCHED,
            json!({"pid": pid, "game_dir": game_dir}),
        );
        Ok(LaunchReport { game_dir, pid })
    }
}
