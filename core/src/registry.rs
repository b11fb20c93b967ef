use std::{collections::HashMap, process::ExitStatus};

use launch_api::InstanceInfo;
use tokio::process::Child;
use tracing::warn;

/// Runtime handle to one spawned engine process.
#[derive(Debug)]
pub struct ProcessHandle {
    pub id: u32,
    pub killed: bool,
    child: Option<Child>,
}

impl ProcessHandle {
    pub fn new(id: u32, child: Child) -> Self {
        Self {
            id,
            killed: false,
            child: Some(child),
        }
    }

    /// A handle with no OS process behind it. It never reports an exit.
    pub fn detached(id: u32) -> Self {
        Self {
            id,
            killed: false,
            child: None,
        }
    }

    /// Ask the process to stop without waiting for it.
    pub fn kill(&mut self) {
        if let Some(child) = self.child.as_mut() {
            if let Err(err) = child.start_kill() {
                warn!(pid = self.id, "failed to kill instance: {err}");
            }
        }
        self.killed = true;
    }

    /// Exit status, if the process has already finished.
    pub fn poll_exit(&mut self) -> Option<ExitStatus> {
        let child = self.child.as_mut()?;
        match child.try_wait() {
            Ok(status) => status,
            Err(err) => {
                warn!(pid = self.id, "failed to poll instance: {err}");
                None
            }
        }
    }
}

/// Spawned instances keyed by process id. Entries stay until they are
/// reaped; killing an instance does not remove it.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    handles: HashMap<u32, ProcessHandle>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn insert(&mut self, handle: ProcessHandle) {
        self.handles.insert(handle.id, handle);
    }

    pub fn get(&self, id: u32) -> Option<&ProcessHandle> {
        self.handles.get(&id)
    }

    /// Request a kill on every live handle, returning the ids signalled.
    pub fn kill_all(&mut self) -> Vec<u32> {
        let mut killed: Vec<u32> = self
            .handles
            .values_mut()
            .filter(|handle| !handle.killed)
            .map(|handle| {
                handle.kill();
                handle.id
            })
            .collect();
        killed.sort_unstable();
        killed
    }

    /// Remove every handle whose process has exited.
    pub fn reap(&mut self) -> Vec<(u32, ExitStatus)> {
        let mut exited = Vec::new();
        for handle in self.handles.values_mut() {
            if let Some(status) = handle.poll_exit() {
                exited.push((handle.id, status));
            }
        }
        for (id, _) in &exited {
            self.handles.remove(id);
        }
        exited.sort_unstable_by_key(|(id, _)| *id);
        exited
    }

    /// Snapshot of the registry, sorted by pid.
    pub fn list(&self) -> Vec<InstanceInfo> {
        let mut list: Vec<InstanceInfo> = self
            .handles
            .values()
            .map(|handle| InstanceInfo {
                pid: handle.id,
                killed: handle.killed,
            })
            .collect();
        list.sort_unstable_by_key(|info| info.pid);
        list
    }
}
