use std::path::{Component, Path, PathBuf};

use launch_api::WorkspaceRoot;
use tracing::debug;

/// Upper bound on parent steps taken by any ancestor walk.
pub const MAX_WALK_DEPTH: usize = 256;

/// Make a path absolute and resolve `.` and `..` lexically, without touching
/// the filesystem. Relative paths are taken against the working directory.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().unwrap_or_default()
    };
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Find the first candidate root that is `target` itself or one of its
/// ancestors. Candidates are checked in the order given.
pub fn resolve_root<'a>(candidates: &'a [WorkspaceRoot], target: &Path) -> Option<&'a WorkspaceRoot> {
    let target = normalize(target);
    candidates.iter().find(|root| {
        let root_path = normalize(&root.path);
        target
            .ancestors()
            .take(MAX_WALK_DEPTH)
            .any(|ancestor| ancestor == root_path)
    })
}

/// The entry file as a path below a directory. `None` when it is absolute,
/// rooted, climbs with `..` or names nothing.
pub fn entry_relative_path(entry_file: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(entry_file).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (!out.as_os_str().is_empty()).then_some(out)
}

/// Where a launch for `file` would run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLocation {
    /// The containing workspace root, with its path normalized.
    pub root: WorkspaceRoot,
    /// Every ancestor holding the entry file, nearest first.
    pub matches: Vec<PathBuf>,
    /// The nearest match, or the root when there is none.
    pub game_dir: PathBuf,
}

/// Resolve the workspace root of `file` and pick the game directory inside
/// it. `None` when no root contains `file`.
pub fn locate_game_dir(roots: &[WorkspaceRoot], file: &Path, entry_file: &str) -> Option<GameLocation> {
    let root = resolve_root(roots, file)?;
    let root_path = normalize(&root.path);
    let matches = walk_up_for_entry_file(file, entry_file, &root_path);
    let game_dir = matches.first().cloned().unwrap_or_else(|| root_path.clone());
    Some(GameLocation {
        root: WorkspaceRoot::new(root.name.clone(), root_path),
        matches,
        game_dir,
    })
}

/// Walk outward from `start` towards `boundary`, collecting every ancestor
/// directory that contains `entry_file`. Results are nearest first.
///
/// The directory holding `start` is the first one tested and `boundary` is
/// the last. A walk that starts at `boundary` tests nothing. If `start` is
/// not below `boundary` the walk ends at the filesystem root.
pub fn walk_up_for_entry_file(start: &Path, entry_file: &str, boundary: &Path) -> Vec<PathBuf> {
    let Some(entry_file) = entry_relative_path(entry_file) else {
        debug!(entry_file, "entry file does not name a path inside a directory");
        return Vec::new();
    };
    let boundary = normalize(boundary);
    let mut current = normalize(start);
    let mut found = Vec::new();

    for _ in 0..MAX_WALK_DEPTH {
        if current == boundary {
            break;
        }
        let Some(parent) = current.parent() else {
            break;
        };
        current = parent.to_path_buf();
        if current.join(&entry_file).exists() {
            debug!(dir = %current.display(), entry_file = %entry_file.display(), "found entry file");
            found.push(current.clone());
        }
    }
    found
}
