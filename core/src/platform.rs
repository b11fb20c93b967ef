use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use launch_api::LaunchConfig;
use tokio::process::Command;

/// Host family used to pick how the engine gets started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Other,
}

/// A fully built process invocation, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Run `program` with `args`, no shell involved.
    Direct { program: OsString, args: Vec<OsString> },
    /// Hand a command line to `sh -c`.
    Shell { command_line: String },
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    /// Build the invocation that starts the engine on `game_dir`.
    pub fn invocation(self, config: &LaunchConfig, game_dir: &Path) -> Invocation {
        let executable = executable_path(config);
        match self {
            Platform::Windows => {
                let mut args = vec![game_dir.as_os_str().to_os_string()];
                if config.use_console_subsystem {
                    args.push("--console".into());
                }
                Invocation::Direct {
                    program: executable.into_os_string(),
                    args,
                }
            }
            Platform::MacOs => Invocation::Shell {
                command_line: format!(
                    "open -n -a {} {}",
                    shell_quote(&config.executable_name),
                    shell_quote(&game_dir.to_string_lossy())
                ),
            },
            Platform::Other => Invocation::Shell {
                command_line: format!(
                    "{} {}",
                    shell_quote(&executable.to_string_lossy()),
                    shell_quote(&game_dir.to_string_lossy())
                ),
            },
        }
    }
}

impl Invocation {
    /// Turn the invocation into a command. The child gets no stdio of ours.
    pub fn command(&self) -> Command {
        let mut cmd = match self {
            Invocation::Direct { program, args } => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
            Invocation::Shell { command_line } => {
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(command_line);
                cmd
            }
        };
        // stdout may be carrying the session protocol
        cmd.stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(false);
        cmd
    }

    /// The program the OS is asked to execute.
    pub fn program(&self) -> OsString {
        match self {
            Invocation::Direct { program, .. } => program.clone(),
            Invocation::Shell { .. } => "sh".into(),
        }
    }
}

/// Join the executable directory and name, dropping `.` and folding `..`
/// lexically. A bare name is left for the OS to look up on `PATH`.
pub fn executable_path(config: &LaunchConfig) -> PathBuf {
    let joined = config.executable_dir.join(&config.executable_name);
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir
                if matches!(out.components().next_back(), Some(Component::Normal(_))) =>
            {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Single-quote a word for POSIX `sh`, leaving plain words untouched.
pub fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+=:,@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
