use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;

/// Launch LÖVE games from the project containing the file you are editing.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Configuration file (defaults to `launcher.toml` in the config dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the game containing a file.
    Launch {
        /// The file currently open in the editor.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Workspace roots bounding the search (defaults to the current directory).
        #[arg(long = "root")]
        roots: Vec<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Show which directory would be launched, without launching.
    Locate {
        #[arg(long)]
        file: PathBuf,
        #[arg(long = "root")]
        roots: Vec<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Serve launch requests as line-delimited JSON on stdin/stdout.
    Session {
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Print the effective configuration.
    Config {
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn launch_accepts_repeated_roots_and_overrides() {
        let cli = Cli::try_parse_from([
            "lovelauncher",
            "launch",
            "--file",
            "/proj/src/main.lua",
            "--root",
            "/proj",
            "--root",
            "/other",
            "--max-instances",
            "2",
            "--overwrite",
            "true",
        ])
        .unwrap();
        let Command::Launch {
            file,
            roots,
            overrides,
        } = cli.command
        else {
            panic!("expected launch");
        };
        assert_eq!(file, Some(PathBuf::from("/proj/src/main.lua")));
        assert_eq!(roots.len(), 2);
        assert_eq!(overrides.max_instances, Some(2));
        assert_eq!(overrides.overwrite, Some(true));
    }

    #[test]
    fn global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["lovelauncher", "session", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
