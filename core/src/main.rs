use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lovelauncher::{
    cli::{Cli, Command},
    config,
    paths::locate_game_dir,
    workspace_roots, LaunchSupervisor, Session,
};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to command output and the session protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("reading current directory")?;

    match cli.command {
        Command::Launch {
            file,
            roots,
            overrides,
        } => {
            let config = config::load(cli.config.as_deref(), &overrides)?;
            let roots = workspace_roots(&roots, &cwd);
            let mut supervisor = LaunchSupervisor::new();
            let report = supervisor.launch(file.as_deref(), &roots, &config)?;
            println!(
                "launched {} (pid {})",
                report.game_dir.display(),
                report.pid
            );
        }
        Command::Locate {
            file,
            roots,
            overrides,
        } => {
            let config = config::load(cli.config.as_deref(), &overrides)?;
            let roots = workspace_roots(&roots, &cwd);
            let location = locate_game_dir(&roots, &file, &config.entry_file)
                .ok_or(lovelauncher::LaunchError::NoWorkspaceRoot)?;
            println!(
                "root    {} ({})",
                location.root.name,
                location.root.path.display()
            );
            for dir in &location.matches {
                println!("match   {}", dir.display());
            }
            println!("launch  {}", location.game_dir.display());
        }
        Command::Session { overrides } => {
            let config = config::load(cli.config.as_deref(), &overrides)?;
            let mut session = Session::new(LaunchSupervisor::new(), config);
            session
                .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
                .await?;
        }
        Command::Config { overrides } => {
            if let Some(path) = config::config_path(cli.config.as_deref()) {
                info!("config file: {}", path.display());
            }
            let config = config::load(cli.config.as_deref(), &overrides)?;
            print!("{}", config::render(&config)?);
        }
    }
    Ok(())
}
