// dashboard/src/main.rs
use clap::{Parser, Subcommand};
use common::{setup_tracing, Config};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use webnok_dashboard::{
    AuthenticatedFetcher, FileStore, Logout, Refresh, SessionStore, ShellHandle, SubmitLogin,
};

#[derive(Debug, Parser)]
#[command(name = "webnok", version, about = "Webnok client dashboard")]
struct Cli {
    /// Backend base URL (overrides configuration)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Session storage file (overrides configuration)
    #[arg(long, global = true)]
    storage_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and show the dashboard
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "WEBNOK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the dashboard for the stored session (default)
    Show {
        /// Reload every N seconds until the session ends
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
    /// End the stored session
    Logout,
}

#[actix::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration, then apply command line overrides
    let mut config = Config::from_env();
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    if let Some(path) = cli.storage_path {
        config.storage_path = path;
    }
    config.validate()?;

    setup_tracing(&config.log_level);
    tracing::debug!("Using backend {:?}", config.api_base());

    let storage = Arc::new(FileStore::new(&config.storage_path));
    let session = SessionStore::new(storage);
    let fetcher = AuthenticatedFetcher::new(config.api_base(), session.clone());
    let mut shell = ShellHandle::start(session, fetcher);

    match cli.command.unwrap_or(Command::Show { watch: None }) {
        Command::Login { username, password } => {
            let result = shell.addr().send(SubmitLogin { username, password }).await?;
            println!("{}", shell.settled().await);
            if result.is_err() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Show { watch } => loop {
            let view = shell.settled().await;
            println!("{}", view);

            let interval = match watch {
                Some(secs) if !view.is_login() => Duration::from_secs(secs.max(1)),
                _ => break,
            };
            tokio::time::sleep(interval).await;
            shell.addr().send(Refresh).await?;
        },
        Command::Logout => {
            shell.addr().send(Logout).await?;
            println!("{}", shell.settled().await);
        }
    }

    Ok(ExitCode::SUCCESS)
}
