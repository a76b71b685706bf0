mod commands;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bugdesk_client::{ApiClient, ClientConfig, FileSessionStore, SessionStore, default_session_dir};
use bugdesk_core::constants::DEFAULT_STATS_INTERVAL_MS;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::App;
use commands::bugs::BugCommands;
use commands::projects::ProjectCommands;

#[derive(Parser)]
#[command(name = "bugdesk", version)]
#[command(about = "Command-line client for the bugdesk bug tracker", long_about = None)]
struct Cli {
    /// API root, e.g. http://localhost:5000/api
    #[arg(long, global = true, env = "BUGDESK_API_URL")]
    api_url: Option<String>,
    /// Directory holding the persisted session
    #[arg(long, global = true, env = "BUGDESK_SESSION_DIR")]
    session_dir: Option<PathBuf>,
    /// Per-request timeout in seconds, 0 waits indefinitely
    #[arg(long, global = true, env = "BUGDESK_REQUEST_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "BUGDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "BUGDESK_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,
        /// ADMIN, TESTER or DEV
        #[arg(short, long)]
        role: bugdesk_core::Role,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in identity
    Whoami,
    /// Report and triage bugs
    Bugs {
        #[command(subcommand)]
        command: BugCommands,
    },
    /// Manage projects and their members
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// List user accounts
    Users,
    /// Print dashboard counts once
    Stats,
    /// Print dashboard counts on every refresh
    Watch {
        /// Refresh period in milliseconds, 0 or less fetches once
        #[arg(long, env = "BUGDESK_STATS_INTERVAL_MS", default_value_t = DEFAULT_STATS_INTERVAL_MS, allow_negative_numbers = true)]
        interval_ms: i64,
        /// Exit after this many updates
        #[arg(long)]
        count: Option<usize>,
    },
}

fn build_app(cli: &Cli) -> Result<App> {
    let mut config = ClientConfig::from_env();
    if let Some(ref url) = cli.api_url {
        config = config.with_base_url(url.as_str());
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }

    let session_dir = cli.session_dir.clone().unwrap_or_else(default_session_dir);
    let session = Arc::new(SessionStore::new(FileSessionStore::new(session_dir.as_path())));
    session.restore();

    let client = ApiClient::new(&config, Arc::clone(&session)).context("failed to build API client")?;
    tracing::debug!(dir = %session_dir.display(), api = client.base_url(), "starting");
    Ok(App { session, client: Arc::new(client) })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = build_app(&cli)?;

    match cli.command {
        Commands::Login { email, password } => commands::auth::run_login(&app, email, password).await,
        Commands::Register { name, email, password, confirm_password, role } => {
            commands::auth::run_register(&app, name, email, password, confirm_password, role).await
        },
        Commands::Logout => {
            commands::auth::run_logout(&app);
            Ok(())
        },
        Commands::Whoami => commands::auth::run_whoami(&app),
        Commands::Bugs { command } => {
            app.require_login()?;
            commands::bugs::run(&app, command).await
        },
        Commands::Projects { command } => {
            app.require_login()?;
            commands::projects::run(&app, command).await
        },
        Commands::Users => {
            app.require_login()?;
            commands::projects::run_users(&app).await
        },
        Commands::Stats => {
            app.require_login()?;
            commands::stats::run_stats(&app).await
        },
        Commands::Watch { interval_ms, count } => {
            app.require_login()?;
            commands::stats::run_watch(&app, interval_ms, count).await
        },
    }
}
