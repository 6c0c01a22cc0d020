// ArtWeave client entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Load config (./config or the user config dir, env overrides)
// 3. Initialize tracing (log to file, not terminal)
// 4. Refuse to start without an API base URL
// 5. Build the client and session, then run the command or the interactive walk

use std::process::ExitCode;

use anyhow::Context;
use artweave_app::cli::{self, Cli, Command};
use artweave_app::flow::Flow;
use artweave_client::ApiClient;
use artweave_core::config::load_config;
use artweave_core::session::Session;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // 1. Parse arguments
    let args = Cli::parse();

    // 2. Load config
    let mut config = load_config().context("failed to load configuration")?;

    // 3. Initialize tracing
    init_tracing(&config.logging.filter)?;
    info!("ArtWeave client starting up");

    // 4. Apply overrides; the base URL is the one setting we cannot run without.
    if let Err(e) = cli::prepare_config(&args, &mut config) {
        error!("refusing to start: {e}");
        eprintln!("{e}");
        return Ok(ExitCode::from(e.exit_code()));
    }
    info!(
        base_url = config.api.base_url.as_deref().unwrap_or_default(),
        timeout = ?config.api.timeout(),
        "config loaded"
    );

    // 5. Build the client and session
    let client = ApiClient::from_config(&config.api);
    let mut session = Session::new();
    let mut flow = Flow::new(client, &mut session);
    let mut stdout = std::io::stdout();

    let command = args.command.unwrap_or(Command::Browse);
    if command == Command::Browse {
        let stdin = BufReader::new(tokio::io::stdin());
        cli::run_browse(&mut flow, stdin, &mut stdout).await?;
        info!("ArtWeave client shut down cleanly");
        return Ok(ExitCode::SUCCESS);
    }

    match cli::run_command(&command, &mut flow, &mut stdout).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("command failed: {e}");
            eprintln!("{e}");
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}

/// Initialize tracing to log to a file (the terminal carries command output).
fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("artweave.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
