use anyhow::{Context, Result};
use fileman::cli::Cli;
use fileman::{path, Repl, Session};
use tokio::io::{self, BufReader};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_lenient().unwrap_or_else(|e| e.exit());

    // Logs go to stderr so the console on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build the tokio runtime")?;

    let result = runtime.block_on(run(cli));

    // A pending stdin read lives on the blocking pool; don't wait for it
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let start_dir = match &cli.start_dir {
        Some(dir) => path::resolve(&cwd, dir),
        None => cwd,
    };

    let session = Session::open(&start_dir, cli.username.clone())
        .await
        .with_context(|| format!("Cannot start in {}", start_dir.display()))?;

    let mut repl = Repl::new(session);
    let mut stdout = io::stdout();
    let reason = repl
        .run(BufReader::new(io::stdin()), &mut stdout, interrupted())
        .await
        .context("Console I/O failed")?;

    tracing::info!("closed: {:?}", reason);
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
