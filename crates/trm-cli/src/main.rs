//! TRM CLI main entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use trm_cli::{start_interactive, Cli, CommandExecutor};

#[tokio::main]
async fn main() -> Result<()> {
    // Fallback notices go to stderr; RUST_LOG overrides the level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut executor = CommandExecutor::from_cli(&cli)?;

    let Some(command) = cli.command else {
        return start_interactive(executor).await;
    };

    let result = executor.execute(command).await?;
    if !result.message.is_empty() {
        println!("{}", result.message);
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
