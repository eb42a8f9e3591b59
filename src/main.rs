//! greenmerge - merge pull requests once CI is green

mod cli;

use clap::{Parser, Subcommand};
use cli::merge::{MergeOptions, run_merge};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "greenmerge", version, about = "Merge pull requests once CI is green")]
struct Cli {
    /// Config file (defaults to <config dir>/greenmerge/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait until a PR is mergeable and green, then merge it
    Merge {
        /// PR URL or `owner/repo#number`
        pr: String,

        /// Give up after this many minutes
        #[arg(long)]
        timeout_minutes: Option<i64>,

        /// Seconds between evaluation passes
        #[arg(long)]
        poll_interval_secs: Option<u64>,
    },
    /// Print the effective configuration
    Config,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "greenmerge=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            pr,
            timeout_minutes,
            poll_interval_secs,
        } => {
            run_merge(
                cli.config.as_deref(),
                &pr,
                MergeOptions {
                    timeout_minutes,
                    poll_interval_secs,
                },
            )
            .await?;
        }
        Commands::Config => {
            let config = greenmerge::config::load_config(cli.config.as_deref())?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
