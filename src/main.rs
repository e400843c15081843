//! `StreamSeek` CLI - List providers and resolve playable streams

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use streamseek::{AppConfig, MediaType};

#[derive(Parser)]
#[command(name = "streamseek")]
#[command(about = "Resolve playable video streams from ranked providers")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read configuration from PATH instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List enabled providers in trial order
    Providers {
        /// Only providers supporting this media type (movie, series)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        media_type: Option<MediaType>,
    },

    /// Resolve a stream for a movie or an episode
    Resolve {
        /// Title as listed in the catalog
        title: String,

        /// Release year
        #[arg(short, long)]
        year: String,

        /// Season number (series only)
        #[arg(short, long, requires = "episode")]
        season: Option<u32>,

        /// Episode number within the season (series only)
        #[arg(short, long, requires = "season")]
        episode: Option<u32>,

        /// Run only this provider
        #[arg(short, long)]
        provider: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Proxy URL; upstream URLs are passed in its destination parameter
        #[arg(long)]
        proxy: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("streamseek=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("streamseek=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Providers { media_type } => {
            cmd::cmd_providers(&config, media_type)?;
        }
        Commands::Resolve {
            title,
            year,
            season,
            episode,
            provider,
            json,
            proxy,
            timeout,
        } => {
            if proxy.is_some() {
                config.proxy_url = proxy;
            }
            if let Some(secs) = timeout {
                config.request_timeout_secs = secs;
            }

            let target = cmd::ResolveTarget {
                title,
                year,
                episode: season.zip(episode),
                provider,
            };
            cmd::cmd_resolve(&config, target, json).await?;
        }
    }

    Ok(())
}
