// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use iptv_catalog::Config;

mod cli;
use cli::{
    CacheCommand, CommandContext, FacetsCommand, ListCommand, OutputFormat, RefreshCommand,
    ShowCommand, SweepCommand, WatchCommand,
};

fn cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser)]
#[command(name = "iptv-catalog")]
#[command(about = "Browse the iptv-org channel and stream catalog")]
#[command(version)]
#[command(styles = cargo_style())]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging to file (iptv_catalog_debug.log)
    #[arg(long, global = true)]
    debug_log: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List channels that have streams, sorted by name
    List {
        /// Case-insensitive text matched against channel name or id
        #[arg(short, long)]
        query: Option<String>,
        /// Country code (defaults to DEFAULT_COUNTRY)
        #[arg(short = 'C', long, conflicts_with = "all_countries")]
        country: Option<String>,
        /// Do not filter by country
        #[arg(short = 'A', long)]
        all_countries: bool,
        /// Category tag
        #[arg(short = 'g', long)]
        category: Option<String>,
        /// Only streams playable without custom request headers
        #[arg(short, long)]
        browser_only: bool,
        /// Maximum number of channels to print
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output format (text, json, m3u)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show a channel and its streams
    Show {
        channel_id: String,
        /// Output format (text, json, m3u)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the URL of one stream of a channel
    Watch {
        channel_id: String,
        /// Stream index as shown by `show`
        #[arg(default_value_t = 0)]
        index: usize,
        /// Output format (text, json, m3u)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Fetch the catalog now, ignoring the cache age
    Refresh,

    /// Manage the catalog cache
    #[command(subcommand)]
    Cache(CacheSubCommand),

    /// List known countries and categories
    Facets {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete aged files from the download directory
    Sweep {
        /// Directory to sweep (defaults to the configured download dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Minimum age in seconds for a file to be removed
        #[arg(short, long)]
        max_age: Option<u64>,
        /// Keep running, sweeping periodically
        #[arg(short, long)]
        watch: bool,
    },
}

#[derive(Subcommand)]
enum CacheSubCommand {
    /// Show cache location, age and freshness
    Info,
    /// Remove the cached snapshot
    Clear,
}

fn init_logging(cli: &Cli) -> Result<()> {
    if cli.debug_log {
        let file = File::create("iptv_catalog_debug.log")?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(
                EnvFilter::from_default_env()
                    .add_directive("iptv_catalog=debug".parse()?)
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive(tracing::Level::DEBUG.into())
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("hyper_util=error".parse()?),
            )
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    // Load configuration, then let the environment override it
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path)?.with_env();
    tracing::debug!("Using cache file {}", config.cache_path().display());

    match cli.command {
        Commands::List {
            query,
            country,
            all_countries,
            category,
            browser_only,
            limit,
            format,
        } => {
            let cmd = ListCommand {
                query,
                country,
                all_countries,
                category,
                browser_only,
                format: OutputFormat::from_str(&format)?,
                limit,
            };
            cmd.execute(CommandContext::new(&config)?).await?;
        }

        Commands::Show { channel_id, format } => {
            let cmd = ShowCommand {
                channel_id,
                format: OutputFormat::from_str(&format)?,
            };
            cmd.execute(CommandContext::new(&config)?).await?;
        }

        Commands::Watch {
            channel_id,
            index,
            format,
        } => {
            let cmd = WatchCommand {
                channel_id,
                index,
                format: OutputFormat::from_str(&format)?,
            };
            cmd.execute(CommandContext::new(&config)?).await?;
        }

        Commands::Refresh => {
            RefreshCommand.execute(CommandContext::new(&config)?).await?;
        }

        Commands::Cache(cache_cmd) => {
            let cmd = match cache_cmd {
                CacheSubCommand::Info => CacheCommand::Info,
                CacheSubCommand::Clear => CacheCommand::Clear,
            };
            cmd.execute(CommandContext::new(&config)?).await?;
        }

        Commands::Facets { format } => {
            let cmd = FacetsCommand {
                format: OutputFormat::from_str(&format)?,
            };
            cmd.execute(CommandContext::new(&config)?).await?;
        }

        Commands::Sweep {
            dir,
            max_age,
            watch,
        } => {
            let mut sweeper = config.sweeper();
            if let Some(dir) = dir {
                sweeper.dir = dir;
            }
            if let Some(secs) = max_age {
                sweeper = sweeper.max_age(Duration::from_secs(secs));
            }
            SweepCommand { sweeper, watch }.execute().await?;
        }
    }

    Ok(())
}
