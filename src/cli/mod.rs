use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use iptv_catalog::{Catalog, Config, HttpSource, Loader};

pub mod cache;
pub mod facets;
pub mod list;
pub mod refresh;
pub mod show;
pub mod sweep;

pub use cache::CacheCommand;
pub use facets::FacetsCommand;
pub use list::ListCommand;
pub use refresh::RefreshCommand;
pub use show::{ShowCommand, WatchCommand};
pub use sweep::SweepCommand;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
    M3u,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "m3u" => Ok(Self::M3u),
            _ => anyhow::bail!("Invalid format: {}. Use 'text', 'json', or 'm3u'", s),
        }
    }
}

/// Shared state for command execution
pub struct CommandContext {
    pub loader: Loader<HttpSource>,
}

impl CommandContext {
    pub fn new(config: &Config) -> Result<Self> {
        let source = config.http_source()?;
        let loader = Loader::new(source, config.loader_options());
        Ok(Self { loader })
    }

    /// Loads the catalog behind a spinner on stderr.
    pub async fn load_catalog(&self) -> Result<Catalog> {
        let pb = spinner("Loading channel catalog...");
        let result = self.loader.load().await;
        pb.finish_and_clear();
        result.with_context(|| "Unable to load channels")
    }
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
