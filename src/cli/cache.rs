use super::CommandContext;
use anyhow::{Context, Result};

pub enum CacheCommand {
    Info,
    Clear,
}

impl CacheCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let cache = context.loader.cache();

        match self {
            Self::Info => {
                let status = cache.status().await;
                println!("Path: {}", status.path.display());
                if !status.exists {
                    println!("Status: empty");
                    return Ok(());
                }

                println!("Status: {}", if status.fresh { "fresh" } else { "stale" });
                println!("Size: {}", format_bytes(status.size_bytes));
                if let Some(age) = status.age {
                    println!("Age: {}s (ttl {}s)", age.as_secs(), cache.ttl().as_secs());
                }
                if let Some(fetched_at) = status.fetched_at {
                    println!("Fetched at: {}", fetched_at.format("%Y-%m-%d %H:%M:%S UTC"));
                }
            }
            Self::Clear => {
                let removed = cache
                    .clear()
                    .await
                    .with_context(|| "Failed to clear cache")?;
                if removed {
                    println!("Cache cleared: {}", cache.path().display());
                } else {
                    println!("Cache already empty");
                }
            }
        }

        Ok(())
    }
}

fn format_bytes(len: u64) -> String {
    if len < 1024 {
        format!("{} B", len)
    } else if len < 1024 * 1024 {
        format!("{:.1} KB", len as f64 / 1024.0)
    } else {
        format!("{:.1} MB", len as f64 / (1024.0 * 1024.0))
    }
}
