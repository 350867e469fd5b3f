use super::{CommandContext, OutputFormat};
use anyhow::Result;
use serde_json::json;

pub struct ShowCommand {
    pub channel_id: String,
    pub format: OutputFormat,
}

impl ShowCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let catalog = context.load_catalog().await?;

        let channel = catalog
            .channel(&self.channel_id)
            .ok_or_else(|| anyhow::anyhow!("Channel '{}' not found", self.channel_id))?;
        let streams = catalog.streams(&channel.id);

        match self.format {
            OutputFormat::Json => {
                let info = json!({
                    "channel": channel,
                    "streams": streams,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            }
            OutputFormat::Text => {
                println!("ID: {}", channel.id);
                println!("Name: {}", channel.name);
                println!("Country: {}", channel.country.as_deref().unwrap_or("-"));
                if !channel.categories.is_empty() {
                    println!("Categories: {}", channel.categories.join(", "));
                }

                if streams.is_empty() {
                    println!("\nNo streams available");
                } else {
                    println!("\nStreams:");
                    for (index, stream) in streams.iter().enumerate() {
                        let browser = if stream.is_browser_playable() {
                            ""
                        } else {
                            " (external player)"
                        };
                        println!("  [{}] {}{}", index, stream.label(), browser);
                        println!("      {}", stream.url);
                    }
                }
            }
            OutputFormat::M3u => {
                println!("#EXTM3U");
                for stream in streams {
                    println!("#EXTINF:-1 tvg-id=\"{}\",{}", channel.id, channel.name);
                    println!("{}", stream.url);
                }
            }
        }

        Ok(())
    }
}

/// Resolves one stream of a channel by its position in the channel's stream list.
pub struct WatchCommand {
    pub channel_id: String,
    pub index: usize,
    pub format: OutputFormat,
}

impl WatchCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let catalog = context.load_catalog().await?;

        let channel = catalog
            .channel(&self.channel_id)
            .ok_or_else(|| anyhow::anyhow!("Channel '{}' not found", self.channel_id))?;
        let total = catalog.streams(&channel.id).len();
        let stream = catalog.stream(&channel.id, self.index).ok_or_else(|| {
            anyhow::anyhow!(
                "Stream {} not found for '{}' ({} available)",
                self.index,
                channel.id,
                total
            )
        })?;

        match self.format {
            OutputFormat::Json => {
                let info = json!({
                    "channel": channel,
                    "stream": stream,
                    "stream_index": self.index,
                    "total_streams": total,
                    "browser_playable": stream.is_browser_playable(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            }
            OutputFormat::Text => {
                eprintln!(
                    "{} - stream {} of {}: {}",
                    channel.name,
                    self.index + 1,
                    total,
                    stream.label()
                );
                if let Some(referrer) = &stream.referrer {
                    eprintln!("Referrer: {}", referrer);
                }
                if let Some(user_agent) = &stream.user_agent {
                    eprintln!("User-Agent: {}", user_agent);
                }
                println!("{}", stream.url);
            }
            OutputFormat::M3u => {
                println!("#EXTM3U");
                println!("#EXTINF:-1 tvg-id=\"{}\",{}", channel.id, channel.name);
                if let Some(referrer) = &stream.referrer {
                    println!("#EXTVLCOPT:http-referrer={}", referrer);
                }
                if let Some(user_agent) = &stream.user_agent {
                    println!("#EXTVLCOPT:http-user-agent={}", user_agent);
                }
                println!("{}", stream.url);
            }
        }

        Ok(())
    }
}
