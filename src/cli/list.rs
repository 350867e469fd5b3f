use super::{CommandContext, OutputFormat};
use anyhow::Result;
use iptv_catalog::{Catalog, FilterSpec, Listing};

pub struct ListCommand {
    pub query: Option<String>,
    pub country: Option<String>,
    pub all_countries: bool,
    pub category: Option<String>,
    pub browser_only: bool,
    pub format: OutputFormat,
    pub limit: Option<usize>,
}

impl ListCommand {
    fn filter_spec(&self, context: &CommandContext) -> FilterSpec {
        let mut spec = context.loader.default_filter();
        if self.all_countries {
            spec.country = None;
        } else if self.country.is_some() {
            spec.country = self.country.clone();
        }
        spec.text = self.query.clone();
        spec.category = self.category.clone();
        spec.browser_playable_only = self.browser_only;
        spec
    }

    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let spec = self.filter_spec(&context);

        // A failed load still renders, as an empty listing under an error banner.
        let catalog = match context.load_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                Catalog::default()
            }
        };

        let items = context.loader.listing(&catalog, &spec);
        let total = items.len();
        let items: Vec<Listing<'_>> = items
            .into_iter()
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&items)?);
            }
            OutputFormat::Text => {
                if items.is_empty() {
                    println!("No channels found");
                } else {
                    for item in &items {
                        Self::print_text_result(item);
                    }
                    eprintln!("\n{} of {} channels shown", items.len(), total);
                }
            }
            OutputFormat::M3u => {
                println!("#EXTM3U");
                for item in &items {
                    Self::print_m3u_entry(item);
                }
            }
        }

        Ok(())
    }

    fn print_text_result(item: &Listing<'_>) {
        let country = item.channel.country.as_deref().unwrap_or("--");
        let categories = item
            .channel
            .categories
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<24} | {:<2} | {:>2} | {} [{}]",
            item.channel.id,
            country,
            item.streams.len(),
            item.channel.name,
            categories
        );
    }

    fn print_m3u_entry(item: &Listing<'_>) {
        let group = item.channel.categories.first().map(String::as_str).unwrap_or("");
        for stream in &item.streams {
            println!(
                "#EXTINF:-1 tvg-id=\"{}\" tvg-name=\"{}\" tvg-country=\"{}\" group-title=\"{}\",{}",
                item.channel.id,
                item.channel.name,
                item.channel.country.as_deref().unwrap_or(""),
                group,
                item.channel.name
            );
            if let Some(referrer) = &stream.referrer {
                println!("#EXTVLCOPT:http-referrer={}", referrer);
            }
            if let Some(user_agent) = &stream.user_agent {
                println!("#EXTVLCOPT:http-user-agent={}", user_agent);
            }
            println!("{}", stream.url);
        }
    }
}
