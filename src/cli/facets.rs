use super::{CommandContext, OutputFormat};
use anyhow::Result;
use serde_json::json;

/// Lists the country and category vocabularies used for filtering.
pub struct FacetsCommand {
    pub format: OutputFormat,
}

impl FacetsCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let catalog = context.load_catalog().await?;
        let countries = catalog.countries();
        let categories = catalog.categories();

        match self.format {
            OutputFormat::Json => {
                let facets = json!({
                    "countries": countries,
                    "categories": categories,
                });
                println!("{}", serde_json::to_string_pretty(&facets)?);
            }
            OutputFormat::Text | OutputFormat::M3u => {
                println!("Countries ({}):", countries.len());
                println!("  {}", countries.join(" "));
                println!("\nCategories ({}):", categories.len());
                for category in &categories {
                    println!("  {}", category);
                }
            }
        }

        Ok(())
    }
}
