use super::{CommandContext, spinner};
use anyhow::{Context, Result};

pub struct RefreshCommand;

impl RefreshCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let pb = spinner("Refreshing channel catalog...");
        let result = context.loader.refresh().await;
        pb.finish_and_clear();

        // The previous snapshot stays in place when the refresh fails.
        result.with_context(|| "Unable to refresh cache")?;

        println!(
            "✓ Cache refreshed at {}",
            context.loader.cache().path().display()
        );
        Ok(())
    }
}
