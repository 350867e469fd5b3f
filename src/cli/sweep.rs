use anyhow::Result;
use iptv_catalog::Sweeper;

pub struct SweepCommand {
    pub sweeper: Sweeper,
    pub watch: bool,
}

impl SweepCommand {
    pub async fn execute(self) -> Result<()> {
        if !self.watch {
            let report = self.sweeper.run_once().await;
            println!(
                "Removed {} file(s) from {} ({} failed)",
                report.removed,
                self.sweeper.dir.display(),
                report.failed
            );
            return Ok(());
        }

        eprintln!(
            "Sweeping {} every {}s (max age {}s), Ctrl-C to stop",
            self.sweeper.dir.display(),
            self.sweeper.period.as_secs(),
            self.sweeper.max_age.as_secs()
        );

        let handle = self.sweeper.spawn();
        tokio::signal::ctrl_c().await?;
        handle.abort();

        Ok(())
    }
}
