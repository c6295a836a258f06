use crate::app::lifecycle::context::StartupContext;
use crate::core::observability::provider;
use crate::core::pipeline::BlockingTask;
use anyhow::{Error, anyhow};
use tracing::info;

/// Installs the tracing subscriber from the loaded config. Runs
/// right after config load so every later task can log
pub(crate) struct ObservabilityStartupTask;

impl BlockingTask<StartupContext, anyhow::Error> for ObservabilityStartupTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let cfg = ctx
            .config
            .get()
            .ok_or_else(|| anyhow!("Config not loaded before observability init"))?;

        provider::init(&cfg.logging)?;

        info!("Observability initialized");

        Ok(())
    }
}
