use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::capture::build_capture_pipeline;
use crate::core::pipeline::BlockingTask;
use crate::core::upstream::meta::MetaClient;
use anyhow::{Error, anyhow};
use std::sync::Arc;
use tracing::info;

/// Builds the capture pipeline with the real Conversions API
/// client as its sink. Client construction is eager so tls/dns
/// problems surface at startup
pub(crate) struct CapturePipelineTask;

impl BlockingTask<StartupContext, anyhow::Error> for CapturePipelineTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let cfg = ctx
            .config
            .get()
            .ok_or_else(|| anyhow!("Config not loaded before capture pipeline build"))?;

        let meta_client = MetaClient::new(&cfg.meta)?;
        let pipeline = build_capture_pipeline(Arc::new(meta_client))?;

        ctx.capture_pipeline
            .set(Arc::new(pipeline))
            .map_err(|_| anyhow!("Capture pipeline already set"))?;

        info!("Capture pipeline ready for dataset {}", cfg.meta.pixel_id);

        Ok(())
    }
}
