use crate::app::lifecycle::context::StartupContext;
use crate::core::pipeline::AsyncTask;
use anyhow::{Error, anyhow};
use async_trait::async_trait;
use tracing::info;

/// Gracefully stops the http server, letting in-flight capture
/// requests finish their single upstream call
pub struct StopServerTask;

#[async_trait]
impl AsyncTask<StartupContext, anyhow::Error> for StopServerTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let handle = ctx
            .server
            .get()
            .ok_or_else(|| anyhow!("No server handle on context during shutdown"))?;

        handle.stop(true).await;

        info!("Http server stopped");

        Ok(())
    }
}
