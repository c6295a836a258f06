use crate::app::config::ConveyConfig;
use crate::app::pipeline::capture::CaptureContext;
use crate::core::pipeline::Pipeline;
use actix_web::dev::ServerHandle;
use anyhow::Error;
use std::sync::{Arc, OnceLock};

/// Shared slots filled by the startup tasks and drained by the
/// shutdown tasks. Everything is write-once
#[derive(Default)]
pub struct StartupContext {
    /// Validated config snapshot
    pub config: OnceLock<Arc<ConveyConfig>>,

    /// The pipeline which defines the full handling of one
    /// capture request
    pub capture_pipeline: OnceLock<Arc<Pipeline<CaptureContext, Error>>>,

    /// Handle for stopping the running http server
    pub server: OnceLock<ServerHandle>,
}
