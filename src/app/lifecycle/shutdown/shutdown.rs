use crate::app::lifecycle::context::StartupContext;
use crate::app::lifecycle::shutdown::tasks::stop_server::StopServerTask;
use crate::app::span::WrappedPipelineTask;
use crate::core::pipeline::{Pipeline, PipelineBuilder};
use tracing::info_span;

/// Builds the shutdown pipeline, which takes the resulting
/// `StartupContext` so anything started there can be wound down
pub fn build_shutdown_pipeline() -> Pipeline<StartupContext, anyhow::Error> {
    let shutdown_pipeline = PipelineBuilder::new()
        .with_async(Box::new(StopServerTask))
        .build()
        .expect("Shutdown pipeline should have tasks!");

    let observed_pipeline =
        WrappedPipelineTask::new(shutdown_pipeline, || info_span!("shutdown_pipeline"));

    PipelineBuilder::new()
        .with_async(Box::new(observed_pipeline))
        .build()
        .expect("Shutdown pipeline should have tasks!")
}
