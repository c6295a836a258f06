use crate::app::pipeline::capture::context::CaptureContext;
use crate::app::pipeline::capture::tasks::{
    BuildPayloadTask, EventIdTask, ForwardEventTask, HashIdentityTask, ValidateEventTask,
};
use crate::core::pipeline::{Pipeline, PipelineBuilder};
use crate::core::upstream::sink::EventSink;
use anyhow::{Error, bail};
use std::sync::Arc;

/// Build the pipeline a capture request flows through. Order
/// matters: nothing may be derived for an invalid event, and the
/// payload must be fully assembled before the single outbound
/// call at the end
pub fn build_capture_pipeline(
    sink: Arc<dyn EventSink>,
) -> Result<Pipeline<CaptureContext, Error>, Error> {
    let pipeline = PipelineBuilder::new()
        // Reject events without a name before any derivation
        .with_blocking(Box::new(ValidateEventTask))
        // Pin the dedup id, caller supplied or generated
        .with_blocking(Box::new(EventIdTask))
        // Hash PII, nothing downstream sees raw values
        .with_blocking(Box::new(HashIdentityTask))
        // Assemble the upstream payload
        .with_blocking(Box::new(BuildPayloadTask))
        // The one outbound call, awaited
        .with_async(Box::new(ForwardEventTask::new(sink)))
        .build();

    match pipeline {
        Some(pipeline) => Ok(pipeline),
        None => bail!("Failed to build capture pipeline"),
    }
}
