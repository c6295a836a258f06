use crate::app::pipeline::capture::context::{CaptureContext, CaptureOutcome};
use crate::child_span_info;
use crate::core::pipeline::BlockingTask;
use anyhow::anyhow;
use tracing::debug;

/// Rejects events with a missing or empty name before anything is
/// derived or forwarded. This is the only caller-facing 400
pub struct ValidateEventTask;

impl BlockingTask<CaptureContext, anyhow::Error> for ValidateEventTask {
    fn run(&self, context: &CaptureContext) -> Result<(), anyhow::Error> {
        let span = child_span_info!(
            "validate_event_task",
            invalid_reason = tracing::field::Empty
        )
        .entered();

        if context.request.event_name.trim().is_empty() {
            context
                .outcome
                .set(CaptureOutcome::Rejected {
                    error: "event_name is required",
                })
                .expect("Should not have an outcome assigned already");

            span.record("invalid_reason", "missing_event_name");

            return Err(anyhow!("Event missing event_name"));
        }

        debug!("Event {} passed validation", context.request.event_name);
        span.record("invalid_reason", "none");

        Ok(())
    }
}
