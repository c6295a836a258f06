use crate::app::pipeline::capture::context::CaptureContext;
use crate::core::identity::event_id::generate_event_id;
use crate::core::pipeline::BlockingTask;
use anyhow::anyhow;
use tracing::debug;

/// Pins the deduplication id for this event. A caller supplied id
/// is kept untouched so the browser pixel and this relay report
/// the same logical event under one key; the generator is only
/// the fallback for callers that omit it
pub struct EventIdTask;

impl BlockingTask<CaptureContext, anyhow::Error> for EventIdTask {
    fn run(&self, context: &CaptureContext) -> Result<(), anyhow::Error> {
        let event_id = match &context.request.event_id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => {
                let generated = generate_event_id();
                debug!("No event_id supplied, generated {}", generated);
                generated
            }
        };

        context
            .event_id
            .set(event_id)
            .map_err(|_| anyhow!("Event id already assigned"))?;

        Ok(())
    }
}
