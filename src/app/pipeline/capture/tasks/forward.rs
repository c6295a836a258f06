use crate::app::pipeline::capture::context::{CaptureContext, CaptureOutcome};
use crate::child_span_info;
use crate::core::pipeline::AsyncTask;
use crate::core::upstream::sink::EventSink;
use anyhow::{Error, anyhow, bail};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{Instrument, Span, debug, warn};

/// Fires the single outbound call for this event and records the
/// terminal outcome. No retries, no queueing: an upstream
/// rejection is passed through and a transport failure is final
pub struct ForwardEventTask {
    sink: Arc<dyn EventSink>,
}

impl ForwardEventTask {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        ForwardEventTask { sink }
    }

    async fn run0(&self, context: &CaptureContext) -> Result<(), Error> {
        let span = Span::current();

        let payload = context
            .payload
            .get()
            .ok_or_else(|| anyhow!("No payload assembled before forwarding"))?;

        let event_id = context
            .event_id
            .get()
            .ok_or_else(|| anyhow!("No event id set before forwarding"))?
            .clone();

        span.record("event_id", event_id.as_str());

        match self.sink.deliver(payload).await {
            Ok(res) if res.is_success() => {
                debug!("Event {} accepted upstream", event_id);
                span.record("success", true);

                context
                    .outcome
                    .set(CaptureOutcome::Accepted {
                        event_id,
                        meta_response: res.body,
                    })
                    .map_err(|_| anyhow!("Outcome already assigned"))?;

                Ok(())
            }
            Ok(res) => {
                warn!(
                    "Upstream rejected event {} with status {}",
                    event_id, res.status_code
                );
                span.record("success", false);

                context
                    .outcome
                    .set(CaptureOutcome::UpstreamError {
                        status: res.status_code,
                        details: res.body,
                    })
                    .map_err(|_| anyhow!("Outcome already assigned"))?;

                Ok(())
            }
            Err(e) => {
                span.record("success", false);
                span.record("error", e.to_string());

                context
                    .outcome
                    .set(CaptureOutcome::Failed {
                        message: e.to_string(),
                    })
                    .map_err(|_| anyhow!("Outcome already assigned"))?;

                bail!("Failed to deliver event {}: {}", event_id, e);
            }
        }
    }
}

#[async_trait]
impl AsyncTask<CaptureContext, Error> for ForwardEventTask {
    async fn run(&self, context: &CaptureContext) -> Result<(), Error> {
        let span = child_span_info!(
            "forward_event_task",
            event_id = tracing::field::Empty,
            success = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        self.run0(context).instrument(span).await
    }
}
