use crate::core::models::event::TrackEventRequest;
use crate::core::models::payload::{ConversionPayload, HashedIdentity};
use crate::core::transport::client_context::ClientContext;
use serde_json::Value;
use std::sync::OnceLock;

/// Terminal result of a capture run. The handler maps this onto
/// the http surface; exactly one variant is set per request
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    /// Upstream accepted the event
    Accepted {
        event_id: String,
        meta_response: Value,
    },
    /// The request never qualified for forwarding
    Rejected { error: &'static str },
    /// Upstream completed the exchange with a non-success status;
    /// its status and body are passed through verbatim
    UpstreamError { status: u16, details: Value },
    /// Assembly or transport failed; message is safe for callers
    Failed { message: String },
}

/// Shared context for one capture request. Tasks fill the slots
/// in pipeline order; OnceLock keeps each write-once
#[derive(Debug, Default)]
pub struct CaptureContext {
    /// The inbound event as received
    pub request: TrackEventRequest,
    /// Transport metadata derived from the http request
    pub client: ClientContext,
    /// The deduplication id, caller supplied or generated
    pub event_id: OnceLock<String>,
    /// Hashed identity triple, set before payload assembly
    pub identity: OnceLock<HashedIdentity>,
    /// The assembled upstream payload
    pub payload: OnceLock<ConversionPayload>,
    /// The terminal outcome for the handler
    pub outcome: OnceLock<CaptureOutcome>,
}

impl CaptureContext {
    pub fn new(request: TrackEventRequest, client: ClientContext) -> CaptureContext {
        CaptureContext {
            request,
            client,
            ..Default::default()
        }
    }
}
