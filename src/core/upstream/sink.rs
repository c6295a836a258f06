use crate::core::models::payload::ConversionPayload;
use anyhow::Error;
use async_trait::async_trait;
use serde_json::Value;

/// A completed upstream exchange. Any http status lands here, a
/// rejection from the upstream is still a completed delivery
#[derive(Debug, Clone)]
pub struct SinkResponse {
    pub status_code: u16,
    pub body: Value,
}

impl SinkResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// The single seam through which events leave this process.
/// Production wires the real Conversions API client, tests wire a
/// recording stub, which keeps the pipeline free of any global or
/// patched network primitive
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver the payload in exactly one outbound call.
    ///
    /// # Behavior
    /// Returns Err only when the exchange itself failed (network,
    /// unreadable body). A completed http exchange returns Ok
    /// regardless of status code
    async fn deliver(&self, payload: &ConversionPayload) -> Result<SinkResponse, Error>;
}
