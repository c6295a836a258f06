use crate::core::models::event::TrackEventRequest;
use anyhow::{Error, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Delivery seam between the emitter and the relay. Production
/// posts over http; tests record instead, so no emitter behavior
/// depends on a live socket
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn deliver(&self, event: &TrackEventRequest) -> Result<Value, Error>;
}

/// Posts events to the relay's capture route as json
pub struct HttpRelayTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayTransport {
    /// `endpoint` is the full capture url, e.g.
    /// `https://funnel.example/capture`
    pub fn new(endpoint: impl Into<String>) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .user_agent("convey-emitter")
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(HttpRelayTransport {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn deliver(&self, event: &TrackEventRequest) -> Result<Value, Error> {
        let res = self
            .client
            .post(&self.endpoint)
            .json(event)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach relay: {}", e))?;

        res.json()
            .await
            .map_err(|e| anyhow!("Relay returned non-json body: {}", e))
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records delivered events and answers with a canned relay
    /// response, or an error when `fail` is set
    pub struct RecordingTransport {
        pub events: Mutex<Vec<TrackEventRequest>>,
        pub response: Value,
        pub fail: bool,
    }

    impl RecordingTransport {
        pub fn succeeding() -> Arc<RecordingTransport> {
            Arc::new(RecordingTransport {
                events: Mutex::new(Vec::new()),
                response: serde_json::json!({ "success": true }),
                fail: false,
            })
        }

        pub fn answering(response: Value) -> Arc<RecordingTransport> {
            Arc::new(RecordingTransport {
                events: Mutex::new(Vec::new()),
                response,
                fail: false,
            })
        }

        pub fn failing() -> Arc<RecordingTransport> {
            Arc::new(RecordingTransport {
                events: Mutex::new(Vec::new()),
                response: Value::Null,
                fail: true,
            })
        }
    }

    #[async_trait]
    impl RelayTransport for RecordingTransport {
        async fn deliver(&self, event: &TrackEventRequest) -> Result<Value, Error> {
            self.events.lock().push(event.clone());

            if self.fail {
                return Err(anyhow!("connection refused"));
            }

            Ok(self.response.clone())
        }
    }
}
