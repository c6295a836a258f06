use crate::app::config::MetaConfig;
use crate::core::models::payload::ConversionPayload;
use crate::core::upstream::sink::{EventSink, SinkResponse};
use anyhow::{Error, anyhow};
use async_trait::async_trait;
use reqwest::{Client, redirect, retry};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// The envelope actually written to the wire. Built immediately
/// before the send so the credential never sits on a context or
/// appears in any inbound/outbound response shape
#[derive(Serialize)]
struct AuthorizedPayload<'a> {
    #[serde(flatten)]
    payload: &'a ConversionPayload,
    access_token: String,
}

/// Client for the Meta Conversions API. One fixed destination per
/// process, built from static configuration. Never retries, never
/// follows redirects
pub struct MetaClient {
    client: Client,
    events_url: String,
    access_token_env: String,
}

impl MetaClient {
    /// Create the client eagerly so a broken tls/dns setup fails
    /// startup rather than the first capture request
    pub fn new(cfg: &MetaConfig) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .user_agent("convey")
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .tcp_keepalive(Some(Duration::from_secs(20)))
            .tcp_nodelay(true)
            .retry(retry::never())
            .referer(false)
            .redirect(redirect::Policy::none())
            .gzip(true)
            .deflate(true)
            .hickory_dns(true)
            .build()?;

        let events_url = format!(
            "{}/{}/{}/events",
            cfg.graph_base.trim_end_matches('/'),
            cfg.api_version,
            cfg.pixel_id
        );

        Ok(MetaClient {
            client,
            events_url,
            access_token_env: cfg.access_token_env.clone(),
        })
    }

    /// Resolve the access credential at delivery time. A missing
    /// variable is a configuration error and fails the call, the
    /// request must never go out unauthenticated
    fn access_token(&self) -> Result<String, Error> {
        std::env::var(&self.access_token_env)
            .map_err(|_| anyhow!("access token env var {} is not set", self.access_token_env))
    }
}

#[async_trait]
impl EventSink for MetaClient {
    async fn deliver(&self, payload: &ConversionPayload) -> Result<SinkResponse, Error> {
        let body = AuthorizedPayload {
            payload,
            access_token: self.access_token()?,
        };

        let res = self
            .client
            .post(&self.events_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach Conversions API: {}", e))?;

        let status_code = res.status().as_u16();

        debug!("Conversions API responded {}", status_code);

        let bytes = res
            .bytes()
            .await
            .map_err(|e| anyhow!("Failed to read Conversions API response: {}", e))?;

        let body = serde_json::from_slice(&bytes)
            .map_err(|e| anyhow!("Conversions API returned non-json body: {}", e))?;

        Ok(SinkResponse { status_code, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn authorized_payload_flattens_with_token() {
        let payload = ConversionPayload { data: vec![] };
        let body = AuthorizedPayload {
            payload: &payload,
            access_token: "secret".into(),
        };

        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value, json!({ "data": [], "access_token": "secret" }));
    }

    #[test]
    fn events_url_is_versioned_per_destination() {
        let cfg = MetaConfig {
            pixel_id: "559798737198143".into(),
            api_version: "v21.0".into(),
            graph_base: "https://graph.facebook.com/".into(),
            access_token_env: "META_CAPI_TOKEN".into(),
        };

        let client = MetaClient::new(&cfg).unwrap();

        assert_eq!(
            client.events_url,
            "https://graph.facebook.com/v21.0/559798737198143/events"
        );
    }
}
