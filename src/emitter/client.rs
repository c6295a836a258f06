use crate::core::models::event::{TrackEventRequest, UserData};
use crate::emitter::cookies::ad_cookies;
use crate::emitter::ids::client_event_id;
use crate::emitter::transport::RelayTransport;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Local browser signals the emitter draws from: the page url and
/// the raw cookie string, captured once per mount
#[derive(Debug, Clone, Default)]
pub struct PageSignals {
    pub url: String,
    pub cookies: String,
}

/// What became of one delivery attempt. Failures land here too,
/// tracking must never take the page down with it
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub success: bool,
    pub event_id: Option<String>,
    pub response: Option<Value>,
    pub error: Option<String>,
}

/// Client-side counterpart of the relay: assembles events from
/// page signals and pushes them through the transport. One
/// instance per page mount
pub struct EventEmitter {
    transport: Arc<dyn RelayTransport>,
    page: PageSignals,
    page_view_fired: AtomicBool,
}

impl EventEmitter {
    pub fn new(transport: Arc<dyn RelayTransport>, page: PageSignals) -> EventEmitter {
        EventEmitter {
            transport,
            page,
            page_view_fired: AtomicBool::new(false),
        }
    }

    /// Fire the automatic PageView. Guarded per instance so a
    /// remount of the same emitter cannot double-report, while a
    /// genuine new page mount (new instance) fires its own
    pub async fn mount(&self) -> Option<DeliveryReport> {
        if self.page_view_fired.swap(true, Ordering::SeqCst) {
            return None;
        }

        Some(self.track_page_view().await)
    }

    pub async fn track_page_view(&self) -> DeliveryReport {
        self.track("PageView", None, Map::new()).await
    }

    pub async fn track_view_content(&self, custom_data: Map<String, Value>) -> DeliveryReport {
        self.track("ViewContent", None, custom_data).await
    }

    pub async fn track_add_to_cart(&self, custom_data: Map<String, Value>) -> DeliveryReport {
        self.track("AddToCart", None, custom_data).await
    }

    pub async fn track_lead(
        &self,
        user_data: Option<UserData>,
        custom_data: Map<String, Value>,
    ) -> DeliveryReport {
        self.track("Lead", user_data, custom_data).await
    }

    /// The escape hatch every convenience method funnels into
    pub async fn track(
        &self,
        event_name: &str,
        user_data: Option<UserData>,
        custom_data: Map<String, Value>,
    ) -> DeliveryReport {
        let event = self.build_event(event_name, user_data, custom_data);
        let event_id = event.event_id.clone();

        match self.transport.deliver(&event).await {
            Ok(response) => {
                let success = response
                    .get("success")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);

                if success {
                    debug!("Delivered {} as {:?}", event_name, event_id);
                } else {
                    warn!("Relay did not accept {}: {}", event_name, response);
                }

                DeliveryReport {
                    success,
                    event_id,
                    response: Some(response),
                    error: None,
                }
            }
            Err(e) => {
                warn!("Delivery of {} failed: {}", event_name, e);

                DeliveryReport {
                    success: false,
                    event_id,
                    response: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn build_event(
        &self,
        event_name: &str,
        user_data: Option<UserData>,
        custom_data: Map<String, Value>,
    ) -> TrackEventRequest {
        let cookies = ad_cookies(&self.page.cookies);

        // Cookies win over whatever the caller put in: they are
        // the live browser identifiers
        let mut user_data = user_data.unwrap_or_default();
        user_data.fbp = cookies.fbp;
        user_data.fbc = cookies.fbc;

        TrackEventRequest {
            event_name: event_name.to_string(),
            event_id: Some(client_event_id()),
            user_data: Some(user_data),
            custom_data,
            event_source_url: Some(self.page.url.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::transport::testing::RecordingTransport;
    use serde_json::json;

    fn page() -> PageSignals {
        PageSignals {
            url: "https://shop.example/resultado".into(),
            cookies: "_fbp=fb.1.1700000000.123; _fbc=fb.1.1700000000.IwAR0".into(),
        }
    }

    #[actix_web::test]
    async fn mount_fires_page_view_exactly_once() {
        let transport = RecordingTransport::succeeding();
        let emitter = EventEmitter::new(transport.clone(), page());

        let first = emitter.mount().await;
        let second = emitter.mount().await;

        assert!(first.unwrap().success);
        assert!(second.is_none());

        let events = transport.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name, "PageView");
    }

    #[actix_web::test]
    async fn a_fresh_mount_fires_its_own_page_view() {
        let transport = RecordingTransport::succeeding();

        EventEmitter::new(transport.clone(), page()).mount().await;
        EventEmitter::new(transport.clone(), page()).mount().await;

        assert_eq!(transport.events.lock().len(), 2);
    }

    #[actix_web::test]
    async fn events_carry_cookies_id_and_page_url() {
        let transport = RecordingTransport::succeeding();
        let emitter = EventEmitter::new(transport.clone(), page());

        let report = emitter
            .track_lead(
                Some(UserData {
                    email: Some("user@example.com".into()),
                    ..Default::default()
                }),
                json!({ "value": 197 }).as_object().unwrap().clone(),
            )
            .await;

        assert!(report.success);
        assert!(report.event_id.as_deref().unwrap().starts_with("evt_"));

        let events = transport.events.lock();
        let event = &events[0];
        let user = event.user_data.as_ref().unwrap();

        assert_eq!(event.event_name, "Lead");
        assert_eq!(user.email.as_deref(), Some("user@example.com"));
        assert_eq!(user.fbp.as_deref(), Some("fb.1.1700000000.123"));
        assert_eq!(user.fbc.as_deref(), Some("fb.1.1700000000.IwAR0"));
        assert_eq!(
            event.event_source_url.as_deref(),
            Some("https://shop.example/resultado")
        );
        assert_eq!(event.custom_data.get("value").unwrap(), 197);
    }

    #[actix_web::test]
    async fn missing_cookies_stay_absent() {
        let transport = RecordingTransport::succeeding();
        let emitter = EventEmitter::new(
            transport.clone(),
            PageSignals {
                url: "https://shop.example/".into(),
                cookies: String::new(),
            },
        );

        emitter.track_view_content(Map::new()).await;

        let events = transport.events.lock();
        let user = events[0].user_data.as_ref().unwrap();

        assert!(user.fbp.is_none());
        assert!(user.fbc.is_none());
    }

    #[actix_web::test]
    async fn transport_failure_becomes_structured_report() {
        let transport = RecordingTransport::failing();
        let emitter = EventEmitter::new(transport, page());

        let report = emitter.track_page_view().await;

        assert!(!report.success);
        assert!(report.response.is_none());
        assert!(report.error.unwrap().contains("connection refused"));
    }

    #[actix_web::test]
    async fn relay_rejection_is_not_a_success() {
        let transport =
            RecordingTransport::answering(json!({ "error": "event_name is required" }));
        let emitter = EventEmitter::new(transport, page());

        let report = emitter.track("Lead", None, Map::new()).await;

        assert!(!report.success);
        assert_eq!(
            report.response.unwrap(),
            json!({ "error": "event_name is required" })
        );
    }
}
