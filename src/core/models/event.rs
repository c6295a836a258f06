use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The inbound event shape accepted by the capture route and
/// produced by the [`crate::emitter`]. Everything is defaulted so
/// a structurally valid but empty body still deserializes, the
/// capture pipeline owns rejecting a missing event name with a
/// proper 400 rather than a serde error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackEventRequest {
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub user_data: Option<UserData>,
    /// Open key/value mapping forwarded upstream without
    /// interpretation. Bounded only by the route body size limit
    #[serde(default)]
    pub custom_data: Map<String, Value>,
    #[serde(default)]
    pub event_source_url: Option<String>,
}

/// Caller supplied identity signals. The plaintext fields are
/// hashed before they leave this process, fbc/fbp are browser
/// identifiers the upstream expects verbatim
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub fbc: Option<String>,
    #[serde(default)]
    pub fbp: Option<String>,
}
