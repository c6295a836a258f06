use serde::Serialize;
use serde_json::{Map, Value};

/// Hashed identity triple computed inside the capture pipeline.
/// None means the caller never supplied the field, which must
/// surface as an explicit null upstream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HashedIdentity {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
}

/// The user_data block of a Conversions API event. Hashed fields
/// use the upstream's abbreviated keys; ip and user agent travel
/// unhashed per the accepted server-event protocol, as do the
/// browser/click identifiers. Absent fields serialize as null on
/// purpose, the shape is fixed
#[derive(Debug, Clone, Serialize)]
pub struct IdentityPayload {
    pub em: Option<String>,
    pub ph: Option<String>,
    #[serde(rename = "fn")]
    pub first_name: Option<String>,
    pub client_ip_address: String,
    pub client_user_agent: String,
    pub fbc: Option<String>,
    pub fbp: Option<String>,
}

/// A single server event as the Conversions API expects it
#[derive(Debug, Clone, Serialize)]
pub struct ConversionEvent {
    pub event_name: String,
    pub event_time: u64,
    pub event_id: String,
    pub event_source_url: String,
    pub action_source: &'static str,
    pub user_data: IdentityPayload,
    pub custom_data: Map<String, Value>,
}

/// The outbound envelope. The access credential is attached at
/// the delivery edge, never here, so this value can sit on the
/// request context without holding a secret
#[derive(Debug, Clone, Serialize)]
pub struct ConversionPayload {
    pub data: Vec<ConversionEvent>,
}

/// Traffic reported through this relay is always web originated
pub const ACTION_SOURCE_WEB: &str = "website";
