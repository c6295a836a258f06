use actix_web::http::header::HeaderMap;

/// Best-effort transport metadata for a capture request. Derived
/// once per request from headers and never stored. An empty ip is
/// forwarded as-is, the upstream tolerates the field being blank
/// when no forwarding headers were present
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientContext {
    pub ip: String,
    pub user_agent: String,
    pub referer: String,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl ClientContext {
    /// Extract the originating ip and browser signals. The ip is
    /// the first hop of x-forwarded-for, falling back to
    /// x-real-ip, falling back to empty
    pub fn from_headers(headers: &HeaderMap) -> ClientContext {
        let ip = header_str(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| header_str(headers, "x-real-ip").map(str::to_string))
            .unwrap_or_default();

        let user_agent = header_str(headers, "user-agent")
            .map(str::to_string)
            .unwrap_or_default();

        let referer = header_str(headers, "referer")
            .map(str::to_string)
            .unwrap_or_default();

        ClientContext {
            ip,
            user_agent,
            referer,
        }
    }
}
