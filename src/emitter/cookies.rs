/// First-party cookie set by the ad platform's pixel to identify
/// the browser
pub const FBP_COOKIE: &str = "_fbp";

/// First-party cookie carrying the ad click context, present only
/// after an ad click landed the session
pub const FBC_COOKIE: &str = "_fbc";

/// The two ad-platform identifiers read from the page's cookies.
/// Missing cookies are None, never an empty string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdCookies {
    pub fbp: Option<String>,
    pub fbc: Option<String>,
}

/// Find one cookie in a `document.cookie`-style header string.
/// Malformed pairs are skipped rather than failing the lookup
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next()?;
            let value = parts.next()?;

            (key == name).then(|| value.to_string())
        })
        .find(|value| !value.is_empty())
}

pub fn ad_cookies(header: &str) -> AdCookies {
    AdCookies {
        fbp: cookie_value(header, FBP_COOKIE),
        fbc: cookie_value(header, FBC_COOKIE),
    }
}
