use url::Url;

/// The utm vendor's hosted loader scripts. Centralized so the
/// first-party rewrite knows exactly which urls it may touch
const UTMIFY_PIXEL_SRC: &str = "https://cdn.utmify.com.br/scripts/pixel/pixel.js";
const UTMIFY_UTMS_SRC: &str = "https://cdn.utmify.com.br/scripts/utms/latest.js";

/// The tag-management container bootstrap, script plus noscript
/// fallback. Injected once per page load by the host page, after
/// which the container runs autonomously
pub fn gtm_snippet(container_id: &str) -> String {
    format!(
        concat!(
            "<script>",
            "(function(w,d,s,l,i){{w[l]=w[l]||[];w[l].push({{'gtm.start':",
            "new Date().getTime(),event:'gtm.js'}});var f=d.getElementsByTagName(s)[0],",
            "j=d.createElement(s),dl=l!='dataLayer'?'&l='+l:'';j.async=true;j.src=",
            "'https://www.googletagmanager.com/gtm.js?id='+i+dl;f.parentNode.insertBefore(j,f);",
            "}})(window,document,'script','dataLayer','{id}');",
            "</script>\n",
            "<noscript><iframe src=\"https://www.googletagmanager.com/ns.html?id={id}\" ",
            "height=\"0\" width=\"0\" style=\"display:none;visibility:hidden\"></iframe></noscript>"
        ),
        id = container_id
    )
}

/// The utm vendor's pixel loader. The pixel id is published to
/// the page before the async script tag
pub fn utmify_pixel_snippet(pixel_id: &str) -> String {
    format!(
        "<script>window.pixelId=\"{}\";</script>\n<script async defer src=\"{}\"></script>",
        pixel_id, UTMIFY_PIXEL_SRC
    )
}

/// The utm vendor's parameter tracker
pub fn utmify_utm_snippet() -> String {
    format!(
        "<script async defer data-utmify-prevent-subids src=\"{}\"></script>",
        UTMIFY_UTMS_SRC
    )
}

/// Rewrite the host of an analytics url to a first-party relay
/// domain, leaving scheme, path and query untouched. Urls that do
/// not parse are returned unchanged, vendor scripts occasionally
/// pass through non-url strings and breaking them would break the
/// page
pub fn rewrite_vendor_host(raw_url: &str, first_party_host: &str) -> String {
    let mut url = match Url::parse(raw_url) {
        Ok(url) => url,
        Err(_) => return raw_url.to_string(),
    };

    if url.set_host(Some(first_party_host)).is_err() {
        return raw_url.to_string();
    }

    url.to_string()
}

/// Every snippet the funnel pages need, in injection order. With
/// a first-party host configured, the vendor loader urls are
/// rewritten so analytics traffic stays on the relay domain
pub fn bootstrap_fragment(
    gtm_container: &str,
    utmify_pixel: &str,
    first_party_host: Option<&str>,
) -> String {
    let mut html = format!(
        "{}\n{}\n{}",
        gtm_snippet(gtm_container),
        utmify_pixel_snippet(utmify_pixel),
        utmify_utm_snippet()
    );

    if let Some(host) = first_party_host {
        for vendor_url in [UTMIFY_PIXEL_SRC, UTMIFY_UTMS_SRC] {
            html = html.replace(vendor_url, &rewrite_vendor_host(vendor_url, host));
        }
    }

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gtm_snippet_embeds_container_in_both_tags() {
        let html = gtm_snippet("GTM-T8M558NG");

        assert!(html.contains("gtm.js?id='+i"));
        assert!(html.contains("'GTM-T8M558NG'"));
        assert!(html.contains("ns.html?id=GTM-T8M558NG"));
        assert!(html.contains("<noscript>"));
    }

    #[test]
    fn pixel_snippet_publishes_id_before_loader() {
        let html = utmify_pixel_snippet("683e4507be02a8b1bece6041");

        let id_pos = html.find("window.pixelId").unwrap();
        let loader_pos = html.find("pixel/pixel.js").unwrap();

        assert!(id_pos < loader_pos);
        assert!(html.contains("683e4507be02a8b1bece6041"));
    }

    #[test]
    fn rewrites_vendor_host_only() {
        let out = rewrite_vendor_host(
            "https://cdn.utmify.com.br/scripts/utms/latest.js?v=2",
            "t.shop.example",
        );

        assert_eq!(out, "https://t.shop.example/scripts/utms/latest.js?v=2");
    }

    #[test]
    fn unparseable_url_passes_through() {
        assert_eq!(rewrite_vendor_host("not a url", "t.shop.example"), "not a url");
    }

    #[test]
    fn fragment_contains_all_three_snippets() {
        let html = bootstrap_fragment("GTM-X", "pix-1", None);

        assert!(html.contains("googletagmanager.com"));
        assert!(html.contains("pixel/pixel.js"));
        assert!(html.contains("utms/latest.js"));
    }

    #[test]
    fn first_party_host_rewrites_vendor_loaders_only() {
        let html = bootstrap_fragment("GTM-X", "pix-1", Some("t.shop.example"));

        assert!(html.contains("https://t.shop.example/scripts/pixel/pixel.js"));
        assert!(html.contains("https://t.shop.example/scripts/utms/latest.js"));
        assert!(!html.contains("cdn.utmify.com.br"));
        // The tag-manager container is not ours to proxy
        assert!(html.contains("googletagmanager.com"));
    }
}
