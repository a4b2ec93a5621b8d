//! Low-level HTTP helpers shared by the fetch-based strategies.

use crate::error::ExtractError;

/// Fetch the HTML body of a URL with the shared client.
///
/// Status mapping follows the strategy failure taxonomy: HTTP ≥ 500 is a
/// network-level failure (the server is broken, not the page shape), any
/// other non-2xx status is a parse-level failure for this URL (the listing
/// simply is not there).
pub(crate) async fn fetch_html(
    client: &reqwest::Client,
    url: &str,
    timeout_secs: u64,
) -> Result<String, ExtractError> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
        .send()
        .await
        .map_err(|e| ExtractError::from_reqwest(url, &e, timeout_secs))?;

    let status = response.status();
    if status.is_server_error() {
        return Err(ExtractError::Network {
            url: url.to_owned(),
            reason: format!("HTTP {}", status.as_u16()),
        });
    }
    if !status.is_success() {
        return Err(ExtractError::Parse {
            url: url.to_owned(),
            reason: format!("HTTP {}", status.as_u16()),
        });
    }

    response
        .text()
        .await
        .map_err(|e| ExtractError::from_reqwest(url, &e, timeout_secs))
}

/// Extracts the scheme+host origin from a target URL.
///
/// Given `"https://dolsan-mall.example.com/shop/main"`, returns
/// `"https://dolsan-mall.example.com"`. Used by the template strategy to
/// probe candidate listing paths from the site root regardless of which page
/// the registry points at.
pub(crate) fn extract_origin(url: &str) -> String {
    reqwest::Url::parse(url).map_or_else(
        |_| {
            // fallback: take "https://host" by splitting on '/' and taking first 3 parts
            url.trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}
