use thiserror::Error;

/// Strategy-level extraction failures.
///
/// All variants are recoverable from the orchestrator's point of view: each
/// simply yields a failed attempt and the next candidate strategy is tried.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("timed out after {timeout_secs}s on {url}")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("no structural match in {url}: {reason}")]
    Parse { url: String, reason: String },
}

impl ExtractError {
    /// Classify a `reqwest` failure: request timeouts map to [`Timeout`],
    /// everything else (DNS, connect, TLS, body read) to [`Network`].
    ///
    /// [`Timeout`]: ExtractError::Timeout
    /// [`Network`]: ExtractError::Network
    pub(crate) fn from_reqwest(url: &str, err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ExtractError::Timeout {
                url: url.to_owned(),
                timeout_secs,
            }
        } else {
            ExtractError::Network {
                url: url.to_owned(),
                reason: err.to_string(),
            }
        }
    }
}
