use thiserror::Error;

/// Errors surfaced by the detector.
///
/// None of these are fatal to the host: selector failures are skipped by the
/// extractor, delivery failures become a presentation error notice.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("document unavailable: {0}")]
    DocumentUnavailable(String),

    #[error("result delivery failed: {0}")]
    Delivery(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
