use thiserror::Error;

/// Failure taxonomy for one extraction session.
///
/// `Extraction` is the only recoverable kind: the session degrades to
/// markup-only extraction and still returns a success envelope. Everything
/// else aborts the session and becomes a failure envelope; callers never
/// see a raw error cross the invocation boundary.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("url is required")]
    MissingUrl,

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("in-page evaluation failed: {0}")]
    Extraction(String),

    #[error("session failed: {0}")]
    Session(String),
}

impl ScrapeError {
    /// Recoverable errors leave the session running with partial data.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScrapeError::Extraction(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_extraction_errors_are_recoverable() {
        assert!(ScrapeError::Extraction("probe threw".into()).is_recoverable());
        assert!(!ScrapeError::Navigation("dns failure".into()).is_recoverable());
        assert!(!ScrapeError::MissingUrl.is_recoverable());
    }

    #[test]
    fn invalid_url_message_names_the_url() {
        let err = ScrapeError::InvalidUrl {
            url: "not a url".into(),
            reason: "relative URL without a base".into(),
        };
        assert!(err.to_string().contains("not a url"));
    }
}
