use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid URL")]
    InvalidUrl,

    /// The endpoint rejected the request. A bad key and a bad URL look the
    /// same from here, so they are reported together.
    #[error("Invalid API key or URL")]
    AuthOrUrl,

    #[error("Invalid response")]
    MalformedResponse,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to save configuration: {0}")]
    Store(String),

    #[error("cancelled")]
    Cancelled,
}

impl CredentialError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CredentialError::InvalidUrl => "Enter a valid http(s) URL.",
            CredentialError::AuthOrUrl => "The endpoint rejected the request. Check the URL and API key.",
            CredentialError::MalformedResponse => "The endpoint did not return a model list.",
            CredentialError::Network(_) => "Network error. Check your connection.",
            CredentialError::Store(_) => "Could not save the configuration.",
            CredentialError::Cancelled => "Configuration cancelled.",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CredentialError::Cancelled)
    }
}

pub type CredentialResult<T> = Result<T, CredentialError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_inline_dialog_text() {
        assert_eq!(CredentialError::InvalidUrl.to_string(), "Invalid URL");
        assert_eq!(CredentialError::AuthOrUrl.to_string(), "Invalid API key or URL");
        assert_eq!(CredentialError::MalformedResponse.to_string(), "Invalid response");
    }

    #[test]
    fn only_cancelled_reports_cancellation() {
        assert!(CredentialError::Cancelled.is_cancelled());
        assert!(!CredentialError::AuthOrUrl.is_cancelled());
        assert!(!CredentialError::Store("disk full".into()).is_cancelled());
    }
}
