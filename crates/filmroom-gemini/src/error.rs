//! Gemini client error types.

use std::time::Duration;

use thiserror::Error;

pub type GeminiResult<T> = Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Model {model} unavailable: {message}")]
    CandidateUnavailable { model: String, message: String },

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("File processing failed: {0}")]
    FileProcessingFailed(String),

    #[error("File {name} not ready after {attempts} polls")]
    FileNotReady { name: String, attempts: u32 },

    #[error("All {attempts} model candidates failed; last error: {last}")]
    AllCandidatesExhausted {
        attempts: usize,
        #[source]
        last: Box<GeminiError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    /// Always built through [`GeminiError::network`], which drops the
    /// request URL from the message.
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeminiError {
    pub fn unavailable(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CandidateUnavailable {
            model: model.into(),
            message: message.into(),
        }
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a transport error without its URL, so query strings and
    /// resource names never reach logs or users.
    pub fn network(err: reqwest::Error) -> Self {
        Self::Network(err.without_url())
    }

    /// The failure of the last candidate tried, wrapped with the attempt count.
    pub fn exhausted(attempts: usize, last: GeminiError) -> Self {
        Self::AllCandidatesExhausted {
            attempts,
            last: Box::new(last),
        }
    }

    /// Cause carried by `AllCandidatesExhausted`, if this is one.
    pub fn last_cause(&self) -> Option<&GeminiError> {
        match self {
            Self::AllCandidatesExhausted { last, .. } => Some(last.as_ref()),
            _ => None,
        }
    }

    /// Classify a non-success HTTP response from `generateContent`.
    pub fn from_http_status(model: &str, status: u16, body: &str) -> Self {
        let lower = body.to_lowercase();
        match status {
            404 => Self::unavailable(model, format!("HTTP 404: {}", body)),
            429 => Self::QuotaExceeded(format!("HTTP 429: {}", body)),
            400 | 403
                if lower.contains("quota")
                    || lower.contains("billing")
                    || lower.contains("resource_exhausted") =>
            {
                Self::QuotaExceeded(format!("HTTP {}: {}", status, body))
            }
            400 if lower.contains("not supported") || lower.contains("is not found") => {
                Self::unavailable(model, format!("HTTP 400: {}", body))
            }
            _ => Self::RequestFailed(format!("HTTP {}: {}", status, body)),
        }
    }

    /// The model variant itself does not exist or cannot serve the request.
    pub fn is_candidate_unavailable(&self) -> bool {
        matches!(self, GeminiError::CandidateUnavailable { .. })
    }

    /// Billing or quota exhaustion; trying another model rarely helps.
    pub fn is_quota(&self) -> bool {
        matches!(self, GeminiError::QuotaExceeded(_))
    }

    /// Transient failure; the same model may succeed on a later request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeminiError::Timeout(_) | GeminiError::Network(_) | GeminiError::RequestFailed(_)
        )
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GeminiError::CandidateUnavailable { .. } => "unavailable",
            GeminiError::QuotaExceeded(_) => "quota",
            GeminiError::RequestFailed(_) => "request_failed",
            GeminiError::InvalidResponse(_) => "invalid_response",
            GeminiError::Timeout(_) => "timeout",
            GeminiError::FileProcessingFailed(_) => "file_failed",
            GeminiError::FileNotReady { .. } => "file_not_ready",
            GeminiError::AllCandidatesExhausted { .. } => "exhausted",
            GeminiError::Config(_) => "config",
            GeminiError::Network(_) => "network",
            GeminiError::Json(_) => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_404() {
        let err = GeminiError::from_http_status("gemini-x", 404, "models/gemini-x is not found");
        assert!(err.is_candidate_unavailable());
        assert!(err.to_string().contains("gemini-x"));
    }

    #[test]
    fn test_from_http_status_429() {
        let err = GeminiError::from_http_status("m", 429, "RESOURCE_EXHAUSTED");
        assert!(err.is_quota());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_from_http_status_billing_403() {
        let err = GeminiError::from_http_status("m", 403, "Billing account disabled");
        assert!(err.is_quota());
    }

    #[test]
    fn test_from_http_status_unsupported_400() {
        let err = GeminiError::from_http_status("m", 400, "Model m is not supported for generateContent");
        assert!(err.is_candidate_unavailable());
    }

    #[test]
    fn test_from_http_status_500() {
        let err = GeminiError::from_http_status("m", 500, "internal");
        assert!(matches!(err, GeminiError::RequestFailed(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_exhausted_message_includes_last_error() {
        let err = GeminiError::exhausted(2, GeminiError::request_failed("HTTP 503: overloaded"));
        assert!(err.to_string().contains("HTTP 503: overloaded"));
    }

    #[test]
    fn test_exhausted_keeps_last_cause_as_source() {
        use std::error::Error as _;

        let err = GeminiError::exhausted(3, GeminiError::QuotaExceeded("HTTP 429".into()));

        let source = err.source().expect("exhausted error has a source");
        assert_eq!(source.to_string(), "Quota exceeded: HTTP 429");
        assert!(err.last_cause().is_some_and(GeminiError::is_quota));
        assert!(GeminiError::config("x").last_cause().is_none());
    }

    #[test]
    fn test_sub_second_timeout_message() {
        let err = GeminiError::Timeout(Duration::from_millis(20));
        assert_eq!(err.to_string(), "Timeout after 20ms");
        assert!(err.is_retryable());
    }
}
