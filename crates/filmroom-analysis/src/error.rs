//! Analysis error types.

use filmroom_gemini::GeminiError;
use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Failures that end a clip analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("AI analysis failed: {0}")]
    Generation(#[from] GeminiError),

    #[error("Clip not ready for analysis: {0}")]
    ClipNotReady(GeminiError),
}

impl AnalysisError {
    /// Message suitable for showing to the person who uploaded the clip.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Generation(GeminiError::AllCandidatesExhausted { last, .. }) => {
                format!("Analysis is unavailable right now ({})", last)
            }
            AnalysisError::Generation(e) => format!("Analysis failed: {}", e),
            AnalysisError::ClipNotReady(_) => {
                "The uploaded clip could not be prepared for analysis".to_string()
            }
        }
    }
}

/// The model output could not be turned into a report.
///
/// Every variant keeps the raw text so the failure can be inspected later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("No JSON object found in model output")]
    NoPayload { raw: String },

    #[error("Invalid JSON in model output: {message}")]
    InvalidJson { message: String, raw: String },

    #[error("Model output is missing required field '{field}'")]
    MissingField { field: &'static str, raw: String },
}

impl ExtractionError {
    pub fn raw_text(&self) -> &str {
        match self {
            ExtractionError::NoPayload { raw }
            | ExtractionError::InvalidJson { raw, .. }
            | ExtractionError::MissingField { raw, .. } => raw,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::NoPayload { .. } => "no_payload",
            ExtractionError::InvalidJson { .. } => "invalid_json",
            ExtractionError::MissingField { .. } => "missing_field",
        }
    }
}
