//! Structured analysis events.
//!
//! Each pipeline step emits one event with typed fields (model, counts,
//! error kinds) so log queries never have to parse message text.

use filmroom_gemini::{GeminiError, GenerationResult};
use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, util::TryInitError, EnvFilter};

use crate::error::ExtractionError;
use crate::roster::MergeOutcome;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "filmroom_analysis=info,filmroom_gemini=info,warn";

/// Emits the events of one clip analysis, tagged with its session and clip.
#[derive(Debug, Clone)]
pub struct AnalysisLogger {
    session_id: String,
    clip_id: String,
}

impl AnalysisLogger {
    pub fn new(session_id: impl Into<String>, clip_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            clip_id: clip_id.into(),
        }
    }

    /// Span wrapping one analysis request; events inside inherit its fields.
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "clip_analysis",
            session_id = %self.session_id,
            clip_id = %self.clip_id
        )
    }

    pub fn started(&self, prompt_parts: usize, roster_len: usize) {
        info!(prompt_parts, roster_len, "Clip analysis started");
    }

    pub fn waiting_for_clip(&self, file_name: &str) {
        info!(file = file_name, "Waiting for uploaded clip");
    }

    pub fn clip_not_ready(&self, file_name: &str, err: &GeminiError) {
        error!(file = file_name, kind = err.kind(), error = %err, "Uploaded clip not ready");
    }

    pub fn generated(&self, generation: &GenerationResult) {
        info!(
            model = %generation.model,
            output_chars = generation.text.len(),
            "Model responded"
        );
    }

    pub fn generation_failed(&self, err: &GeminiError) {
        error!(
            kind = err.kind(),
            cause = err.last_cause().map(GeminiError::kind),
            error = %err,
            "Generation failed"
        );
    }

    /// Output came back but no report could be read from it.
    pub fn uninterpretable(&self, model: &str, err: &ExtractionError) {
        warn!(
            model,
            kind = err.kind(),
            raw_chars = err.raw_text().len(),
            error = %err,
            "Model output not interpretable, roster left unchanged"
        );
    }

    pub fn merged(&self, title: &str, model: &str, outcome: &MergeOutcome) {
        info!(
            title,
            model,
            added = outcome.added,
            updated = outcome.updated,
            skipped = outcome.skipped,
            roster_len = outcome.roster.len(),
            "Roster merged"
        );
    }
}

/// Install the global subscriber: colored text by default, JSON when
/// `LOG_FORMAT=json`. `RUST_LOG` replaces [`DEFAULT_LOG_FILTER`].
pub fn init_tracing() -> Result<(), TryInitError> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    if use_json {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    }
}
