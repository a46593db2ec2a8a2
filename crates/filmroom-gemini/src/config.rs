//! Gemini client configuration.

use std::time::Duration;

use crate::error::{GeminiError, GeminiResult};
use crate::orchestrator::FallbackPolicy;
use crate::types::{default_candidates, ModelCandidate};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini backend and its fallback chain.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Base URL including the API version
    pub base_url: String,
    /// Ordered model candidates
    pub candidates: Vec<ModelCandidate>,
    /// What to do when a candidate reports quota/billing exhaustion
    pub fallback_policy: FallbackPolicy,
    /// Upper bound on a single generateContent call
    pub request_timeout: Duration,
    /// Delay between file state polls
    pub file_poll_interval: Duration,
    /// Polls before giving up on an uploaded file
    pub file_poll_max_attempts: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            candidates: default_candidates(),
            fallback_policy: FallbackPolicy::default(),
            request_timeout: Duration::from_secs(120),
            file_poll_interval: Duration::from_secs(2),
            file_poll_max_attempts: 60,
        }
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> GeminiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::config("GEMINI_API_KEY not set"))?;

        let candidates = match std::env::var("GEMINI_MODELS") {
            Ok(list) => parse_model_list(&list),
            Err(_) => default_candidates(),
        };
        if candidates.is_empty() {
            return Err(GeminiError::config("GEMINI_MODELS contains no model ids"));
        }

        let fallback_policy = match std::env::var("GEMINI_FALLBACK_POLICY") {
            Ok(v) => v.parse()?,
            Err(_) => FallbackPolicy::default(),
        };

        Ok(Self {
            api_key,
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            candidates,
            fallback_policy,
            request_timeout: Duration::from_secs(
                std::env::var("GEMINI_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            file_poll_interval: Duration::from_secs(
                std::env::var("GEMINI_FILE_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            ),
            file_poll_max_attempts: std::env::var("GEMINI_FILE_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<ModelCandidate>) -> Self {
        self.candidates = candidates;
        self
    }
}

/// Parse a comma-separated list of model ids, keeping order.
pub fn parse_model_list(list: &str) -> Vec<ModelCandidate> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ModelCandidate::new)
        .collect()
}
