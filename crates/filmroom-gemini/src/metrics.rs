//! Generation metrics.
//!
//! - Attempt counters by model and outcome
//! - Latency histogram per model

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Candidate attempts by model and outcome.
    pub const CANDIDATE_ATTEMPTS_TOTAL: &str = "gemini_candidate_attempts_total";

    /// generateContent latency in seconds by model.
    pub const GENERATE_LATENCY_SECONDS: &str = "gemini_generate_latency_seconds";
}

/// Record one candidate attempt. `outcome` is "success" or an error kind.
pub fn record_attempt(model: &str, outcome: &'static str, latency_ms: f64) {
    counter!(
        names::CANDIDATE_ATTEMPTS_TOTAL,
        "model" => model.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        names::GENERATE_LATENCY_SECONDS,
        "model" => model.to_string()
    )
    .record(latency_ms / 1000.0);
}
