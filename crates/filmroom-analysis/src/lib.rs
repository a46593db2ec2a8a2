//! Clip analysis for coaching reports.
//!
//! This crate provides:
//! - Report extraction from raw model output
//! - Roster aggregation across clips in a session
//! - Prompt assembly and the end-to-end clip pipeline
//! - Structured logging for analysis requests

pub mod error;
pub mod extract;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod roster;

pub use error::{AnalysisError, AnalysisResult, ExtractionError};
pub use extract::extract;
pub use logging::{init_tracing, AnalysisLogger};
pub use pipeline::{ClipAnalysis, ClipAnalyzer};
pub use prompt::{build_analysis_prompt, default_rubric, roster_context};
pub use roster::{merge, merge_at, merge_detailed, MergeOutcome};
