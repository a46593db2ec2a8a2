//! Gemini client with ordered model fallback.
//!
//! This crate provides:
//! - [`Orchestrator`], which tries model candidates strictly in order
//! - [`GeminiClient`], the REST backend for `generateContent` and file polling
//! - The [`InferenceBackend`] seam so other backends (or test doubles) plug in

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod types;

pub use backend::InferenceBackend;
pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use error::{GeminiError, GeminiResult};
pub use orchestrator::{FallbackPolicy, Orchestrator};
pub use types::{
    default_candidates, FileMetadata, FileState, GenerationConfig, GenerationResult,
    ModelCandidate, PromptPart,
};
