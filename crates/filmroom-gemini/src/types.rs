//! Model candidates, prompt parts and Gemini wire types.

use serde::{Deserialize, Serialize};

/// One piece of a prompt: inline text or a reference to uploaded media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPart {
    Text(String),
    File { mime_type: String, file_uri: String },
}

impl PromptPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn file(mime_type: impl Into<String>, file_uri: impl Into<String>) -> Self {
        Self::File {
            mime_type: mime_type.into(),
            file_uri: file_uri.into(),
        }
    }
}

/// Sampling settings sent with every request to a candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub response_mime_type: String,
}

impl GenerationConfig {
    /// Reproducible settings: temperature pinned to zero, JSON output.
    pub fn deterministic() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.95,
            top_k: 40,
            response_mime_type: "application/json".to_string(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::deterministic()
    }
}

/// A model variant attempted in priority order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCandidate {
    pub id: String,
    pub generation: GenerationConfig,
}

impl ModelCandidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            generation: GenerationConfig::deterministic(),
        }
    }
}

/// Default fallback order: most capable first, most available last.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-2.5-pro",
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-2.5-flash-lite",
];

pub fn default_candidates() -> Vec<ModelCandidate> {
    DEFAULT_MODELS.iter().map(|m| ModelCandidate::new(*m)).collect()
}

/// Raw model output plus the candidate that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: String,
    pub model: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiRequest<'a> {
    pub contents: Vec<Content>,
    pub generation_config: &'a GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Part {
    Text {
        text: String,
    },
    File {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

impl<'a> GeminiRequest<'a> {
    pub fn new(prompt: &[PromptPart], generation_config: &'a GenerationConfig) -> Self {
        let parts = prompt
            .iter()
            .map(|p| match p {
                PromptPart::Text(text) => Part::Text { text: text.clone() },
                PromptPart::File { mime_type, file_uri } => Part::File {
                    file_data: FileData {
                        mime_type: mime_type.clone(),
                        file_uri: file_uri.clone(),
                    },
                },
            })
            .collect();

        Self {
            contents: vec![Content { role: "user", parts }],
            generation_config,
        }
    }
}

/// `generateContent` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    pub text: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate.
    pub fn first_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    StateUnspecified,
    Processing,
    Active,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Metadata of an uploaded file as returned by `files/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub state: FileState,
}
