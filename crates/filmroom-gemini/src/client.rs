//! Gemini REST client.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::backend::InferenceBackend;
use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};
use crate::orchestrator::Orchestrator;
use crate::types::{
    FileMetadata, FileState, GeminiRequest, GeminiResponse, ModelCandidate, PromptPart,
};

/// The key travels in a header so it never appears in a request URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        if config.api_key.is_empty() {
            return Err(GeminiError::config("Gemini API key is empty"));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(GeminiError::network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> GeminiResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Wrap this client in an orchestrator using the configured candidates,
    /// fallback policy and request timeout.
    pub fn into_orchestrator(self) -> Orchestrator<GeminiClient> {
        let candidates = self.config.candidates.clone();
        let policy = self.config.fallback_policy;
        let timeout = self.config.request_timeout;
        Orchestrator::new(self, candidates)
            .with_policy(policy)
            .with_call_timeout(timeout)
    }

    /// Fetch metadata for an uploaded file (`files/abc` or `abc`).
    pub async fn get_file(&self, name: &str) -> GeminiResult<FileMetadata> {
        let url = format!("{}/{}", self.config.base_url, file_resource(name));

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(GeminiError::network)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::request_failed(format!(
                "file lookup returned {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            GeminiError::invalid_response(format!("Failed to parse file metadata: {}", e.without_url()))
        })
    }

    /// Poll an uploaded file until it is ACTIVE.
    ///
    /// Polls every `file_poll_interval`, at most `file_poll_max_attempts`
    /// times. A FAILED state ends polling immediately.
    pub async fn wait_for_file_active(&self, name: &str) -> GeminiResult<FileMetadata> {
        let max_attempts = self.config.file_poll_max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let file = self.get_file(name).await?;
            match file.state {
                FileState::Active => {
                    info!(file = %file.name, attempt, "File ready for analysis");
                    return Ok(file);
                }
                FileState::Failed => {
                    return Err(GeminiError::FileProcessingFailed(file.name));
                }
                state => {
                    debug!(file = %file.name, ?state, attempt, "File not ready yet");
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.config.file_poll_interval).await;
            }
        }

        warn!(file = name, attempts = max_attempts, "Gave up waiting for file");
        Err(GeminiError::FileNotReady {
            name: name.to_string(),
            attempts: max_attempts,
        })
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.config.base_url, model)
    }
}

#[async_trait]
impl InferenceBackend for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate_content(
        &self,
        candidate: &ModelCandidate,
        prompt: &[PromptPart],
    ) -> GeminiResult<String> {
        let request = GeminiRequest::new(prompt, &candidate.generation);

        let response = self
            .http
            .post(self.generate_url(&candidate.id))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeminiError::Timeout(self.config.request_timeout)
                } else {
                    GeminiError::network(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::from_http_status(&candidate.id, status, &body));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            GeminiError::invalid_response(format!(
                "Failed to parse Gemini response: {}",
                e.without_url()
            ))
        })?;

        gemini_response
            .first_text()
            .ok_or_else(|| GeminiError::invalid_response("No content in Gemini response"))
    }
}

fn file_resource(name: &str) -> String {
    if name.starts_with("files/") {
        name.to_string()
    } else {
        format!("files/{}", name)
    }
}
