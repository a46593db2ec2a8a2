//! Ordered model fallback.
//!
//! Candidates are tried strictly in order, one at a time, each at most once.
//! The first success wins; if all fail the caller gets a single error whose
//! source is the last failure.

use std::str::FromStr;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::backend::InferenceBackend;
use crate::error::{GeminiError, GeminiResult};
use crate::metrics;
use crate::types::{GenerationResult, ModelCandidate, PromptPart};

/// How failures other than "model unavailable" are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Every failure advances to the next candidate.
    #[default]
    Permissive,
    /// Quota/billing failures abort the request immediately.
    FailFastOnQuota,
}

impl FallbackPolicy {
    /// Whether `error` from one candidate should stop the whole request.
    pub fn aborts_on(&self, error: &GeminiError) -> bool {
        match self {
            FallbackPolicy::Permissive => false,
            FallbackPolicy::FailFastOnQuota => error.is_quota(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackPolicy::Permissive => "permissive",
            FallbackPolicy::FailFastOnQuota => "fail_fast_on_quota",
        }
    }
}

impl FromStr for FallbackPolicy {
    type Err = GeminiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "permissive" => Ok(FallbackPolicy::Permissive),
            "fail_fast_on_quota" | "fail-fast-on-quota" | "fail_fast" => {
                Ok(FallbackPolicy::FailFastOnQuota)
            }
            other => Err(GeminiError::config(format!(
                "unknown fallback policy '{}'",
                other
            ))),
        }
    }
}

/// Walks an ordered candidate list against one backend.
pub struct Orchestrator<B> {
    backend: B,
    candidates: Vec<ModelCandidate>,
    policy: FallbackPolicy,
    call_timeout: Option<Duration>,
}

impl<B: InferenceBackend> Orchestrator<B> {
    pub fn new(backend: B, candidates: Vec<ModelCandidate>) -> Self {
        Self {
            backend,
            candidates,
            policy: FallbackPolicy::default(),
            call_timeout: None,
        }
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound each candidate call. An elapsed call is dropped (cancelled)
    /// and counts as a `Timeout` failure for that candidate.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Generate with the configured candidate list.
    pub async fn generate(&self, prompt: &[PromptPart]) -> GeminiResult<GenerationResult> {
        self.generate_with(prompt, &self.candidates).await
    }

    /// Generate with an explicit candidate list.
    pub async fn generate_with(
        &self,
        prompt: &[PromptPart],
        candidates: &[ModelCandidate],
    ) -> GeminiResult<GenerationResult> {
        let mut last_error: Option<GeminiError> = None;
        let mut attempts = 0usize;

        for candidate in candidates {
            attempts += 1;
            info!(
                backend = self.backend.name(),
                model = %candidate.id,
                attempt = attempts,
                "Attempting generation with model: {}", candidate.id
            );

            let started = Instant::now();
            let outcome = self.call_candidate(candidate, prompt).await;
            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

            match outcome {
                Ok(text) => {
                    metrics::record_attempt(&candidate.id, "success", latency_ms);
                    info!(model = %candidate.id, "Generation succeeded with {}", candidate.id);
                    return Ok(GenerationResult {
                        text,
                        model: candidate.id.clone(),
                    });
                }
                Err(e) => {
                    metrics::record_attempt(&candidate.id, e.kind(), latency_ms);
                    if e.is_candidate_unavailable() {
                        warn!(model = %candidate.id, error = %e, "Model unavailable, trying next");
                    } else {
                        warn!(
                            model = %candidate.id,
                            kind = e.kind(),
                            retryable = e.is_retryable(),
                            error = %e,
                            "Candidate failed"
                        );
                    }

                    if self.policy.aborts_on(&e) {
                        warn!(
                            policy = self.policy.as_str(),
                            "Aborting fallback chain after {} failure", e.kind()
                        );
                        return Err(e);
                    }
                    last_error = Some(e);
                }
            }
        }

        let last =
            last_error.unwrap_or_else(|| GeminiError::config("no candidates configured"));

        Err(GeminiError::exhausted(attempts, last))
    }

    async fn call_candidate(
        &self,
        candidate: &ModelCandidate,
        prompt: &[PromptPart],
    ) -> GeminiResult<String> {
        let call = self.backend.generate_content(candidate, prompt);
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GeminiError::Timeout(limit))?,
            None => call.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Clone)]
    enum Outcome {
        Text(&'static str),
        Unavailable,
        Quota,
        Fail(&'static str),
        Hang,
    }

    struct ScriptedBackend {
        script: HashMap<&'static str, Outcome>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(script: &[(&'static str, Outcome)]) -> Self {
            Self {
                script: script.iter().cloned().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InferenceBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn generate_content(
            &self,
            candidate: &ModelCandidate,
            _prompt: &[PromptPart],
        ) -> GeminiResult<String> {
            self.calls.lock().unwrap().push(candidate.id.clone());
            match self.script.get(candidate.id.as_str()).cloned() {
                Some(Outcome::Text(t)) => Ok(t.to_string()),
                Some(Outcome::Unavailable) => {
                    Err(GeminiError::unavailable(&candidate.id, "HTTP 404: not found"))
                }
                Some(Outcome::Quota) => Err(GeminiError::QuotaExceeded("HTTP 429".into())),
                Some(Outcome::Fail(msg)) => Err(GeminiError::request_failed(msg)),
                Some(Outcome::Hang) => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok("too late".to_string())
                }
                None => Err(GeminiError::unavailable(&candidate.id, "unscripted")),
            }
        }
    }

    fn candidates(ids: &[&str]) -> Vec<ModelCandidate> {
        ids.iter().map(|id| ModelCandidate::new(*id)).collect()
    }

    fn prompt() -> Vec<PromptPart> {
        vec![PromptPart::text("grade this clip")]
    }

    #[tokio::test]
    async fn test_first_success_stops_the_chain() {
        let backend = ScriptedBackend::new(&[("a", Outcome::Text("{}")), ("b", Outcome::Text("{}"))]);
        let orchestrator = Orchestrator::new(backend, candidates(&["a", "b"]));

        let result = orchestrator.generate(&prompt()).await.unwrap();

        assert_eq!(result.model, "a");
        assert_eq!(orchestrator.backend().calls(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_last_candidate_success_after_each_prior_once() {
        let backend = ScriptedBackend::new(&[
            ("a", Outcome::Unavailable),
            ("b", Outcome::Fail("HTTP 500: boom")),
            ("c", Outcome::Quota),
            ("d", Outcome::Text("ok")),
        ]);
        let orchestrator = Orchestrator::new(backend, candidates(&["a", "b", "c", "d"]));

        let result = orchestrator.generate(&prompt()).await.unwrap();

        assert_eq!(result.text, "ok");
        assert_eq!(result.model, "d");
        assert_eq!(orchestrator.backend().calls(), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_all_failed_reports_last_error() {
        let backend = ScriptedBackend::new(&[
            ("a", Outcome::Fail("HTTP 500: first")),
            ("b", Outcome::Fail("HTTP 503: model overloaded")),
        ]);
        let orchestrator = Orchestrator::new(backend, candidates(&["a", "b"]));

        let err = orchestrator.generate(&prompt()).await.unwrap_err();

        match &err {
            GeminiError::AllCandidatesExhausted { attempts, last } => {
                assert_eq!(*attempts, 2);
                assert!(matches!(**last, GeminiError::RequestFailed(ref m) if m == "HTTP 503: model overloaded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("HTTP 503: model overloaded"));
        assert!(!err.to_string().contains("first"));
    }

    #[tokio::test]
    async fn test_exhausted_after_quota_is_classifiable() {
        let backend = ScriptedBackend::new(&[("a", Outcome::Unavailable), ("b", Outcome::Quota)]);
        let orchestrator = Orchestrator::new(backend, candidates(&["a", "b"]));

        let err = orchestrator.generate(&prompt()).await.unwrap_err();

        assert!(!err.is_quota());
        assert!(err.last_cause().is_some_and(GeminiError::is_quota));
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let orchestrator = Orchestrator::new(ScriptedBackend::new(&[]), Vec::new());
        let err = orchestrator.generate(&prompt()).await.unwrap_err();
        assert!(matches!(err, GeminiError::AllCandidatesExhausted { attempts: 0, .. }));
        assert!(matches!(err.last_cause(), Some(GeminiError::Config(_))));
    }

    #[tokio::test]
    async fn test_fail_fast_policy_stops_on_quota() {
        let backend = ScriptedBackend::new(&[("a", Outcome::Quota), ("b", Outcome::Text("ok"))]);
        let orchestrator = Orchestrator::new(backend, candidates(&["a", "b"]))
            .with_policy(FallbackPolicy::FailFastOnQuota);

        let err = orchestrator.generate(&prompt()).await.unwrap_err();

        assert!(err.is_quota());
        assert_eq!(orchestrator.backend().calls(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_fail_fast_policy_still_skips_unavailable() {
        let backend = ScriptedBackend::new(&[("a", Outcome::Unavailable), ("b", Outcome::Text("ok"))]);
        let orchestrator = Orchestrator::new(backend, candidates(&["a", "b"]))
            .with_policy(FallbackPolicy::FailFastOnQuota);

        let result = orchestrator.generate(&prompt()).await.unwrap();
        assert_eq!(result.model, "b");
    }

    #[tokio::test]
    async fn test_call_timeout_moves_to_next_candidate() {
        let backend = ScriptedBackend::new(&[("slow", Outcome::Hang), ("fast", Outcome::Text("ok"))]);
        let orchestrator = Orchestrator::new(backend, candidates(&["slow", "fast"]))
            .with_call_timeout(Duration::from_millis(20));

        let result = orchestrator.generate(&prompt()).await.unwrap();

        assert_eq!(result.model, "fast");
        assert_eq!(orchestrator.backend().calls(), vec!["slow", "fast"]);
    }

    #[tokio::test]
    async fn test_call_timeout_reports_its_limit() {
        let backend = ScriptedBackend::new(&[("slow", Outcome::Hang)]);
        let orchestrator = Orchestrator::new(backend, candidates(&["slow"]))
            .with_call_timeout(Duration::from_millis(20));

        let err = orchestrator.generate(&prompt()).await.unwrap_err();

        match err.last_cause() {
            Some(GeminiError::Timeout(limit)) => assert_eq!(*limit, Duration::from_millis(20)),
            other => panic!("unexpected cause: {other:?}"),
        }
        assert!(err.to_string().contains("Timeout after 20ms"));
    }

    #[tokio::test]
    async fn test_explicit_candidate_list_overrides_configured() {
        let backend = ScriptedBackend::new(&[("a", Outcome::Text("A")), ("z", Outcome::Text("Z"))]);
        let orchestrator = Orchestrator::new(backend, candidates(&["a"]));

        let result = orchestrator
            .generate_with(&prompt(), &candidates(&["z"]))
            .await
            .unwrap();
        assert_eq!(result.text, "Z");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("permissive".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::Permissive);
        assert_eq!(
            "FAIL_FAST_ON_QUOTA".parse::<FallbackPolicy>().unwrap(),
            FallbackPolicy::FailFastOnQuota
        );
        assert!("sometimes".parse::<FallbackPolicy>().is_err());
    }
}
