//! Clip analysis pipeline: generate, extract, merge.

use filmroom_gemini::{GeminiClient, InferenceBackend, Orchestrator, PromptPart};
use filmroom_models::{AnalysisReport, Roster};
use serde::Serialize;
use tracing::Instrument;

use crate::error::{AnalysisError, AnalysisResult, ExtractionError};
use crate::extract::extract;
use crate::logging::AnalysisLogger;
use crate::prompt::build_analysis_prompt;
use crate::roster::merge_detailed;

/// Everything the caller needs to persist after analyzing one clip.
#[derive(Debug, Clone, Serialize)]
pub struct ClipAnalysis {
    pub report: AnalysisReport,
    pub roster: Roster,
    /// Model candidate that produced the output
    pub model: String,
    /// Set when the output could not be interpreted and `report` is a placeholder
    #[serde(skip)]
    pub extraction_error: Option<ExtractionError>,
}

impl ClipAnalysis {
    pub fn interpreted(&self) -> bool {
        self.extraction_error.is_none()
    }
}

/// Runs one clip through the orchestrator, extractor and roster merge.
pub struct ClipAnalyzer<B> {
    orchestrator: Orchestrator<B>,
}

impl<B: InferenceBackend> ClipAnalyzer<B> {
    pub fn new(orchestrator: Orchestrator<B>) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &Orchestrator<B> {
        &self.orchestrator
    }

    /// Analyze a clip described by `prompt` and fold detections into `roster`.
    ///
    /// Only generation failures are returned as errors. Output that cannot
    /// be interpreted yields a placeholder report and the roster unchanged.
    pub async fn analyze(
        &self,
        prompt: &[PromptPart],
        roster: Roster,
        logger: &AnalysisLogger,
    ) -> AnalysisResult<ClipAnalysis> {
        self.run(prompt, roster, logger)
            .instrument(logger.span())
            .await
    }

    async fn run(
        &self,
        prompt: &[PromptPart],
        roster: Roster,
        logger: &AnalysisLogger,
    ) -> AnalysisResult<ClipAnalysis> {
        logger.started(prompt.len(), roster.len());

        let generation = match self.orchestrator.generate(prompt).await {
            Ok(generation) => generation,
            Err(e) => {
                logger.generation_failed(&e);
                return Err(AnalysisError::Generation(e));
            }
        };
        logger.generated(&generation);

        let report = match extract(&generation.text) {
            Ok(report) => report,
            Err(e) => {
                logger.uninterpretable(&generation.model, &e);
                return Ok(ClipAnalysis {
                    report: AnalysisReport::uninterpretable(e.to_string()),
                    roster,
                    model: generation.model,
                    extraction_error: Some(e),
                });
            }
        };

        let outcome = merge_detailed(roster, &report.players_detected, chrono::Utc::now());
        logger.merged(&report.title, &generation.model, &outcome);

        Ok(ClipAnalysis {
            report,
            roster: outcome.roster,
            model: generation.model,
            extraction_error: None,
        })
    }
}

impl ClipAnalyzer<GeminiClient> {
    /// Wait for an uploaded clip to finish processing, then analyze it.
    pub async fn analyze_uploaded_clip(
        &self,
        file_name: &str,
        rubric: &str,
        roster: Roster,
        logger: &AnalysisLogger,
    ) -> AnalysisResult<ClipAnalysis> {
        logger.waiting_for_clip(file_name);

        let file = self
            .orchestrator
            .backend()
            .wait_for_file_active(file_name)
            .await
            .map_err(|e| {
                logger.clip_not_ready(file_name, &e);
                AnalysisError::ClipNotReady(e)
            })?;

        let prompt = build_analysis_prompt(rubric, &roster, Some(&file));
        self.analyze(&prompt, roster, logger).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use filmroom_gemini::{GeminiError, GeminiResult, ModelCandidate};
    use filmroom_models::report::UNINTERPRETABLE_TITLE;
    use filmroom_models::DetectedSubject;

    use super::*;

    struct FixedBackend(&'static str);

    #[async_trait]
    impl InferenceBackend for FixedBackend {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn generate_content(
            &self,
            _candidate: &ModelCandidate,
            _prompt: &[PromptPart],
        ) -> GeminiResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct DownBackend;

    #[async_trait]
    impl InferenceBackend for DownBackend {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn generate_content(
            &self,
            candidate: &ModelCandidate,
            _prompt: &[PromptPart],
        ) -> GeminiResult<String> {
            Err(GeminiError::request_failed(format!("{} is down", candidate.id)))
        }
    }

    fn analyzer<B: InferenceBackend>(backend: B) -> ClipAnalyzer<B> {
        ClipAnalyzer::new(Orchestrator::new(backend, vec![ModelCandidate::new("m1")]))
    }

    fn logger() -> AnalysisLogger {
        AnalysisLogger::new("session", "clip")
    }

    #[tokio::test]
    async fn test_uninterpretable_output_degrades() {
        let roster = crate::roster::merge(
            Roster::new(),
            &[DetectedSubject::new("CB3", "C", "x")],
        );
        let analysis = analyzer(FixedBackend("I could not see the video, sorry."))
            .analyze(&[PromptPart::text("p")], roster.clone(), &logger())
            .await
            .unwrap();

        assert!(!analysis.interpreted());
        assert_eq!(analysis.report.title, UNINTERPRETABLE_TITLE);
        assert_eq!(analysis.roster, roster);
        assert_eq!(analysis.model, "m1");
        assert!(matches!(
            analysis.extraction_error,
            Some(ExtractionError::NoPayload { .. })
        ));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let err = analyzer(DownBackend)
            .analyze(&[PromptPart::text("p")], Roster::new(), &logger())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::Generation(GeminiError::AllCandidatesExhausted { .. })
        ));
        assert!(err.to_string().contains("m1 is down"));
    }

    #[test]
    fn test_report_without_players_keeps_roster() {
        let json = r#"{"title":"Inside zone","formation":{"offense":"Singleback","defense":"Over"}}"#;
        let analysis = tokio_test::block_on(
            analyzer(FixedBackend(json)).analyze(&[PromptPart::text("p")], Roster::new(), &logger()),
        )
        .unwrap();

        assert!(analysis.interpreted());
        assert_eq!(analysis.report.title, "Inside zone");
        assert!(analysis.roster.is_empty());
    }

    #[tokio::test]
    async fn test_report_titled_like_placeholder_is_still_interpreted() {
        let json = r#"{"title":"Could not interpret result","formation":{"offense":"Empty","defense":"Cover 0"},
            "players_detected":[{"identifier":"LB50","grade":"B","observation":"fast fill"}]}"#;
        let analysis = analyzer(FixedBackend(json))
            .analyze(&[PromptPart::text("p")], Roster::new(), &logger())
            .await
            .unwrap();

        assert!(analysis.interpreted());
        assert_eq!(analysis.report.title, UNINTERPRETABLE_TITLE);
        assert_eq!(analysis.roster.identifiers(), vec!["LB50"]);
    }
}
