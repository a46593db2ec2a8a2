//! Coaching report models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::roster::DetectedSubject;

/// Title used for reports that could not be interpreted.
pub const UNINTERPRETABLE_TITLE: &str = "Could not interpret result";

/// Structured coaching report for one analyzed clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    /// Short headline, e.g. "Slant vs Cover 1"
    pub title: String,

    /// Offensive and defensive alignment seen in the clip
    pub formation: Formation,

    /// Scouting notes, timeline and grades
    #[serde(default)]
    pub scouting_report: ScoutingReport,

    /// Players the model picked out of the clip
    #[serde(default)]
    pub players_detected: Vec<DetectedSubject>,

    /// Follow-up Q&A attached after the report was created
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chat_history: Vec<ChatTurn>,
}

impl AnalysisReport {
    /// Create a report with the required fields and empty scouting data.
    pub fn new(title: impl Into<String>, formation: Formation) -> Self {
        Self {
            title: title.into(),
            formation,
            scouting_report: ScoutingReport::default(),
            players_detected: Vec::new(),
            chat_history: Vec::new(),
        }
    }

    /// Placeholder report stored when the model output could not be parsed.
    ///
    /// The clip is still recorded; `reason` ends up in the summary so the
    /// caller can show why nothing useful came back. Whether a report is a
    /// placeholder is tracked by the caller, not by the title.
    pub fn uninterpretable(reason: impl Into<String>) -> Self {
        let mut report = Self::new(UNINTERPRETABLE_TITLE, Formation::default());
        report.scouting_report.summary = reason.into();
        report
    }
}

/// The two opposing sides as described by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Formation {
    #[serde(default)]
    pub offense: String,
    #[serde(default)]
    pub defense: String,
}

impl Formation {
    pub fn new(offense: impl Into<String>, defense: impl Into<String>) -> Self {
        Self {
            offense: offense.into(),
            defense: defense.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoutingReport {
    #[serde(default)]
    pub summary: String,

    /// Timestamped observations in clip order
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,

    /// Prescriptive fix, drill and tip
    #[serde(default)]
    pub coaching: CoachingPoint,

    #[serde(default)]
    pub grades: GradeCard,
}

/// A single timestamped observation (timestamp as emitted, e.g. "00:03").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimelineEntry {
    #[serde(default, alias = "time")]
    pub timestamp: String,
    #[serde(default, alias = "event", alias = "note")]
    pub observation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CoachingPoint {
    #[serde(default)]
    pub fix: String,
    #[serde(default)]
    pub drill: String,
    #[serde(default)]
    pub tip: String,
}

/// Letter grades ("A" through "F", with optional +/-).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GradeCard {
    #[serde(default)]
    pub execution: String,
    #[serde(default)]
    pub technique: String,
    #[serde(default)]
    pub decision_making: String,
}

/// One question/answer exchange about a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}
