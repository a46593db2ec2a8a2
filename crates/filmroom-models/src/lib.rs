//! Shared data models for the Filmroom backend.
//!
//! This crate provides Serde-serializable types for:
//! - Coaching reports produced from one analyzed clip
//! - Player detections extracted from a report
//! - Session-scoped player rosters

pub mod report;
pub mod roster;

// Re-export common types
pub use report::{
    AnalysisReport, ChatTurn, CoachingPoint, Formation, GradeCard, ScoutingReport, TimelineEntry,
};
pub use roster::{DetectedSubject, PlayerProfile, Roster};
