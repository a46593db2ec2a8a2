//! Fold a clip's player detections into the session roster.

use chrono::{DateTime, Utc};
use filmroom_models::{DetectedSubject, PlayerProfile, Roster};
use tracing::debug;

/// Result of a merge with per-outcome counts for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub roster: Roster,
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Merge detections into `roster` using the current time.
pub fn merge(roster: Roster, detections: &[DetectedSubject]) -> Roster {
    merge_at(roster, detections, Utc::now())
}

/// Merge detections into `roster` stamping updates with `now`.
pub fn merge_at(roster: Roster, detections: &[DetectedSubject], now: DateTime<Utc>) -> Roster {
    merge_detailed(roster, detections, now).roster
}

/// Merge detections and report how many were added, updated and skipped.
///
/// Existing profiles keep their position in the roster; unseen identifiers
/// are appended in detection order. Detections without an identifier are
/// skipped individually.
pub fn merge_detailed(
    mut roster: Roster,
    detections: &[DetectedSubject],
    now: DateTime<Utc>,
) -> MergeOutcome {
    let mut added = 0;
    let mut updated = 0;
    let mut skipped = 0;

    for detection in detections {
        if !detection.is_well_formed() {
            debug!(?detection, "Skipping detection without identifier");
            skipped += 1;
            continue;
        }

        match roster.get_mut(&detection.identifier) {
            Some(profile) => {
                profile.apply(detection, now);
                updated += 1;
            }
            None => {
                roster.push(PlayerProfile::from_detection(detection, now));
                added += 1;
            }
        }
    }

    MergeOutcome {
        roster,
        added,
        updated,
        skipped,
    }
}
