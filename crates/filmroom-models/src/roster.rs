//! Player detection and roster models.
//!
//! A [`Roster`] is owned by a session and accumulates one [`PlayerProfile`]
//! per identifier across every clip analyzed in that session.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// A player observation extracted from one clip's report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetectedSubject {
    /// Name or jersey number, e.g. "CB3" or "#21"
    #[serde(
        alias = "name",
        alias = "jersey",
        alias = "number",
        deserialize_with = "string_or_number"
    )]
    #[schemars(with = "String")]
    pub identifier: String,

    /// Position or role tag, e.g. "CB", "WR"
    #[serde(default, alias = "role")]
    pub position: String,

    /// Letter grade for this clip
    #[serde(default)]
    pub grade: String,

    /// Free-text observation for this clip
    #[serde(default, alias = "note")]
    pub observation: String,

    /// Optional weakness tag, e.g. "phase", "eyes"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weakness: Option<String>,
}

impl DetectedSubject {
    pub fn new(
        identifier: impl Into<String>,
        grade: impl Into<String>,
        observation: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            position: String::new(),
            grade: grade.into(),
            observation: observation.into(),
            weakness: None,
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_weakness(mut self, weakness: impl Into<String>) -> Self {
        self.weakness = Some(weakness.into());
        self
    }

    /// Detections without a usable identifier cannot be keyed into a roster.
    pub fn is_well_formed(&self) -> bool {
        !self.identifier.trim().is_empty()
    }

    /// Weakness tag if present and non-blank.
    pub fn weakness_tag(&self) -> Option<&str> {
        self.weakness
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}

/// Accumulated history for one player within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerProfile {
    /// Unique key within the roster (exact match)
    pub identifier: String,

    #[serde(default)]
    pub position: String,

    /// Most recent grade
    #[serde(default)]
    pub grade: String,

    /// Observations in the order they were seen; append-only
    #[serde(default)]
    pub notes: Vec<String>,

    /// Weakness tags in the order they were seen; append-only
    #[serde(default)]
    pub weaknesses: Vec<String>,

    pub last_updated: DateTime<Utc>,
}

impl PlayerProfile {
    /// Create a profile from the first sighting of a player.
    pub fn from_detection(detection: &DetectedSubject, now: DateTime<Utc>) -> Self {
        let observation = detection.observation.trim();
        Self {
            identifier: detection.identifier.clone(),
            position: detection.position.clone(),
            grade: detection.grade.clone(),
            notes: if observation.is_empty() {
                Vec::new()
            } else {
                vec![observation.to_string()]
            },
            weaknesses: detection
                .weakness_tag()
                .map(|w| vec![w.to_string()])
                .unwrap_or_default(),
            last_updated: now,
        }
    }

    /// Fold a later sighting into this profile.
    ///
    /// Grade is last-write-wins; notes and weaknesses only grow; the
    /// timestamp never moves backwards.
    pub fn apply(&mut self, detection: &DetectedSubject, now: DateTime<Utc>) {
        if !detection.grade.trim().is_empty() {
            self.grade = detection.grade.clone();
        }
        if self.position.is_empty() && !detection.position.is_empty() {
            self.position = detection.position.clone();
        }

        let observation = detection.observation.trim();
        if !observation.is_empty() {
            self.notes.push(observation.to_string());
        }
        if let Some(weakness) = detection.weakness_tag() {
            self.weaknesses.push(weakness.to_string());
        }

        self.last_updated = self.last_updated.max(now);
    }
}

/// Ordered, identifier-unique collection of player profiles.
///
/// Serialized as a plain JSON array. Deserializing goes through
/// `Roster::from`, so a stored array with repeated identifiers loads with
/// the first profile for each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(from = "Vec<PlayerProfile>")]
#[schemars(transparent)]
pub struct Roster(Vec<PlayerProfile>);

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayerProfile> {
        self.0.iter()
    }

    /// Look up a profile by exact identifier.
    pub fn get(&self, identifier: &str) -> Option<&PlayerProfile> {
        self.0.iter().find(|p| p.identifier == identifier)
    }

    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut PlayerProfile> {
        self.0.iter_mut().find(|p| p.identifier == identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    /// Append a profile at the end. Returns false (and drops the profile)
    /// if its identifier is already present.
    pub fn push(&mut self, profile: PlayerProfile) -> bool {
        if self.contains(&profile.identifier) {
            return false;
        }
        self.0.push(profile);
        true
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.identifier.as_str()).collect()
    }

    pub fn into_inner(self) -> Vec<PlayerProfile> {
        self.0
    }
}

impl From<Vec<PlayerProfile>> for Roster {
    /// Keeps the first profile for each identifier.
    fn from(profiles: Vec<PlayerProfile>) -> Self {
        let mut roster = Roster::new();
        for profile in profiles {
            roster.push(profile);
        }
        roster
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a PlayerProfile;
    type IntoIter = std::slice::Iter<'a, PlayerProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Accept `"21"` as well as `21` for identifiers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}
