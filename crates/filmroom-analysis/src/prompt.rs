//! Prompt assembly for clip analysis.

use filmroom_gemini::{FileMetadata, PromptPart};
use filmroom_models::Roster;

/// Output contract appended to every rubric.
const OUTPUT_SCHEMA: &str = r#"IMPORTANT: You must strictly follow this output format.
Return ONLY a single JSON object with this schema:
{
  "title": "Short play title, e.g. Slant vs Cover 1",
  "formation": { "offense": "Offensive formation", "defense": "Defensive coverage/front" },
  "scouting_report": {
    "summary": "Two or three sentence summary",
    "timeline": [ { "timestamp": "MM:SS", "observation": "What happened" } ],
    "coaching": { "fix": "Main correction", "drill": "Drill to practice it", "tip": "One cue to remember" },
    "grades": { "execution": "A-F", "technique": "A-F", "decision_making": "A-F" }
  },
  "players_detected": [
    { "identifier": "Name or jersey number", "position": "CB", "grade": "A-F", "observation": "One sentence", "weakness": "optional short tag" }
  ]
}

Additional instructions:
- Return ONLY the JSON object and nothing else.
- Grades are letter grades (A, B+, C-, ...).
- Reuse identifiers from KNOWN PLAYERS when you recognize the same player."#;

/// Fallback rubric used when the caller has no template of its own.
pub fn default_rubric() -> &'static str {
    "You are an experienced football position coach reviewing game film. \
Describe the formations, walk through the play in order with timestamps, \
grade the execution and give one concrete fix, drill and coaching tip. \
Call out every player you can identify with a grade and one observation."
}

/// Describe the current roster so the model keeps identifiers stable.
pub fn roster_context(roster: &Roster) -> String {
    if roster.is_empty() {
        return String::new();
    }

    let mut context = String::from("KNOWN PLAYERS (reuse these identifiers):\n");
    for profile in roster {
        context.push_str(&format!("- {}", profile.identifier));
        if !profile.position.is_empty() {
            context.push_str(&format!(" ({})", profile.position));
        }
        if !profile.grade.is_empty() {
            context.push_str(&format!(", last grade {}", profile.grade));
        }
        if let Some(weakness) = profile.weaknesses.last() {
            context.push_str(&format!(", watch for: {}", weakness));
        }
        context.push('\n');
    }
    context
}

/// Build the prompt parts for analyzing one clip.
///
/// The uploaded clip (if any) goes first, followed by the rubric, the output
/// schema and the roster context.
pub fn build_analysis_prompt(
    rubric: &str,
    roster: &Roster,
    clip: Option<&FileMetadata>,
) -> Vec<PromptPart> {
    let mut parts = Vec::new();

    if let Some(file) = clip {
        let uri = file.uri.clone().unwrap_or_else(|| file.name.clone());
        let mime = file
            .mime_type
            .clone()
            .unwrap_or_else(|| "video/mp4".to_string());
        parts.push(PromptPart::file(mime, uri));
    }

    let mut text = rubric.trim().to_string();
    text.push_str("\n\n");
    text.push_str(OUTPUT_SCHEMA);

    let context = roster_context(roster);
    if !context.is_empty() {
        text.push_str("\n\n");
        text.push_str(&context);
    }

    parts.push(PromptPart::Text(text));
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use filmroom_gemini::FileState;
    use filmroom_models::{DetectedSubject, PlayerProfile};

    #[test]
    fn test_empty_roster_has_no_context() {
        assert!(roster_context(&Roster::new()).is_empty());
    }

    #[test]
    fn test_roster_context_lists_players() {
        let detection = DetectedSubject::new("CB3", "C-", "late jump")
            .with_position("CB")
            .with_weakness("phase");
        let roster = Roster::from(vec![PlayerProfile::from_detection(&detection, Utc::now())]);

        let context = roster_context(&roster);
        assert!(context.contains("- CB3 (CB), last grade C-, watch for: phase"));
    }

    #[test]
    fn test_prompt_puts_clip_first() {
        let file = FileMetadata {
            name: "files/abc".to_string(),
            uri: Some("https://example.test/files/abc".to_string()),
            mime_type: Some("video/quicktime".to_string()),
            state: FileState::Active,
        };

        let parts = build_analysis_prompt(default_rubric(), &Roster::new(), Some(&file));

        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[0],
            PromptPart::file("video/quicktime", "https://example.test/files/abc")
        );
        match &parts[1] {
            PromptPart::Text(text) => {
                assert!(text.contains("players_detected"));
                assert!(!text.contains("KNOWN PLAYERS"));
            }
            other => panic!("expected text part, got {other:?}"),
        }
    }
}
