//! Recover a coaching report from free-form model output.
//!
//! Models wrap JSON in code fences, prepend prose, or stop mid-object. The
//! extractor strips fences, scans for a balanced `{...}` span that parses as a
//! JSON object, checks the required fields and returns either a report or an
//! [`ExtractionError`] holding the raw text. It never panics.

use filmroom_models::{AnalysisReport, DetectedSubject};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ExtractionError;

/// Parse raw model output into an [`AnalysisReport`].
pub fn extract(raw: &str) -> Result<AnalysisReport, ExtractionError> {
    let text = strip_code_fences(raw);
    let mut object = locate_payload(text, raw)?;

    match object.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => {}
        _ => return Err(missing("title", raw)),
    }
    if !matches!(object.get("formation"), Some(Value::Object(_))) {
        return Err(missing("formation", raw));
    }

    let players = object
        .remove("players_detected")
        .map(parse_detections)
        .unwrap_or_default();

    let mut report: AnalysisReport =
        serde_json::from_value(Value::Object(object)).map_err(|e| ExtractionError::InvalidJson {
            message: e.to_string(),
            raw: raw.to_string(),
        })?;
    report.players_detected = players;

    Ok(report)
}

/// Remove a leading ```` ```json ```` (or bare ```` ``` ````) line and a
/// trailing ```` ``` ````.
pub fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the language tag, if any, up to the end of the fence line.
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Byte range of the balanced object starting at `start` (which must be a
/// `{`), or `None` if the text ends before it closes.
///
/// Braces inside JSON strings do not count.
pub fn balanced_object_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// Find the JSON object to use.
///
/// Prefers the first balanced span that parses and has a `title`; otherwise
/// the first top-level span that parses at all (so the caller gets a precise
/// missing-field error). Objects nested inside an unterminated span are never
/// used as the fallback: that is a truncated payload, not a smaller one.
fn locate_payload(text: &str, raw: &str) -> Result<Map<String, Value>, ExtractionError> {
    let mut fallback: Option<Map<String, Value>> = None;
    let mut last_error: Option<String> = None;
    let mut unterminated = false;
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;

        let Some(end) = balanced_object_end(text, start) else {
            unterminated = true;
            last_error.get_or_insert_with(|| "unterminated JSON object".to_string());
            search_from = start + 1;
            continue;
        };

        match serde_json::from_str::<Value>(&text[start..end]) {
            Ok(Value::Object(map)) if map.contains_key("title") => return Ok(map),
            Ok(Value::Object(map)) => {
                if !unterminated {
                    fallback.get_or_insert(map);
                }
                search_from = end;
            }
            Ok(_) => search_from = end,
            Err(e) => {
                last_error = Some(e.to_string());
                search_from = start + 1;
            }
        }
    }

    if let Some(map) = fallback {
        return Ok(map);
    }

    match last_error {
        Some(message) => Err(ExtractionError::InvalidJson {
            message,
            raw: raw.to_string(),
        }),
        None => Err(ExtractionError::NoPayload {
            raw: raw.to_string(),
        }),
    }
}

/// Deserialize detections one by one, dropping entries that don't fit.
fn parse_detections(value: Value) -> Vec<DetectedSubject> {
    let Value::Array(items) = value else {
        if !value.is_null() {
            warn!("players_detected is not an array; ignoring");
        }
        return Vec::new();
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<DetectedSubject>(item) {
            Ok(subject) => Some(subject),
            Err(e) => {
                warn!(index, "Skipping malformed player detection: {}", e);
                None
            }
        })
        .collect()
}

fn missing(field: &'static str, raw: &str) -> ExtractionError {
    ExtractionError::MissingField {
        field,
        raw: raw.to_string(),
    }
}
