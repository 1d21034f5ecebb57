//! Strict decoding of the generation service's raw text into a
//! [`GeneratedPayload`].
//!
//! The payload is accepted whole or rejected whole: a response with one bad
//! event is an error, never a shorter list.

use serde_json::{ Map, Value };
use thiserror::Error;

use crate::models::{ EventSuggestion, GeneratedPayload };

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("generated text is not valid JSON: {reason}")]
    Syntax {
        reason: String,
        raw: String,
    },

    #[error("generated payload does not match the expected shape: {reason}")]
    Schema {
        reason: String,
        raw: String,
    },
}

impl ParseError {
    /// The untouched generated text, for operational logs only.
    pub fn raw(&self) -> &str {
        match self {
            ParseError::Syntax { raw, .. } | ParseError::Schema { raw, .. } => raw,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            ParseError::Syntax { reason, .. } | ParseError::Schema { reason, .. } => reason,
        }
    }

    /// Explanation safe to hand back to a caller. Schema reasons name entries
    /// by position only, so neither variant carries generated content.
    pub fn summary(&self) -> &str {
        match self {
            ParseError::Syntax { .. } => "generated text is not valid JSON",
            ParseError::Schema { reason, .. } => reason,
        }
    }
}

/// Removes a surrounding markdown code fence, with or without a language tag.
/// Text without a leading fence is only trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_');
    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn parse_generated_payload(raw: &str) -> Result<GeneratedPayload, ParseError> {
    let body = strip_code_fences(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| ParseError::Syntax {
        reason: e.to_string(),
        raw: raw.to_string(),
    })?;

    validate_payload(value).map_err(|reason| ParseError::Schema {
        reason,
        raw: raw.to_string(),
    })
}

fn validate_payload(value: Value) -> Result<GeneratedPayload, String> {
    let mut root = match value {
        Value::Object(root) => root,
        other => {
            return Err(format!("top level must be an object, found {}", kind_of(&other)));
        }
    };

    let message = match root.remove("message") {
        Some(Value::String(message)) => message,
        Some(other) => {
            return Err(format!("`message` must be a string, found {}", kind_of(&other)));
        }
        None => {
            return Err("missing `message`".to_string());
        }
    };

    let events = match root.remove("events") {
        Some(Value::Object(events)) => events,
        Some(other) => {
            return Err(format!("`events` must be an object, found {}", kind_of(&other)));
        }
        None => {
            return Err("missing `events`".to_string());
        }
    };

    let events = ordered_entries(events)
        .into_iter()
        .enumerate()
        .map(|(index, (_, value))| validate_event(index + 1, value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GeneratedPayload { message, events })
}

/// Entries are named by their 1-based position after ordering, never by key:
/// keys are generated text.
fn validate_event(position: usize, value: Value) -> Result<EventSuggestion, String> {
    let mut event = match value {
        Value::Object(event) => event,
        other => {
            return Err(format!("event #{} must be an object, found {}", position, kind_of(&other)));
        }
    };

    Ok(EventSuggestion {
        title: required_text(&mut event, position, "title")?,
        date: required_text(&mut event, position, "date")?,
        location: required_text(&mut event, position, "location")?,
        description: required_text(&mut event, position, "description")?,
    })
}

fn required_text(
    event: &mut Map<String, Value>,
    position: usize,
    field: &str
) -> Result<String, String> {
    match event.remove(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        Some(Value::String(_)) => Err(format!("event #{} has an empty `{}`", position, field)),
        Some(other) =>
            Err(
                format!(
                    "event #{} `{}` must be a string, found {}",
                    position,
                    field,
                    kind_of(&other)
                )
            ),
        None => Err(format!("event #{} is missing `{}`", position, field)),
    }
}

/// Numeric keys first in numeric order, then any other keys in the order the
/// service emitted them.
fn ordered_entries(events: Map<String, Value>) -> Vec<(String, Value)> {
    let mut entries: Vec<(String, Value)> = events.into_iter().collect();
    entries.sort_by_key(|(key, _)| ordinal_rank(key));
    entries
}

fn ordinal_rank(key: &str) -> (u8, u64) {
    match key.trim().parse::<u64>() {
        Ok(n) => (0, n),
        Err(_) => (1, 0),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
