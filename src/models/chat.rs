use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };

use super::event::EventCandidate;

/// Inbound body of `POST /chat`. Both fields are optional at the wire level so
/// that absence is reported as `InvalidInput` rather than a decode failure.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub query: Option<String>,
}

/// Client-supplied user identifier; the front-end sends a number, other
/// callers may send a string.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl UserId {
    /// Canonical key used for store lookups. `None` when the text form is
    /// blank or not a plain decimal id, so "1abc" never reaches the store.
    pub fn as_key(&self) -> Option<String> {
        match self {
            UserId::Number(n) => Some(n.to_string()),
            UserId::Text(s) => {
                let s = s.trim();
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    None
                } else {
                    Some(s.to_string())
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSuggestion {
    pub title: String,
    pub date: String,
    pub location: String,
    pub description: String,
}

/// Validated output of the generation service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedPayload {
    pub message: String,
    pub events: Vec<EventSuggestion>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceEvent {
    pub title: String,
    pub date: String,
    pub location: String,
    pub description: String,
    pub img_url: Option<String>,
}

impl From<&EventCandidate> for PreferenceEvent {
    fn from(candidate: &EventCandidate) -> Self {
        Self {
            title: candidate.title.clone(),
            date: candidate.date.clone(),
            location: candidate.location.clone(),
            description: candidate.description.clone(),
            img_url: candidate.img_url.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub events: Vec<EventSuggestion>,
    #[serde(rename = "usePreferenceEvent")]
    pub use_preference_event: Vec<PreferenceEvent>,
}

/// Append-only audit row for one answered chat request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionRecord {
    pub user_id: String,
    pub query: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self { error: error.into(), details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_accepts_number_or_string() {
        let req: ChatRequest = serde_json::from_str(r#"{"userId": 1, "query": "hi"}"#).unwrap();
        assert_eq!(req.user_id.unwrap().as_key().as_deref(), Some("1"));

        let req: ChatRequest = serde_json::from_str(r#"{"userId": " 42 ", "query": "hi"}"#).unwrap();
        assert_eq!(req.user_id.unwrap().as_key().as_deref(), Some("42"));
    }

    #[test]
    fn missing_fields_decode_as_none() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.user_id.is_none());
        assert!(req.query.is_none());
    }

    #[test]
    fn blank_text_user_id_has_no_key() {
        assert_eq!(UserId::Text("   ".into()).as_key(), None);
    }

    #[test]
    fn non_numeric_text_user_id_has_no_key() {
        assert_eq!(UserId::Text("1abc".into()).as_key(), None);
        assert_eq!(UserId::Text("1 OR 1=1".into()).as_key(), None);
        assert_eq!(UserId::Text("-1".into()).as_key(), None);
    }

    #[test]
    fn chat_response_uses_wire_field_names() {
        let response = ChatResponse {
            message: "hey".into(),
            events: vec![],
            use_preference_event: vec![],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("usePreferenceEvent").is_some());
        assert!(json.get("use_preference_event").is_none());
    }

    #[test]
    fn error_body_omits_absent_details() {
        let body = serde_json::to_string(&ErrorBody::new("ProfileNotFound", None)).unwrap();
        assert_eq!(body, r#"{"error":"ProfileNotFound"}"#);
    }
}
