use serde::{ Deserialize, Serialize };

/// Stored profile of a registered user, read-only to the chat pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub location: String,
    pub preferences: Vec<String>,
}

impl UserProfile {
    /// Builds a profile from the raw `preferences` column, which holds either
    /// a JSON array (`["tech","music"]`) or a comma-delimited list.
    pub fn from_stored(user_id: &str, location: String, raw_preferences: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            location,
            preferences: normalize_preferences(raw_preferences),
        }
    }
}

pub fn normalize_preferences(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
            return list
                .iter()
                .map(|pref| pref.trim().to_string())
                .filter(|pref| !pref.is_empty())
                .collect();
        }
    }

    trimmed
        .split(',')
        .map(|pref| pref.trim().to_string())
        .filter(|pref| !pref.is_empty())
        .collect()
}

/// Event row retrieved by category match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCandidate {
    pub title: String,
    pub date: String,
    pub location: String,
    pub description: String,
    pub img_url: Option<String>,
}

/// Full event row as listed by the `/events` endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub title: String,
    pub date: String,
    pub location: String,
    pub description: String,
    pub category: String,
    pub img_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EventFilter {
    pub location: Option<String>,
    pub category: Option<String>,
}
