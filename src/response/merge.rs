use crate::models::{ ChatResponse, EventCandidate, GeneratedPayload, PreferenceEvent };

/// Combines a validated payload with the preference-matched candidates.
///
/// The two lists are not deduplicated against each other: the generated list
/// answers the query, the candidate list reflects the stored preferences.
pub fn merge(payload: &GeneratedPayload, candidates: &[EventCandidate]) -> ChatResponse {
    ChatResponse {
        message: payload.message.clone(),
        events: payload.events.clone(),
        use_preference_event: candidates.iter().map(PreferenceEvent::from).collect(),
    }
}
