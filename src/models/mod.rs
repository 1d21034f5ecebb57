pub mod chat;
pub mod event;

pub use chat::{
    ChatRequest,
    ChatResponse,
    ErrorBody,
    EventSuggestion,
    GeneratedPayload,
    InteractionRecord,
    PreferenceEvent,
    UserId,
};
pub use event::{ EventCandidate, EventFilter, EventRecord, UserProfile };
