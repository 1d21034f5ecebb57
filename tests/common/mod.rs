#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use commune_chat::agent::{ AgentSettings, ChatAgent };
use commune_chat::config::prompt::PromptConfig;
use commune_chat::llm::chat::{ ChatClient, CompletionResponse, GenerationRequest, LlmError };
use commune_chat::models::{
    EventCandidate,
    EventFilter,
    EventRecord,
    InteractionRecord,
    UserProfile,
};
use commune_chat::store::{ EventStore, StoreError };

pub const VALID_REPLY: &str = r#"{
    "message": "Hey there! Chennai has some awesome tech events coming up.",
    "events": {
        "1": {"title": "Chennai Rust Meetup", "date": "2025-01-10", "location": "Chennai", "description": "Talks on async Rust"},
        "2": {"title": "AI Builders Night", "date": "2025-01-12", "location": "Chennai", "description": "Demos and networking"}
    }
}"#;

/// In-memory store that counts every call it receives.
#[derive(Default)]
pub struct FakeStore {
    pub profiles: HashMap<String, UserProfile>,
    pub events: Vec<EventRecord>,
    pub fail_reads: bool,
    pub fail_candidates: bool,
    pub fail_inserts: bool,
    pub profile_calls: AtomicUsize,
    pub candidate_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub requested_categories: Mutex<Vec<Vec<String>>>,
    pub interactions: Mutex<Vec<InteractionRecord>>,
}

impl FakeStore {
    pub fn with_chennai_user() -> Self {
        let mut store = FakeStore::default();
        store.profiles.insert("1".into(), UserProfile {
            user_id: "1".into(),
            location: "Chennai".into(),
            preferences: vec!["tech".into(), "music".into()],
        });
        store.events = vec![
            event(1, "Hack Day", "tech", "Chennai"),
            event(2, "Cloud Summit", "tech", "Bengaluru"),
            event(3, "Yoga in the Park", "fitness", "Chennai")
        ];
        store
    }

    pub fn inserted(&self) -> Vec<InteractionRecord> {
        self.interactions.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst) +
            self.candidate_calls.load(Ordering::SeqCst) +
            self.insert_calls.load(Ordering::SeqCst)
    }
}

pub fn event(id: i64, title: &str, category: &str, location: &str) -> EventRecord {
    EventRecord {
        id,
        title: title.into(),
        date: "2025-01-10".into(),
        location: location.into(),
        description: format!("{} description", title),
        category: category.into(),
        img_url: Some(format!("https://img.example/{}.png", id)),
    }
}

#[async_trait]
impl EventStore for FakeStore {
    async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(self.profiles.get(user_id).cloned())
    }

    async fn get_events_by_categories(
        &self,
        categories: &[String]
    ) -> Result<Vec<EventCandidate>, StoreError> {
        self.candidate_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_categories.lock().unwrap().push(categories.to_vec());
        if self.fail_reads || self.fail_candidates {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(
            self.events
                .iter()
                .filter(|e| categories.contains(&e.category))
                .map(|e| EventCandidate {
                    title: e.title.clone(),
                    date: e.date.clone(),
                    location: e.location.clone(),
                    description: e.description.clone(),
                    img_url: e.img_url.clone(),
                })
                .collect()
        )
    }

    async fn insert_interaction(&self, record: &InteractionRecord) -> Result<(), StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts {
            return Err(StoreError::Unavailable("disk full".into()));
        }
        self.interactions.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(match &filter.category {
            None => self.events.clone(),
            Some(category) =>
                self.events
                    .iter()
                    .filter(
                        |e| &e.category == category || Some(&e.location) == filter.location.as_ref()
                    )
                    .cloned()
                    .collect(),
        })
    }

    async fn get_event(&self, id: i64) -> Result<Option<EventRecord>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(self.events.iter().find(|e| e.id == id).cloned())
    }
}

pub enum Script {
    Reply(String),
    Fail,
    Hang(Duration),
}

/// Generation service double returning a scripted reply.
pub struct FakeChatClient {
    script: Script,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<GenerationRequest>>,
}

impl FakeChatClient {
    pub fn new(script: Script) -> Self {
        Self { script, calls: AtomicUsize::new(0), last_request: Mutex::new(None) }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(Script::Reply(text.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for FakeChatClient {
    async fn complete(&self, request: &GenerationRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.script {
            Script::Reply(text) => Ok(CompletionResponse { response: text.clone() }),
            Script::Fail => Err(LlmError::EmptyResponse("service returned 503".into())),
            Script::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(CompletionResponse { response: VALID_REPLY.to_string() })
            }
        }
    }

    fn get_model(&self) -> String {
        "fake-model".into()
    }

    fn get_base_url(&self) -> Option<String> {
        None
    }
}

pub fn agent(store: &Arc<FakeStore>, client: &Arc<FakeChatClient>) -> ChatAgent {
    agent_with(store, client, AgentSettings::default())
}

pub fn agent_with(
    store: &Arc<FakeStore>,
    client: &Arc<FakeChatClient>,
    settings: AgentSettings
) -> ChatAgent {
    let store: Arc<dyn EventStore> = store.clone();
    let client: Arc<dyn ChatClient> = client.clone();
    ChatAgent::new(store, client, PromptConfig::default(), settings)
}

/// Lets spawned logging tasks run to completion on the test runtime.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
