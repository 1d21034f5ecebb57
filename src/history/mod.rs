use chrono::Utc;
use log::{ debug, error };
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::models::{ ChatResponse, InteractionRecord };
use crate::store::EventStore;

/// Best-effort, at-most-once audit trail of answered chat requests.
#[derive(Clone)]
pub struct InteractionLogger {
    store: Arc<dyn EventStore>,
}

impl InteractionLogger {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Writes the interaction on a background task. Failures are logged and
    /// dropped; the handle is only useful to callers that want to wait.
    pub fn record(
        &self,
        user_id: &str,
        query: &str,
        response: &ChatResponse
    ) -> Option<JoinHandle<()>> {
        let serialized = match serde_json::to_string(response) {
            Ok(s) => s,
            Err(e) => {
                error!("Error serializing interaction for user {}: {}", user_id, e);
                return None;
            }
        };

        let record = InteractionRecord {
            user_id: user_id.to_string(),
            query: query.to_string(),
            response: serialized,
            created_at: Utc::now(),
        };
        let store = Arc::clone(&self.store);

        Some(
            tokio::spawn(async move {
                match store.insert_interaction(&record).await {
                    Ok(()) => debug!("Logged interaction for user {}", record.user_id),
                    Err(e) => error!("Error logging interaction for user {}: {}", record.user_id, e),
                }
            })
        )
    }
}
