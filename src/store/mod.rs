mod mysql;

pub use mysql::MySqlEventStore;

use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::cli::Args;
use crate::models::{ EventCandidate, EventFilter, EventRecord, InteractionRecord, UserProfile };

#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection, pool or query failure.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A row came back in a shape the service cannot read.
    #[error("could not decode stored row: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. } => StoreError::Decode(err.to_string()),
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

/// Relational store holding users, events and the interaction log.
///
/// Implementations own their connection discipline (pooling); callers share a
/// single handle across requests.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// `Ok(None)` when no user matches.
    async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Events whose category is one of `categories`. An empty slice matches nothing.
    async fn get_events_by_categories(
        &self,
        categories: &[String]
    ) -> Result<Vec<EventCandidate>, StoreError>;

    async fn insert_interaction(&self, record: &InteractionRecord) -> Result<(), StoreError>;

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>, StoreError>;

    async fn get_event(&self, id: i64) -> Result<Option<EventRecord>, StoreError>;
}

pub async fn create_store(args: &Args) -> Result<Arc<dyn EventStore>, Box<dyn Error + Send + Sync>> {
    info!("Connecting to event store (max connections: {})", args.db_max_connections);
    let store = MySqlEventStore::connect(
        &args.database_url,
        args.db_max_connections,
        Duration::from_secs(args.db_acquire_timeout_secs)
    ).await?;
    Ok(Arc::new(store))
}
