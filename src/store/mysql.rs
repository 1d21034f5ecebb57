use async_trait::async_trait;
use log::debug;
use sqlx::mysql::{ MySqlPool, MySqlPoolOptions, MySqlRow };
use sqlx::{ MySql, QueryBuilder, Row };
use std::time::Duration;

use super::{ EventStore, StoreError };
use crate::models::{ EventCandidate, EventFilter, EventRecord, InteractionRecord, UserProfile };

const EVENT_COLUMNS: &str =
    "id, title, CAST(date AS CHAR) AS date, location, description, category, img_url";

pub struct MySqlEventStore {
    pool: MySqlPool,
}

impl MySqlEventStore {
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration
    ) -> Result<Self, StoreError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url).await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn text(row: &MySqlRow, column: &str) -> Result<String, StoreError> {
    let value: Option<String> = row.try_get(column)?;
    Ok(value.unwrap_or_default())
}

fn candidate_from_row(row: &MySqlRow) -> Result<EventCandidate, StoreError> {
    Ok(EventCandidate {
        title: text(row, "title")?,
        date: text(row, "date")?,
        location: text(row, "location")?,
        description: text(row, "description")?,
        img_url: row.try_get("img_url")?,
    })
}

fn record_from_row(row: &MySqlRow) -> Result<EventRecord, StoreError> {
    Ok(EventRecord {
        id: row.try_get("id")?,
        title: text(row, "title")?,
        date: text(row, "date")?,
        location: text(row, "location")?,
        description: text(row, "description")?,
        category: text(row, "category")?,
        img_url: row.try_get("img_url")?,
    })
}

#[async_trait]
impl EventStore for MySqlEventStore {
    async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        // Bound as an integer so MySQL never coerces a malformed string id.
        let id: i64 = match user_id.parse() {
            Ok(id) => id,
            Err(_) => {
                return Ok(None);
            }
        };
        let row = sqlx
            ::query(
                "SELECT location, CAST(preferences AS CHAR) AS preferences FROM users WHERE id = ? LIMIT 1"
            )
            .bind(id)
            .fetch_optional(&self.pool).await?;

        match row {
            Some(row) => {
                let location = text(&row, "location")?;
                let preferences = text(&row, "preferences")?;
                Ok(Some(UserProfile::from_stored(user_id, location, &preferences)))
            }
            None => Ok(None),
        }
    }

    async fn get_events_by_categories(
        &self,
        categories: &[String]
    ) -> Result<Vec<EventCandidate>, StoreError> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(
            "SELECT title, CAST(date AS CHAR) AS date, location, description, img_url FROM events WHERE category IN ("
        );
        let mut separated = builder.separated(", ");
        for category in categories {
            separated.push_bind(category);
        }
        separated.push_unseparated(") ORDER BY id");

        let rows = builder.build().fetch_all(&self.pool).await?;
        debug!("Fetched {} preference events for {:?}", rows.len(), categories);
        rows.iter().map(candidate_from_row).collect()
    }

    async fn insert_interaction(&self, record: &InteractionRecord) -> Result<(), StoreError> {
        sqlx
            ::query(
                "INSERT INTO interactions (user_id, query, response, created_at) VALUES (?, ?, ?, ?)"
            )
            .bind(&record.user_id)
            .bind(&record.query)
            .bind(&record.response)
            .bind(record.created_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>, StoreError> {
        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(
            format!("SELECT {} FROM events", EVENT_COLUMNS)
        );

        // Without a category every event is listed, the location alone never narrows it.
        if let Some(category) = filter.category.as_deref() {
            builder.push(" WHERE location = ");
            builder.push_bind(filter.location.clone());
            builder.push(" OR category = ");
            builder.push_bind(category.to_string());
        }
        builder.push(" ORDER BY id");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn get_event(&self, id: i64) -> Result<Option<EventRecord>, StoreError> {
        let row = sqlx
            ::query(&format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool).await?;

        row.as_ref().map(record_from_row).transpose()
    }
}
