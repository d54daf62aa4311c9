use axum::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, FromRow, Postgres, QueryBuilder, Row};

use super::analytics_store::{AnalyticsStore, EventFilter, StoreError};
use crate::database::DatabasePool;
use crate::models::{Session, SessionData, StoredEvent};

const SESSION_COLUMNS: &str =
    "session_id, user_id, start_time, end_time, last_activity, event_count, country, device, closed";

impl<'r> FromRow<'r, PgRow> for StoredEvent {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            event_type: row.try_get("event_type")?,
            session_id: row.try_get("session_id")?,
            user_id: row.try_get("user_id")?,
            timestamp: row.try_get("occurred_at")?,
            data: row.try_get("data")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Session {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            session_id: row.try_get("session_id")?,
            user: row.try_get("user_id")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            last_activity: row.try_get("last_activity")?,
            event_count: row.try_get("event_count")?,
            country: row.try_get("country")?,
            device: row.try_get("device")?,
            closed: row.try_get("closed")?,
        })
    }
}

/// Postgres-backed store. Schema lives in `migrations/`.
pub struct PgStore {
    pool: DatabasePool,
}

impl PgStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsStore for PgStore {
    async fn record_event(
        &self,
        event: &StoredEvent,
        session_data: Option<&SessionData>,
    ) -> Result<Option<Session>, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO analytics_events (id, event_type, session_id, user_id, occurred_at, data)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id)
        .bind(&event.event_type)
        .bind(&event.session_id)
        .bind(&event.user_id)
        .bind(event.timestamp)
        .bind(&event.data)
        .execute(&mut *tx)
        .await?;

        let Some(session_id) = event.session_id.as_deref() else {
            tx.commit().await?;
            return Ok(None);
        };

        // A first event claims the row; losers of a race fall through to the
        // locked read-modify-write below.
        let fresh = Session::apply(None, event, session_data).ok_or_else(|| {
            StoreError::Corrupt(format!("session {} could not be aggregated", session_id))
        })?;
        let inserted = sqlx::query(
            r#"
            INSERT INTO analytics_sessions
                (session_id, user_id, start_time, end_time, last_activity, event_count, country, device, closed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (session_id) DO NOTHING
            "#,
        )
        .bind(&fresh.session_id)
        .bind(&fresh.user)
        .bind(fresh.start_time)
        .bind(fresh.end_time)
        .bind(fresh.last_activity)
        .bind(fresh.event_count)
        .bind(&fresh.country)
        .bind(&fresh.device)
        .bind(fresh.closed)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 1 {
            tx.commit().await?;
            return Ok(Some(fresh));
        }

        let existing = sqlx::query_as::<_, Session>(&format!(
            "SELECT {} FROM analytics_sessions WHERE session_id = $1 FOR UPDATE",
            SESSION_COLUMNS
        ))
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;

        let session = Session::apply(Some(existing), event, session_data).ok_or_else(|| {
            StoreError::Corrupt(format!("session {} could not be aggregated", session_id))
        })?;

        sqlx::query(
            r#"
            UPDATE analytics_sessions SET
                user_id = $2,
                end_time = $3,
                last_activity = $4,
                event_count = $5,
                country = $6,
                device = $7,
                closed = $8
            WHERE session_id = $1
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.user)
        .bind(session.end_time)
        .bind(session.last_activity)
        .bind(session.event_count)
        .bind(&session.country)
        .bind(&session.device)
        .bind(session.closed)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(session))
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {} FROM analytics_sessions WHERE session_id = $1",
            SESSION_COLUMNS
        ))
        .bind(session_id)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(session)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        let sessions = sqlx::query_as::<_, Session>(&format!(
            "SELECT {} FROM analytics_sessions ORDER BY start_time DESC",
            SESSION_COLUMNS
        ))
        .fetch_all(&*self.pool)
        .await?;
        Ok(sessions)
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<StoredEvent>, StoreError> {
        let mut query_builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT id, event_type, session_id, user_id, occurred_at, data FROM analytics_events WHERE 1=1",
        );

        if let Some(event_type) = &filter.event_type {
            query_builder.push(" AND LOWER(event_type) = LOWER(");
            query_builder.push_bind(event_type.clone());
            query_builder.push(")");
        }
        if let Some(session_id) = &filter.session_id {
            query_builder.push(" AND session_id = ");
            query_builder.push_bind(session_id.clone());
        }
        if let Some(since) = filter.since {
            query_builder.push(" AND occurred_at >= ");
            query_builder.push_bind(since);
        }

        query_builder.push(" ORDER BY occurred_at DESC");
        if let Some(limit) = filter.limit {
            query_builder.push(" LIMIT ");
            query_builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        query_builder.push(" OFFSET ");
        query_builder.push_bind(i64::try_from(filter.offset).unwrap_or(i64::MAX));

        let events = query_builder
            .build_query_as::<StoredEvent>()
            .fetch_all(&*self.pool)
            .await?;
        Ok(events)
    }

    async fn close_idle_sessions(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE analytics_sessions
            SET closed = true, end_time = last_activity
            WHERE closed = false AND last_activity < $1
            "#,
        )
        .bind(cutoff)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
