/// Rehearsal event model
///
/// Events are created attached to a band and queried either through the
/// band or transitively through a member user: a user's events are the
/// union of the events of every band the user belongs to.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     band_id UUID NOT NULL REFERENCES bands(id) ON DELETE CASCADE,
///     time TIMESTAMPTZ NOT NULL,
///     place VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Rehearsal event owned by a band
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    /// Unique event ID (UUID v4)
    pub id: Uuid,

    /// Owning band
    pub band_id: Uuid,

    /// When the rehearsal takes place
    pub time: DateTime<Utc>,

    /// Where the rehearsal takes place
    pub place: String,

    /// When the event record was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    /// Owning band
    pub band_id: Uuid,

    /// When the rehearsal takes place
    pub time: DateTime<Utc>,

    /// Where the rehearsal takes place
    pub place: String,
}

impl Event {
    /// Creates a new event attached to a band
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The band doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateEvent) -> Result<Self, sqlx::Error> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (band_id, time, place)
            VALUES ($1, $2, $3)
            RETURNING id, band_id, time, place, created_at
            "#,
        )
        .bind(data.band_id)
        .bind(data.time)
        .bind(data.place)
        .fetch_one(pool)
        .await?;

        Ok(event)
    }

    /// Lists all events owned by a band
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list_by_band(pool: &PgPool, band_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, band_id, time, place, created_at
            FROM events
            WHERE band_id = $1
            "#,
        )
        .bind(band_id)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    /// Lists the events of every band a user belongs to
    ///
    /// Unsorted union across the user's memberships; empty when the user
    /// belongs to no bands.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT e.id, e.band_id, e.time, e.place, e.created_at
            FROM events e
            JOIN band_members bm ON bm.band_id = e.band_id
            WHERE bm.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }
}
