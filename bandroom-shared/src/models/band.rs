/// Band model and the user-band membership association
///
/// Bands own their events (deleting a band cascades to its events), while
/// the membership relation is a pure association: adding or removing a
/// member never touches the lifecycle of either the band or the user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE bands (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE band_members (
///     band_id UUID NOT NULL REFERENCES bands(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (band_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::User;

/// Band model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Band {
    /// Unique band ID (UUID v4)
    pub id: Uuid,

    /// Band name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// When the band was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new band
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBand {
    /// Band name
    pub name: String,

    /// Free-form description
    pub description: String,
}

impl Band {
    /// Creates a new band
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn create(pool: &PgPool, data: CreateBand) -> Result<Self, sqlx::Error> {
        let band = sqlx::query_as::<_, Band>(
            r#"
            INSERT INTO bands (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(band)
    }

    /// Finds a band by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let band = sqlx::query_as::<_, Band>(
            r#"
            SELECT id, name, description, created_at
            FROM bands
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(band)
    }

    /// Adds a user to the band
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The user is already a member (unique constraint violation)
    /// - Band or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn add_member(pool: &PgPool, band_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO band_members (band_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(band_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes a user from the band
    ///
    /// Pure association removal; neither the band nor the user is deleted.
    ///
    /// # Returns
    ///
    /// True if the membership existed, false otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn remove_member(
        pool: &PgPool,
        band_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM band_members WHERE band_id = $1 AND user_id = $2")
            .bind(band_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all members of the band
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn members(pool: &PgPool, band_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.login, u.password_hash, u.name, u.email, u.phone,
                   u.status, u.role, u.created_at, u.updated_at
            FROM users u
            JOIN band_members bm ON bm.user_id = u.id
            WHERE bm.band_id = $1
            ORDER BY bm.created_at ASC
            "#,
        )
        .bind(band_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Lists all bands a user belongs to
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let bands = sqlx::query_as::<_, Band>(
            r#"
            SELECT b.id, b.name, b.description, b.created_at
            FROM bands b
            JOIN band_members bm ON bm.band_id = b.id
            WHERE bm.user_id = $1
            ORDER BY bm.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(bands)
    }

    /// Deletes a band
    ///
    /// Cascades to the band's events and memberships; member users are
    /// untouched.
    ///
    /// # Returns
    ///
    /// True if the band was deleted, false if it didn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bands WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
