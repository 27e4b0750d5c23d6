/// User model and database operations
///
/// Users authenticate by login and belong to bands via the `band_members`
/// association. Deletion is soft: a "deleted" user is flipped to
/// `UserStatus::Inactive` and excluded from active listings, but the row
/// stays addressable by id. Logins are unique among all users ever created,
/// active or not.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_status AS ENUM ('active', 'inactive');
/// CREATE TYPE user_role AS ENUM ('admin', 'member');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     login VARCHAR(64) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     name VARCHAR(255),
///     email VARCHAR(255) NOT NULL,
///     phone VARCHAR(32),
///     status user_status NOT NULL DEFAULT 'active',
///     role user_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Lifecycle status of a user record
///
/// Modeled as an enum rather than a boolean so further states can be added
/// without a schema rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Normal account, appears in listings, can log in
    Active,

    /// Soft-deleted account, hidden from listings, cannot log in
    Inactive,
}

/// Capability role of a user
///
/// The grant side of the access-control model: admins hold the `Edit`
/// capability (list, edit, deactivate users), members hold `View` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Can manage user accounts in addition to viewing
    Admin,

    /// Can view user profiles and their events
    Member,
}

/// User model representing a user account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Login name, unique among all users ever created
    pub login: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Email address
    pub email: String,

    /// Optional phone number
    pub phone: Option<String>,

    /// Soft-delete status
    pub status: UserStatus,

    /// Capability role
    pub role: UserRole,

    /// When the user account was created
    pub created_at: DateTime<Utc>,

    /// When the user account was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// True if the user has not been soft-deleted
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Login name (must be unique)
    pub login: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Email address
    pub email: String,

    /// Optional phone number
    pub phone: Option<String>,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New login name
    pub login: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,

    /// New display name (use Some(None) to clear)
    pub name: Option<Option<String>>,

    /// New email address
    pub email: Option<String>,

    /// New phone number (use Some(None) to clear)
    pub phone: Option<Option<String>>,
}

impl User {
    /// Creates a new user in the database
    ///
    /// New users start as `Active` members.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Login already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, password_hash, name, email, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, login, password_hash, name, email, phone, status, role,
                      created_at, updated_at
            "#,
        )
        .bind(data.login)
        .bind(data.password_hash)
        .bind(data.name)
        .bind(data.email)
        .bind(data.phone)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// Inactive users are still found here; they remain addressable by
    /// identifier after soft deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash, name, email, phone, status, role,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by login
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash, name, email, phone, status, role,
                   created_at, updated_at
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists exactly the users whose status is `Active`
    ///
    /// No pagination, filtering, or sorting options; rows come back in
    /// creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash, name, email, phone, status, role,
                   created_at, updated_at
            FROM users
            WHERE status = 'active'
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Soft-deletes a user by flipping status to `Inactive`
    ///
    /// The row is never removed. Idempotent: deactivating an already
    /// inactive user is a no-op from the caller's perspective. Does not
    /// cascade to bands or events.
    ///
    /// # Returns
    ///
    /// True if a user row with that id exists, false otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET status = 'inactive', updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` are written; `updated_at` is bumped
    /// automatically.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the user doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Login already exists for another user
    /// - Database connection fails
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.login.is_some() {
            bind_count += 1;
            query.push_str(&format!(", login = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, login, password_hash, name, email, phone, \
             status, role, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(login) = data.login {
            q = q.bind(login);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(name_opt) = data.name {
            q = q.bind(name_opt);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(phone_opt) = data.phone {
            q = q.bind(phone_opt);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Checks whether a login is already used by a *different* user
    ///
    /// The check runs against the full user set, active or inactive, so a
    /// soft-deleted user still reserves its login.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn login_taken_by_other(
        pool: &PgPool,
        login: &str,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE login = $1 AND id <> $2
            )
            "#,
        )
        .bind(login)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(taken)
    }

    /// Promotes or demotes a user's capability role
    ///
    /// # Returns
    ///
    /// True if the user was found and updated, false otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn set_role(pool: &PgPool, id: Uuid, role: UserRole) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(role)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_struct() {
        let create_user = CreateUser {
            login: "user".to_string(),
            password_hash: "hash".to_string(),
            name: Some("Test User".to_string()),
            email: "user@user.com".to_string(),
            phone: None,
        };

        assert_eq!(create_user.login, "user");
        assert_eq!(create_user.password_hash, "hash");
    }

    #[test]
    fn test_update_user_default() {
        let update = UpdateUser::default();
        assert!(update.login.is_none());
        assert!(update.password_hash.is_none());
        assert!(update.name.is_none());
        assert!(update.email.is_none());
        assert!(update.phone.is_none());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&UserStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&UserStatus::Inactive).unwrap(),
            "\"inactive\""
        );
    }

    // Integration tests for database operations are in bandroom-api/tests/
}
