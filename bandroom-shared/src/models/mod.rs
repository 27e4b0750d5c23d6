/// Database models for bandroom
///
/// This module contains all database models and their query operations.
///
/// # Models
///
/// - `user`: User accounts with soft-delete status and capability role
/// - `band`: Bands and the user-band membership association
/// - `event`: Rehearsal events owned by a band
///
/// # Example
///
/// ```no_run
/// use bandroom_shared::models::user::{CreateUser, User};
/// use bandroom_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     login: "joannanewsom".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: Some("Joanna Newsom".to_string()),
///     email: "joanna@example.com".to_string(),
///     phone: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod band;
pub mod event;
pub mod user;
