/// Credential verification against stored users
///
/// The single entry point is [`authenticate`], which checks a login and
/// password against the users table. The failure mode is deliberately
/// uniform: an unknown login, an inactive user, and a wrong password all
/// produce the same `WrongCredential` error, so callers cannot use the
/// login form to enumerate accounts.

use sqlx::PgPool;
use tracing::debug;

use super::password::{verify_password, PasswordError};
use crate::models::user::User;

/// Error type for credential checks
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Login unknown, user inactive, or password mismatch.
    /// Intentionally carries no detail about which of the three it was.
    #[error("Wrong credential")]
    WrongCredential,

    /// Stored hash could not be processed
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Authenticates a user by login and password
///
/// Succeeds only if a user with the given login exists, is `Active`, and
/// the password verifies against the stored Argon2id hash.
///
/// # Errors
///
/// Returns `CredentialError::WrongCredential` for every mismatch case;
/// `Password`/`Database` only for infrastructure failures.
///
/// # Example
///
/// ```no_run
/// use bandroom_shared::auth::credentials::{authenticate, CredentialError};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// match authenticate(&pool, "user", "password").await {
///     Ok(user) => println!("Logged in: {}", user.login),
///     Err(CredentialError::WrongCredential) => println!("Login failed"),
///     Err(e) => return Err(e.into()),
/// }
/// # Ok(())
/// # }
/// ```
pub async fn authenticate(
    pool: &PgPool,
    login: &str,
    password: &str,
) -> Result<User, CredentialError> {
    let user = match User::find_by_login(pool, login).await? {
        Some(user) => user,
        None => {
            debug!("Authentication failed");
            return Err(CredentialError::WrongCredential);
        }
    };

    if !user.is_active() {
        debug!("Authentication failed");
        return Err(CredentialError::WrongCredential);
    }

    if !verify_password(password, &user.password_hash)? {
        debug!("Authentication failed");
        return Err(CredentialError::WrongCredential);
    }

    Ok(user)
}
