/// Session token generation and validation
///
/// The authenticated-session marker is an HS256-signed token bound to the
/// user's login, delivered to the browser as a cookie after a successful
/// login and validated by the session middleware on every protected
/// request.
///
/// # Example
///
/// ```
/// use bandroom_shared::auth::session::{create_session_token, validate_session_token, SessionClaims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = SessionClaims::new(Uuid::new_v4(), "user".to_string());
/// let token = create_session_token(&claims, "secret-key-at-least-32-bytes-long")?;
///
/// let validated = validate_session_token(&token, "secret-key-at-least-32-bytes-long")?;
/// assert_eq!(validated.sub, "user");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into every session token
const ISSUER: &str = "bandroom";

/// Default session lifetime
const DEFAULT_SESSION_HOURS: i64 = 12;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to create token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Token failed signature or structural validation
    #[error("Invalid session token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Session has expired")]
    Expired,
}

/// Claims carried by a session token
///
/// The subject is the user's login (the identity the session layer
/// remembers); the user id rides along so the middleware can load the
/// record without a login lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - user login
    pub sub: String,

    /// User ID
    pub user_id: Uuid,

    /// Issuer - always "bandroom"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Creates new claims with the default session lifetime
    pub fn new(user_id: Uuid, login: String) -> Self {
        Self::with_expiration(user_id, login, Duration::hours(DEFAULT_SESSION_HOURS))
    }

    /// Creates claims with a custom lifetime
    pub fn with_expiration(user_id: Uuid, login: String, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: login,
            user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

/// Creates a signed session token from claims
///
/// # Errors
///
/// Returns `SessionError::CreateError` if signing fails
pub fn create_session_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| SessionError::CreateError(e.to_string()))
}

/// Validates a session token and returns its claims
///
/// Checks signature, expiration, and issuer.
///
/// # Errors
///
/// - `SessionError::Expired` if the token is past its expiration
/// - `SessionError::ValidationError` for any other failure
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        _ => SessionError::ValidationError(e.to_string()),
    })?;

    Ok(data.claims)
}
