/// Session middleware for Axum
///
/// Resolves the `session` cookie on incoming requests: validates the signed
/// token, loads the user it is bound to, and injects an [`AuthContext`]
/// into request extensions for handlers and the capability gate to use.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use bandroom_shared::auth::middleware::{session_auth_middleware, AuthContext};
/// use sqlx::PgPool;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.login)
/// }
///
/// fn router(pool: PgPool, secret: String) -> Router {
///     Router::new()
///         .route("/home", get(handler))
///         .layer(middleware::from_fn(move |req, next| {
///             session_auth_middleware(pool.clone(), secret.clone(), req, next)
///         }))
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::session::{validate_session_token, SessionError};
use crate::models::user::{User, UserRole};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Authentication context added to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Authenticated user login (the session subject)
    pub login: String,

    /// Capability role of the user
    pub role: UserRole,
}

impl AuthContext {
    /// Creates an auth context from a loaded user
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            login: user.login.clone(),
            role: user.role,
        }
    }
}

/// Error type for the session middleware
#[derive(Debug)]
pub enum AuthError {
    /// No session cookie on the request
    MissingSession,

    /// Session token failed validation or has expired
    InvalidSession(String),

    /// The session's user no longer exists or is inactive
    StaleSession,

    /// Database error while loading the user
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Same { error, message } body shape as the API error responder
        let (status, error, message) = match self {
            AuthError::MissingSession => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
            ),
            AuthError::InvalidSession(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            AuthError::StaleSession => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Session is no longer valid".to_string(),
            ),
            AuthError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
        };

        (
            status,
            Json(serde_json::json!({ "error": error, "message": message })),
        )
            .into_response()
    }
}

/// Extracts a cookie value from a Cookie header
fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Session authentication middleware
///
/// Validates the `session` cookie, reloads the user (the account must still
/// be `Active`), and adds an [`AuthContext`] extension.
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - The session cookie is missing
/// - The token fails validation or has expired
/// - The user no longer exists or has been deactivated since login
pub async fn session_auth_middleware(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Extract the session cookie
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingSession)?;

    let token = cookie_value(cookie_header, SESSION_COOKIE).ok_or(AuthError::MissingSession)?;

    // Validate the token
    let claims = validate_session_token(token, &secret).map_err(|e| match e {
        SessionError::Expired => AuthError::InvalidSession("Session expired".to_string()),
        _ => AuthError::InvalidSession("Invalid session".to_string()),
    })?;

    // Reload the user; a session for a deactivated account is stale
    let user = User::find_by_id(&pool, claims.user_id)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Database error: {}", e)))?
        .ok_or(AuthError::StaleSession)?;

    if !user.is_active() {
        return Err(AuthError::StaleSession);
    }

    req.extensions_mut().insert(AuthContext::from_user(&user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value() {
        assert_eq!(
            cookie_value("session=abc123; theme=dark", "session"),
            Some("abc123")
        );
        assert_eq!(
            cookie_value("theme=dark; session=abc123", "session"),
            Some("abc123")
        );
        assert_eq!(cookie_value("theme=dark", "session"), None);
        assert_eq!(cookie_value("", "session"), None);
    }

    #[test]
    fn test_cookie_value_does_not_match_prefix() {
        assert_eq!(cookie_value("session2=abc", "session"), None);
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingSession.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidSession("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::DatabaseError("oops".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_auth_error_body_shape() {
        // Middleware errors use the same { error, message } body as
        // handler errors
        let response = AuthError::MissingSession.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "unauthorized");
        assert_eq!(json["message"], "Authentication required");
    }
}
