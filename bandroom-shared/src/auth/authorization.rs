/// Route capabilities and the access-control gate
///
/// Permissions are an explicit per-route configuration: a static table maps
/// each protected route pattern to the [`Capability`] it requires, and a
/// single gate middleware checks the table before any handler body runs.
/// Denial is decided from the session role alone, so a 403 never reveals
/// whether the target record exists.
///
/// # Capability Model
///
/// - `View`: read a user profile and its events
/// - `Edit`: list, edit, and deactivate users
///
/// Grants come from the user's [`UserRole`]: admins hold both capabilities,
/// members hold `View` only.

use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use super::middleware::AuthContext;
use crate::models::user::UserRole;

/// Capability required to use a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read access to user profiles and their events
    View,

    /// Manage access: list, edit, deactivate users
    Edit,
}

impl Capability {
    /// Checks whether a role grants this capability
    ///
    /// Hierarchy: Admin grants everything, Member grants View only.
    pub fn granted_to(self, role: UserRole) -> bool {
        match self {
            Capability::View => true,
            Capability::Edit => matches!(role, UserRole::Admin),
        }
    }

    /// Gets capability as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::View => "view",
            Capability::Edit => "edit",
        }
    }
}

/// Route pattern to required capability, checked by [`capability_gate`]
///
/// Patterns are axum route paths as reported by `MatchedPath`. Routes not
/// listed here require authentication only.
const ROUTE_CAPABILITIES: &[(&str, Capability)] = &[
    ("/users", Capability::Edit),
    ("/users/:id", Capability::View),
    ("/users/:id/events", Capability::View),
    ("/users/:id/edit", Capability::Edit),
    ("/users/:id/delete", Capability::Edit),
];

/// Looks up the capability a route pattern requires
///
/// Returns None for routes with no entry in the table.
pub fn required_capability(route: &str) -> Option<Capability> {
    ROUTE_CAPABILITIES
        .iter()
        .find(|(pattern, _)| *pattern == route)
        .map(|(_, cap)| *cap)
}

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Session role does not grant the required capability
    #[error("Missing required capability: {0}")]
    Denied(&'static str),

    /// No auth context on the request; the session middleware must run first
    #[error("Request is not authenticated")]
    Unauthenticated,
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        // Same { error, message } body shape as the API error responder.
        // A denial never names the missing capability or the target.
        let (status, error, message) = match self {
            AuthzError::Denied(_) => (StatusCode::FORBIDDEN, "forbidden", "Forbidden"),
            AuthzError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required",
            ),
        };

        (
            status,
            Json(serde_json::json!({ "error": error, "message": message })),
        )
            .into_response()
    }
}

/// Checks a role against a required capability
///
/// # Errors
///
/// Returns `AuthzError::Denied` if the role does not grant the capability
pub fn require_capability(role: UserRole, capability: Capability) -> Result<(), AuthzError> {
    if !capability.granted_to(role) {
        return Err(AuthzError::Denied(capability.as_str()));
    }

    Ok(())
}

/// Access-control gate middleware
///
/// Looks up the matched route in the capability table and short-circuits
/// with 403 before the handler body runs when the session role is
/// insufficient. Must be layered inside the session middleware so the
/// [`AuthContext`] extension is already present.
pub async fn capability_gate(req: Request, next: Next) -> Result<Response, AuthzError> {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string());

    if let Some(capability) = route.as_deref().and_then(required_capability) {
        let auth = req
            .extensions()
            .get::<AuthContext>()
            .ok_or(AuthzError::Unauthenticated)?;

        require_capability(auth.role, capability)?;
    }

    Ok(next.run(req).await)
}
