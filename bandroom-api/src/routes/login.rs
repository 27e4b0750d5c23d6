/// Login endpoints
///
/// `GET /login` returns the login form view-model; `POST /login` checks the
/// submitted credentials. A successful login sets the `session` cookie and
/// redirects to the `next` destination; a failed login re-renders the form
/// view-model with the `fail` flag set instead of surfacing an error status,
/// so the client shows "Login failed" inline.
///
/// # Endpoints
///
/// ```text
/// GET  /login?next=/users
/// POST /login   (form-encoded: user, password)
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Form, Json,
};
use bandroom_shared::{
    auth::{
        credentials::{authenticate, CredentialError},
        middleware::SESSION_COOKIE,
        session::{create_session_token, SessionClaims},
    },
    forms::{FieldSchema, FormSchema, FormView, WidgetRequirements},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Destination after a successful login when no `next` was requested
const DEFAULT_NEXT: &str = "/home";

/// The login form schema
fn login_schema() -> FormSchema {
    FormSchema::new("login")
        .field(FieldSchema::text("user", "Type your user"))
        .field(FieldSchema::password("password", "Type your password"))
        .button("submit")
}

/// Query parameters accepted by both login endpoints
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Where to redirect after a successful login
    pub next: Option<String>,
}

/// View-model for the login page
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginPage {
    /// Rendered form
    pub form: FormView,

    /// Static assets the form's widgets need
    pub requirements: WidgetRequirements,

    /// Destination to carry through the form submission
    pub next: String,

    /// True when the previous submission had wrong credentials
    pub fail: bool,
}

impl LoginPage {
    fn new(next: String, fail: bool) -> Self {
        let schema = login_schema();
        Self {
            form: schema.render(),
            requirements: schema.widget_requirements(),
            next,
            fail,
        }
    }
}

/// Login form handler
///
/// Returns the view-model for a fresh login form.
pub async fn login_form(Query(query): Query<LoginQuery>) -> Json<LoginPage> {
    let next = query.next.unwrap_or_else(|| DEFAULT_NEXT.to_string());
    Json(LoginPage::new(next, false))
}

/// Login submission handler
///
/// Verifies the submitted credentials. On success, sets the session cookie
/// and redirects (303) to `next`, which is read from the query string or a
/// `next` form field. On wrong credentials, returns the login view-model
/// again with `fail` set; the response deliberately does not say whether
/// the login or the password was wrong.
///
/// # Errors
///
/// Infrastructure failures (database, hashing) surface as 500; credential
/// mismatches never do.
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    Form(input): Form<HashMap<String, String>>,
) -> ApiResult<Response> {
    let next = query
        .next
        .or_else(|| input.get("next").filter(|v| !v.is_empty()).cloned())
        .unwrap_or_else(|| DEFAULT_NEXT.to_string());

    let user = input.get("user").map(String::as_str).unwrap_or_default();
    let password = input
        .get("password")
        .map(String::as_str)
        .unwrap_or_default();

    let user = match authenticate(&state.db, user, password).await {
        Ok(user) => user,
        Err(CredentialError::WrongCredential) => {
            return Ok(Json(LoginPage::new(next, true)).into_response());
        }
        Err(CredentialError::Password(e)) => return Err(e.into()),
        Err(CredentialError::Database(e)) => return Err(e.into()),
    };

    let claims = SessionClaims::new(user.id, user.login.clone());
    let token = create_session_token(&claims, state.session_secret())?;

    info!(login = %user.login, "User logged in");

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, token
    );

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to(&next)).into_response())
}
