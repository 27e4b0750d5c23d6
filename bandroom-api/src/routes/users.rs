/// User management endpoints
///
/// Listing, viewing, editing, and soft-deleting user accounts, plus each
/// user's rehearsal schedule. All of these sit behind the session middleware
/// and the capability gate: `/users`, edit, and delete require the `edit`
/// capability, profile and events views require `view`.
///
/// # Endpoints
///
/// ```text
/// GET      /users                 List active users
/// GET      /users/:id             Profile with the user's events
/// GET      /users/:id/events      The user's events only
/// GET/POST /users/:id/edit        Edit form view-model / submission
/// GET/POST /users/:id/delete      Soft delete (idempotent)
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use bandroom_shared::{
    auth::password::hash_password,
    forms::{FieldError, FieldSchema, FormSchema, FormView, WidgetRequirements},
    models::{
        event::Event,
        user::{UpdateUser, User, UserRole, UserStatus},
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// The user edit form schema
///
/// Password changes require confirmation and a minimum length; phone is the
/// only optional field, and omitting it leaves the stored number untouched.
fn user_edit_schema() -> FormSchema {
    FormSchema::new("user_edit")
        .field(FieldSchema::text("name", "Type your name"))
        .field(
            FieldSchema::checked_password("password", "Type your password and confirm it")
                .min_length(5),
        )
        .field(FieldSchema::text("login", "Type your login"))
        .field(FieldSchema::email("email", "Type your e-mail"))
        .field(FieldSchema::text("phone", "Type your phone number").optional())
        .button("send")
}

/// User representation for API responses
///
/// Deliberately omits the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    /// User ID
    pub id: Uuid,

    /// Login name
    pub login: String,

    /// Display name
    pub name: Option<String>,

    /// Email address
    pub email: String,

    /// Phone number
    pub phone: Option<String>,

    /// Lifecycle status
    pub status: UserStatus,

    /// Capability role
    pub role: UserRole,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
            name: user.name,
            email: user.email,
            phone: user.phone,
            status: user.status,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Response for the user list
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    /// Active users in creation order
    pub users: Vec<UserView>,
}

/// Response for a user profile
#[derive(Debug, Serialize, Deserialize)]
pub struct UserDetailResponse {
    /// The user
    pub user: UserView,

    /// Events of every band the user belongs to
    pub events: Vec<Event>,
}

/// Response for a user's events
#[derive(Debug, Serialize, Deserialize)]
pub struct UserEventsResponse {
    /// Events of every band the user belongs to
    pub events: Vec<Event>,
}

/// View-model for the edit form page
#[derive(Debug, Serialize, Deserialize)]
pub struct EditFormPage {
    /// Rendered form, annotated with errors after a failed submission
    pub form: FormView,

    /// Static assets the form's widgets need
    pub requirements: WidgetRequirements,
}

/// Generic status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Operation status, "success" on completion
    pub status: String,
}

/// Lists all active users
///
/// Soft-deleted users never appear here. Requires the `edit` capability.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UserListResponse>> {
    let users = User::list_active(&state.db).await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserView::from).collect(),
    }))
}

/// Shows a user profile with the user's rehearsal schedule
///
/// The schedule is the union of the events of every band the user belongs
/// to. Inactive users remain addressable here.
pub async fn view_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserDetailResponse>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let events = Event::list_for_user(&state.db, user.id).await?;

    Ok(Json(UserDetailResponse {
        user: user.into(),
        events,
    }))
}

/// Shows a user's rehearsal schedule only
pub async fn user_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserEventsResponse>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let events = Event::list_for_user(&state.db, user.id).await?;

    Ok(Json(UserEventsResponse { events }))
}

/// Returns the edit form view-model for a user
pub async fn edit_user_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EditFormPage>> {
    User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let schema = user_edit_schema();

    Ok(Json(EditFormPage {
        form: schema.render(),
        requirements: schema.widget_requirements(),
    }))
}

/// Handles an edit form submission
///
/// Validation runs in two stages: schema binding (presence, lengths, email
/// shape, password confirmation) and then the login-uniqueness check against
/// every user ever created, active or not. Any failure re-renders the form
/// with inline errors as a 422; nothing is written in that case.
///
/// A successful submission rewrites every submitted field (the password is
/// re-hashed); the optional phone is dropped when absent, leaving the
/// stored number as it was.
pub async fn edit_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(input): Form<HashMap<String, String>>,
) -> ApiResult<Response> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let schema = user_edit_schema();

    let bound = match schema.bind(&input) {
        Ok(bound) => bound,
        Err(errors) => return Ok(validation_failure(&schema, &errors)),
    };

    // Schema guarantees presence of every required field
    let login = bound.get("login").unwrap_or_default();
    let password = bound.get("password").unwrap_or_default();
    let name = bound.get("name").unwrap_or_default();
    let email = bound.get("email").unwrap_or_default();
    let phone = bound.get("phone");

    if User::login_taken_by_other(&state.db, login, user.id).await? {
        let errors = vec![FieldError::new("login", "User login already in use")];
        return Ok(validation_failure(&schema, &errors));
    }

    let password_hash = hash_password(password)?;

    let updated = User::update(
        &state.db,
        user.id,
        UpdateUser {
            login: Some(login.to_string()),
            password_hash: Some(password_hash),
            name: Some(Some(name.to_string())),
            email: Some(email.to_string()),
            phone: phone.map(|p| Some(p.to_string())),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(login = %updated.login, "User updated");

    Ok(Json(StatusResponse {
        status: "success".to_string(),
    })
    .into_response())
}

/// Soft-deletes a user
///
/// Flips the account to inactive; the row stays addressable by id and the
/// login stays reserved. Idempotent: deleting an already inactive user
/// succeeds again. Never cascades to bands or events.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse>> {
    let found = User::deactivate(&state.db, id).await?;

    if !found {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(user_id = %id, "User deactivated");

    Ok(Json(StatusResponse {
        status: "success".to_string(),
    }))
}

/// Builds the 422 response for a failed edit submission
fn validation_failure(schema: &FormSchema, errors: &[FieldError]) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(EditFormPage {
            form: schema.render_with_errors(errors),
            requirements: schema.widget_requirements(),
        }),
    )
        .into_response()
}
