/// Authenticated landing page
///
/// Returns the bands the logged-in user plays in. Any authenticated user can
/// reach this; no capability is required.
///
/// # Endpoint
///
/// ```text
/// GET /home
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use bandroom_shared::{auth::middleware::AuthContext, models::band::Band};
use serde::{Deserialize, Serialize};

/// View-model for the landing page
#[derive(Debug, Serialize, Deserialize)]
pub struct HomePage {
    /// Login of the authenticated user
    pub login: String,

    /// Bands the user belongs to
    pub bands: Vec<Band>,
}

/// Landing page handler
pub async fn home(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<HomePage>> {
    let bands = Band::list_for_user(&state.db, auth.user_id).await?;

    Ok(Json(HomePage {
        login: auth.login,
        bands,
    }))
}
