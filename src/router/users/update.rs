//! Partially update user data.

use axum::Json;
use axum::extract::{Path, State};

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::{UpdateUser, User};

pub async fn handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Valid(body): Valid<UpdateUser>,
) -> Result<Json<User>> {
    Ok(Json(state.users.update(&user_id, body).await?))
}
