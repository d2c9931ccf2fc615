//! Delete user from database.

use axum::extract::{Path, State};

use crate::AppState;
use crate::error::Result;

pub async fn handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<()> {
    state.users.remove(&user_id).await?;
    Ok(())
}
