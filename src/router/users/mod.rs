//! Users-related HTTP API.
mod create;
mod delete;
mod get;
mod list;
mod update;

use axum::Router;
use axum::routing::get;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /users` goes to `create`, `GET /users` goes to `list`.
        .route("/", get(list::handler).post(create::handler))
        // `GET /users/:ID` goes to `get`.
        // `PATCH /users/:ID` goes to `update`.
        // `DELETE /users/:ID` goes to `delete`.
        .route(
            "/{user_id}",
            get(get::handler)
                .patch(update::handler)
                .delete(delete::handler),
        )
}
