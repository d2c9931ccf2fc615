//! Get a user by its identifier.

use axum::Json;
use axum::extract::{Path, State};

use crate::AppState;
use crate::error::Result;
use crate::user::User;

pub async fn handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.users.find_one(&user_id).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use crate::*;

    #[tokio::test]
    async fn test_get_user_handler() {
        let app = app(router::state());

        let response = make_request(
            app.clone(),
            Method::POST,
            "/users",
            json!({ "name": "Ada" }).to_string(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let created: Value = serde_json::from_slice(&body).unwrap();

        let path = format!("/users/{}", created["id"].as_str().unwrap());
        let response = make_request(app, Method::GET, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, created);
    }

    #[tokio::test]
    async fn test_get_malformed_id() {
        let app = app(router::state());

        let response =
            make_request(app, Method::GET, "/users/not-a-valid-id", String::default()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "message": "Invalid" }));
    }

    #[tokio::test]
    async fn test_get_absent_user() {
        let app = app(router::state());

        let response = make_request(
            app,
            Method::GET,
            "/users/507f1f77bcf86cd799439011",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "message": "Not Found" }));
    }
}
