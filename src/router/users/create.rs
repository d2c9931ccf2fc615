use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::{CreateUser, User};

/// Handler to create user.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<CreateUser>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.users.create(body).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use crate::*;

    #[tokio::test]
    async fn test_create_handler() {
        let app = app(router::state());

        let response = make_request(
            app,
            Method::POST,
            "/users",
            json!({ "name": "Ada", "email": "ada@example.com" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["email"], "ada@example.com");

        let id = body["id"].as_str().unwrap();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_create_with_missing_name() {
        let app = app(router::state());

        let response = make_request(
            app,
            Method::POST,
            "/users",
            json!({ "email": "ada@example.com" }).to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_with_wrong_type() {
        let app = app(router::state());

        let response =
            make_request(app, Method::POST, "/users", json!({ "name": 42 }).to_string()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_with_empty_name() {
        let app = app(router::state());

        let response =
            make_request(app, Method::POST, "/users", json!({ "name": "" }).to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["errors"][0]["field"], "name");
    }
}
