//! Error handler for users-api.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::cache::CacheError;
use crate::user::UserError;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    User(#[from] UserError),

    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Body sent along an error status.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    #[serde(skip)]
    status: StatusCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Create a new [`ResponseError`].
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }

    /// Automatically add errors field.
    pub fn errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = Some(parse_validation_errors(errors));
        self
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue.to_string(),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::User(UserError::InvalidArgument) => {
                ResponseError::new(StatusCode::BAD_REQUEST, "Invalid")
            },
            ServerError::User(UserError::NotFound) => {
                ResponseError::new(StatusCode::NOT_FOUND, "Not Found")
            },
            ServerError::User(_) | ServerError::Cache(_) => {
                tracing::error!(error = %self, "server returned 500 status");
                ResponseError::default()
            },
            ServerError::Validation(errors) => {
                ResponseError::new(StatusCode::BAD_REQUEST, "Validation failed")
                    .errors(errors)
            },
            ServerError::Axum(rejection) => {
                let status = match rejection {
                    JsonRejection::MissingJsonContentType(_) => {
                        StatusCode::UNSUPPORTED_MEDIA_TYPE
                    },
                    _ => StatusCode::BAD_REQUEST,
                };
                ResponseError::new(status, &rejection.body_text())
            },
        }
        .into_response()
    }
}
