mod error;
mod id;
#[cfg(test)]
pub mod memory;
mod repository;
mod service;

pub use error::*;
pub use id::*;
pub use repository::*;
pub use service::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User as returned by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(flatten)]
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User-supplied fields, saved as a document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Fields accepted on creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Name must not be empty."))]
    pub name: String,
    pub email: Option<String>,
}

impl From<CreateUser> for Profile {
    fn from(body: CreateUser) -> Self {
        Self {
            name: body.name,
            email: body.email,
        }
    }
}

/// Partial fields accepted on update.
///
/// Fields left to `None` are not serialized, hence not merged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name must not be empty."))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
