//! Errors raised by the user resource.

use crate::cache::CacheError;
use crate::user::StoreError;

pub type Result<T> = std::result::Result<T, UserError>;

/// Enum representing user resource errors.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("malformed user identifier")]
    InvalidArgument,
    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}
