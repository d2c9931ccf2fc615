//! HTTP routes.
pub mod index;
pub mod users;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::ServerError;

/// JSON body deserialized then validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// Application state backed by in-memory adapters.
#[cfg(test)]
pub fn state() -> crate::AppState {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::cache::MemoryCache;
    use crate::user::UserService;
    use crate::user::memory::MemoryUserRepository;

    let cache = Arc::new(MemoryCache::new(Duration::ZERO, 1_000));
    crate::AppState {
        users: UserService::new(Arc::new(MemoryUserRepository::new()), cache.clone()),
        cache,
        metrics: None,
    }
}
