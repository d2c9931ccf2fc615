//! Greeting page.

use axum::extract::State;

use crate::AppState;
use crate::error::Result;

const GREETING: &str = "Hello World!";
const CACHE_ITEM_KEY: &str = "cache_item";

/// Return a fixed greeting, round-tripping it through the cache.
pub async fn handler(State(state): State<AppState>) -> Result<&'static str> {
    state.cache.set(CACHE_ITEM_KEY, GREETING.to_owned()).await?;
    let cached = state.cache.get(CACHE_ITEM_KEY).await?;
    tracing::debug!(?cached, "cache item read back");

    Ok(GREETING)
}
