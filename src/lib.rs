//! Users API is a small user directory over HTTP, cached in front of a document store.

pub mod cache;
pub mod config;
mod database;
pub mod error;
mod router;
pub mod telemetry;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderName, Method, StatusCode};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};

pub use error::ServerError;

use crate::cache::Cache;
use crate::user::{PgUserRepository, UserService};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use axum::http::header;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub cache: Arc<dyn Cache>,
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let middleware = ServiceBuilder::new()
        // Give every request an identifier before it is traced.
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        .layer(PropagateRequestIdLayer::new(request_id))
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(10)))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any),
        );

    let mut routes = Router::new()
        // `GET /` goes to `index`.
        .route("/", get(router::index::handler))
        .nest("/users", router::users::router());

    // `GET /metrics` only exists once a recorder is installed.
    if let Some(handle) = state.metrics.clone() {
        routes = routes.route("/metrics", get(move || std::future::ready(handle.render())));
    }

    routes
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: &config::Configuration,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let url = config::database_url()?;
    let db = database::Database::new(&url, config.postgres.pool_size).await?;

    // execute migrations scripts on start.
    db.migrate().await?;

    let cache = cache::from_config(&config.cache)?;

    if !config.cache.invalidate_collection_on_write {
        tracing::warn!(
            ttl = config.cache.ttl,
            "writes do not evict the cached user list, it can be stale until it expires"
        );
    }

    let users = UserService::new(Arc::new(PgUserRepository::new(db.postgres)), cache.clone())
        .invalidate_collection(config.cache.invalidate_collection_on_write);

    let metrics = if config.telemetry.prometheus {
        Some(telemetry::setup_metrics_recorder()?)
    } else {
        None
    };

    Ok(AppState {
        users,
        cache,
        metrics,
    })
}
