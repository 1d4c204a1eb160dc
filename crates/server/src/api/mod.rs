//! HTTP API
//!
//! ```text
//! /api/v1/health                      GET
//! /api/v1/records/:id                 GET, POST
//! /api/v2/health                      GET
//! /api/v2/records/:id                 GET, POST
//! /api/v2/records/:id/versions        GET
//! ```

pub mod error;
pub mod handlers;

use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tracing::info;

use timetravel_service::RecordService;

pub use error::ApiError;

/// State shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Record service over the shared store
    pub service: RecordService,
    /// Deadline for the blocking part of a request
    pub request_timeout: Duration,
}

impl AppState {
    /// Create handler state
    pub fn new(service: RecordService, request_timeout: Duration) -> Self {
        Self {
            service,
            request_timeout,
        }
    }
}

fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/records/:id",
            get(handlers::get_record).post(handlers::post_record),
        )
}

fn v2_routes() -> Router<AppState> {
    v1_routes().route("/records/:id/versions", get(handlers::get_versions))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        target: "timetravel::http",
        %method,
        %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", v1_routes())
        .nest("/api/v2", v2_routes())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
