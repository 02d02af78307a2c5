//! HTTP surface: axum router, shared state and error mapping.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::models::{ServiceStatus, MAX_UPLOAD_BYTES};
use crate::pipeline::CloudPipeline;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CloudPipeline>,
    pub services: ServiceStatus,
}

impl AppState {
    pub fn new(pipeline: CloudPipeline, services: ServiceStatus) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            services,
        }
    }
}

pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/process-cloud", post(handlers::process_cloud))
        .route("/images/original/:session_id", get(handlers::original_image))
        .route("/images/generated/:filename", get(handlers::generated_image))
        .route("/download/:filename", get(handlers::download_image))
        .layer(DefaultBodyLimit::max(
            MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
