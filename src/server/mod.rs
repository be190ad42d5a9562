//! # HTTP Server Module
//!
//! Superficie HTTP del servizio (axum).
//!
//! ## Rotte:
//! - `POST /api/upload`: batch di immagini, risponde con `optimized_batch.zip`
//! - `POST /api/video/optimize`: batch di video, risponde con `optimized_videos.zip`
//! - `GET /api/metrics`: contatori di processo
//! - `GET /api/health`: liveness
//!
//! Ogni risposta porta l'header `X-Request-ID`.

pub mod handlers;
pub mod request_context;

use crate::config::Config;
use crate::metrics::AtomicMetrics;
use crate::optimizer::MediaOptimizer;
use crate::video_processor::VideoEncoder;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub optimizer: MediaOptimizer,
    pub metrics: Arc<AtomicMetrics>,
}

impl AppState {
    pub fn new(config: Config, encoder: Arc<dyn VideoEncoder>) -> Self {
        let metrics = Arc::new(AtomicMetrics::new());
        let optimizer = MediaOptimizer::new(Arc::new(config), metrics.clone(), encoder);
        Self { optimizer, metrics }
    }
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.optimizer.config().max_request_bytes();

    let api = Router::new()
        .route("/upload", post(handlers::upload_images))
        .route("/video/optimize", post(handlers::optimize_videos))
        .route("/metrics", get(handlers::metrics))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_context::request_context_middleware))
        .with_state(state)
}
