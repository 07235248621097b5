//! HTTP read API.
//!
//! Every handler runs its query on the blocking pool with a fresh
//! [`AnalysisContext`] and returns JSON. Errors use the shape
//! `{ "error", "status", "details" }`.

mod error;
mod handlers;

pub(crate) use error::ApiError;

use axum::routing::get;
use axum::Router;
use ch_analysis::{AnalysisContext, AnalysisResult};
use ch_core::Config;
use ch_db::Database;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared handler state.
#[derive(Clone)]
pub(crate) struct AppState {
    pub db: Arc<dyn Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Run `op` on the blocking pool with its own analysis context.
    pub async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&AnalysisContext<'_>) -> AnalysisResult<T> + Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || {
            let ctx = AnalysisContext::new(state.db.as_ref(), &state.config.columns);
            op(&ctx)
        })
        .await
        .map_err(|e| ApiError::internal(format!("blocking task failed: {e}")))?
        .map_err(ApiError::from)
    }
}

/// Build the API router.
pub(crate) fn build_router(state: AppState, cors_allow_any: bool) -> Router {
    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/vars", get(handlers::list_variables))
        .route("/api/variables/categories", get(handlers::variable_categories))
        .route("/api/stats", get(handlers::stats))
        .route("/api/stats/transformed", get(handlers::transformed_stats))
        .route("/api/choropleth", get(handlers::choropleth))
        .route("/api/corr", get(handlers::correlation))
        .route("/api/moran", get(handlers::moran))
        .route("/api/counties/{fips}", get(handlers::county))
        .route("/api/neighbors/{fips}", get(handlers::neighbors))
        .route("/api/validation", get(handlers::validation))
        .fallback(handlers::not_found)
        .with_state(state);

    if cors_allow_any {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
