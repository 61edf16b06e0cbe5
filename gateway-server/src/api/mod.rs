//! API Module
//!
//! HTTP API layer for the program gateway.
//! Each versioned router is built from the shared program handlers and the
//! serializer registered for that version.

pub mod error;
pub mod form;
pub mod health;
pub mod program;

use axum::{Router, extract::DefaultBodyLimit, middleware, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::serializer::{ProgramSerializer, ProgramSerializerV1};
use crate::state::AppState;

/// Serializers for every mounted API version
pub fn api_versions() -> Vec<Arc<dyn ProgramSerializer>> {
    vec![Arc::new(ProgramSerializerV1)]
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    let mut router = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .with_state(state.clone());

    for serializer in api_versions() {
        router = router.merge(program::router(state.clone(), serializer));
    }

    router
        .layer(middleware::from_fn_with_state(
            state,
            auth::auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}
