//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, WebSocket endpoint, and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        ErrorResponse, MediaView, SequenceView, SnapshotView, StepView, TopicsResponse,
        VisualizePayload,
    },
    state::AppState,
    ws::ws_handler,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_topics,
        handlers::create_visualization,
    ),
    components(
        schemas(TopicsResponse, VisualizePayload, SequenceView, StepView, MediaView, SnapshotView, ErrorResponse)
    ),
    tags(
        (name = "VisualMath API", description = "Topic selection and step-by-step viewer sessions")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/topics", get(handlers::list_topics))
        .route("/visualizations", post(handlers::create_visualization))
        .route("/ws", get(ws_handler))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
