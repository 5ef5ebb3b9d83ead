//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for topic
//! selection. It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, warn};
use visualmath_core::{CatalogError, catalog::EXAMPLE_TOPICS};

use crate::{
    models::{ErrorResponse, SequenceView, TopicsResponse, VisualizePayload},
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                warn!(%message, "Rejected request");
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// List example and curated topics.
#[utoipa::path(
    get,
    path = "/topics",
    responses(
        (status = 200, description = "Known topics", body = TopicsResponse)
    )
)]
pub async fn list_topics(State(state): State<Arc<AppState>>) -> Json<TopicsResponse> {
    Json(TopicsResponse {
        examples: EXAMPLE_TOPICS.iter().map(|t| t.to_string()).collect(),
        curated: state.catalog.curated_topics(),
    })
}

/// Choose the step sequence for a topic.
#[utoipa::path(
    post,
    path = "/visualizations",
    request_body = VisualizePayload,
    responses(
        (status = 200, description = "Sequence selected", body = SequenceView),
        (status = 400, description = "Blank topic", body = ErrorResponse)
    )
)]
pub async fn create_visualization(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VisualizePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let sequence = state.catalog.select(&payload.topic)?;
    let curated = state.catalog.is_curated(sequence.topic());
    let suggestion = if curated {
        None
    } else {
        state.catalog.suggest(sequence.topic())
    };

    info!(topic = %sequence.topic(), curated, steps = sequence.len(), "Selected sequence");
    Ok((
        StatusCode::OK,
        Json(SequenceView::new(&sequence, curated, suggestion)),
    ))
}
