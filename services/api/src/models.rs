//! API Models
//!
//! This module defines the data structures exchanged with clients, both for
//! JSON bodies and for generating OpenAPI documentation with `utoipa`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use visualmath_core::{Media, Step, StepSequence, ViewerSnapshot};

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaView {
    Glyph { text: String },
    Clip { path: String },
}

impl From<&Media> for MediaView {
    fn from(media: &Media) -> Self {
        match media {
            Media::Glyph { text } => MediaView::Glyph { text: text.clone() },
            Media::Clip { path } => MediaView::Clip { path: path.clone() },
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    #[schema(example = "Basic Concept")]
    pub title: String,
    pub description: String,
    pub media: MediaView,
}

impl From<&Step> for StepView {
    fn from(step: &Step) -> Self {
        Self {
            title: step.title.clone(),
            description: step.description.clone(),
            media: MediaView::from(&step.media),
        }
    }
}

/// A complete sequence as chosen for a topic.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SequenceView {
    #[schema(example = "Pythagorean Theorem")]
    pub topic: String,
    /// Whether the sequence is hand-written rather than the generic fallback.
    pub curated: bool,
    pub steps: Vec<StepView>,
    /// A curated topic the input probably meant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl SequenceView {
    pub fn new(sequence: &StepSequence, curated: bool, suggestion: Option<String>) -> Self {
        Self {
            topic: sequence.topic().to_string(),
            curated,
            steps: sequence.steps().iter().map(StepView::from).collect(),
            suggestion,
        }
    }
}

/// What a client needs to render the viewer at its current position.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct SnapshotView {
    pub topic: String,
    pub position: usize,
    pub total: usize,
    #[schema(example = "Step 1 of 6")]
    pub label: String,
    pub step: StepView,
    /// Fraction of the sequence reached, in (0, 1].
    pub progress: f64,
    pub can_advance: bool,
    pub can_retreat: bool,
    pub generation: u64,
}

impl From<ViewerSnapshot> for SnapshotView {
    fn from(snapshot: ViewerSnapshot) -> Self {
        Self {
            step: StepView::from(&snapshot.step),
            label: snapshot.label,
            topic: snapshot.topic,
            position: snapshot.position,
            total: snapshot.total,
            progress: snapshot.progress,
            can_advance: snapshot.can_advance,
            can_retreat: snapshot.can_retreat,
            generation: snapshot.generation,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct VisualizePayload {
    #[schema(example = "Pythagorean Theorem")]
    pub topic: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct TopicsResponse {
    /// Topics suggested on the landing page.
    pub examples: Vec<String>,
    /// Topics with hand-written sequences.
    pub curated: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
