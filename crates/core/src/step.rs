use crate::error::ViewerError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The visual attached to a single step: either a static glyph or a clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum Media {
    /// A short textual or emoji representation.
    Glyph { text: String },
    /// Path or URI of a short, silent video asset.
    Clip { path: String },
}

impl Media {
    /// Returns the clip path when this media is a clip.
    pub fn clip_path(&self) -> Option<&str> {
        match self {
            Media::Clip { path } => Some(path),
            Media::Glyph { .. } => None,
        }
    }
}

/// One unit of a visualization sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Step {
    pub title: String,
    pub description: String,
    pub media: Media,
}

impl Step {
    /// Creates a step illustrated by a static glyph.
    pub fn glyph(
        title: impl Into<String>,
        description: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            media: Media::Glyph { text: text.into() },
        }
    }

    /// Creates a step illustrated by a video clip.
    pub fn clip(
        title: impl Into<String>,
        description: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            media: Media::Clip { path: path.into() },
        }
    }

    /// Checks that every text field of the step carries content.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description is empty".to_string());
        }
        match &self.media {
            Media::Glyph { text } if text.trim().is_empty() => Err("glyph text is empty".to_string()),
            Media::Clip { path } if path.trim().is_empty() => Err("clip path is empty".to_string()),
            _ => Ok(()),
        }
    }
}

/// An ordered list of steps for one topic.
///
/// Sequences are immutable once built: there are no accessors that add,
/// remove or reorder steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StepSequence {
    topic: String,
    steps: Vec<Step>,
}

impl StepSequence {
    pub fn new(topic: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            topic: topic.into(),
            steps,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Verifies the sequence is non-empty and that every step is well formed.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.steps.is_empty() {
            return Err(ViewerError::EmptySequence {
                topic: self.topic.clone(),
            });
        }
        for (index, step) in self.steps.iter().enumerate() {
            step.validate()
                .map_err(|reason| ViewerError::InvalidStep { index, reason })?;
        }
        Ok(())
    }
}

/// JSON Schema describing a curated sequence file.
pub fn sequence_schema() -> serde_json::Value {
    schemars::schema_for!(StepSequence).to_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_serialization_is_tagged() {
        let glyph = Media::Glyph {
            text: "△".to_string(),
        };
        let clip = Media::Clip {
            path: "/videos/step1.mp4".to_string(),
        };

        assert_eq!(
            serde_json::to_string(&glyph).unwrap(),
            r#"{"kind":"glyph","text":"△"}"#
        );
        assert_eq!(
            serde_json::to_string(&clip).unwrap(),
            r#"{"kind":"clip","path":"/videos/step1.mp4"}"#
        );
    }

    #[test]
    fn test_media_requires_exactly_one_representation() {
        let both = r#"{"kind":"clip","path":"/a.mp4","text":"x"}"#;
        assert!(serde_json::from_str::<Media>(both).is_err());

        let clip: Media = serde_json::from_str(r#"{"kind":"clip","path":"/a.mp4"}"#).unwrap();
        assert_eq!(clip.clip_path(), Some("/a.mp4"));

        let neither = r#"{"title":"x"}"#;
        assert!(serde_json::from_str::<Media>(neither).is_err());
    }

    #[test]
    fn test_step_validation() {
        assert!(Step::glyph("Intro", "Welcome", "📐").validate().is_ok());
        assert_eq!(
            Step::glyph("  ", "Welcome", "📐").validate(),
            Err("title is empty".to_string())
        );
        assert_eq!(
            Step::glyph("Intro", "", "📐").validate(),
            Err("description is empty".to_string())
        );
        assert_eq!(
            Step::clip("Intro", "Welcome", "").validate(),
            Err("clip path is empty".to_string())
        );
    }

    #[test]
    fn test_sequence_validate_reports_first_invalid_step() {
        let sequence = StepSequence::new(
            "Derivatives",
            vec![
                Step::glyph("Step 1", "ok", "1"),
                Step::glyph("Step 2", "ok", ""),
            ],
        );
        assert_eq!(
            sequence.validate(),
            Err(ViewerError::InvalidStep {
                index: 1,
                reason: "glyph text is empty".to_string()
            })
        );
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let sequence = StepSequence::new("Integration", vec![]);
        assert!(sequence.is_empty());
        assert_eq!(
            sequence.validate(),
            Err(ViewerError::EmptySequence {
                topic: "Integration".to_string()
            })
        );
    }

    #[test]
    fn test_sequence_schema_names_fields() {
        let schema = sequence_schema().to_string();
        assert!(schema.contains("topic"));
        assert!(schema.contains("steps"));
    }
}
