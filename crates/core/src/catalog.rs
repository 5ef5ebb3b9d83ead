//! Topic Catalog
//!
//! This module decides which step sequence is shown for a topic typed by the
//! user. Curated topics are looked up by exact name; every other topic gets a
//! generic three-step sequence mentioning the topic. The lookup is a trait so
//! that new curated content can be added without touching the viewer.

use crate::{
    error::CatalogError,
    step::{Step, StepSequence},
};
use anyhow::{Context, Result};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use std::{collections::HashMap, fs, path::Path};
use tracing::{debug, info};

/// Topics offered as suggestions on the landing page.
pub const EXAMPLE_TOPICS: [&str; 4] = [
    "Pythagorean Theorem",
    "Quadratic Equations",
    "Derivatives",
    "Integration",
];

const PYTHAGOREAN_THEOREM: &str = "Pythagorean Theorem";

/// Shortest input for which a fuzzy suggestion is attempted.
const MIN_SUGGESTION_LEN: usize = 3;

/// Defines the contract for anything that maps a topic to a step sequence.
pub trait TopicCatalog: Send + Sync {
    /// Returns the sequence for `topic`. Never fails: unknown topics get a generic sequence.
    fn lookup(&self, topic: &str) -> StepSequence;

    /// Names of the topics with curated content, sorted.
    fn curated_topics(&self) -> Vec<String>;

    /// A curated topic that `topic` probably meant, if any.
    fn suggest(&self, topic: &str) -> Option<String>;

    /// Trims user input and looks it up, rejecting blank input.
    fn select(&self, input: &str) -> Result<StepSequence, CatalogError> {
        let topic = input.trim();
        if topic.is_empty() {
            return Err(CatalogError::BlankTopic);
        }
        Ok(self.lookup(topic))
    }

    fn is_curated(&self, topic: &str) -> bool {
        self.curated_topics().iter().any(|t| t == topic.trim())
    }
}

/// The generic sequence shown for topics without curated content.
pub fn generic_sequence(topic: &str) -> StepSequence {
    StepSequence::new(
        topic,
        vec![
            Step::glyph(
                "Step 1",
                format!(
                    "Welcome to the visualization of {}. We'll start with the idea behind it.",
                    topic
                ),
                "📘",
            ),
            Step::glyph(
                "Step 2",
                format!(
                    "Now let's look at how {} works, one piece at a time.",
                    topic
                ),
                "🔍",
            ),
            Step::glyph(
                "Step 3",
                format!(
                    "You've walked through {}. Try a few examples on your own to make it stick.",
                    topic
                ),
                "🎓",
            ),
        ],
    )
}

fn pythagorean_sequence() -> StepSequence {
    StepSequence::new(
        PYTHAGOREAN_THEOREM,
        vec![
            Step::clip(
                "Introduction",
                "Welcome to the visualization of the Pythagorean Theorem. This lesson guides you through each idea step by step.",
                "/videos/step1.mp4",
            ),
            Step::clip(
                "Basic Concept",
                "Draw a right triangle and label its sides a, b and c, where c is the hypotenuse opposite the right angle.",
                "/videos/step2.mp4",
            ),
            Step::clip(
                "Squares on the Sides",
                "Build a square on each side of the triangle. Each square's area is its side length squared.",
                "/videos/step3.mp4",
            ),
            Step::clip(
                "Visual Proof",
                "The area of the square on side c equals the sum of the areas of the squares on sides a and b: a² + b² = c².",
                "/videos/step4.mp4",
            ),
            Step::clip(
                "Example Application",
                "If a = 3 and b = 4, then c² = 9 + 16 = 25, so c = 5.",
                "/videos/step5.mp4",
            ),
            Step::clip(
                "Summary",
                "You've learned the complete theorem! Practice with different values to strengthen your understanding.",
                "/videos/step6.mp4",
            ),
        ],
    )
}

/// A catalog of hand-written sequences with a generic fallback.
#[derive(Debug, Clone, Default)]
pub struct CuratedCatalog {
    curated: HashMap<String, StepSequence>,
}

impl CuratedCatalog {
    /// An empty catalog: every topic gets the generic sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog shipped with the application.
    pub fn builtin() -> Self {
        Self::new().with_sequence(pythagorean_sequence())
    }

    /// Adds or replaces the curated sequence for `sequence.topic()`.
    pub fn with_sequence(mut self, sequence: StepSequence) -> Self {
        self.insert(sequence);
        self
    }

    pub fn insert(&mut self, sequence: StepSequence) {
        debug!(topic = %sequence.topic(), steps = sequence.len(), "Registering curated sequence");
        self.curated.insert(sequence.topic().to_string(), sequence);
    }

    /// Adds every curated sequence found in `dir`.
    pub fn extend_from_dir(&mut self, dir: &Path) -> Result<usize> {
        let sequences = load_curated_dir(dir)?;
        let count = sequences.len();
        for sequence in sequences {
            self.insert(sequence);
        }
        info!(count, dir = %dir.display(), "Loaded curated sequences");
        Ok(count)
    }
}

impl TopicCatalog for CuratedCatalog {
    fn lookup(&self, topic: &str) -> StepSequence {
        match self.curated.get(topic) {
            Some(sequence) => sequence.clone(),
            None => generic_sequence(topic),
        }
    }

    fn curated_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.curated.keys().cloned().collect();
        topics.sort();
        topics
    }

    fn suggest(&self, topic: &str) -> Option<String> {
        let pattern = topic.trim();
        if pattern.chars().count() < MIN_SUGGESTION_LEN || self.curated.contains_key(pattern) {
            return None;
        }
        let matcher = SkimMatcherV2::default();
        self.curated
            .keys()
            .filter_map(|name| matcher.fuzzy_match(name, pattern).map(|score| (score, name)))
            .max_by(|(a, name_a), (b, name_b)| a.cmp(b).then_with(|| name_b.cmp(name_a)))
            .map(|(_, name)| name.clone())
    }
}

/// Reads every `*.json` file in `dir` as a validated [`StepSequence`].
pub fn load_curated_dir(dir: &Path) -> Result<Vec<StepSequence>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read catalog directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let sequence: StepSequence = serde_json::from_str(&content)
                .with_context(|| format!("Invalid sequence file {}", path.display()))?;
            sequence
                .validate()
                .with_context(|| format!("Invalid sequence in {}", path.display()))?;
            Ok(sequence)
        })
        .collect()
}
