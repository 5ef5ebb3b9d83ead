//! Core of the step-by-step math visualizer.
//!
//! A topic is turned into a [`StepSequence`] by a [`TopicCatalog`], and a
//! [`StepSequenceViewer`] walks through it, asking a [`MediaPlayer`] to start
//! the clip of every step it lands on.

pub mod catalog;
pub mod error;
pub mod playback;
pub mod step;
pub mod viewer;

pub use catalog::{CuratedCatalog, TopicCatalog};
pub use error::{CatalogError, PlaybackError, ViewerError};
pub use playback::{MediaPlayer, PlayRequest, PlaybackOptions, PlaybackPhase, PlaybackStatus};
pub use step::{Media, Step, StepSequence};
pub use viewer::{NavigationPolicy, StepSequenceViewer, ViewerSnapshot, ViewerState};
