//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the topic catalog
//! and configuration shared by every handler and viewer session.

use crate::config::Config;
use std::sync::Arc;
use visualmath_core::TopicCatalog;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn TopicCatalog>,
    pub config: Arc<Config>,
}
