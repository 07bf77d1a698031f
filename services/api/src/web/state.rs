//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use praxis_core::ports::{
    ClassificationService, DatabaseService, EmbeddingService, PatternDetectionService,
    TranscriptionService,
};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// The store handle and the AI adapters live here for the process lifetime;
/// handlers borrow them per request and never own a connection themselves.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub classifier: Arc<dyn ClassificationService>,
    pub embedder: Arc<dyn EmbeddingService>,
    pub detector: Arc<dyn PatternDetectionService>,
    pub transcriber: Arc<dyn TranscriptionService>,
}
