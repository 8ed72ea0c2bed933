use std::sync::Arc;

use crate::config::Config;
use crate::extraction::{DocumentExtractor, TextExtractor};
use crate::recommender::category::{CategoryPredictor, KeywordCategoryPredictor};
use crate::recommender::scoring::{KeywordRecommender, Recommender};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Document-to-text extraction. Called from `spawn_blocking` only.
    pub extractor: Arc<dyn TextExtractor>,
    /// Pluggable resume categorizer. Default: KeywordCategoryPredictor.
    pub predictor: Arc<dyn CategoryPredictor>,
    /// Pluggable match scorer. Default: KeywordRecommender.
    pub recommender: Arc<dyn Recommender>,
}

impl AppState {
    /// State wired with the keyword-based collaborators.
    pub fn with_defaults(config: Config) -> Self {
        Self {
            config,
            extractor: Arc::new(DocumentExtractor),
            predictor: Arc::new(KeywordCategoryPredictor),
            recommender: Arc::new(KeywordRecommender),
        }
    }
}
