use std::sync::Arc;

use crate::services::recommender::Recommender;

/// Shared application state
///
/// Everything in here is immutable after startup (the enrichment cache
/// synchronizes internally), so handlers clone cheaply via `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
}

impl AppState {
    pub fn new(recommender: Arc<Recommender>) -> Self {
        Self { recommender }
    }
}
