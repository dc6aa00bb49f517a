pub mod enrichment;
pub mod mood_log;
pub mod recommender;
