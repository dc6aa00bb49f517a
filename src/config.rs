use serde::Deserialize;

use crate::services::enrichment::EnrichmentMode;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the destination dataset (JSON array of catalog entries)
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// Path to the append-only mood telemetry log
    #[serde(default = "default_mood_log_path")]
    pub mood_log_path: String,

    /// Wikipedia API base URL (title search and page images)
    #[serde(default = "default_wikipedia_api_url")]
    pub wikipedia_api_url: String,

    /// Secondary image search API base URL
    #[serde(default = "default_image_search_api_url")]
    pub image_search_api_url: String,

    /// Secondary image search API key
    #[serde(default)]
    pub image_search_api_key: String,

    /// Origins allowed by CORS, comma-separated
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Run batch image enrichment on a bounded worker pool rather than
    /// sequentially. Results are identical either way.
    #[serde(default = "default_parallel_enrichment")]
    pub parallel_enrichment: bool,

    /// Worker pool size for parallel enrichment
    #[serde(default = "default_enrichment_workers")]
    pub enrichment_workers: usize,

    /// Per-call timeout for external provider requests, in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_dataset_path() -> String {
    "data/destinations.json".to_string()
}

fn default_mood_log_path() -> String {
    "data/user_moods.csv".to_string()
}

fn default_wikipedia_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_image_search_api_url() -> String {
    "https://travel-image-search.p.rapidapi.com".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "https://driftlane.vercel.app".to_string(),
    ]
}

fn default_parallel_enrichment() -> bool {
    true
}

fn default_enrichment_workers() -> usize {
    5
}

fn default_provider_timeout_secs() -> u64 {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Enrichment fan-out mode derived from the configuration flag
    pub fn enrichment_mode(&self) -> EnrichmentMode {
        if self.parallel_enrichment {
            EnrichmentMode::Bounded(self.enrichment_workers.max(1))
        } else {
            EnrichmentMode::Sequential
        }
    }
}
