use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use driftlane_api::api::{create_router, AppState};
use driftlane_api::catalog::Catalog;
use driftlane_api::config::Config;
use driftlane_api::services::enrichment::{ImageEnricher, ImageSearchClient, WikipediaClient};
use driftlane_api::services::mood_log::MoodLog;
use driftlane_api::services::recommender::Recommender;
use driftlane_api::similarity::SimilarityIndex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("driftlane_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let catalog = Arc::new(Catalog::load(Path::new(&config.dataset_path))?);
    let index = Arc::new(SimilarityIndex::build(&catalog));

    let timeout = Duration::from_secs(config.provider_timeout_secs);
    let wikipedia = Arc::new(WikipediaClient::new(
        config.wikipedia_api_url.clone(),
        timeout,
    ));
    let image_search = Arc::new(ImageSearchClient::new(
        config.image_search_api_url.clone(),
        config.image_search_api_key.clone(),
        timeout,
    ));
    let enricher = Arc::new(ImageEnricher::new(
        wikipedia,
        image_search,
        config.enrichment_mode(),
    ));

    let mood_log = Arc::new(MoodLog::load(PathBuf::from(&config.mood_log_path)));

    let recommender = Arc::new(Recommender::new(catalog, index, enricher, mood_log));
    let app = create_router(AppState::new(recommender), &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(host = %config.host, port = config.port, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
