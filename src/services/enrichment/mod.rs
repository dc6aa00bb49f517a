use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, Semaphore};

use crate::error::AppResult;
use crate::models::{ImageRef, ImageSource};

pub mod image_search;
pub mod wikipedia;

pub use image_search::ImageSearchClient;
pub use wikipedia::WikipediaClient;

/// Served when every network tier comes back empty, and cached like any
/// other result so known-failing destinations stop hitting the network.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/6/65/No-Image-Placeholder.svg";

/// Cap on results taken from the secondary image search tier.
const MAX_SEARCH_IMAGES: usize = 4;

/// Snippet keywords that mark a search hit as an actual locality.
const LOCALITY_HINTS: [&str; 5] = ["village", "city", "town", "located in", "state of"];

/// One hit from the place search API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceHit {
    pub title: String,
    pub snippet: String,
}

/// Place title resolution and primary image lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Searches for place pages matching the query.
    async fn search(&self, query: &str) -> AppResult<Vec<PlaceHit>>;

    /// Fetches the page's single "original" image URL, if it has one.
    async fn original_image(&self, title: &str) -> AppResult<Option<String>>;
}

/// Secondary image search provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search_images(&self, query: &str) -> AppResult<Vec<String>>;
}

/// Fan-out policy for batch enrichment. Both modes must produce identical
/// results; the flag only trades latency for resource usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentMode {
    Sequential,
    Bounded(usize),
}

#[derive(Clone)]
struct CachedImages {
    images: Vec<ImageRef>,
    fetched_at: DateTime<Utc>,
}

/// Resolves destinations to image lists through a cache-first, three-tier
/// fallback chain.
///
/// The cache is process-wide and never evicted; growth is bounded by the
/// finite destination catalog. Two workers racing on the same uncached key
/// may both hit the network; the write lock makes each insert a whole-list
/// replacement, so readers never observe partial values. Clones share the
/// cache, so workers spawned from a clone still populate the same map.
#[derive(Clone)]
pub struct ImageEnricher {
    place_lookup: Arc<dyn PlaceLookup>,
    image_search: Arc<dyn ImageSearch>,
    cache: Arc<RwLock<HashMap<String, CachedImages>>>,
    mode: EnrichmentMode,
}

/// Cache key for one destination's enrichment entry.
pub fn cache_key(base_destination: &str, validated_state: &str) -> String {
    format!("{}-{}", base_destination, validated_state).to_lowercase()
}

/// Picks the place title to use for image lookup: the first hit that is not
/// a disambiguation page and whose snippet mentions a locality, else the
/// first hit, else the query itself.
fn select_place_title(query: &str, hits: &[PlaceHit]) -> String {
    for hit in hits {
        let title = hit.title.to_lowercase();
        let snippet = hit.snippet.to_lowercase();
        if title.contains("disambiguation") {
            continue;
        }
        if LOCALITY_HINTS.iter().any(|hint| snippet.contains(hint)) {
            return hit.title.clone();
        }
    }
    hits.first()
        .map(|hit| hit.title.clone())
        .unwrap_or_else(|| query.to_string())
}

impl ImageEnricher {
    pub fn new(
        place_lookup: Arc<dyn PlaceLookup>,
        image_search: Arc<dyn ImageSearch>,
        mode: EnrichmentMode,
    ) -> Self {
        Self {
            place_lookup,
            image_search,
            cache: Arc::new(RwLock::new(HashMap::new())),
            mode,
        }
    }

    /// Resolves images for one destination, cache-first.
    ///
    /// Never fails: every tier error is absorbed and the chain falls through
    /// to the placeholder. The resolved list (placeholder included) is cached
    /// before returning.
    pub async fn enrich(&self, base_destination: &str, validated_state: &str) -> Vec<ImageRef> {
        let key = cache_key(base_destination, validated_state);

        if let Some(entry) = self.cache.read().await.get(&key) {
            tracing::debug!(
                key = %key,
                age_secs = (Utc::now() - entry.fetched_at).num_seconds(),
                "Image cache hit"
            );
            return entry.images.clone();
        }

        let images = self.fetch_uncached(base_destination, validated_state).await;

        let mut cache = self.cache.write().await;
        cache.insert(
            key,
            CachedImages {
                images: images.clone(),
                fetched_at: Utc::now(),
            },
        );

        images
    }

    /// Runs the tier chain for an uncached destination.
    async fn fetch_uncached(&self, base_destination: &str, validated_state: &str) -> Vec<ImageRef> {
        let query = format!("{} {}", base_destination, validated_state);

        // Tier 1: resolve a usable page title; failures fall back to the
        // raw query string.
        let title = match self.place_lookup.search(&query).await {
            Ok(hits) => select_place_title(&query, &hits),
            Err(error) => {
                tracing::warn!(query = %query, error = %error, "Place search failed");
                query.clone()
            }
        };

        // Tier 2: the page's original image.
        match self.place_lookup.original_image(&title).await {
            Ok(Some(url)) => {
                return vec![ImageRef::new(url, ImageSource::Wikipedia)];
            }
            Ok(None) => {
                tracing::debug!(title = %title, "No original image on resolved page");
            }
            Err(error) => {
                tracing::warn!(title = %title, error = %error, "Primary image fetch failed");
            }
        }

        // Tier 3: secondary image search on the raw query.
        match self.image_search.search_images(&query).await {
            Ok(urls) if !urls.is_empty() => {
                return urls
                    .into_iter()
                    .take(MAX_SEARCH_IMAGES)
                    .map(|url| ImageRef::new(url, ImageSource::ImageSearch))
                    .collect();
            }
            Ok(_) => {
                tracing::debug!(query = %query, "Secondary image search returned nothing");
            }
            Err(error) => {
                tracing::warn!(query = %query, error = %error, "Secondary image search failed");
            }
        }

        tracing::debug!(query = %query, "All enrichment tiers empty, using placeholder");
        vec![ImageRef::new(PLACEHOLDER_IMAGE_URL, ImageSource::Placeholder)]
    }

    /// Enriches a batch of destinations, either sequentially or on a bounded
    /// worker pool depending on the configured mode.
    ///
    /// Results are keyed by input position, so the output order matches the
    /// input order regardless of task completion order. A slot is `None` only
    /// if its worker crashed; callers drop that candidate and continue.
    pub async fn enrich_batch(&self, targets: Vec<(String, String)>) -> Vec<Option<Vec<ImageRef>>> {
        match self.mode {
            EnrichmentMode::Sequential => {
                let mut results = Vec::with_capacity(targets.len());
                for (base_destination, validated_state) in &targets {
                    results.push(Some(self.enrich(base_destination, validated_state).await));
                }
                results
            }
            EnrichmentMode::Bounded(workers) => {
                let semaphore = Arc::new(Semaphore::new(workers));
                let mut tasks = Vec::with_capacity(targets.len());

                for (position, (base_destination, validated_state)) in
                    targets.into_iter().enumerate()
                {
                    let enricher = self.clone();
                    let semaphore = Arc::clone(&semaphore);
                    tasks.push(tokio::spawn(async move {
                        // The semaphore is never closed, so the permit is
                        // always granted.
                        let _permit = semaphore.acquire_owned().await.ok();
                        (
                            position,
                            enricher.enrich(&base_destination, &validated_state).await,
                        )
                    }));
                }

                let mut results: Vec<Option<Vec<ImageRef>>> = vec![None; tasks.len()];
                for task in tasks {
                    match task.await {
                        Ok((position, images)) => results[position] = Some(images),
                        Err(error) => {
                            tracing::error!(error = %error, "Enrichment worker crashed");
                        }
                    }
                }
                results
            }
        }
    }
}
