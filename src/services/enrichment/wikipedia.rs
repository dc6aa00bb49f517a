/// Wikipedia provider
///
/// Backs the first two enrichment tiers with the MediaWiki action API:
/// `list=search` for place title resolution and `prop=pageimages` with
/// `piprop=original` for the primary image.
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::enrichment::{PlaceHit, PlaceLookup};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchBody>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    search: Vec<RawSearchHit>,
}

#[derive(Debug, Deserialize)]
struct RawSearchHit {
    title: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct PageImagesResponse {
    #[serde(default)]
    query: Option<PagesBody>,
}

#[derive(Debug, Deserialize)]
struct PagesBody {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    original: Option<OriginalImage>,
}

#[derive(Debug, Deserialize)]
struct OriginalImage {
    source: String,
}

fn hits_from_response(response: SearchResponse) -> Vec<PlaceHit> {
    response
        .query
        .map(|body| {
            body.search
                .into_iter()
                .map(|raw| PlaceHit {
                    title: raw.title,
                    snippet: raw.snippet,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn first_original_image(response: PageImagesResponse) -> Option<String> {
    response
        .query?
        .pages
        .into_values()
        .find_map(|page| page.original.map(|image| image.source))
}

#[derive(Clone)]
pub struct WikipediaClient {
    http_client: HttpClient,
    api_url: String,
    timeout: Duration,
}

impl WikipediaClient {
    pub fn new(api_url: String, timeout: Duration) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            timeout,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(&self.api_url)
            .timeout(self.timeout)
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Wikipedia API returned status {}",
                status
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl PlaceLookup for WikipediaClient {
    async fn search(&self, query: &str) -> AppResult<Vec<PlaceHit>> {
        let response: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
            ])
            .await?;

        let hits = hits_from_response(response);
        tracing::debug!(query = %query, hits = hits.len(), "Wikipedia place search completed");
        Ok(hits)
    }

    async fn original_image(&self, title: &str) -> AppResult<Option<String>> {
        let response: PageImagesResponse = self
            .get_json(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "pageimages"),
                ("titles", title),
                ("piprop", "original"),
            ])
            .await?;

        Ok(first_original_image(response))
    }
}
