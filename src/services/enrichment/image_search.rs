/// Secondary image search provider (via RapidAPI)
///
/// Third enrichment tier: a plain keyword image search used when the
/// resolved place page has no usable original image.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::enrichment::ImageSearch;

#[derive(Debug, Deserialize)]
struct ImageSearchResponse {
    #[serde(default)]
    results: Vec<ImageResult>,
}

#[derive(Debug, Deserialize)]
struct ImageResult {
    url: String,
}

#[derive(Clone)]
pub struct ImageSearchClient {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl ImageSearchClient {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl ImageSearch for ImageSearchClient {
    async fn search_images(&self, query: &str) -> AppResult<Vec<String>> {
        let url = format!("{}/search", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .timeout(self.timeout)
            .header("X-RapidAPI-Key", &self.api_key)
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Image search API returned status {}: {}",
                status, body
            )));
        }

        let results: ImageSearchResponse = response.json().await?;
        let urls: Vec<String> = results.results.into_iter().map(|r| r.url).collect();

        tracing::debug!(query = %query, results = urls.len(), "Image search completed");

        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "results": [
                {"url": "https://img.example/a.jpg", "width": 1200},
                {"url": "https://img.example/b.jpg"}
            ],
            "total": 2
        }"#;

        let response: ImageSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].url, "https://img.example/a.jpg");
    }

    #[test]
    fn test_empty_response_deserialization() {
        let response: ImageSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
    }
}
