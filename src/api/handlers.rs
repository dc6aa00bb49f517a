use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::error::AppResult;
use crate::models::{Recommendation, RecommendationQuery, DEFAULT_BUDGET_CEILING};

use super::AppState;

/// Inbound recommendation request. Absent fields take the documented
/// defaults: an unbounded budget sentinel and match-everything filters.
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub mood: String,
    #[serde(default = "default_budget")]
    pub budget: u32,
    #[serde(default)]
    pub group: String,
    #[serde(rename = "type", default)]
    pub travel_type: String,
}

fn default_budget() -> u32 {
    DEFAULT_BUDGET_CEILING
}

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Recommendation endpoint: returns the sorted recommendation list, or a
/// single `{"error": ...}` object if the pipeline fails.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let query = RecommendationQuery::new(
        request.mood,
        request.budget,
        request.group,
        request.travel_type,
    );
    let recommendations = state.recommender.recommend(&query).await?;
    Ok(Json(recommendations))
}
