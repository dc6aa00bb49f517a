use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::{AppError, AppResult};
use crate::models::{DestinationRecord, Recommendation, RecommendationQuery};
use crate::services::enrichment::ImageEnricher;
use crate::services::mood_log::MoodLog;
use crate::similarity::SimilarityIndex;

/// Candidates pulled from the similarity index per query.
pub const CANDIDATE_POOL: usize = 30;

/// Target number of recommendations per response.
pub const TARGET_RESULTS: usize = 15;

/// Orchestrates the recommendation pipeline: telemetry, retrieval,
/// constraint filtering with relaxation, batch image enrichment, and the
/// final budget-ascending sort.
pub struct Recommender {
    catalog: Arc<Catalog>,
    index: Arc<SimilarityIndex>,
    enricher: Arc<ImageEnricher>,
    mood_log: Arc<MoodLog>,
}

impl Recommender {
    pub fn new(
        catalog: Arc<Catalog>,
        index: Arc<SimilarityIndex>,
        enricher: Arc<ImageEnricher>,
        mood_log: Arc<MoodLog>,
    ) -> Self {
        Self {
            catalog,
            index,
            enricher,
            mood_log,
        }
    }

    pub async fn recommend(&self, query: &RecommendationQuery) -> AppResult<Vec<Recommendation>> {
        // Telemetry first; a failed write never blocks the pipeline.
        self.mood_log.record(&query.mood).await;

        if self.catalog.is_empty() {
            return Err(AppError::Retrieval(
                "Destination catalog is empty".to_string(),
            ));
        }

        let candidate_ids = self.index.nearest(&query.mood, CANDIDATE_POOL);
        let candidates: Vec<&DestinationRecord> = candidate_ids
            .iter()
            .filter_map(|&id| self.catalog.get(id))
            .collect();

        let selected = select_candidates(&candidates, query);

        tracing::info!(
            mood = %query.mood,
            candidates = candidates.len(),
            selected = selected.len(),
            "Candidates selected"
        );

        let targets: Vec<(String, String)> = selected
            .iter()
            .map(|record| {
                (
                    record.base_destination.clone(),
                    record.validated_state.clone(),
                )
            })
            .collect();
        let image_slots = self.enricher.enrich_batch(targets).await;

        let mut recommendations = Vec::with_capacity(selected.len());
        for (record, slot) in selected.iter().zip(image_slots) {
            match slot {
                Some(images) => recommendations.push(Recommendation::from_record(record, images)),
                None => {
                    tracing::warn!(title = %record.title, "Dropping candidate after enrichment failure");
                }
            }
        }

        // Stable sort: equal budgets keep selection order.
        recommendations.sort_by_key(|recommendation| recommendation.avg_budget_per_day_inr);

        Ok(recommendations)
    }
}

/// Applies the strict constraints, then relaxes the group constraint if the
/// target count was not met.
///
/// The strict pass keeps the similarity ordering and takes the first
/// `TARGET_RESULTS` matches. The relaxation pass re-walks the original
/// candidate list, skipping already-selected records and dropping only the
/// group constraint; type and budget stay strict. There are no further
/// relaxation tiers: fewer than the target is a valid outcome.
fn select_candidates<'a>(
    candidates: &[&'a DestinationRecord],
    query: &RecommendationQuery,
) -> Vec<&'a DestinationRecord> {
    let mut selected: Vec<&DestinationRecord> = candidates
        .iter()
        .copied()
        .filter(|record| {
            matches_group(record, query)
                && matches_type(record, query)
                && within_budget(record, query)
        })
        .take(TARGET_RESULTS)
        .collect();

    if selected.len() < TARGET_RESULTS {
        let mut chosen: HashSet<usize> = selected.iter().map(|record| record.id).collect();
        for record in candidates.iter().copied() {
            if selected.len() >= TARGET_RESULTS {
                break;
            }
            if chosen.contains(&record.id) {
                continue;
            }
            if matches_type(record, query) && within_budget(record, query) {
                chosen.insert(record.id);
                selected.push(record);
            }
        }
    }

    selected
}

/// One-directional substring match against the raw group field. A short
/// query can match inside a longer group name; that is the documented
/// matching behavior, not an oversight.
fn matches_group(record: &DestinationRecord, query: &RecommendationQuery) -> bool {
    record.ideal_group.to_lowercase().contains(&query.group)
}

fn matches_type(record: &DestinationRecord, query: &RecommendationQuery) -> bool {
    record.travel_type.to_lowercase().contains(&query.travel_type)
}

fn within_budget(record: &DestinationRecord, query: &RecommendationQuery) -> bool {
    record.budget_per_day <= query.budget
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_BUDGET_CEILING;

    fn record(
        id: usize,
        title: &str,
        travel_type: &str,
        ideal_group: &str,
        budget: u32,
    ) -> DestinationRecord {
        DestinationRecord {
            id,
            title: title.to_string(),
            state: "Test State".to_string(),
            travel_type: travel_type.to_string(),
            ideal_group: ideal_group.to_string(),
            mood_tags: "adventure".to_string(),
            budget_per_day: budget,
            best_months: "Any".to_string(),
            sample_itinerary: String::new(),
            base_destination: title.to_string(),
            validated_state: "Test State".to_string(),
        }
    }

    fn query(budget: u32, group: &str, travel_type: &str) -> RecommendationQuery {
        RecommendationQuery::new(
            "adventure".to_string(),
            budget,
            group.to_string(),
            travel_type.to_string(),
        )
    }

    #[test]
    fn test_strict_pass_keeps_similarity_order() {
        let records: Vec<DestinationRecord> = (0..5)
            .map(|n| record(n, &format!("Trek {}", n), "trek", "friends", 1000 + n as u32))
            .collect();
        let candidates: Vec<&DestinationRecord> = records.iter().collect();

        let selected = select_candidates(&candidates, &query(2000, "friends", "trek"));
        let ids: Vec<usize> = selected.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_strict_pass_enforces_all_constraints() {
        let records = vec![
            record(0, "Good", "trek", "friends", 1500),
            record(1, "Wrong Type", "beach", "friends", 1500),
            record(2, "Over Budget", "trek", "friends", 5000),
            record(3, "Wrong Group", "trek", "solo", 1500),
        ];
        let candidates: Vec<&DestinationRecord> = records.iter().collect();

        // Small candidate pool: relaxation still enforces type and budget.
        let selected = select_candidates(&candidates, &query(2000, "friends", "trek"));
        let ids: Vec<usize> = selected.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 3]);
    }

    #[test]
    fn test_relaxation_fills_to_target_without_duplicates() {
        // 8 strict matches, 12 more that only fail the group constraint.
        let mut records = Vec::new();
        for n in 0..8 {
            records.push(record(n, &format!("Strict {}", n), "trek", "friends", 1000));
        }
        for n in 8..20 {
            records.push(record(n, &format!("Relaxed {}", n), "trek", "solo", 1000));
        }
        let candidates: Vec<&DestinationRecord> = records.iter().collect();

        let selected = select_candidates(&candidates, &query(2000, "friends", "trek"));
        assert_eq!(selected.len(), TARGET_RESULTS);

        let distinct: HashSet<usize> = selected.iter().map(|r| r.id).collect();
        assert_eq!(distinct.len(), TARGET_RESULTS);

        let strict_count = selected
            .iter()
            .filter(|r| r.ideal_group.contains("friends"))
            .count();
        assert_eq!(strict_count, 8);
    }

    #[test]
    fn test_strict_pass_caps_at_target() {
        let records: Vec<DestinationRecord> = (0..20)
            .map(|n| record(n, &format!("Trek {}", n), "trek", "friends", 1000))
            .collect();
        let candidates: Vec<&DestinationRecord> = records.iter().collect();

        let selected = select_candidates(&candidates, &query(2000, "friends", "trek"));
        assert_eq!(selected.len(), TARGET_RESULTS);
        assert_eq!(selected[0].id, 0);
        assert_eq!(selected[14].id, 14);
    }

    #[test]
    fn test_returns_fewer_when_candidates_exhausted() {
        let records = vec![
            record(0, "Only Trek", "trek", "friends", 1000),
            record(1, "Beach", "beach", "friends", 1000),
        ];
        let candidates: Vec<&DestinationRecord> = records.iter().collect();

        let selected = select_candidates(&candidates, &query(2000, "", "trek"));
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_empty_group_and_type_match_everything() {
        let records = vec![
            record(0, "A", "trek", "friends", 1000),
            record(1, "B", "beach", "couples", 2000),
        ];
        let candidates: Vec<&DestinationRecord> = records.iter().collect();

        let selected = select_candidates(&candidates, &query(DEFAULT_BUDGET_CEILING, "", ""));
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_group_match_is_substring_containment() {
        let records = vec![record(0, "A", "trek", "friends, family", 1000)];
        let candidates: Vec<&DestinationRecord> = records.iter().collect();

        // "friend" is a substring of the raw group field.
        let selected = select_candidates(&candidates, &query(2000, "friend", "trek"));
        assert_eq!(selected.len(), 1);
    }
}
