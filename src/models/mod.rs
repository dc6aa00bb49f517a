use serde::{Deserialize, Serialize};

/// Budget ceiling applied when a query omits the budget field.
pub const DEFAULT_BUDGET_CEILING: u32 = 99_999;

/// One destination from the catalog. Loaded once at startup and shared
/// read-only across requests.
///
/// The `ideal_group`, `mood_tags` and `sample_itinerary` fields keep the raw
/// comma-separated dataset strings: constraint matching runs substring checks
/// against the raw field, while responses expose the decomposed lists via the
/// accessor methods below.
#[derive(Debug, Clone)]
pub struct DestinationRecord {
    /// Position of the record in the catalog; doubles as the similarity
    /// index document id.
    pub id: usize,
    pub title: String,
    pub state: String,
    pub travel_type: String,
    pub ideal_group: String,
    pub mood_tags: String,
    pub budget_per_day: u32,
    pub best_months: String,
    pub sample_itinerary: String,
    /// Name used for image lookups; falls back to `title` in the dataset.
    pub base_destination: String,
    /// State used for image lookups; falls back to `state` in the dataset.
    pub validated_state: String,
}

impl DestinationRecord {
    pub fn groups(&self) -> Vec<String> {
        split_list(&self.ideal_group)
    }

    pub fn tags(&self) -> Vec<String> {
        split_list(&self.mood_tags)
    }

    pub fn itinerary_steps(&self) -> Vec<String> {
        split_list(&self.sample_itinerary)
    }
}

/// Normalized per-request query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    pub mood: String,
    pub budget: u32,
    pub group: String,
    pub travel_type: String,
}

impl RecommendationQuery {
    /// Normalizes raw query input: mood, group and type are trimmed and
    /// lowercased; empty group/type match every record.
    pub fn new(mood: String, budget: u32, group: String, travel_type: String) -> Self {
        Self {
            mood: mood.trim().to_lowercase(),
            budget,
            group: group.trim().to_lowercase(),
            travel_type: travel_type.trim().to_lowercase(),
        }
    }
}

/// Where an image reference was resolved from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Wikipedia,
    ImageSearch,
    Placeholder,
}

/// A single resolved image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub source: ImageSource,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, source: ImageSource) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }
}

/// One recommendation returned to the client. Derived from a
/// `DestinationRecord` plus its enrichment; the source record never mutates.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub state: String,
    #[serde(rename = "type")]
    pub travel_type: String,
    pub groups: Vec<String>,
    pub mood_tags: Vec<String>,
    pub avg_budget_per_day_inr: u32,
    pub best_months: String,
    pub sample_itinerary: Vec<String>,
    pub images: Vec<ImageRef>,
}

impl Recommendation {
    pub fn from_record(record: &DestinationRecord, images: Vec<ImageRef>) -> Self {
        Self {
            title: record.title.clone(),
            state: record.state.clone(),
            travel_type: display_case(&record.travel_type),
            groups: record.groups(),
            mood_tags: record.tags(),
            avg_budget_per_day_inr: record.budget_per_day,
            best_months: record.best_months.clone(),
            sample_itinerary: record.itinerary_steps(),
            images,
        }
    }
}

/// Splits a comma-separated dataset field into trimmed, non-empty parts.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Display casing for type categories: first character uppercased, the rest
/// lowercased ("trek" -> "Trek", "ROAD TRIP" -> "Road trip").
pub fn display_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
