use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::models::DestinationRecord;

/// Raw dataset entry as it appears in the JSON dataset. Optional fields are
/// resolved to documented defaults when converted into a record:
/// `base_destination` falls back to `destination`, `validated_state` to
/// `state`, `best_months` to "Any".
#[derive(Debug, Deserialize)]
struct RawDestination {
    destination: String,
    state: String,
    #[serde(rename = "type")]
    travel_type: String,
    ideal_group: String,
    mood_tags: String,
    avg_budget_per_day_inr: u32,
    #[serde(default)]
    best_months: Option<String>,
    #[serde(default)]
    sample_itinerary: String,
    #[serde(default)]
    base_destination: Option<String>,
    #[serde(default)]
    validated_state: Option<String>,
}

impl RawDestination {
    fn into_record(self, id: usize) -> DestinationRecord {
        let base_destination = self
            .base_destination
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.destination.clone());
        let validated_state = self
            .validated_state
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.state.clone());
        let best_months = self
            .best_months
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "Any".to_string());

        DestinationRecord {
            id,
            title: self.destination,
            state: self.state,
            travel_type: self.travel_type,
            ideal_group: self.ideal_group,
            mood_tags: self.mood_tags,
            budget_per_day: self.avg_budget_per_day_inr,
            best_months,
            sample_itinerary: self.sample_itinerary,
            base_destination,
            validated_state,
        }
    }
}

/// The destination catalog, loaded once at startup and immutable afterwards.
pub struct Catalog {
    records: Vec<DestinationRecord>,
}

impl Catalog {
    /// Loads the catalog from a JSON dataset.
    ///
    /// Malformed entries are skipped with a warning rather than failing the
    /// whole load; an empty resulting catalog is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset at {}", path.display()))?;
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&raw).context("Dataset is not a JSON array")?;

        let total = entries.len();
        let mut records = Vec::with_capacity(total);
        for (position, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<RawDestination>(entry) {
                Ok(raw_destination) => {
                    records.push(raw_destination.into_record(records.len()));
                }
                Err(error) => {
                    tracing::warn!(position, error = %error, "Skipping malformed dataset entry");
                }
            }
        }

        if records.is_empty() {
            anyhow::bail!("Destination dataset at {} has no usable entries", path.display());
        }

        tracing::info!(
            destinations = records.len(),
            skipped = total - records.len(),
            "Destination catalog loaded"
        );

        Ok(Self { records })
    }

    /// Builds a catalog from already-constructed records, re-assigning ids so
    /// they match catalog positions.
    pub fn from_records(mut records: Vec<DestinationRecord>) -> Self {
        for (position, record) in records.iter_mut().enumerate() {
            record.id = position;
        }
        Self { records }
    }

    pub fn get(&self, id: usize) -> Option<&DestinationRecord> {
        self.records.get(id)
    }

    pub fn records(&self) -> &[DestinationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_dataset(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_applies_default_resolution() {
        let file = write_dataset(
            r#"[{
                "destination": "Gokarna",
                "state": "Karnataka",
                "type": "beach",
                "ideal_group": "friends, couples",
                "mood_tags": "relax, coastal",
                "avg_budget_per_day_inr": 1500,
                "sample_itinerary": "Om Beach, Kudle Beach"
            }]"#,
        );

        let catalog = Catalog::load(file.path()).unwrap();
        let record = catalog.get(0).unwrap();

        assert_eq!(record.base_destination, "Gokarna");
        assert_eq!(record.validated_state, "Karnataka");
        assert_eq!(record.best_months, "Any");
    }

    #[test]
    fn test_load_keeps_explicit_lookup_fields() {
        let file = write_dataset(
            r#"[{
                "destination": "Munnar Tea Trails",
                "state": "Kerala",
                "type": "nature",
                "ideal_group": "family",
                "mood_tags": "calm, green",
                "avg_budget_per_day_inr": 2200,
                "best_months": "September-March",
                "sample_itinerary": "Eravikulam, Top Station",
                "base_destination": "Munnar",
                "validated_state": "Kerala"
            }]"#,
        );

        let catalog = Catalog::load(file.path()).unwrap();
        let record = catalog.get(0).unwrap();

        assert_eq!(record.base_destination, "Munnar");
        assert_eq!(record.best_months, "September-March");
    }

    #[test]
    fn test_load_skips_malformed_entries() {
        let file = write_dataset(
            r#"[
                {
                    "destination": "Rishikesh",
                    "state": "Uttarakhand",
                    "type": "adventure",
                    "ideal_group": "friends",
                    "mood_tags": "rafting, spiritual",
                    "avg_budget_per_day_inr": 1200,
                    "sample_itinerary": "Laxman Jhula, Rafting"
                },
                {
                    "destination": "Broken Entry",
                    "state": "Nowhere",
                    "type": "trek",
                    "ideal_group": "solo",
                    "mood_tags": "lost",
                    "avg_budget_per_day_inr": "not-a-number",
                    "sample_itinerary": ""
                }
            ]"#,
        );

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().title, "Rishikesh");
    }

    #[test]
    fn test_load_rejects_empty_dataset() {
        let file = write_dataset("[]");
        assert!(Catalog::load(file.path()).is_err());
    }

    #[test]
    fn test_from_records_reassigns_ids() {
        let record = DestinationRecord {
            id: 42,
            title: "Hampi".to_string(),
            state: "Karnataka".to_string(),
            travel_type: "heritage".to_string(),
            ideal_group: "friends".to_string(),
            mood_tags: "history".to_string(),
            budget_per_day: 900,
            best_months: "Any".to_string(),
            sample_itinerary: "Virupaksha Temple".to_string(),
            base_destination: "Hampi".to_string(),
            validated_state: "Karnataka".to_string(),
        };

        let catalog = Catalog::from_records(vec![record]);
        assert_eq!(catalog.get(0).unwrap().id, 0);
    }
}
