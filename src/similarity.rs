use std::collections::{HashMap, HashSet};

use crate::catalog::Catalog;

/// In-memory similarity index over catalog mood tags.
///
/// Documents are TF-IDF vectors built from each record's mood tags; queries
/// are ranked by cosine similarity. Built once at startup and read-only
/// afterwards, so it is shared across requests without locking.
pub struct SimilarityIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    document_vectors: Vec<Vec<f32>>,
}

impl SimilarityIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let documents: Vec<Vec<String>> = catalog
            .records()
            .iter()
            .map(|record| tokenize(&record.mood_tags))
            .collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        for tokens in &documents {
            for token in tokens {
                let next_id = vocabulary.len();
                vocabulary.entry(token.clone()).or_insert(next_id);
            }
        }

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for tokens in &documents {
            let distinct: HashSet<&String> = tokens.iter().collect();
            for token in distinct {
                document_frequency[vocabulary[token]] += 1;
            }
        }

        // Smoothed idf, so terms present in every document still contribute.
        let total = documents.len() as f32;
        let idf: Vec<f32> = document_frequency
            .iter()
            .map(|&df| ((1.0 + total) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        let document_vectors = documents
            .iter()
            .map(|tokens| vectorize(tokens, &vocabulary, &idf))
            .collect();

        tracing::debug!(
            documents = documents.len(),
            vocabulary = vocabulary.len(),
            "Similarity index built"
        );

        Self {
            vocabulary,
            idf,
            document_vectors,
        }
    }

    /// Returns up to `k` catalog ids ordered by descending cosine similarity
    /// to the mood query. Ties keep catalog order, so results are
    /// deterministic even for queries with no known terms.
    pub fn nearest(&self, mood: &str, k: usize) -> Vec<usize> {
        let query_vector = vectorize(&tokenize(mood), &self.vocabulary, &self.idf);

        let mut scored: Vec<(usize, f32)> = self
            .document_vectors
            .iter()
            .enumerate()
            .map(|(id, document)| (id, dot(document, &query_vector)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored.into_iter().take(k).map(|(id, _)| id).collect()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn vectorize(tokens: &[String], vocabulary: &HashMap<String, usize>, idf: &[f32]) -> Vec<f32> {
    let mut vector = vec![0f32; vocabulary.len()];
    for token in tokens {
        if let Some(&index) = vocabulary.get(token) {
            vector[index] += 1.0;
        }
    }
    for (index, value) in vector.iter_mut().enumerate() {
        *value *= idf[index];
    }

    let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
