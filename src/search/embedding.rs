//! Embedding-similarity scoring.
//!
//! The embedding model itself is an opaque collaborator behind
//! [`EmbeddingProvider`]; this module only owns the ranking arithmetic and a
//! cache of description vectors so a provider is asked about each
//! description at most once.

use std::hash::{Hash, Hasher};

use ahash::{AHashMap, AHasher};
use anyhow::anyhow;
use tracing::debug;

use crate::{
    data::SceneDataset,
    search::{Result, ResultSet, ScoredRecord, SearchError, query_terms, sort_descending},
};

/// An external embedding model.
///
/// Implementations must be deterministic for a given text and model version;
/// beyond that the model is a black box. Failures are reported as opaque
/// errors and handled by the caller (logged, then fallen back on).
pub trait EmbeddingProvider {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Description vectors keyed by a content hash of the text, so cache entries
/// survive any reordering of the dataset.
#[derive(Default)]
pub(crate) struct EmbeddingCache {
    vectors: AHashMap<u64, Vec<f32>>,
}

impl EmbeddingCache {
    fn get_or_embed(&mut self, provider: &dyn EmbeddingProvider, text: &str) -> Result<&[f32]> {
        let key = content_key(text);
        if !self.vectors.contains_key(&key) {
            let vector = provider
                .embed(text)
                .map_err(SearchError::EmbeddingProvider)?;
            self.vectors.insert(key, vector);
        }
        Ok(self.vectors[&key].as_slice())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.vectors.len()
    }
}

fn content_key(text: &str) -> u64 {
    let mut hasher = AHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Cosine similarity of two vectors, `dot(a,b) / (|a| * |b|)`.
///
/// Returns `0.0` when either vector has zero magnitude; the division is
/// never taken on a zero denominator.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    let mag_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|y| f64::from(*y).powi(2)).sum::<f64>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

/// Rank records by cosine similarity between the query embedding and each
/// description embedding, keeping matches at or above `threshold`.
pub(crate) fn rank(
    query: &str,
    dataset: &SceneDataset,
    provider: &dyn EmbeddingProvider,
    threshold: f64,
    cache: &mut EmbeddingCache,
) -> Result<ResultSet> {
    // Blank queries are rejected before touching the provider.
    query_terms(query)?;

    let query_vector = provider
        .embed(&query.to_lowercase())
        .map_err(SearchError::EmbeddingProvider)?;

    let mut results = ResultSet::new();
    for record in dataset.records() {
        let vector = cache.get_or_embed(provider, &record.description_from_model)?;
        if vector.len() != query_vector.len() {
            return Err(SearchError::EmbeddingProvider(anyhow!(
                "embedding dimension mismatch: query {} vs record {}",
                query_vector.len(),
                vector.len()
            )));
        }
        let similarity = cosine_similarity(&query_vector, vector);
        if similarity >= threshold {
            results.push(ScoredRecord {
                record: record.clone(),
                relevance: similarity,
            });
        }
    }

    sort_descending(&mut results);
    debug!(
        query,
        threshold,
        matched = results.len(),
        "embedding ranking complete"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;
    use crate::data::SceneRecord;

    /// Deterministic toy provider: projects text onto fixed keyword axes.
    struct KeywordProvider;

    impl EmbeddingProvider for KeywordProvider {
        fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
            let axes = ["bridge", "river", "house"];
            Ok(axes
                .iter()
                .map(|axis| text.matches(axis).count() as f32)
                .collect())
        }
    }

    struct FailingProvider;

    impl EmbeddingProvider for FailingProvider {
        fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            Err(anyhow!("model unavailable"))
        }
    }

    #[test]
    fn test_cosine_of_self_is_one() {
        let v = [0.3_f32, -1.2, 4.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_zero_magnitude_is_zero() {
        let zero = [0.0_f32; 3];
        let v = [1.0_f32, 2.0, 3.0];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_cosine_orthogonal_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_rank_filters_by_threshold() {
        let dataset = SceneDataset::new(vec![
            SceneRecord::new("bridge over the river", json!("(0,0,1,1)")),
            SceneRecord::new("house", json!("(2,2,3,3)")),
        ]);
        let mut cache = EmbeddingCache::default();
        let results = rank("bridge", &dataset, &KeywordProvider, 0.3, &mut cache).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].record.description_from_model,
            "bridge over the river"
        );
        assert!(results[0].relevance > 0.3);
    }

    #[test]
    fn test_provider_failure_surfaces() {
        let dataset = SceneDataset::new(vec![SceneRecord::new("bridge", json!("(0,0,1,1)"))]);
        let mut cache = EmbeddingCache::default();
        let result = rank("bridge", &dataset, &FailingProvider, 0.3, &mut cache);
        assert!(matches!(result, Err(SearchError::EmbeddingProvider(_))));
    }

    #[test]
    fn test_blank_query_rejected_before_provider() {
        let dataset = SceneDataset::new(vec![SceneRecord::new("bridge", json!("(0,0,1,1)"))]);
        let mut cache = EmbeddingCache::default();
        // FailingProvider would error if reached; InvalidQuery must win.
        let result = rank("   ", &dataset, &FailingProvider, 0.3, &mut cache);
        assert!(matches!(result, Err(SearchError::InvalidQuery)));
    }

    #[test]
    fn test_cache_avoids_reembedding() {
        struct CountingProvider {
            calls: Cell<usize>,
        }
        impl EmbeddingProvider for CountingProvider {
            fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
                self.calls.set(self.calls.get() + 1);
                Ok(vec![1.0, 0.0])
            }
        }

        let dataset = SceneDataset::new(vec![
            SceneRecord::new("alpha", json!("(0,0,1,1)")),
            SceneRecord::new("beta", json!("(0,0,1,1)")),
        ]);
        let provider = CountingProvider {
            calls: Cell::new(0),
        };
        let mut cache = EmbeddingCache::default();

        rank("one", &dataset, &provider, 0.0, &mut cache).unwrap();
        // 1 query embed + 2 record embeds.
        assert_eq!(provider.calls.get(), 3);
        assert_eq!(cache.len(), 2);

        rank("two", &dataset, &provider, 0.0, &mut cache).unwrap();
        // Only the new query is embedded; records come from the cache.
        assert_eq!(provider.calls.get(), 4);
    }

    #[test]
    fn test_dimension_mismatch_is_provider_error() {
        struct RaggedProvider;
        impl EmbeddingProvider for RaggedProvider {
            fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
                Ok(vec![1.0; text.len().max(1)])
            }
        }
        let dataset = SceneDataset::new(vec![SceneRecord::new("longer text", json!("(0,0,1,1)"))]);
        let mut cache = EmbeddingCache::default();
        let result = rank("hi", &dataset, &RaggedProvider, 0.0, &mut cache);
        assert!(matches!(result, Err(SearchError::EmbeddingProvider(_))));
    }
}
