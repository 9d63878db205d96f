//! Relevance scoring over the scene dataset.
//!
//! Two interchangeable scoring routines sit behind [`Scorer::score`]: a
//! term-overlap counter that needs nothing beyond the dataset itself, and a
//! cosine-similarity ranker over embeddings from an injected provider. Both
//! produce the same shape of output, a [`ResultSet`] sorted descending by
//! relevance with ties kept in dataset order.

use tracing::{debug, warn};

use crate::{
    config::{ScoringMode, SearchConfig},
    data::SceneDataset,
};
pub use embedding::{EmbeddingProvider, cosine_similarity};
pub use error::SearchError;
use error::Result;

mod embedding;
mod term_overlap;

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum SearchError {
        #[error("query is blank; enter at least one search term")]
        InvalidQuery,
        #[error("embedding provider failed: {0}")]
        EmbeddingProvider(#[source] anyhow::Error),
    }
    pub type Result<T> = std::result::Result<T, SearchError>;
}

/// One record paired with its relevance for the current query.
///
/// Relevance is strictly positive (zero-scoring records are dropped before a
/// result set is built) and comparable only within a single query's results.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: crate::data::SceneRecord,
    pub relevance: f64,
}

/// A ranked result set, rebuilt from scratch on every search.
pub type ResultSet = Vec<ScoredRecord>;

/// Scoring engine for a session.
///
/// Owns the optional embedding provider and the per-description embedding
/// cache, so repeated searches against the same dataset never re-embed a
/// description. There is no global state; drop the scorer and the cache goes
/// with it.
#[derive(Default)]
pub struct Scorer {
    provider: Option<Box<dyn EmbeddingProvider>>,
    cache: embedding::EmbeddingCache,
}

impl Scorer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an embedding provider for [`ScoringMode::Embedding`] queries.
    #[must_use]
    pub fn with_provider(provider: Box<dyn EmbeddingProvider>) -> Self {
        Self {
            provider: Some(provider),
            cache: embedding::EmbeddingCache::default(),
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Score `query` against every record in `dataset`.
    ///
    /// A blank or whitespace-only query fails with
    /// [`SearchError::InvalidQuery`] before any scoring happens, in either
    /// mode. In embedding mode a provider failure (or a missing provider)
    /// falls back to term-overlap scoring unless the config disables the
    /// fallback.
    pub fn score(
        &mut self,
        query: &str,
        dataset: &SceneDataset,
        config: &SearchConfig,
    ) -> Result<ResultSet> {
        let mut results = match config.mode {
            ScoringMode::TermOverlap => term_overlap::rank(query, dataset)?,
            ScoringMode::Embedding => self.score_embedding(query, dataset, config)?,
        };
        if let Some(limit) = config.limit {
            results.truncate(limit);
        }
        debug!(query, matched = results.len(), "query scored");
        Ok(results)
    }

    fn score_embedding(
        &mut self,
        query: &str,
        dataset: &SceneDataset,
        config: &SearchConfig,
    ) -> Result<ResultSet> {
        let attempt = match self.provider.as_deref() {
            Some(provider) => embedding::rank(
                query,
                dataset,
                provider,
                config.similarity_threshold,
                &mut self.cache,
            ),
            None => Err(SearchError::EmbeddingProvider(anyhow::anyhow!(
                "no embedding provider configured"
            ))),
        };
        match attempt {
            Ok(results) => Ok(results),
            // A blank query is the caller's problem in either mode.
            Err(SearchError::InvalidQuery) => Err(SearchError::InvalidQuery),
            Err(e) if config.fallback_to_term_overlap => {
                warn!(error = %e, "embedding scoring failed, falling back to term overlap");
                term_overlap::rank(query, dataset)
            }
            Err(e) => Err(e),
        }
    }
}

/// Lowercase the query and split it into non-empty whitespace-separated
/// terms. Fails with [`SearchError::InvalidQuery`] when nothing remains.
pub(crate) fn query_terms(query: &str) -> Result<Vec<String>> {
    let terms: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect();
    if terms.is_empty() {
        return Err(SearchError::InvalidQuery);
    }
    Ok(terms)
}

/// Sort descending by relevance. `sort_by` is stable, so equal scores keep
/// their dataset order and a query always ranks reproducibly.
pub(crate) fn sort_descending(results: &mut ResultSet) {
    results.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::SceneRecord;

    fn sample_dataset() -> SceneDataset {
        SceneDataset::new(vec![
            SceneRecord::new("a blue bridge over a river", json!("(0,0,1,1)")),
            SceneRecord::new("a red house", json!("(2,2,3,3)")),
        ])
    }

    #[test]
    fn test_blank_query_is_invalid() {
        let mut scorer = Scorer::new();
        let config = SearchConfig::default();
        assert!(matches!(
            scorer.score("", &sample_dataset(), &config),
            Err(SearchError::InvalidQuery)
        ));
        assert!(matches!(
            scorer.score("   \t ", &sample_dataset(), &config),
            Err(SearchError::InvalidQuery)
        ));
    }

    #[test]
    fn test_bridge_river_scenario() {
        let mut scorer = Scorer::new();
        let results = scorer
            .score("bridge river", &sample_dataset(), &SearchConfig::default())
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].record.description_from_model,
            "a blue bridge over a river"
        );
        assert_eq!(results[0].relevance, 2.0);
    }

    #[test]
    fn test_no_zero_relevance_results() {
        let mut scorer = Scorer::new();
        let results = scorer
            .score("volcano", &sample_dataset(), &SearchConfig::default())
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_results_sorted_descending() {
        let dataset = SceneDataset::new(vec![
            SceneRecord::new("river", json!("(0,0,1,1)")),
            SceneRecord::new("river river river", json!("(0,0,1,1)")),
            SceneRecord::new("river river", json!("(0,0,1,1)")),
        ]);
        let mut scorer = Scorer::new();
        let results = scorer
            .score("river", &dataset, &SearchConfig::default())
            .unwrap();
        let scores: Vec<f64> = results.iter().map(|r| r.relevance).collect();
        assert_eq!(scores, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_ties_keep_dataset_order() {
        let dataset = SceneDataset::new(vec![
            SceneRecord::new("river one", json!("(0,0,1,1)")),
            SceneRecord::new("river two", json!("(0,0,1,1)")),
            SceneRecord::new("river three", json!("(0,0,1,1)")),
        ]);
        let mut scorer = Scorer::new();
        let results = scorer
            .score("river", &dataset, &SearchConfig::default())
            .unwrap();
        let order: Vec<&str> = results
            .iter()
            .map(|r| r.record.description_from_model.as_str())
            .collect();
        assert_eq!(order, vec!["river one", "river two", "river three"]);
    }

    #[test]
    fn test_limit_truncates_after_ranking() {
        let dataset = SceneDataset::new(vec![
            SceneRecord::new("river", json!("(0,0,1,1)")),
            SceneRecord::new("river river", json!("(0,0,1,1)")),
        ]);
        let mut scorer = Scorer::new();
        let config = SearchConfig::builder().limit(1).build();
        let results = scorer.score("river", &dataset, &config).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].relevance, 2.0);
    }

    #[test]
    fn test_embedding_mode_without_provider_falls_back() {
        let mut scorer = Scorer::new();
        let config = SearchConfig::builder()
            .mode(crate::config::ScoringMode::Embedding)
            .build();
        let results = scorer
            .score("bridge river", &sample_dataset(), &config)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].relevance, 2.0);
    }

    #[test]
    fn test_embedding_mode_without_provider_no_fallback_errors() {
        let mut scorer = Scorer::new();
        let config = SearchConfig::builder()
            .mode(crate::config::ScoringMode::Embedding)
            .no_fallback()
            .build();
        assert!(matches!(
            scorer.score("bridge", &sample_dataset(), &config),
            Err(SearchError::EmbeddingProvider(_))
        ));
    }
}
