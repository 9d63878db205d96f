//! Search configuration and its builder.

/// Which scoring routine answers a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringMode {
    /// Count query-term occurrences inside each description. The default and
    /// the mode that needs no external collaborator.
    #[default]
    TermOverlap,
    /// Cosine similarity between query and description embeddings, via an
    /// injected [`crate::search::EmbeddingProvider`].
    Embedding,
}

/// Tunable parameters for a search session.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Scoring routine to use.
    pub mode: ScoringMode,
    /// Minimum cosine similarity for a record to count as a match
    /// (embedding mode only).
    pub similarity_threshold: f64,
    /// Cap on the number of results returned, applied after ranking.
    pub limit: Option<usize>,
    /// Whether an embedding-provider failure falls back to term-overlap
    /// scoring for that query instead of surfacing the error.
    pub fallback_to_term_overlap: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: ScoringMode::TermOverlap,
            similarity_threshold: 0.3,
            limit: None,
            fallback_to_term_overlap: true,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }
}

/// Builder for creating search configurations with ergonomic defaults.
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Create a new builder with sensible defaults (term-overlap mode).
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    /// Create a builder preset for embedding-similarity scoring.
    pub fn embedding() -> Self {
        let mut builder = Self::new();
        builder.config.mode = ScoringMode::Embedding;
        builder
    }

    /// Set the scoring mode.
    pub fn mode(mut self, mode: ScoringMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the minimum cosine similarity for embedding matches,
    /// clamped to `[0, 1]`.
    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.config.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the maximum number of results to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = Some(limit);
        self
    }

    /// Surface embedding-provider failures instead of falling back to
    /// term-overlap scoring.
    pub fn no_fallback(mut self) -> Self {
        self.config.fallback_to_term_overlap = false;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> SearchConfig {
        self.config
    }
}
