//! Session orchestration: the [`MapExplorer`].
//!
//! One explorer owns everything a session needs — the immutable dataset, the
//! scoring engine, the ranked results and the exploration cursor — and
//! drives an external map renderer through the [`MapSurface`] seam. Nothing
//! here draws; the surface receives feature collections and rectangles and
//! is otherwise a black box.

use tracing::{debug, info, instrument};

use crate::{
    config::SearchConfig,
    data::SceneDataset,
    error::GeoscoutError,
    explore::ExploreCursor,
    geometry::{self, BoundingBox, FeatureCollection},
    search::{EmbeddingProvider, ResultSet, ScoredRecord, Scorer},
    view::ViewState,
};

/// The fixed map area this tool covers (Banepa, Nepal), used as the
/// fallback viewport when a restored session carries no bounds.
pub const DEFAULT_VIEWPORT: BoundingBox = BoundingBox {
    min_lon: 85.5098,
    min_lat: 27.6152,
    max_lon: 85.5457,
    max_lat: 27.6512,
};

/// The rendering collaborator.
///
/// Implementations wrap whatever actually draws the map. All operations are
/// fire-and-forget effects; the explorer never reads anything back.
pub trait MapSurface {
    /// Pan/zoom so `bounds` fills the view.
    fn fit_bounds(&mut self, bounds: BoundingBox);
    /// Replace the match overlay with `features`.
    fn show_features(&mut self, features: &FeatureCollection);
    /// Draw the single-item highlight rectangle, replacing any previous one.
    fn highlight(&mut self, bounds: BoundingBox);
    /// Remove the highlight rectangle.
    fn clear_highlight(&mut self);
}

/// What one search produced, ready for display.
#[derive(Debug, Clone)]
pub struct SearchSummary {
    /// Number of matching records.
    pub matched: usize,
    /// Polygon features for the match overlay.
    pub features: FeatureCollection,
    /// Union of the matches' boxes, for fitting the viewport. `None` when
    /// nothing matched or no match had a usable bbox.
    pub fit: Option<BoundingBox>,
}

/// Token tying a result set to the search submission that produced it.
///
/// Scoring may run somewhere asynchronous (an embedding round-trip); the
/// ticket lets [`MapExplorer::apply_results`] refuse results that belong to
/// a submission that has since been superseded, so a slow old query can
/// never overwrite a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
}

/// Builder for a [`MapExplorer`], mirroring the config-then-build shape of
/// the rest of the crate.
#[derive(Default)]
pub struct MapExplorerBuilder {
    dataset: SceneDataset,
    config: SearchConfig,
    provider: Option<Box<dyn EmbeddingProvider>>,
}

impl MapExplorerBuilder {
    pub fn dataset(mut self, dataset: SceneDataset) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn embedding_provider(mut self, provider: Box<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn build(self) -> MapExplorer {
        let scorer = match self.provider {
            Some(provider) => Scorer::with_provider(provider),
            None => Scorer::new(),
        };
        MapExplorer {
            dataset: self.dataset,
            config: self.config,
            scorer,
            cursor: ExploreCursor::default(),
            generation: 0,
            last_query: None,
        }
    }
}

/// A single-user exploration session over one dataset.
pub struct MapExplorer {
    dataset: SceneDataset,
    config: SearchConfig,
    scorer: Scorer,
    cursor: ExploreCursor,
    generation: u64,
    last_query: Option<String>,
}

impl MapExplorer {
    /// Create an explorer with the default term-overlap configuration.
    #[must_use]
    pub fn new(dataset: SceneDataset) -> Self {
        MapExplorerBuilder::default().dataset(dataset).build()
    }

    #[must_use]
    pub fn builder() -> MapExplorerBuilder {
        MapExplorerBuilder::default()
    }

    pub fn dataset(&self) -> &SceneDataset {
        &self.dataset
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Register a new search submission. Any results later applied with an
    /// older ticket are discarded.
    pub fn begin_search(&mut self) -> SearchTicket {
        self.generation += 1;
        SearchTicket {
            generation: self.generation,
        }
    }

    /// Score a query against the dataset without touching session state.
    pub fn score(&mut self, query: &str) -> Result<ResultSet, GeoscoutError> {
        Ok(self.scorer.score(query, &self.dataset, &self.config)?)
    }

    /// Install a computed result set, unless a newer submission has been
    /// made since `ticket` was issued. Returns `None` for stale results.
    pub fn apply_results(
        &mut self,
        ticket: SearchTicket,
        query: &str,
        results: ResultSet,
    ) -> Option<SearchSummary> {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale search results"
            );
            return None;
        }
        let summary = SearchSummary {
            matched: results.len(),
            features: geometry::feature_collection(&results),
            fit: geometry::fit_bounds(&results),
        };
        self.cursor.replace(results);
        self.last_query = Some(query.to_owned());
        info!(query, matched = summary.matched, "search complete");
        Some(summary)
    }

    /// Score `query` and install the results in one synchronous step.
    #[instrument(level = "debug", skip(self))]
    pub fn search(&mut self, query: &str) -> Result<SearchSummary, GeoscoutError> {
        let ticket = self.begin_search();
        let results = self.score(query)?;
        // Synchronous path: the ticket is necessarily current.
        Ok(self
            .apply_results(ticket, query, results)
            .unwrap_or(SearchSummary {
                matched: 0,
                features: geometry::feature_collection(&[]),
                fit: None,
            }))
    }

    /// Search and push the outcome to the renderer: overlay the matches and
    /// fit the viewport around them.
    pub fn search_and_render(
        &mut self,
        query: &str,
        surface: &mut dyn MapSurface,
    ) -> Result<SearchSummary, GeoscoutError> {
        let summary = self.search(query)?;
        if summary.matched > 0 {
            surface.show_features(&summary.features);
            if let Some(bounds) = summary.fit {
                surface.fit_bounds(bounds);
            }
        }
        Ok(summary)
    }

    /// Open the explore panel on the top-ranked match, zooming and
    /// highlighting it. Returns the item shown, or `None` with no results.
    pub fn start_exploration(&mut self, surface: &mut dyn MapSurface) -> Option<&ScoredRecord> {
        self.cursor.start()?;
        self.render_current(surface);
        self.cursor.current()
    }

    /// Step forward through the results.
    pub fn navigate_next(&mut self, surface: &mut dyn MapSurface) -> Option<&ScoredRecord> {
        self.cursor.next()?;
        self.render_current(surface);
        self.cursor.current()
    }

    /// Step backward through the results.
    pub fn navigate_prev(&mut self, surface: &mut dyn MapSurface) -> Option<&ScoredRecord> {
        self.cursor.prev()?;
        self.render_current(surface);
        self.cursor.current()
    }

    /// Close the explore panel and remove the highlight.
    pub fn close_exploration(&mut self, surface: &mut dyn MapSurface) {
        self.cursor.close();
        surface.clear_highlight();
    }

    pub fn cursor(&self) -> &ExploreCursor {
        &self.cursor
    }

    fn render_current(&self, surface: &mut dyn MapSurface) {
        if let Some(bounds) = self.cursor.highlight_bounds() {
            surface.fit_bounds(bounds);
            surface.highlight(bounds);
        }
    }

    /// Capture the session for the address bar. The viewport comes from the
    /// caller because only the renderer knows where the user actually
    /// panned to.
    #[must_use]
    pub fn view_state(&self, viewport: Option<BoundingBox>) -> ViewState {
        ViewState::new(self.last_query.clone(), viewport)
    }

    /// Restore a session from a shared link: re-run the query (if any),
    /// then fit the viewport — an explicit bbox wins over the fit computed
    /// from the search, falling back to the default map area.
    #[instrument(level = "debug", skip(self, surface))]
    pub fn restore(
        &mut self,
        state: &ViewState,
        surface: &mut dyn MapSurface,
    ) -> Result<(), GeoscoutError> {
        if let Some(query) = &state.query {
            let query = query.clone();
            self.search_and_render(&query, surface)?;
        }
        surface.fit_bounds(state.viewport.unwrap_or(DEFAULT_VIEWPORT));
        Ok(())
    }
}
