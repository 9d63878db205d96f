//! Geoscout - query-driven exploration of geotagged scene descriptions.
//!
//! Geoscout loads a fixed collection of geotagged records (free-text scene
//! descriptions, each with a geographic bounding box), scores them against
//! natural-language queries, projects the matches to GeoJSON polygons for a
//! map renderer, and steps through the ranked results with an exploration
//! cursor. The map renderer itself stays external, behind the
//! [`MapSurface`] trait.
//!
//! # Quick Start
//!
//! ```rust
//! use geoscout::{MapExplorer, SceneDataset};
//!
//! let dataset = SceneDataset::from_json_str(
//!     r#"[
//!         {"description_from_model": "a blue bridge over a river", "bbox": "(85.51,27.62,85.52,27.63)"},
//!         {"description_from_model": "a red house", "bbox": "(85.53,27.64,85.54,27.65)"}
//!     ]"#,
//! )?;
//!
//! let mut explorer = MapExplorer::new(dataset);
//! let summary = explorer.search("bridge river")?;
//! assert_eq!(summary.matched, 1);
//! # Ok::<(), geoscout::error::GeoscoutError>(())
//! ```
//!
//! # Scoring Modes
//!
//! - **Term overlap** (default): counts query-term occurrences inside each
//!   description, substring matching included. No external collaborators.
//! - **Embedding similarity**: cosine similarity between query and
//!   description vectors from an injected [`EmbeddingProvider`], with
//!   automatic fallback to term overlap when the provider fails.
//!
//! # Session State
//!
//! All mutable session state (ranked results, exploration cursor, search
//! generation) lives in one [`MapExplorer`] instance. Sessions serialize to
//! a URL query string via [`ViewState`] so a search and viewport can be
//! shared as a link.

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

pub mod config;
mod core;
pub mod data;
pub mod error;
pub mod explore;
pub mod geometry;
pub mod search;
pub mod view;

pub use config::{ScoringMode, SearchConfig, SearchConfigBuilder};
pub use core::{
    DEFAULT_VIEWPORT, MapExplorer, MapExplorerBuilder, MapSurface, SearchSummary, SearchTicket,
};
pub use data::{SceneDataset, SceneRecord};
pub use explore::ExploreCursor;
pub use geometry::{BoundingBox, Feature, FeatureCollection, feature_collection, fit_bounds};
pub use search::{EmbeddingProvider, ResultSet, ScoredRecord, Scorer, cosine_similarity};
pub use view::ViewState;

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the library.
///
/// Sets up structured logging with configurable levels and filtering. Call
/// once at the start of your application; later calls are no-ops.
///
/// # Examples
///
/// ```rust
/// use tracing::Level;
///
/// geoscout::init_logging(Level::INFO)?;
/// # Ok::<(), geoscout::error::GeoscoutError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::GeoscoutError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?;

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}
