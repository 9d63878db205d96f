//! Dataset loading for geotagged scene records.
//!
//! The dataset is a flat JSON array of records, each describing one labelled
//! region of the map area. It is read once at startup and never mutated;
//! every search runs over the same in-memory slice.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::info;

pub use error::DataError;
use error::Result;

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum DataError {
        #[error("failed to read dataset file: {0}")]
        Io(#[from] std::io::Error),
        #[error("failed to parse dataset JSON: {0}")]
        Json(#[from] serde_json::Error),
    }
    pub type Result<T> = std::result::Result<T, DataError>;
}

/// One geotagged record in the dataset.
///
/// Only two fields participate in search and geometry: the free-text
/// description produced by the labelling model, and the bounding box. The
/// bounding box is kept in its raw JSON shape (string or numeric array) and
/// parsed lazily by [`crate::geometry::BoundingBox::parse`] — a record with a
/// malformed box still scores and is still navigable, it just produces no
/// geometry. Every other field passes through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneRecord {
    /// Free-text description used for relevance matching.
    #[serde(default)]
    pub description_from_model: String,
    /// Raw bounding box, either a `"(minLon,minLat,maxLon,maxLat)"` style
    /// string or a numeric 4-array.
    #[serde(default)]
    pub bbox: serde_json::Value,
    /// All remaining fields, carried opaquely.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SceneRecord {
    /// Convenience constructor used in tests and demos.
    pub fn new(description: impl Into<String>, bbox: serde_json::Value) -> Self {
        Self {
            description_from_model: description.into(),
            bbox,
            extra: serde_json::Map::new(),
        }
    }
}

/// The full, immutable record collection for one map area.
///
/// Record order is meaningful: it is the tie-break order for equally relevant
/// search results, so two loads of the same file always rank identically.
#[derive(Debug, Clone, Default)]
pub struct SceneDataset {
    records: Vec<SceneRecord>,
}

impl SceneDataset {
    pub fn new(records: Vec<SceneRecord>) -> Self {
        Self { records }
    }

    /// Parse a dataset from a JSON array string.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let records: Vec<SceneRecord> = serde_json::from_str(raw)?;
        info!(record_count = records.len(), "dataset loaded");
        Ok(Self { records })
    }

    /// Read and parse a dataset file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn records(&self) -> &[SceneRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
