//! Bounding boxes and their GeoJSON projection.
//!
//! The dataset stores each record's extent in one of two raw shapes: a
//! numeric 4-array, or a delimited string such as `"(85.50,27.61,85.54,27.65)"`.
//! [`BoundingBox::parse`] is the single canonical parser for both shapes; it
//! replaces the two divergent splitting strategies the exploration and
//! query paths used to carry separately.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::search::ScoredRecord;
pub use error::GeometryError;
use error::Result;

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum GeometryError {
        #[error("expected 4 numeric coordinates, found {0}")]
        WrongArity(usize),
        #[error("non-finite coordinate in bounding box")]
        NonFinite,
        #[error("unsupported bounding box shape: {0}")]
        UnsupportedShape(String),
    }
    pub type Result<T> = std::result::Result<T, GeometryError>;
}

/// Numeric tokens inside a bbox string: optional sign, integers or decimals.
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?(?:\d+\.\d+|\.\d+|\d+)").expect("valid number regex"));

/// An axis-aligned rectangle in geographic coordinates,
/// `(min longitude, min latitude, max longitude, max latitude)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Build a box from four coordinates, rejecting non-finite values.
    pub fn from_coords(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        let coords = [min_lon, min_lat, max_lon, max_lat];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// Parse a raw bbox value as found in the dataset: either a numeric
    /// 4-array or a string with four numeric tokens (parentheses, commas,
    /// signs and decimals all tolerated).
    pub fn parse(raw: &serde_json::Value) -> Result<Self> {
        match raw {
            serde_json::Value::String(s) => Self::parse_str(s),
            serde_json::Value::Array(items) => {
                let coords: Vec<f64> = items.iter().filter_map(serde_json::Value::as_f64).collect();
                if coords.len() != items.len() || coords.len() != 4 {
                    return Err(GeometryError::WrongArity(coords.len()));
                }
                Self::from_coords(coords[0], coords[1], coords[2], coords[3])
            }
            other => Err(GeometryError::UnsupportedShape(other.to_string())),
        }
    }

    /// Parse a bbox string. Exactly four numeric tokens must be present.
    pub fn parse_str(raw: &str) -> Result<Self> {
        let coords: Vec<f64> = NUMBER_RE
            .find_iter(raw)
            .filter_map(|m| m.as_str().parse::<f64>().ok())
            .collect();
        if coords.len() != 4 {
            return Err(GeometryError::WrongArity(coords.len()));
        }
        Self::from_coords(coords[0], coords[1], coords[2], coords[3])
    }

    /// The box's boundary as a closed 5-point ring in `(lon, lat)` order:
    /// SW → NW → NE → SE → SW. Consumers expect exactly this traversal, so
    /// the ordering is part of the wire format.
    #[must_use]
    pub fn ring(&self) -> Vec<[f64; 2]> {
        vec![
            [self.min_lon, self.min_lat],
            [self.min_lon, self.max_lat],
            [self.max_lon, self.max_lat],
            [self.max_lon, self.min_lat],
            [self.min_lon, self.min_lat],
        ]
    }

    /// The smallest box covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }
}

/// GeoJSON `Polygon` geometry.
#[derive(Debug, Clone, Serialize)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl PolygonGeometry {
    fn from_box(bbox: &BoundingBox) -> Self {
        Self {
            kind: "Polygon",
            coordinates: vec![bbox.ring()],
        }
    }
}

/// Properties carried on every emitted feature.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureProperties {
    pub description: String,
    pub score: f64,
}

/// GeoJSON `Feature` wrapping one matched record's rectangle.
#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: PolygonGeometry,
    pub properties: FeatureProperties,
}

/// GeoJSON `FeatureCollection` for a whole result set.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }
}

/// Project a ranked result set to a GeoJSON feature collection.
///
/// Records whose bbox fails to parse are skipped with a warning; a bad box
/// affects geometry only, never the record's rank.
pub fn feature_collection(results: &[ScoredRecord]) -> FeatureCollection {
    let features = results
        .iter()
        .filter_map(|scored| match BoundingBox::parse(&scored.record.bbox) {
            Ok(bbox) => Some(Feature {
                kind: "Feature",
                geometry: PolygonGeometry::from_box(&bbox),
                properties: FeatureProperties {
                    description: scored.record.description_from_model.clone(),
                    score: scored.relevance,
                },
            }),
            Err(e) => {
                warn!(
                    error = %e,
                    description = %scored.record.description_from_model,
                    "skipping record with unparseable bbox"
                );
                None
            }
        })
        .collect();
    FeatureCollection {
        kind: "FeatureCollection",
        features,
    }
}

/// The union of all parseable boxes in a result set, for fitting the
/// viewport around the matches. `None` when nothing parses.
#[must_use]
pub fn fit_bounds(results: &[ScoredRecord]) -> Option<BoundingBox> {
    results
        .iter()
        .filter_map(|scored| BoundingBox::parse(&scored.record.bbox).ok())
        .reduce(|acc, bbox| acc.union(&bbox))
}
