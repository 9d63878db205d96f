//! URL view-state sync.
//!
//! A session is shareable as a link: the query text and the viewport bounds
//! round-trip through the address bar as `query=...&bbox=minLon,minLat,maxLon,maxLat`.
//! Restoring is lenient — unknown parameters are ignored and a malformed
//! `bbox` is dropped with a warning rather than failing the whole restore.

use itertools::Itertools;
use tracing::warn;
use url::form_urlencoded;

use crate::geometry::BoundingBox;

/// Shareable session state: what was searched and where the map was looking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub query: Option<String>,
    pub viewport: Option<BoundingBox>,
}

impl ViewState {
    #[must_use]
    pub fn new(query: Option<String>, viewport: Option<BoundingBox>) -> Self {
        Self { query, viewport }
    }

    /// Serialize to a URL query string (no leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(query) = &self.query {
            serializer.append_pair("query", query);
        }
        if let Some(viewport) = &self.viewport {
            let joined = [
                viewport.min_lon,
                viewport.min_lat,
                viewport.max_lon,
                viewport.max_lat,
            ]
            .iter()
            .join(",");
            serializer.append_pair("bbox", &joined);
        }
        serializer.finish()
    }

    /// Parse a URL query string (leading `?` tolerated).
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut state = Self::default();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match &*key {
                "query" => {
                    if !value.trim().is_empty() {
                        state.query = Some(value.into_owned());
                    }
                }
                "bbox" => match BoundingBox::parse_str(&value) {
                    Ok(bbox) => state.viewport = Some(bbox),
                    Err(e) => {
                        warn!(error = %e, bbox = %value, "ignoring malformed bbox parameter");
                    }
                },
                _ => {}
            }
        }
        state
    }
}
