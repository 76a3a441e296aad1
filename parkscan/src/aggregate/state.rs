//! Shared result state for capture runs.

use std::collections::HashMap;

use crate::coord::{GeoPoint, Viewport};

/// Image artifacts returned by the detection service for one tile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileArtifacts {
    /// Tile image with detection markers drawn on it, as a data URI.
    pub annotated: Option<String>,
    /// Tile image as the service received it, as a data URI.
    pub incoming: Option<String>,
}

/// Aggregated results of the most recent capture run.
///
/// One run's results fully replace the previous run's; a run that is
/// superseded mid-flight never contributes here. Cloned out under the
/// session lock for display, so readers never observe a half-merged tile.
#[derive(Debug, Clone, Default)]
pub struct AggregateState {
    /// Accepted detection markers in geographic coordinates, in tile
    /// completion order.
    pub markers: Vec<GeoPoint>,
    /// Per-tile image artifacts, keyed by tile id (`"row-col"`).
    pub images: HashMap<String, TileArtifacts>,
    /// The viewport the current results were captured from, if any.
    pub viewport: Option<Viewport>,
}

impl AggregateState {
    /// Returns true if no run has produced results since the last clear.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.images.is_empty() && self.viewport.is_none()
    }

    /// Number of accepted markers.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}
