//! Capture session configuration.
//!
//! This module defines `CaptureConfig`, which combines all knobs a
//! [`CaptureSession`](crate::aggregate::CaptureSession) needs: tile sizing,
//! concurrency, per-stage timeouts, and the reprojection strategy.

use std::time::Duration;

use crate::grid::TileSize;
use crate::reproject::Projection;

/// Default number of tiles processed concurrently.
///
/// Each in-flight tile holds one imagery request and one detection request.
/// 8 keeps a 2x2..4x4 grid fully parallel without flooding either service.
pub const DEFAULT_MAX_CONCURRENT_TILES: usize = 8;

/// Default timeout for one imagery fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for one detection call.
///
/// Detection runs a model server-side; it is slower than an imagery fetch
/// but a tile that takes longer than this is treated as failed.
pub const DEFAULT_DETECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a capture session.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target pixel size for planned tiles.
    pub tile_size: TileSize,

    /// Maximum number of tiles in flight at once.
    pub max_concurrent_tiles: usize,

    /// Timeout applied to each imagery fetch.
    pub fetch_timeout: Duration,

    /// Timeout applied to each detection call.
    pub detect_timeout: Duration,

    /// Strategy for mapping detection pixels back to coordinates.
    pub projection: Projection,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            tile_size: TileSize::default(),
            max_concurrent_tiles: DEFAULT_MAX_CONCURRENT_TILES,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            detect_timeout: DEFAULT_DETECT_TIMEOUT,
            projection: Projection::default(),
        }
    }
}

impl CaptureConfig {
    /// Creates a config with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target tile size.
    pub fn with_tile_size(mut self, tile_size: TileSize) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the tile concurrency limit (clamped to at least 1).
    pub fn with_max_concurrent_tiles(mut self, limit: usize) -> Self {
        self.max_concurrent_tiles = limit.max(1);
        self
    }

    /// Set the imagery fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the detection call timeout.
    pub fn with_detect_timeout(mut self, timeout: Duration) -> Self {
        self.detect_timeout = timeout;
        self
    }

    /// Set the reprojection strategy.
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.tile_size, TileSize::square(640));
        assert_eq!(config.max_concurrent_tiles, 8);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.projection, Projection::Linear);
    }

    #[test]
    fn test_builder_chain() {
        let config = CaptureConfig::new()
            .with_tile_size(TileSize::square(320))
            .with_max_concurrent_tiles(2)
            .with_detect_timeout(Duration::from_secs(30))
            .with_projection(Projection::Mercator);

        assert_eq!(config.tile_size, TileSize::square(320));
        assert_eq!(config.max_concurrent_tiles, 2);
        assert_eq!(config.detect_timeout, Duration::from_secs(30));
        assert_eq!(config.projection, Projection::Mercator);
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        let config = CaptureConfig::new().with_max_concurrent_tiles(0);
        assert_eq!(config.max_concurrent_tiles, 1);
    }
}
