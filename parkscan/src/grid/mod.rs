//! Viewport tiling.
//!
//! Partitions a captured [`Viewport`] into a grid of tiles small enough for
//! the detection service (which resizes anything larger than its input
//! resolution). Planning is pure computation: the only failure mode is a
//! degenerate viewport.
//!
//! Tile centers are linearly interpolated in latitude/longitude across the
//! viewport box. Under Web Mercator the true centers are not exactly evenly
//! spaced in latitude, but at the zoom levels captures run at (>= 15) the
//! error across a single viewport is far below one pixel, so the linear
//! placement is a documented, accepted approximation.

use crate::coord::{CoordError, GeoPoint, Viewport};

/// Default tile edge length, matching the detection service's native
/// 640x640 input resolution.
pub const DEFAULT_TILE_EDGE: u32 = 640;

/// Target pixel size for planned tiles.
///
/// The planner produces tiles no larger than this; actual tile sizes are the
/// display dimensions divided evenly (rounded up) across the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSize {
    /// Target tile width in pixels.
    pub width: u32,
    /// Target tile height in pixels.
    pub height: u32,
}

impl TileSize {
    /// Creates a new target size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square target size with the given edge length.
    pub fn square(edge: u32) -> Self {
        Self::new(edge, edge)
    }
}

impl Default for TileSize {
    fn default() -> Self {
        Self::square(DEFAULT_TILE_EDGE)
    }
}

/// One rectangular sub-region of the captured viewport.
///
/// Immutable once planned; owned by the pipeline run that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Row index in the grid, 0 at the northern edge.
    pub row: u32,
    /// Column index in the grid, 0 at the western edge.
    pub col: u32,
    /// Geographic center of the tile.
    pub center: GeoPoint,
    /// Tile width in pixels.
    pub width: u32,
    /// Tile height in pixels.
    pub height: u32,
}

impl Tile {
    /// Stable identifier used to correlate imagery, detections, and
    /// artifacts across the pipeline regardless of arrival order.
    pub fn id(&self) -> String {
        format!("{}-{}", self.row, self.col)
    }
}

/// The planned tile grid covering a viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    /// Number of rows in the grid.
    pub num_rows: u32,
    /// Number of columns in the grid.
    pub num_cols: u32,
    /// Per-tile pixel width.
    pub tile_width: u32,
    /// Per-tile pixel height.
    pub tile_height: u32,
}

impl TileGrid {
    /// Plans a tile grid covering `viewport` with tiles no larger than
    /// `target`.
    ///
    /// Grid dimensions are `ceil(display / target)` (at least 1 each), and
    /// tile pixel sizes are `ceil(display / count)`. Tile centers are placed
    /// at fractional offsets `(col + 0.5) / num_cols` west-to-east and
    /// `(row + 0.5) / num_rows` north-to-south across the viewport box.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError`] if the viewport fails validation; nothing else
    /// can fail.
    pub fn plan(viewport: &Viewport, target: TileSize) -> Result<Self, CoordError> {
        viewport.validate()?;
        if target.width == 0 || target.height == 0 {
            return Err(CoordError::DegenerateViewport {
                reason: format!(
                    "zero tile target size ({}x{})",
                    target.width, target.height
                ),
            });
        }

        let num_cols = viewport.width.div_ceil(target.width).max(1);
        let num_rows = viewport.height.div_ceil(target.height).max(1);
        let tile_width = viewport.width.div_ceil(num_cols);
        let tile_height = viewport.height.div_ceil(num_rows);

        let mut tiles = Vec::with_capacity((num_rows * num_cols) as usize);
        for row in 0..num_rows {
            for col in 0..num_cols {
                let frac_col = (col as f64 + 0.5) / num_cols as f64;
                let frac_row = (row as f64 + 0.5) / num_rows as f64;

                // Row 0 sits at the northern edge, so latitude descends from
                // ne.lat as frac_row grows.
                let center = GeoPoint::new(
                    viewport.ne.lat - frac_row * viewport.lat_span(),
                    viewport.sw.lon + frac_col * viewport.lon_span(),
                );

                tiles.push(Tile {
                    row,
                    col,
                    center,
                    width: tile_width,
                    height: tile_height,
                });
            }
        }

        Ok(Self {
            tiles,
            num_rows,
            num_cols,
            tile_width,
            tile_height,
        })
    }

    /// Iterates over the planned tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Returns the planned tiles, consuming the grid's ownership of them.
    pub fn into_tiles(self) -> Vec<Tile> {
        self.tiles
    }

    /// Total number of tiles in the grid.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns true if the grid contains no tiles (never the case for a
    /// successfully planned grid).
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
