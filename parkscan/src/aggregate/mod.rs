//! Capture run orchestration and result aggregation.
//!
//! A [`CaptureSession`] owns the whole pipeline for one viewport capture:
//! plan the tile grid, fetch imagery and run detection for every tile with
//! bounded concurrency, reproject the results, and merge them into a shared
//! [`AggregateState`].
//!
//! # Supersession
//!
//! Runs are tagged with a generation number. Starting a new run (or calling
//! [`CaptureSession::clear`]) bumps the generation under the state lock, so
//! any still-running older run finds its tag stale at merge time and stops
//! contributing. Tile tasks from a superseded run may still complete their
//! HTTP calls, but their results are discarded atomically.
//!
//! # Failure model
//!
//! Every tile failure (fetch, timeout, detection, malformed response) is
//! isolated: the tile is dropped, counted, and reported in the
//! [`RunSummary`]; the rest of the run proceeds.

mod state;

pub use state::{AggregateState, TileArtifacts};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::time::timeout;

use crate::config::CaptureConfig;
use crate::coord::{CoordError, GeoPoint, Viewport};
use crate::detect::Detector;
use crate::grid::{Tile, TileGrid};
use crate::provider::{ImageryProvider, TileImage};
use crate::telemetry::{CaptureMetrics, MetricsSnapshot};

/// Errors that abort a capture run before any tile is dispatched.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The requested viewport failed validation.
    #[error("invalid viewport: {0}")]
    InvalidViewport(#[from] CoordError),
}

/// The pipeline stage a tile failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStage {
    /// Imagery fetch from the provider.
    Fetch,
    /// Detection call against the service.
    Detect,
}

impl fmt::Display for TileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Detect => write!(f, "detect"),
        }
    }
}

/// A per-tile failure, reported in the run summary.
#[derive(Debug, Clone, Error)]
#[error("tile {tile_id} failed during {stage}: {message}")]
pub struct TileError {
    /// Identifier of the failed tile.
    pub tile_id: String,
    /// Which stage failed.
    pub stage: TileStage,
    /// Failure details.
    pub message: String,
}

/// Outcome of one capture run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of tiles the grid was planned with.
    pub tiles_total: usize,
    /// Tiles that completed all stages and merged results.
    pub tiles_succeeded: usize,
    /// Tiles dropped by a stage failure.
    pub tiles_failed: usize,
    /// Markers accepted into the aggregate state by this run.
    pub markers_added: usize,
    /// Reprojected markers dropped as out of range.
    pub markers_rejected: usize,
    /// True if a newer run or a clear discarded this run's results.
    pub superseded: bool,
    /// Per-tile failures, in completion order.
    pub failures: Vec<TileError>,
}

/// Results of one tile's trip through fetch, detect, and reproject.
struct TileOutcome {
    tile_id: String,
    markers: Vec<GeoPoint>,
    rejected: usize,
    artifacts: TileArtifacts,
}

struct Inner {
    generation: u64,
    state: AggregateState,
}

/// The capture pipeline for one provider/detector pairing.
///
/// Cheap to share behind an `Arc`; [`CaptureSession::run`] and
/// [`CaptureSession::clear`] take `&self` and synchronize internally.
pub struct CaptureSession<P, D> {
    provider: Arc<P>,
    detector: Arc<D>,
    config: CaptureConfig,
    metrics: Arc<CaptureMetrics>,
    inner: Mutex<Inner>,
}

impl<P: ImageryProvider, D: Detector> CaptureSession<P, D> {
    /// Creates a session around a provider and detector.
    pub fn new(provider: P, detector: D, config: CaptureConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            detector: Arc::new(detector),
            config,
            metrics: Arc::new(CaptureMetrics::new()),
            inner: Mutex::new(Inner {
                generation: 0,
                state: AggregateState::default(),
            }),
        }
    }

    /// Captures `viewport`: plans the grid, processes every tile, and
    /// replaces the aggregate state with the results.
    ///
    /// Returns once every tile has either merged or failed, or as soon as
    /// the run notices it has been superseded.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::InvalidViewport`] if the viewport fails
    /// validation; per-tile failures never fail the run.
    pub async fn run(&self, viewport: Viewport) -> Result<RunSummary, CaptureError> {
        let grid = TileGrid::plan(&viewport, self.config.tile_size)?;
        let tiles_total = grid.len();

        // Claim a fresh generation and reset the visible state in one
        // critical section, so an older in-flight run can no longer merge.
        let run_generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.state = AggregateState {
                viewport: Some(viewport.clone()),
                ..Default::default()
            };
            inner.generation
        };

        self.metrics.run_started();
        tracing::info!(
            tiles = tiles_total,
            zoom = viewport.zoom,
            provider = self.provider.name(),
            "capture run started"
        );

        let mut summary = RunSummary {
            tiles_total,
            tiles_succeeded: 0,
            tiles_failed: 0,
            markers_added: 0,
            markers_rejected: 0,
            superseded: false,
            failures: Vec::new(),
        };

        let mut results = stream::iter(grid.tiles().cloned().collect::<Vec<_>>())
            .map(|tile| {
                self.metrics.tile_dispatched();
                self.process_tile(tile, &viewport, &grid)
            })
            .buffer_unordered(self.config.max_concurrent_tiles);

        while let Some(result) = results.next().await {
            match result {
                Ok(outcome) => {
                    let merged = {
                        let mut inner = self.inner.lock();
                        if inner.generation == run_generation {
                            inner.state.markers.extend(outcome.markers.iter().copied());
                            inner
                                .state
                                .images
                                .insert(outcome.tile_id.clone(), outcome.artifacts);
                            true
                        } else {
                            false
                        }
                    };

                    if !merged {
                        summary.superseded = true;
                        break;
                    }

                    self.metrics.tile_succeeded();
                    self.metrics.markers_placed(outcome.markers.len() as u64);
                    self.metrics.markers_rejected(outcome.rejected as u64);
                    summary.tiles_succeeded += 1;
                    summary.markers_added += outcome.markers.len();
                    summary.markers_rejected += outcome.rejected;
                }
                Err(error) => {
                    tracing::warn!(
                        tile_id = %error.tile_id,
                        stage = %error.stage,
                        "tile dropped: {}",
                        error.message
                    );
                    self.metrics.tile_failed();
                    summary.tiles_failed += 1;
                    summary.failures.push(error);
                }
            }
        }

        // A supersession noticed after the stream ended still counts.
        if !summary.superseded {
            summary.superseded = self.inner.lock().generation != run_generation;
        }
        if summary.superseded {
            self.metrics.run_superseded();
            tracing::info!("capture run superseded, results discarded");
        } else {
            tracing::info!(
                succeeded = summary.tiles_succeeded,
                failed = summary.tiles_failed,
                markers = summary.markers_added,
                "capture run finished"
            );
        }

        Ok(summary)
    }

    /// Discards all aggregated results and invalidates any in-flight run.
    ///
    /// Idempotent: clearing an already-empty session is a no-op apart from
    /// the generation bump.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = AggregateState::default();
    }

    /// Returns a copy of the current aggregate state.
    pub fn state(&self) -> AggregateState {
        self.inner.lock().state.clone()
    }

    /// Returns a point-in-time copy of the session metrics.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn process_tile(
        &self,
        tile: Tile,
        viewport: &Viewport,
        grid: &TileGrid,
    ) -> Result<TileOutcome, TileError> {
        let tile_id = tile.id();

        let data = self
            .fetch_stage(&tile, viewport.zoom, self.config.fetch_timeout)
            .await
            .map_err(|message| {
                self.metrics.fetch_failure();
                TileError {
                    tile_id: tile_id.clone(),
                    stage: TileStage::Fetch,
                    message,
                }
            })?;

        let image = TileImage {
            tile_id: tile_id.clone(),
            data,
        };

        let detections = self
            .detect_stage(image, self.config.detect_timeout)
            .await
            .map_err(|message| {
                self.metrics.detect_failure();
                TileError {
                    tile_id: tile_id.clone(),
                    stage: TileStage::Detect,
                    message,
                }
            })?;

        let outcome = self
            .config
            .projection
            .reproject(&detections, &tile, grid, viewport);

        Ok(TileOutcome {
            tile_id,
            markers: outcome.markers,
            rejected: outcome.rejected,
            artifacts: TileArtifacts {
                annotated: detections.annotated_image,
                incoming: detections.incoming_image,
            },
        })
    }

    async fn fetch_stage(
        &self,
        tile: &Tile,
        zoom: u8,
        limit: Duration,
    ) -> Result<Vec<u8>, String> {
        match timeout(
            limit,
            self.provider
                .fetch_image(tile.center, zoom, tile.width, tile.height),
        )
        .await
        {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("timed out after {:?}", limit)),
        }
    }

    async fn detect_stage(
        &self,
        image: TileImage,
        limit: Duration,
    ) -> Result<crate::detect::TileDetections, String> {
        match timeout(limit, self.detector.detect(image)).await {
            Ok(Ok(detections)) => Ok(detections),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("timed out after {:?}", limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{DetectError, PixelPoint, TileDetections};
    use crate::grid::TileSize;
    use crate::http::HttpError;
    use crate::provider::ProviderError;

    fn test_viewport() -> Viewport {
        Viewport::new(
            GeoPoint::new(47.02, -122.16),
            GeoPoint::new(47.0, -122.2),
            18,
            1280,
            1280,
        )
    }

    struct StaticProvider;

    impl ImageryProvider for StaticProvider {
        async fn fetch_image(
            &self,
            _center: GeoPoint,
            _zoom: u8,
            _width: u32,
            _height: u32,
        ) -> Result<Vec<u8>, ProviderError> {
            Ok(vec![0x89, 0x50, 0x4E, 0x47])
        }

        fn name(&self) -> &str {
            "static"
        }

        fn min_zoom(&self) -> u8 {
            0
        }

        fn max_zoom(&self) -> u8 {
            22
        }
    }

    struct FailingProvider;

    impl ImageryProvider for FailingProvider {
        async fn fetch_image(
            &self,
            _center: GeoPoint,
            _zoom: u8,
            _width: u32,
            _height: u32,
        ) -> Result<Vec<u8>, ProviderError> {
            Err(ProviderError::Http(HttpError::Status {
                status: 503,
                url: "http://imagery.test".to_string(),
            }))
        }

        fn name(&self) -> &str {
            "failing"
        }

        fn min_zoom(&self) -> u8 {
            0
        }

        fn max_zoom(&self) -> u8 {
            22
        }
    }

    /// Detector returning one fixed point per tile, optionally failing one
    /// tile and optionally sleeping first.
    struct ScriptedDetector {
        fail_tile: Option<String>,
        delay: Duration,
    }

    impl ScriptedDetector {
        fn ok() -> Self {
            Self {
                fail_tile: None,
                delay: Duration::ZERO,
            }
        }

        fn failing(tile_id: &str) -> Self {
            Self {
                fail_tile: Some(tile_id.to_string()),
                delay: Duration::ZERO,
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                fail_tile: None,
                delay,
            }
        }
    }

    impl Detector for ScriptedDetector {
        async fn detect(&self, image: TileImage) -> Result<TileDetections, DetectError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail_tile.as_deref() == Some(image.tile_id.as_str()) {
                return Err(DetectError::Http {
                    tile_id: image.tile_id,
                    source: HttpError::Status {
                        status: 500,
                        url: "http://detect.test".to_string(),
                    },
                });
            }
            Ok(TileDetections {
                tile_id: image.tile_id.clone(),
                points: vec![PixelPoint { x: 320.0, y: 320.0 }],
                annotated_image: Some("data:image/png;base64,QQ==".to_string()),
                incoming_image: Some("data:image/png;base64,Ug==".to_string()),
            })
        }
    }

    fn session(
        detector: ScriptedDetector,
    ) -> CaptureSession<StaticProvider, ScriptedDetector> {
        CaptureSession::new(StaticProvider, detector, CaptureConfig::default())
    }

    #[tokio::test]
    async fn test_full_run_merges_all_tiles() {
        let session = session(ScriptedDetector::ok());
        let summary = session.run(test_viewport()).await.unwrap();

        assert_eq!(summary.tiles_total, 4);
        assert_eq!(summary.tiles_succeeded, 4);
        assert_eq!(summary.tiles_failed, 0);
        assert_eq!(summary.markers_added, 4);
        assert!(!summary.superseded);

        let state = session.state();
        assert_eq!(state.marker_count(), 4);
        assert_eq!(state.images.len(), 4);
        assert!(state.viewport.is_some());
        assert!(state.images["0-0"].annotated.is_some());

        let metrics = session.metrics();
        assert_eq!(metrics.runs_started, 1);
        assert_eq!(metrics.tiles_succeeded, 4);
        assert_eq!(metrics.markers_placed, 4);
    }

    #[tokio::test]
    async fn test_failed_tile_is_isolated() {
        let session = session(ScriptedDetector::failing("1-0"));
        let summary = session.run(test_viewport()).await.unwrap();

        assert_eq!(summary.tiles_succeeded, 3);
        assert_eq!(summary.tiles_failed, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].tile_id, "1-0");
        assert_eq!(summary.failures[0].stage, TileStage::Detect);

        let state = session.state();
        assert_eq!(state.marker_count(), 3);
        assert!(!state.images.contains_key("1-0"));
        assert_eq!(session.metrics().detect_failures, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_reported_per_tile() {
        let session = CaptureSession::new(
            FailingProvider,
            ScriptedDetector::ok(),
            CaptureConfig::default(),
        );
        let summary = session.run(test_viewport()).await.unwrap();

        assert_eq!(summary.tiles_succeeded, 0);
        assert_eq!(summary.tiles_failed, 4);
        assert!(summary
            .failures
            .iter()
            .all(|f| f.stage == TileStage::Fetch));
        assert_eq!(session.metrics().fetch_failures, 4);

        // The run still replaced state: empty results, viewport recorded.
        let state = session.state();
        assert_eq!(state.marker_count(), 0);
        assert!(state.viewport.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_detect_timeout_fails_tile() {
        let config = CaptureConfig::default().with_detect_timeout(Duration::from_secs(1));
        let session = CaptureSession::new(
            StaticProvider,
            ScriptedDetector::slow(Duration::from_secs(5)),
            config,
        );

        let summary = session.run(test_viewport()).await.unwrap();
        assert_eq!(summary.tiles_succeeded, 0);
        assert_eq!(summary.tiles_failed, 4);
        assert!(summary.failures[0].message.contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_run_supersedes_older() {
        let session = Arc::new(CaptureSession::new(
            StaticProvider,
            ScriptedDetector::slow(Duration::from_millis(50)),
            CaptureConfig::default(),
        ));

        let slow = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.run(test_viewport()).await })
        };

        // Let the slow run claim its generation before starting the next.
        tokio::time::sleep(Duration::from_millis(1)).await;

        // Shrink the viewport so the second run's grid is a single tile.
        let small = Viewport::new(
            GeoPoint::new(47.02, -122.16),
            GeoPoint::new(47.0, -122.2),
            18,
            640,
            640,
        );
        let fast_summary = session.run(small).await.unwrap();
        let slow_summary = slow.await.unwrap().unwrap();

        assert!(!fast_summary.superseded);
        assert!(slow_summary.superseded);

        // Only the fast run's single tile is visible.
        let state = session.state();
        assert_eq!(state.images.len(), 1);
        assert_eq!(state.marker_count(), 1);
        assert_eq!(session.metrics().runs_superseded, 1);
    }

    #[tokio::test]
    async fn test_clear_discards_results() {
        let session = session(ScriptedDetector::ok());
        session.run(test_viewport()).await.unwrap();
        assert!(!session.state().is_empty());

        session.clear();
        assert!(session.state().is_empty());

        // Idempotent.
        session.clear();
        assert!(session.state().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_supersedes_running_capture() {
        let session = Arc::new(CaptureSession::new(
            StaticProvider,
            ScriptedDetector::slow(Duration::from_millis(50)),
            CaptureConfig::default(),
        ));

        let running = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.run(test_viewport()).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;
        session.clear();

        let summary = running.await.unwrap().unwrap();
        assert!(summary.superseded);
        assert!(session.state().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_viewport_rejected() {
        let session = session(ScriptedDetector::ok());
        let inverted = Viewport::new(
            GeoPoint::new(47.0, -122.2),
            GeoPoint::new(47.02, -122.16),
            18,
            1280,
            1280,
        );

        let result = session.run(inverted).await;
        assert!(matches!(result, Err(CaptureError::InvalidViewport(_))));
        assert!(session.state().is_empty());
    }

    #[tokio::test]
    async fn test_run_replaces_previous_results() {
        let session = session(ScriptedDetector::ok());
        session.run(test_viewport()).await.unwrap();
        assert_eq!(session.state().marker_count(), 4);

        // A second capture of a single-tile viewport replaces, not appends.
        let small = Viewport::new(
            GeoPoint::new(47.02, -122.16),
            GeoPoint::new(47.0, -122.2),
            18,
            640,
            640,
        );
        session.run(small).await.unwrap();

        let state = session.state();
        assert_eq!(state.marker_count(), 1);
        assert_eq!(state.images.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_limit_respected() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct CountingDetector {
            in_flight: AtomicUsize,
            peak: AtomicUsize,
        }

        impl Detector for CountingDetector {
            async fn detect(&self, image: TileImage) -> Result<TileDetections, DetectError> {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(TileDetections {
                    tile_id: image.tile_id,
                    points: vec![],
                    annotated_image: None,
                    incoming_image: None,
                })
            }
        }

        let config = CaptureConfig::default()
            .with_tile_size(TileSize::square(320))
            .with_max_concurrent_tiles(2);
        let session = CaptureSession::new(
            StaticProvider,
            CountingDetector {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            },
            config,
        );

        // 4x4 grid of 16 tiles.
        let summary = session.run(test_viewport()).await.unwrap();
        assert_eq!(summary.tiles_total, 16);
        assert!(session.detector.peak.load(Ordering::SeqCst) <= 2);
    }
}
