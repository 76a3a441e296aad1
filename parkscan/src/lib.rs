//! Parking-space detection over satellite imagery.
//!
//! parkscan captures a geographic viewport, splits it into a grid of tiles
//! sized for a detection service, fetches a static satellite image per tile,
//! submits each image for parking-space detection, and reprojects the
//! resulting pixel coordinates back into latitude/longitude markers.
//!
//! # Pipeline
//!
//! ```text
//! Viewport ──► TileGrid ──► ImageryProvider ──► Detector ──► Projection ──► AggregateState
//!  (coord)      (grid)        (provider)        (detect)     (reproject)     (aggregate)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use parkscan::aggregate::CaptureSession;
//! use parkscan::config::CaptureConfig;
//! use parkscan::coord::{GeoPoint, Viewport};
//! use parkscan::detect::HttpDetector;
//! use parkscan::http::AsyncReqwestClient;
//! use parkscan::provider::{ProviderConfig, ProviderFactory};
//!
//! let http_client = AsyncReqwestClient::new()?;
//! let provider = ProviderFactory::new(http_client.clone())
//!     .create(&ProviderConfig::azure("SUBSCRIPTION-KEY"));
//! let detector = HttpDetector::new(http_client, "http://127.0.0.1:5000/process-image");
//!
//! let session = CaptureSession::new(provider, detector, CaptureConfig::default());
//! let viewport = Viewport::new(
//!     GeoPoint::new(47.02, -122.16),
//!     GeoPoint::new(47.0, -122.2),
//!     18,
//!     1280,
//!     1280,
//! );
//! let summary = session.run(viewport).await?;
//! println!("{} markers", summary.markers_added);
//! ```

pub mod aggregate;
pub mod config;
pub mod coord;
pub mod detect;
pub mod grid;
pub mod http;
pub mod provider;
pub mod reproject;
pub mod telemetry;

pub use aggregate::{AggregateState, CaptureError, CaptureSession, RunSummary};
pub use config::CaptureConfig;
pub use coord::{GeoPoint, Viewport};
pub use grid::{TileGrid, TileSize};
pub use reproject::Projection;
