//! Capture run telemetry.
//!
//! Metrics collection and reporting for the detection pipeline, using
//! lock-free atomic counters so pipeline stages can record events without
//! contending on the aggregate state lock.
//!
//! # Architecture
//!
//! ```text
//! Pipeline Stages ─────► CaptureMetrics ─────► MetricsSnapshot ─────► Views
//!                        (atomic counters)    (point-in-time copy)    (CLI, etc.)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use parkscan::telemetry::CaptureMetrics;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(CaptureMetrics::new());
//!
//! metrics.run_started();
//! metrics.tile_dispatched();
//! metrics.tile_succeeded();
//! metrics.markers_placed(12);
//!
//! let snapshot = metrics.snapshot();
//! println!("Tiles ok: {}/{}", snapshot.tiles_succeeded, snapshot.tiles_dispatched);
//! ```

mod metrics;
mod snapshot;

pub use metrics::CaptureMetrics;
pub use snapshot::MetricsSnapshot;
