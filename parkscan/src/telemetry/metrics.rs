//! Atomic counters recorded by pipeline stages.

use std::sync::atomic::{AtomicU64, Ordering};

use super::MetricsSnapshot;

/// Lock-free event counters for the capture pipeline.
///
/// Safe to share across tile tasks behind an `Arc`; every recording method
/// takes `&self`. Counters only grow; [`CaptureMetrics::snapshot`] takes a
/// point-in-time copy for display.
#[derive(Debug, Default)]
pub struct CaptureMetrics {
    runs_started: AtomicU64,
    runs_superseded: AtomicU64,
    tiles_dispatched: AtomicU64,
    tiles_succeeded: AtomicU64,
    tiles_failed: AtomicU64,
    fetch_failures: AtomicU64,
    detect_failures: AtomicU64,
    markers_placed: AtomicU64,
    markers_rejected: AtomicU64,
}

impl CaptureMetrics {
    /// Creates a new metrics collector with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start of a capture run.
    pub fn run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a run whose results were discarded because a newer run (or a
    /// clear) started before it finished.
    pub fn run_superseded(&self) {
        self.runs_superseded.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a tile handed to the fetch/detect pipeline.
    pub fn tile_dispatched(&self) {
        self.tiles_dispatched.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a tile that completed fetch, detection, and reprojection.
    pub fn tile_succeeded(&self) {
        self.tiles_succeeded.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a tile dropped by a stage failure.
    pub fn tile_failed(&self) {
        self.tiles_failed.fetch_add(1, Ordering::SeqCst);
    }

    /// Records an imagery fetch failure.
    pub fn fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a detection service failure.
    pub fn detect_failure(&self) {
        self.detect_failures.fetch_add(1, Ordering::SeqCst);
    }

    /// Records markers accepted into the aggregate state.
    pub fn markers_placed(&self, count: u64) {
        self.markers_placed.fetch_add(count, Ordering::SeqCst);
    }

    /// Records reprojected markers dropped for being out of range.
    pub fn markers_rejected(&self, count: u64) {
        self.markers_rejected.fetch_add(count, Ordering::SeqCst);
    }

    /// Takes a point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::SeqCst),
            runs_superseded: self.runs_superseded.load(Ordering::SeqCst),
            tiles_dispatched: self.tiles_dispatched.load(Ordering::SeqCst),
            tiles_succeeded: self.tiles_succeeded.load(Ordering::SeqCst),
            tiles_failed: self.tiles_failed.load(Ordering::SeqCst),
            fetch_failures: self.fetch_failures.load(Ordering::SeqCst),
            detect_failures: self.detect_failures.load(Ordering::SeqCst),
            markers_placed: self.markers_placed.load(Ordering::SeqCst),
            markers_rejected: self.markers_rejected.load(Ordering::SeqCst),
        }
    }
}
