//! Point-in-time view of the capture metrics.

/// A consistent-enough copy of all counters for display.
///
/// Each field is loaded independently, so a snapshot taken mid-run may be a
/// tick ahead on one counter relative to another; totals converge once the
/// run settles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Capture runs started.
    pub runs_started: u64,
    /// Runs whose results were discarded by a newer run or a clear.
    pub runs_superseded: u64,
    /// Tiles handed to the pipeline.
    pub tiles_dispatched: u64,
    /// Tiles that completed all stages.
    pub tiles_succeeded: u64,
    /// Tiles dropped by a stage failure.
    pub tiles_failed: u64,
    /// Imagery fetch failures.
    pub fetch_failures: u64,
    /// Detection service failures.
    pub detect_failures: u64,
    /// Markers accepted into the aggregate state.
    pub markers_placed: u64,
    /// Reprojected markers dropped as out of range.
    pub markers_rejected: u64,
}

impl MetricsSnapshot {
    /// Fraction of dispatched tiles that succeeded, or 1.0 before any
    /// dispatch.
    pub fn success_rate(&self) -> f64 {
        if self.tiles_dispatched == 0 {
            1.0
        } else {
            self.tiles_succeeded as f64 / self.tiles_dispatched as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_empty() {
        assert_eq!(MetricsSnapshot::default().success_rate(), 1.0);
    }

    #[test]
    fn test_success_rate_partial() {
        let snapshot = MetricsSnapshot {
            tiles_dispatched: 4,
            tiles_succeeded: 3,
            tiles_failed: 1,
            ..Default::default()
        };
        assert!((snapshot.success_rate() - 0.75).abs() < 1e-12);
    }
}
