//! Rolling statistics over media segment downloads.
//!
//! Load times are kept over a bounded window and failures in a bounded
//! error log, so the stats stay cheap no matter how long a stream runs.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::Serialize;

use crate::protocol_constants::{SEGMENT_ERROR_LOG_CAPACITY, SEGMENT_LOAD_TIME_WINDOW};
use crate::utils::now_millis;

/// One failed segment download.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentError {
    /// URL of the segment that failed.
    pub url: String,
    /// Error message from the engine.
    pub message: String,
    /// HTTP status code, when the failure was an HTTP error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
}

/// Point-in-time view of the segment statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStatsSnapshot {
    /// Total segments downloaded successfully.
    pub segments_loaded: u64,
    /// Total segments that failed to download.
    pub segments_failed: u64,
    /// Total bytes downloaded.
    pub total_bytes: u64,
    /// Successful downloads as a percentage of all attempts.
    pub success_rate: f64,
    /// Failed downloads as a percentage of all attempts.
    pub error_rate: f64,
    /// Mean download time over the recent window, in milliseconds.
    pub average_load_time_ms: f64,
    /// Most recent failures, oldest first.
    pub recent_errors: Vec<SegmentError>,
}

#[derive(Default)]
struct StatsInner {
    loaded: u64,
    failed: u64,
    total_bytes: u64,
    load_times: VecDeque<u64>,
    errors: VecDeque<SegmentError>,
}

/// Tracks segment download health for the active stream.
#[derive(Default)]
pub struct SegmentStats {
    inner: Mutex<StatsInner>,
}

impl SegmentStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful segment download.
    pub fn record_loaded(&self, load_time_ms: u64, bytes: u64) {
        let mut inner = self.inner.lock();
        inner.loaded += 1;
        inner.total_bytes += bytes;
        inner.load_times.push_back(load_time_ms);
        while inner.load_times.len() > SEGMENT_LOAD_TIME_WINDOW {
            inner.load_times.pop_front();
        }
    }

    /// Records a failed segment download.
    pub fn record_failed(&self, url: &str, message: &str, status: Option<u16>) {
        let mut inner = self.inner.lock();
        inner.failed += 1;
        inner.errors.push_back(SegmentError {
            url: url.to_string(),
            message: message.to_string(),
            status,
            timestamp: now_millis(),
        });
        while inner.errors.len() > SEGMENT_ERROR_LOG_CAPACITY {
            inner.errors.pop_front();
        }
    }

    /// Clears all counters, typically on a source change.
    pub fn reset(&self) {
        *self.inner.lock() = StatsInner::default();
    }

    #[must_use]
    pub fn snapshot(&self) -> SegmentStatsSnapshot {
        let inner = self.inner.lock();
        let attempts = inner.loaded + inner.failed;
        let success_rate = if attempts == 0 {
            100.0
        } else {
            inner.loaded as f64 / attempts as f64 * 100.0
        };
        let error_rate = if attempts == 0 {
            0.0
        } else {
            inner.failed as f64 / attempts as f64 * 100.0
        };
        let average_load_time_ms = if inner.load_times.is_empty() {
            0.0
        } else {
            inner.load_times.iter().sum::<u64>() as f64 / inner.load_times.len() as f64
        };
        SegmentStatsSnapshot {
            segments_loaded: inner.loaded,
            segments_failed: inner.failed,
            total_bytes: inner.total_bytes,
            success_rate,
            error_rate,
            average_load_time_ms,
            recent_errors: inner.errors.iter().cloned().collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
