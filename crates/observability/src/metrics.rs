use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Wall-clock and monotonic start of the process.
#[derive(Debug, Clone, Copy)]
pub struct ProcessClock {
    started: Instant,
    started_at: DateTime<Utc>,
}

impl ProcessClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn snapshot(&self) -> ProcessMetrics {
        ProcessMetrics {
            started_at: self.started_at,
            uptime_seconds: self.uptime().as_secs(),
            timestamp: Utc::now().timestamp(),
            available_parallelism: std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

impl Default for ProcessClock {
    fn default() -> Self {
        Self::start()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessMetrics {
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    /// Unix seconds at snapshot time.
    pub timestamp: i64,
    pub available_parallelism: usize,
}
