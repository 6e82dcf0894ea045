//! C12: Performance Tracker. Per-operation counts and elapsed time.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Default, Clone, Copy)]
struct OpStats {
    count: u64,
    total_ms: u128,
}

pub struct Tracker {
    stats: Mutex<HashMap<&'static str, OpStats>>,
}

impl Tracker {
    pub fn new() -> Self {
        Self {
            stats: Mutex::new(HashMap::new()),
        }
    }

    pub async fn record(&self, operation: &'static str, elapsed: Duration) {
        let mut stats = self.stats.lock().await;
        let entry = stats.entry(operation).or_default();
        entry.count += 1;
        entry.total_ms += elapsed.as_millis();
    }

    /// Log a summary line per tracked operation (count, mean elapsed ms).
    pub async fn log_summary(&self, total_duration: Duration) {
        let stats = self.stats.lock().await;
        tracing::info!(total_ms = total_duration.as_millis(), "crawl finished");
        for (operation, op_stats) in stats.iter() {
            let mean_ms = if op_stats.count > 0 {
                op_stats.total_ms as f64 / op_stats.count as f64
            } else {
                0.0
            };
            tracing::info!(
                operation,
                count = op_stats.count,
                mean_ms,
                "performance summary"
            );
        }
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accumulates_count_and_total() {
        let tracker = Tracker::new();
        tracker.record("page_crawl", Duration::from_millis(100)).await;
        tracker.record("page_crawl", Duration::from_millis(300)).await;

        let stats = tracker.stats.lock().await;
        let page_crawl = stats.get("page_crawl").unwrap();
        assert_eq!(page_crawl.count, 2);
        assert_eq!(page_crawl.total_ms, 400);
    }
}
