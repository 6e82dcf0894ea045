//! C8: Rate Governor. Adaptive per-request delay driven by observed
//! timeouts (§4.8).

use crate::model::synthetic_status;
use tokio::sync::Mutex;
use tokio::time::Duration;

struct GovernorState {
    current_delay_ms: u64,
    consecutive_timeouts: u32,
}

/// Adaptive (or fixed) per-request delay.
pub struct RateGovernor {
    baseline_ms: u64,
    adaptive: bool,
    state: Mutex<GovernorState>,
}

const ADAPTIVE_CAP_MS: u64 = 5_000;
const TIMEOUT_THRESHOLD: u32 = 3;

impl RateGovernor {
    pub fn new(baseline_ms: u64, adaptive: bool) -> Self {
        Self {
            baseline_ms,
            adaptive,
            state: Mutex::new(GovernorState {
                current_delay_ms: baseline_ms,
                consecutive_timeouts: 0,
            }),
        }
    }

    /// Sleep for the current delay; cancellable by racing against `cancelled`.
    pub async fn wait(&self, cancelled: &tokio_util::sync::CancellationToken) {
        let delay_ms = self.state.lock().await.current_delay_ms;
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
            _ = cancelled.cancelled() => {}
        }
    }

    /// Update delay state after observing a fetch's status code.
    pub async fn record_outcome(&self, status_code: u16) {
        if !self.adaptive {
            return;
        }

        let mut state = self.state.lock().await;
        if status_code == synthetic_status::TIMEOUT {
            state.consecutive_timeouts += 1;
            if state.consecutive_timeouts > TIMEOUT_THRESHOLD {
                state.current_delay_ms = (state.current_delay_ms * 2).min(ADAPTIVE_CAP_MS);
            }
        } else {
            state.consecutive_timeouts = 0;
            if state.current_delay_ms > self.baseline_ms {
                state.current_delay_ms = (state.current_delay_ms / 2).max(self.baseline_ms);
            }
        }
    }

    #[cfg(test)]
    pub async fn current_delay_ms(&self) -> u64 {
        self.state.lock().await.current_delay_ms
    }
}
