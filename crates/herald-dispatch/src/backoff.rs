// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry backoff policy.
//!
//! The next due-time is a pure function of the attempt count and the current
//! time, so two replicas computing a retry for the same item land on the
//! same score.

use herald_config::model::DispatchConfig;

/// Exponential backoff with an upper bound.
///
/// `delay = min(base * 2^(attempt - 1), max)`. A zero base degenerates to
/// immediate re-enqueue (catch-up retry on the next poll cycle).
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base_delay_ms: i64,
    pub max_delay_ms: i64,
}

impl BackoffPolicy {
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            base_delay_ms: (config.retry_base_delay_secs as i64).saturating_mul(1_000),
            max_delay_ms: (config.retry_max_delay_secs as i64).saturating_mul(1_000),
        }
    }

    /// Delay before the attempt numbered `attempt_count` becomes due.
    pub fn delay_ms(&self, attempt_count: u32) -> i64 {
        if self.base_delay_ms <= 0 || attempt_count == 0 {
            return 0;
        }
        // Cap the shift so the multiplication cannot wrap before saturating.
        let shift = (attempt_count - 1).min(32);
        self.base_delay_ms
            .saturating_mul(1_i64 << shift)
            .min(self.max_delay_ms)
    }

    /// Due-time score for a retry computed at `now_ms`.
    pub fn next_due_at_ms(&self, attempt_count: u32, now_ms: i64) -> i64 {
        now_ms.saturating_add(self.delay_ms(attempt_count))
    }
}

/// Milliseconds since the Unix epoch.
pub fn epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
