//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Throttle metrics.
//!
//! Activity is counted in atomics read back through [`ThrottleMetrics`].
//! With the `observability` feature, every event is also exported to the
//! `metrics` crate under the `writethrottle.` prefix.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A point-in-time view of a filter's throttling activity.
///
/// These metrics provide visibility into flow control behavior and can be
/// used for monitoring and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThrottleMetrics {
    /// Writes that found the session over a limit
    pub throttled_writes: u64,

    /// Warnings emitted
    pub warnings_logged: u64,

    /// Warnings skipped by log-flood suppression
    pub warnings_suppressed: u64,

    /// Writes that entered a blocking wait
    pub blocked_writes: u64,

    /// Writes refused under the exception policy
    pub rejected_writes: u64,

    /// Writes refused because a bounded wait expired
    pub timed_out_writes: u64,

    /// Wake broadcasts that reached at least one waiter
    pub wakeups: u64,

    /// Producers blocked when the snapshot was taken
    pub current_waiters: usize,

    /// Total time spent blocked (milliseconds)
    pub block_time_ms: u64,
}

impl ThrottleMetrics {
    /// Returns `true` if any producer is currently blocked.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.current_waiters > 0
    }

    /// Writes refused for any reason.
    #[must_use]
    pub const fn failed_writes(&self) -> u64 {
        self.rejected_writes + self.timed_out_writes
    }

    /// Average time a blocked write waited, in milliseconds.
    #[must_use]
    pub fn average_block_time_ms(&self) -> f64 {
        if self.blocked_writes == 0 {
            0.0
        } else {
            self.block_time_ms as f64 / self.blocked_writes as f64
        }
    }
}

/// Atomic counters behind [`ThrottleMetrics`].
#[derive(Debug, Default)]
pub(crate) struct ThrottleCounters {
    throttled_writes: AtomicU64,
    warnings_logged: AtomicU64,
    warnings_suppressed: AtomicU64,
    blocked_writes: AtomicU64,
    rejected_writes: AtomicU64,
    timed_out_writes: AtomicU64,
    wakeups: AtomicU64,
    block_time_ms: AtomicU64,
}

impl ThrottleCounters {
    pub(crate) fn record_throttled(&self) {
        self.throttled_writes.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("writethrottle.throttled_writes").increment(1);
    }

    pub(crate) fn record_warning(&self, logged: bool) {
        if logged {
            self.warnings_logged.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "observability")]
            metrics::counter!("writethrottle.warnings_logged").increment(1);
        } else {
            self.warnings_suppressed.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "observability")]
            metrics::counter!("writethrottle.warnings_suppressed").increment(1);
        }
    }

    pub(crate) fn record_blocked(&self, waited: Duration) {
        self.blocked_writes.fetch_add(1, Ordering::Relaxed);
        let millis = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX);
        self.block_time_ms.fetch_add(millis, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        {
            metrics::counter!("writethrottle.blocked_writes").increment(1);
            metrics::histogram!("writethrottle.block_time.ms")
                .record(waited.as_secs_f64() * 1000.0);
        }
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected_writes.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("writethrottle.rejected_writes").increment(1);
    }

    pub(crate) fn record_timed_out(&self) {
        self.timed_out_writes.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("writethrottle.timed_out_writes").increment(1);
    }

    pub(crate) fn record_wakeup(&self) {
        self.wakeups.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("writethrottle.wakeups").increment(1);
    }

    pub(crate) fn snapshot(&self, current_waiters: usize) -> ThrottleMetrics {
        ThrottleMetrics {
            throttled_writes: self.throttled_writes.load(Ordering::Relaxed),
            warnings_logged: self.warnings_logged.load(Ordering::Relaxed),
            warnings_suppressed: self.warnings_suppressed.load(Ordering::Relaxed),
            blocked_writes: self.blocked_writes.load(Ordering::Relaxed),
            rejected_writes: self.rejected_writes.load(Ordering::Relaxed),
            timed_out_writes: self.timed_out_writes.load(Ordering::Relaxed),
            wakeups: self.wakeups.load(Ordering::Relaxed),
            current_waiters,
            block_time_ms: self.block_time_ms.load(Ordering::Relaxed),
        }
    }
}
