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

//! The write throttle filter.

use super::WriteThrottlePolicy;
use super::config::{ThrottleConfig, ThrottleLimits, ThrottleSettings};
use super::log_gate::LogGate;
use super::metrics::{ThrottleCounters, ThrottleMetrics};
use super::waiters::{BlockOutcome, Waiters};
use crate::error::{FilterError, WriteError};
use crate::filter::{NextFilter, WriteFilter, WriteRequest};
use crate::session::Session;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::warn;

#[cfg(feature = "observability")]
use tracing::{debug, instrument};

/// Applies a [`WriteThrottlePolicy`] to writes on sessions whose outbound
/// queues are over their limits.
///
/// A write is throttled when any configured limit is reached. The limits are
/// the messages or bytes scheduled on its session, or on the service that
/// owns the session. A limit of 0 is unlimited. A session that is closing is
/// never throttled, so shutdown cannot deadlock on a full queue.
///
/// Blocked producers are woken whenever a message is sent, an error passes
/// through the filter, or a session closes. The wakeup is broadcast to every
/// blocked producer on this filter, and each one re-checks its own session.
///
/// Without a block timeout, a producer blocked on a session that stalls
/// without ever being marked closing waits forever.
///
/// # Examples
///
/// ```rust
/// use writethrottle::throttle::{ThrottleSettings, WriteThrottleFilter, WriteThrottlePolicy};
/// use writethrottle::session::{MemoryService, MemorySession};
/// use std::sync::Arc;
///
/// let filter = WriteThrottleFilter::new(
///     ThrottleSettings::default()
///         .with_policy(WriteThrottlePolicy::Exception)
///         .with_limits(2, 0, 0, 0),
/// );
///
/// let session = MemorySession::new(Arc::new(MemoryService::new()));
/// session.schedule_write(10);
/// assert!(filter.is_ready(&session));
///
/// session.schedule_write(10);
/// assert!(!filter.is_ready(&session));
///
/// session.close();
/// assert!(filter.is_ready(&session));
/// ```
#[derive(Debug)]
pub struct WriteThrottleFilter {
    config: ThrottleConfig,
    log_gate: LogGate,
    waiters: Waiters,
    counters: ThrottleCounters,
}

impl WriteThrottleFilter {
    /// Creates a filter from settings.
    #[must_use]
    pub fn new(settings: ThrottleSettings) -> Self {
        Self {
            config: ThrottleConfig::new(&settings),
            log_gate: LogGate::new(),
            waiters: Waiters::new(),
            counters: ThrottleCounters::default(),
        }
    }

    /// Creates a filter with the given policy and default limits.
    #[must_use]
    pub fn with_policy(policy: WriteThrottlePolicy) -> Self {
        Self::new(ThrottleSettings::default().with_policy(policy))
    }

    /// The live configuration. Changes apply to the next write.
    #[must_use]
    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// The current policy.
    #[must_use]
    pub fn policy(&self) -> WriteThrottlePolicy {
        self.config.policy()
    }

    /// Returns `true` if a write on `session` is within every limit.
    ///
    /// Has no side effects and may be called from any thread.
    #[must_use]
    pub fn is_ready(&self, session: &dyn Session) -> bool {
        if session.is_closing() {
            return true;
        }

        let limits = self.config.limits();
        ThrottleLimits::within(session.scheduled_write_messages(), limits.local_messages)
            && ThrottleLimits::within(session.scheduled_write_bytes(), limits.local_bytes)
            && ThrottleLimits::within(
                session.service().scheduled_write_messages(),
                limits.global_messages,
            )
            && ThrottleLimits::within(
                session.service().scheduled_write_bytes(),
                limits.global_bytes,
            )
    }

    /// Wakes every producer blocked in this filter so each can re-check its
    /// session.
    pub fn wake(&self) {
        if self.waiters.wake() {
            self.counters.record_wakeup();
        }
    }

    /// Number of producers currently blocked in this filter.
    #[must_use]
    pub fn waiting_writers(&self) -> usize {
        self.waiters.count()
    }

    /// Returns a snapshot of throttling activity.
    #[must_use]
    pub fn metrics(&self) -> ThrottleMetrics {
        self.counters.snapshot(self.waiters.count())
    }

    /// Applies the policy to a throttled write, returning the request if it
    /// may proceed. Never called with [`WriteThrottlePolicy::Off`].
    fn enforce(
        &self,
        policy: WriteThrottlePolicy,
        session: &dyn Session,
        request: WriteRequest,
    ) -> Result<WriteRequest, FilterError> {
        self.counters.record_throttled();

        match policy {
            WriteThrottlePolicy::Off => unreachable!("Off is handled before enforcement"),
            WriteThrottlePolicy::Log => self.log(session),
            WriteThrottlePolicy::Block | WriteThrottlePolicy::LogAndBlock => {
                if policy.logs() {
                    self.log(session);
                }
                if let Err(waited) = self.block(session) {
                    self.counters.record_timed_out();
                    return Err(WriteError::BlockTimedOut {
                        request,
                        waited,
                        message: self.message(session),
                    }
                    .into());
                }
            }
            WriteThrottlePolicy::Exception => {
                self.counters.record_rejected();
                return Err(WriteError::TooManyScheduledWrites {
                    request,
                    message: self.message(session),
                }
                .into());
            }
        }

        Ok(request)
    }

    fn log(&self, session: &dyn Session) {
        let logged = self
            .log_gate
            .try_acquire(Instant::now(), self.config.log_interval());
        self.counters.record_warning(logged);
        if logged {
            warn!(session = %session.id(), "{}", self.message(session));
        }
    }

    /// Suspends the caller until `session` is ready. Returns how long it
    /// waited if a configured timeout expired first.
    #[cfg_attr(feature = "observability", instrument(skip_all, fields(session = %session.id())))]
    fn block(&self, session: &dyn Session) -> Result<(), Duration> {
        let start = Instant::now();

        #[cfg(feature = "observability")]
        debug!("Blocking writer until scheduled writes drain");

        let outcome = self
            .waiters
            .block_until(|| self.is_ready(session), self.config.block_timeout());
        let waited = start.elapsed();
        self.counters.record_blocked(waited);

        #[cfg(feature = "observability")]
        debug!(?waited, ?outcome, "Writer released");

        match outcome {
            BlockOutcome::Ready => Ok(()),
            BlockOutcome::TimedOut => Err(waited),
        }
    }

    fn message(&self, session: &dyn Session) -> String {
        let limits = self.config.limits();
        let service = session.service();
        format!(
            "Write requests flooded - local: {}, {}, global: {}, {}",
            Usage::new(session.scheduled_write_messages(), limits.local_messages, "msgs"),
            Usage::new(session.scheduled_write_bytes(), limits.local_bytes, "bytes"),
            Usage::new(service.scheduled_write_messages(), limits.global_messages, "msgs"),
            Usage::new(service.scheduled_write_bytes(), limits.global_bytes, "bytes"),
        )
    }
}

impl Default for WriteThrottleFilter {
    fn default() -> Self {
        Self::new(ThrottleSettings::default())
    }
}

impl WriteFilter for WriteThrottleFilter {
    fn name(&self) -> &str {
        "WriteThrottleFilter"
    }

    fn filter_write(
        &self,
        next: &dyn NextFilter,
        session: &dyn Session,
        request: WriteRequest,
    ) -> Result<(), FilterError> {
        let policy = self.config.policy();
        if policy == WriteThrottlePolicy::Off || self.is_ready(session) {
            return next.filter_write(session, request);
        }

        let request = self.enforce(policy, session, request)?;
        next.filter_write(session, request)
    }

    fn message_sent(
        &self,
        next: &dyn NextFilter,
        session: &dyn Session,
        request: &WriteRequest,
    ) -> Result<(), FilterError> {
        self.wake();
        next.message_sent(session, request)
    }

    fn exception_caught(
        &self,
        next: &dyn NextFilter,
        session: &dyn Session,
        cause: FilterError,
    ) -> Result<(), FilterError> {
        let _wake = WakeOnDrop(self);
        next.exception_caught(session, cause)
    }

    fn session_closed(
        &self,
        next: &dyn NextFilter,
        session: &dyn Session,
    ) -> Result<(), FilterError> {
        self.wake();
        next.session_closed(session)
    }
}

/// Wakes blocked producers when dropped, including during unwinding.
struct WakeOnDrop<'a>(&'a WriteThrottleFilter);

impl Drop for WakeOnDrop<'_> {
    fn drop(&mut self) {
        self.0.wake();
    }
}

/// `current / limit unit`, or `current / unlimited unit` for a zero limit.
struct Usage {
    current: u64,
    limit: u64,
    unit: &'static str,
}

impl Usage {
    fn new(current: u64, limit: u64, unit: &'static str) -> Self {
        Self {
            current,
            limit,
            unit,
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.limit == 0 {
            write!(f, "{} / unlimited {}", self.current, self.unit)
        } else {
            write!(f, "{} / {} {}", self.current, self.limit, self.unit)
        }
    }
}
