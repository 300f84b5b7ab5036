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

//! Throttle configuration.
//!
//! [`ThrottleSettings`] is a plain value used to construct a filter or to
//! load settings from a config file. [`ThrottleConfig`] is the live
//! configuration owned by a filter. Every field is an independent atomic so
//! producer threads can read it without locking while an operator changes
//! it. There is no cross-field snapshot: an evaluation racing with two
//! setters may observe one new limit and one old limit.

use super::WriteThrottlePolicy;
use crate::error::ConfigError;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Duration;

/// Default per-session message limit.
pub const DEFAULT_LOCAL_MAX_SCHEDULED_WRITE_MESSAGES: u64 = 4096;

/// Default per-session byte limit (64 KiB).
pub const DEFAULT_LOCAL_MAX_SCHEDULED_WRITE_BYTES: u64 = 65536;

/// Default per-service message limit.
pub const DEFAULT_GLOBAL_MAX_SCHEDULED_WRITE_MESSAGES: u64 = 131_072;

/// Default per-service byte limit (128 MiB).
pub const DEFAULT_GLOBAL_MAX_SCHEDULED_WRITE_BYTES: u64 = 128 * 1024 * 1024;

/// Default minimum interval between two throttle warnings.
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_millis(3000);

/// Sentinel stored in place of `None` for the block timeout.
const NO_TIMEOUT: u64 = u64::MAX;

/// Settings used to build a [`WriteThrottleFilter`](super::WriteThrottleFilter).
///
/// Limits are signed so that negative values from a config file are
/// accepted and clamped to 0, meaning unlimited.
///
/// # Examples
///
/// ```rust
/// use writethrottle::throttle::{ThrottleSettings, WriteThrottlePolicy};
///
/// // Use default configuration
/// let settings = ThrottleSettings::default();
/// assert_eq!(settings.policy, WriteThrottlePolicy::Log);
///
/// // Customize configuration
/// let settings = ThrottleSettings::default()
///     .with_policy(WriteThrottlePolicy::Block)
///     .with_local_max_scheduled_write_messages(16)
///     .with_global_max_scheduled_write_bytes(0);
/// assert_eq!(settings.local_max_scheduled_write_messages, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ThrottleSettings {
    /// Action taken when a write is throttled.
    ///
    /// Default: [`WriteThrottlePolicy::Log`]
    pub policy: WriteThrottlePolicy,

    /// Maximum messages scheduled on one session. 0 means unlimited.
    ///
    /// Default: 4096
    pub local_max_scheduled_write_messages: i64,

    /// Maximum bytes scheduled on one session. 0 means unlimited.
    ///
    /// Default: 64 KiB
    pub local_max_scheduled_write_bytes: i64,

    /// Maximum messages scheduled across the owning service. 0 means unlimited.
    ///
    /// Default: 131072
    pub global_max_scheduled_write_messages: i64,

    /// Maximum bytes scheduled across the owning service. 0 means unlimited.
    ///
    /// Default: 128 MiB
    pub global_max_scheduled_write_bytes: i64,

    /// Minimum interval between two throttle warnings from one filter.
    ///
    /// Default: 3 seconds
    pub log_interval: Duration,

    /// Upper bound on how long a blocking policy waits.
    ///
    /// `None` waits until the queue drains or the session closes, however
    /// long that takes.
    ///
    /// Default: None
    pub block_timeout: Option<Duration>,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            policy: WriteThrottlePolicy::default(),
            local_max_scheduled_write_messages: DEFAULT_LOCAL_MAX_SCHEDULED_WRITE_MESSAGES as i64,
            local_max_scheduled_write_bytes: DEFAULT_LOCAL_MAX_SCHEDULED_WRITE_BYTES as i64,
            global_max_scheduled_write_messages: DEFAULT_GLOBAL_MAX_SCHEDULED_WRITE_MESSAGES as i64,
            global_max_scheduled_write_bytes: DEFAULT_GLOBAL_MAX_SCHEDULED_WRITE_BYTES as i64,
            log_interval: DEFAULT_LOG_INTERVAL,
            block_timeout: None,
        }
    }
}

impl ThrottleSettings {
    /// Creates settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy.
    #[must_use]
    pub fn with_policy(mut self, policy: WriteThrottlePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets all four limits at once.
    #[must_use]
    pub fn with_limits(
        mut self,
        local_messages: i64,
        local_bytes: i64,
        global_messages: i64,
        global_bytes: i64,
    ) -> Self {
        self.local_max_scheduled_write_messages = local_messages;
        self.local_max_scheduled_write_bytes = local_bytes;
        self.global_max_scheduled_write_messages = global_messages;
        self.global_max_scheduled_write_bytes = global_bytes;
        self
    }

    /// Sets the per-session message limit.
    #[must_use]
    pub fn with_local_max_scheduled_write_messages(mut self, max: i64) -> Self {
        self.local_max_scheduled_write_messages = max;
        self
    }

    /// Sets the per-session byte limit.
    #[must_use]
    pub fn with_local_max_scheduled_write_bytes(mut self, max: i64) -> Self {
        self.local_max_scheduled_write_bytes = max;
        self
    }

    /// Sets the per-service message limit.
    #[must_use]
    pub fn with_global_max_scheduled_write_messages(mut self, max: i64) -> Self {
        self.global_max_scheduled_write_messages = max;
        self
    }

    /// Sets the per-service byte limit.
    #[must_use]
    pub fn with_global_max_scheduled_write_bytes(mut self, max: i64) -> Self {
        self.global_max_scheduled_write_bytes = max;
        self
    }

    /// Sets the warning interval.
    #[must_use]
    pub fn with_log_interval(mut self, interval: Duration) -> Self {
        self.log_interval = interval;
        self
    }

    /// Sets an upper bound on blocking waits.
    #[must_use]
    pub fn with_block_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.block_timeout = timeout;
        self
    }
}

/// The four limits as read for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleLimits {
    /// Per-session message limit, 0 for unlimited
    pub local_messages: u64,
    /// Per-session byte limit, 0 for unlimited
    pub local_bytes: u64,
    /// Per-service message limit, 0 for unlimited
    pub global_messages: u64,
    /// Per-service byte limit, 0 for unlimited
    pub global_bytes: u64,
}

impl ThrottleLimits {
    /// Returns `true` if `current` is within `limit`, where 0 is unlimited.
    #[must_use]
    pub const fn within(current: u64, limit: u64) -> bool {
        limit == 0 || current < limit
    }
}

/// Live throttle configuration shared by every producer.
///
/// # Examples
///
/// ```rust
/// use writethrottle::throttle::{ThrottleConfig, ThrottleSettings, WriteThrottlePolicy};
///
/// let config = ThrottleConfig::new(&ThrottleSettings::default());
///
/// config.set_local_max_scheduled_write_messages(-1);
/// assert_eq!(config.local_max_scheduled_write_messages(), 0);
///
/// assert!(config.set_policy_name("bogus").is_err());
/// assert_eq!(config.policy(), WriteThrottlePolicy::Log);
/// ```
#[derive(Debug)]
pub struct ThrottleConfig {
    policy: AtomicU8,
    local_max_messages: AtomicU64,
    local_max_bytes: AtomicU64,
    global_max_messages: AtomicU64,
    global_max_bytes: AtomicU64,
    log_interval_nanos: AtomicU64,
    block_timeout_nanos: AtomicU64,
}

impl ThrottleConfig {
    /// Creates a live configuration from settings, clamping negative limits.
    #[must_use]
    pub fn new(settings: &ThrottleSettings) -> Self {
        let config = Self {
            policy: AtomicU8::new(settings.policy.as_u8()),
            local_max_messages: AtomicU64::new(0),
            local_max_bytes: AtomicU64::new(0),
            global_max_messages: AtomicU64::new(0),
            global_max_bytes: AtomicU64::new(0),
            log_interval_nanos: AtomicU64::new(0),
            block_timeout_nanos: AtomicU64::new(NO_TIMEOUT),
        };
        config.apply(settings);
        config
    }

    /// Replaces every field with the values from `settings`.
    ///
    /// Fields are stored one at a time; a concurrent evaluation may see a
    /// mix of old and new values.
    pub fn apply(&self, settings: &ThrottleSettings) {
        self.set_policy(settings.policy);
        self.set_local_max_scheduled_write_messages(settings.local_max_scheduled_write_messages);
        self.set_local_max_scheduled_write_bytes(settings.local_max_scheduled_write_bytes);
        self.set_global_max_scheduled_write_messages(settings.global_max_scheduled_write_messages);
        self.set_global_max_scheduled_write_bytes(settings.global_max_scheduled_write_bytes);
        self.set_log_interval(settings.log_interval);
        self.set_block_timeout(settings.block_timeout);
    }

    /// Returns the current values as settings.
    #[must_use]
    pub fn snapshot(&self) -> ThrottleSettings {
        ThrottleSettings {
            policy: self.policy(),
            local_max_scheduled_write_messages: to_signed(
                self.local_max_scheduled_write_messages(),
            ),
            local_max_scheduled_write_bytes: to_signed(self.local_max_scheduled_write_bytes()),
            global_max_scheduled_write_messages: to_signed(
                self.global_max_scheduled_write_messages(),
            ),
            global_max_scheduled_write_bytes: to_signed(self.global_max_scheduled_write_bytes()),
            log_interval: self.log_interval(),
            block_timeout: self.block_timeout(),
        }
    }

    /// Returns the current policy.
    ///
    /// # Panics
    ///
    /// Panics if the stored discriminant is not a known policy. Only
    /// [`set_policy`](Self::set_policy) writes it, so this cannot happen.
    #[must_use]
    pub fn policy(&self) -> WriteThrottlePolicy {
        let raw = self.policy.load(Ordering::Relaxed);
        match WriteThrottlePolicy::from_u8(raw) {
            Some(policy) => policy,
            None => unreachable!("invalid write throttle policy discriminant {raw}"),
        }
    }

    /// Sets the policy.
    pub fn set_policy(&self, policy: WriteThrottlePolicy) {
        self.policy.store(policy.as_u8(), Ordering::Relaxed);
    }

    /// Sets the policy, rejecting `None` and keeping the current policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingPolicy`] if `policy` is `None`.
    pub fn try_set_policy(&self, policy: Option<WriteThrottlePolicy>) -> Result<(), ConfigError> {
        let policy = policy.ok_or(ConfigError::MissingPolicy)?;
        self.set_policy(policy);
        Ok(())
    }

    /// Sets the policy by name, keeping the current policy on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingPolicy`] for an empty name and
    /// [`ConfigError::UnknownPolicy`] for an unrecognized one.
    pub fn set_policy_name(&self, name: &str) -> Result<(), ConfigError> {
        self.set_policy(name.parse()?);
        Ok(())
    }

    /// Per-session message limit, 0 for unlimited.
    #[must_use]
    pub fn local_max_scheduled_write_messages(&self) -> u64 {
        self.local_max_messages.load(Ordering::Relaxed)
    }

    /// Sets the per-session message limit. Negative values mean unlimited.
    pub fn set_local_max_scheduled_write_messages(&self, max: i64) {
        self.local_max_messages.store(clamp(max), Ordering::Relaxed);
    }

    /// Per-session byte limit, 0 for unlimited.
    #[must_use]
    pub fn local_max_scheduled_write_bytes(&self) -> u64 {
        self.local_max_bytes.load(Ordering::Relaxed)
    }

    /// Sets the per-session byte limit. Negative values mean unlimited.
    pub fn set_local_max_scheduled_write_bytes(&self, max: i64) {
        self.local_max_bytes.store(clamp(max), Ordering::Relaxed);
    }

    /// Per-service message limit, 0 for unlimited.
    #[must_use]
    pub fn global_max_scheduled_write_messages(&self) -> u64 {
        self.global_max_messages.load(Ordering::Relaxed)
    }

    /// Sets the per-service message limit. Negative values mean unlimited.
    pub fn set_global_max_scheduled_write_messages(&self, max: i64) {
        self.global_max_messages.store(clamp(max), Ordering::Relaxed);
    }

    /// Per-service byte limit, 0 for unlimited.
    #[must_use]
    pub fn global_max_scheduled_write_bytes(&self) -> u64 {
        self.global_max_bytes.load(Ordering::Relaxed)
    }

    /// Sets the per-service byte limit. Negative values mean unlimited.
    pub fn set_global_max_scheduled_write_bytes(&self, max: i64) {
        self.global_max_bytes.store(clamp(max), Ordering::Relaxed);
    }

    /// Reads each limit exactly once.
    #[must_use]
    pub fn limits(&self) -> ThrottleLimits {
        ThrottleLimits {
            local_messages: self.local_max_scheduled_write_messages(),
            local_bytes: self.local_max_scheduled_write_bytes(),
            global_messages: self.global_max_scheduled_write_messages(),
            global_bytes: self.global_max_scheduled_write_bytes(),
        }
    }

    /// Minimum interval between two throttle warnings.
    #[must_use]
    pub fn log_interval(&self) -> Duration {
        Duration::from_nanos(self.log_interval_nanos.load(Ordering::Relaxed))
    }

    /// Sets the minimum interval between two throttle warnings.
    pub fn set_log_interval(&self, interval: Duration) {
        self.log_interval_nanos
            .store(to_nanos(interval), Ordering::Relaxed);
    }

    /// Upper bound on blocking waits, `None` for unbounded.
    #[must_use]
    pub fn block_timeout(&self) -> Option<Duration> {
        match self.block_timeout_nanos.load(Ordering::Relaxed) {
            NO_TIMEOUT => None,
            nanos => Some(Duration::from_nanos(nanos)),
        }
    }

    /// Sets the upper bound on blocking waits.
    pub fn set_block_timeout(&self, timeout: Option<Duration>) {
        let nanos = timeout.map_or(NO_TIMEOUT, to_nanos);
        self.block_timeout_nanos.store(nanos, Ordering::Relaxed);
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self::new(&ThrottleSettings::default())
    }
}

fn clamp(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn to_signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// Saturates below the sentinel so a huge timeout never reads back as None.
fn to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos())
        .unwrap_or(NO_TIMEOUT - 1)
        .min(NO_TIMEOUT - 1)
}
