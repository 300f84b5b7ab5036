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

//! Throttle policies.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// What to do with a write when the scheduled-write limits are exceeded.
///
/// # Examples
///
/// ```rust
/// use writethrottle::throttle::WriteThrottlePolicy;
///
/// let policy: WriteThrottlePolicy = "log_and_block".parse().unwrap();
/// assert_eq!(policy, WriteThrottlePolicy::LogAndBlock);
/// assert!(policy.logs());
/// assert!(policy.blocks());
///
/// assert_eq!(WriteThrottlePolicy::default(), WriteThrottlePolicy::Log);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[repr(u8)]
pub enum WriteThrottlePolicy {
    /// Never evaluate limits.
    Off = 0,
    /// Emit a rate-limited warning and let the write through.
    #[default]
    Log = 1,
    /// Suspend the writer until the queue drains below the limits.
    Block = 2,
    /// Warn, then block.
    LogAndBlock = 3,
    /// Refuse the write with
    /// [`TooManyScheduledWrites`](crate::WriteError::TooManyScheduledWrites).
    Exception = 4,
}

impl WriteThrottlePolicy {
    /// All policies in discriminant order.
    pub const ALL: [Self; 5] = [
        Self::Off,
        Self::Log,
        Self::Block,
        Self::LogAndBlock,
        Self::Exception,
    ];

    /// Returns the canonical name of this policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Log => "log",
            Self::Block => "block",
            Self::LogAndBlock => "log_and_block",
            Self::Exception => "exception",
        }
    }

    /// Returns `true` if a throttled write emits a warning.
    #[must_use]
    pub const fn logs(self) -> bool {
        matches!(self, Self::Log | Self::LogAndBlock)
    }

    /// Returns `true` if a throttled write suspends the caller.
    #[must_use]
    pub const fn blocks(self) -> bool {
        matches!(self, Self::Block | Self::LogAndBlock)
    }

    pub(crate) const fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::Log),
            2 => Some(Self::Block),
            3 => Some(Self::LogAndBlock),
            4 => Some(Self::Exception),
            _ => None,
        }
    }
}

impl fmt::Display for WriteThrottlePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteThrottlePolicy {
    type Err = ConfigError;

    /// Parses a policy name, ignoring case and accepting `-` for `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(ConfigError::MissingPolicy);
        }
        let normalized = name.to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == normalized)
            .ok_or_else(|| ConfigError::UnknownPolicy {
                name: name.to_string(),
            })
    }
}
