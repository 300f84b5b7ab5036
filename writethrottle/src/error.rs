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

//! Error types for the filter pipeline.
//!
//! Errors are split in three layers:
//!
//! 1. **Write errors** ([`WriteError`]): a specific write was refused. The
//!    rejected [`WriteRequest`] travels inside the error so the caller gets
//!    its payload back.
//! 2. **Configuration errors** ([`ConfigError`]): an invalid setting was
//!    rejected and the previous value stays in effect.
//! 3. **Pipeline errors** ([`FilterError`]): the top-level type every filter
//!    hook returns. It composes the two layers above with transport I/O
//!    failures and opaque errors from other filters.
//!
//! # Examples
//!
//! ```rust
//! use writethrottle::{FilterError, WriteError};
//! use writethrottle::filter::WriteRequest;
//! use std::io;
//!
//! let throttled: FilterError = WriteError::TooManyScheduledWrites {
//!     request: WriteRequest::new(b"hello".to_vec()),
//!     message: "flooded".to_string(),
//! }
//! .into();
//! assert!(throttled.is_throttled());
//!
//! let io_failure: FilterError = io::Error::new(io::ErrorKind::BrokenPipe, "reset").into();
//! assert!(!io_failure.is_throttled());
//! assert!(io_failure.is_io_error());
//! ```

use crate::filter::WriteRequest;
use std::error::Error as StdError;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// A write that was refused before reaching the next filter.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The session or its service had too many writes scheduled and the
    /// throttle policy is [`Exception`](crate::throttle::WriteThrottlePolicy::Exception).
    #[error("too many scheduled writes: {message}")]
    TooManyScheduledWrites {
        /// The rejected write
        request: WriteRequest,
        /// Diagnostic describing current and configured limits
        message: String,
    },

    /// A blocking policy with a bounded wait gave up before the queue
    /// drained below its limits.
    #[error("write blocked for {waited:?} without draining: {message}")]
    BlockTimedOut {
        /// The rejected write
        request: WriteRequest,
        /// How long the producer waited
        waited: Duration,
        /// Diagnostic describing current and configured limits
        message: String,
    },
}

impl WriteError {
    /// Returns the rejected write.
    #[must_use]
    pub fn request(&self) -> &WriteRequest {
        match self {
            Self::TooManyScheduledWrites { request, .. } | Self::BlockTimedOut { request, .. } => {
                request
            }
        }
    }

    /// Consumes the error and returns the rejected write.
    #[must_use]
    pub fn into_request(self) -> WriteRequest {
        match self {
            Self::TooManyScheduledWrites { request, .. } | Self::BlockTimedOut { request, .. } => {
                request
            }
        }
    }

    /// Returns the diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::TooManyScheduledWrites { message, .. } | Self::BlockTimedOut { message, .. } => {
                message
            }
        }
    }

    /// Returns `true` if this error came from a bounded blocking wait.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::BlockTimedOut { .. })
    }
}

/// Invalid throttle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No policy was supplied.
    #[error("write throttle policy must be set")]
    MissingPolicy,

    /// The policy name did not match any known policy.
    #[error("unknown write throttle policy '{name}'")]
    UnknownPolicy {
        /// The name that failed to parse
        name: String,
    },
}

/// Top-level error returned by filter hooks.
///
/// Throttling failures are kept apart from transport failures so callers
/// can tell "the queue was too full" from "the connection broke".
#[derive(Debug, Error)]
pub enum FilterError {
    /// A write was refused by a filter.
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// A configuration change was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The underlying transport failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// Any other error raised further down the pipeline.
    #[error("filter error: {0}")]
    Other(Box<dyn StdError + Send + Sync>),
}

impl FilterError {
    /// Returns `true` if the throttle refused a write outright because too
    /// many writes were scheduled.
    ///
    /// A blocking wait that gave up is not counted here; see
    /// [`is_timeout`](Self::is_timeout).
    #[must_use]
    pub const fn is_throttled(&self) -> bool {
        matches!(self, Self::Write(WriteError::TooManyScheduledWrites { .. }))
    }

    /// Returns `true` if a blocked write gave up after its block timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Write(WriteError::BlockTimedOut { .. }))
    }

    /// Returns `true` if this is a write error of either kind.
    #[must_use]
    pub const fn is_write_error(&self) -> bool {
        matches!(self, Self::Write(_))
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns `true` if this is a transport I/O error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Returns the write error, if this is one.
    #[must_use]
    pub const fn as_write_error(&self) -> Option<&WriteError> {
        match self {
            Self::Write(e) => Some(e),
            _ => None,
        }
    }

    /// Consumes the error and returns the rejected write, if any.
    #[must_use]
    pub fn into_request(self) -> Option<WriteRequest> {
        match self {
            Self::Write(e) => Some(e.into_request()),
            _ => None,
        }
    }
}
