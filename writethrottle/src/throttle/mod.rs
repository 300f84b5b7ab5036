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

//! Write throttling.
//!
//! This module bounds the outbound write queue of a session and of the
//! service that owns it. When a producer writes faster than the network can
//! drain, [`WriteThrottleFilter`] applies one of the
//! [`WriteThrottlePolicy`] actions.
//!
//! # Policies
//!
//! - [`Off`](WriteThrottlePolicy::Off): No evaluation at all
//! - [`Log`](WriteThrottlePolicy::Log): Rate-limited warning, write proceeds (default)
//! - [`Block`](WriteThrottlePolicy::Block): Producer waits until the queue drains
//! - [`LogAndBlock`](WriteThrottlePolicy::LogAndBlock): Warning, then wait
//! - [`Exception`](WriteThrottlePolicy::Exception): Write is refused with
//!   [`WriteError::TooManyScheduledWrites`](crate::WriteError::TooManyScheduledWrites)
//!
//! # Examples
//!
//! ```rust
//! use writethrottle::filter::{NextFilter, WriteFilter, WriteRequest};
//! use writethrottle::session::{MemoryService, MemorySession, Session};
//! use writethrottle::throttle::{ThrottleSettings, WriteThrottleFilter, WriteThrottlePolicy};
//! use writethrottle::FilterError;
//! use std::sync::Arc;
//!
//! /// End of the pipeline: accepts everything.
//! struct Wire;
//!
//! impl NextFilter for Wire {
//!     fn filter_write(&self, _: &dyn Session, _: WriteRequest) -> Result<(), FilterError> {
//!         Ok(())
//!     }
//!     fn message_sent(&self, _: &dyn Session, _: &WriteRequest) -> Result<(), FilterError> {
//!         Ok(())
//!     }
//!     fn exception_caught(&self, _: &dyn Session, cause: FilterError) -> Result<(), FilterError> {
//!         Err(cause)
//!     }
//!     fn session_closed(&self, _: &dyn Session) -> Result<(), FilterError> {
//!         Ok(())
//!     }
//! }
//!
//! let filter = WriteThrottleFilter::new(
//!     ThrottleSettings::default()
//!         .with_policy(WriteThrottlePolicy::Exception)
//!         .with_limits(1, 0, 0, 0),
//! );
//! let session = MemorySession::new(Arc::new(MemoryService::new()));
//!
//! // Under the limit: the write goes through
//! filter.filter_write(&Wire, &session, WriteRequest::new(b"a".to_vec())).unwrap();
//!
//! // At the limit: the write is refused and handed back
//! session.schedule_write(1);
//! let error = filter
//!     .filter_write(&Wire, &session, WriteRequest::new(b"b".to_vec()))
//!     .unwrap_err();
//! assert!(error.is_throttled());
//! assert_eq!(error.into_request().unwrap().message(), b"b");
//! ```

mod config;
mod filter;
mod log_gate;
mod metrics;
mod policy;
mod waiters;

pub use config::{
    DEFAULT_GLOBAL_MAX_SCHEDULED_WRITE_BYTES, DEFAULT_GLOBAL_MAX_SCHEDULED_WRITE_MESSAGES,
    DEFAULT_LOCAL_MAX_SCHEDULED_WRITE_BYTES, DEFAULT_LOCAL_MAX_SCHEDULED_WRITE_MESSAGES,
    DEFAULT_LOG_INTERVAL, ThrottleConfig, ThrottleLimits, ThrottleSettings,
};
pub use filter::WriteThrottleFilter;
pub use metrics::ThrottleMetrics;
pub use policy::WriteThrottlePolicy;
