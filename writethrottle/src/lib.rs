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

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! ## Architecture
//!
//! - **[`session`]**: Sessions, services and their scheduled-write counters
//! - **[`filter`]**: Pipeline hooks and write requests
//! - **[`throttle`]**: Threshold evaluation, policies and blocked-writer coordination
//! - **[`error`]**: Write, configuration and pipeline errors
//!
//! ## Features
//!
//! - **`serde`** (default): Serialize and deserialize [`throttle::ThrottleSettings`]
//! - **`observability`**: Trace blocking waits with `tracing` spans and export throttle
//!   counters, block times and the waiter gauge through the `metrics` crate

pub mod error;
pub mod filter;
pub mod session;
pub mod throttle;

pub use error::{ConfigError, FilterError, WriteError};
pub use filter::{NextFilter, WriteFilter, WriteRequest};
pub use session::{ServiceStats, Session, SessionId};
pub use throttle::{ThrottleSettings, WriteThrottleFilter, WriteThrottlePolicy};
