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

//! Sessions and their write-queue accounting.
//!
//! A [`Session`] reports how many messages and bytes are scheduled on it,
//! and exposes the [`ServiceStats`] of the service that owns it. The
//! throttle reads these counters; it never modifies them.
//!
//! [`MemorySession`] and [`MemoryService`] are atomic-counter
//! implementations for tests and embedded use.

mod id;
mod memory;
mod traits;

pub use id::SessionId;
pub use memory::{MemoryService, MemorySession};
pub use traits::{ServiceStats, Session};
