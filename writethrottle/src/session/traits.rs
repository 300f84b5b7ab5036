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

//! Write-queue accounting traits.
//!
//! The throttle never owns a queue. It only reads the scheduled-write
//! counters that a session and its owning service already maintain.

use super::SessionId;

/// Scheduled-write accounting for a service.
///
/// A service is the owner of many sessions. Its counters are the sum of
/// writes that have been scheduled on any of its sessions but not yet fully
/// written to the wire.
pub trait ServiceStats: Send + Sync {
    /// Number of messages scheduled for writing across all sessions.
    fn scheduled_write_messages(&self) -> u64;

    /// Number of bytes scheduled for writing across all sessions.
    fn scheduled_write_bytes(&self) -> u64;
}

/// A connection whose outbound writes pass through a filter.
///
/// Implementations update their counters asynchronously as the pipeline
/// drains the queue. Readers must tolerate stale values.
///
/// # Examples
///
/// ```rust
/// use writethrottle::session::{MemoryService, MemorySession, Session};
/// use std::sync::Arc;
///
/// let service = Arc::new(MemoryService::new());
/// let session = MemorySession::new(service);
///
/// session.schedule_write(128);
/// assert_eq!(session.scheduled_write_messages(), 1);
/// assert_eq!(session.service().scheduled_write_bytes(), 128);
/// ```
pub trait Session: Send + Sync {
    /// Identifier used to tag diagnostics.
    fn id(&self) -> SessionId;

    /// Returns `true` once the session has started closing.
    fn is_closing(&self) -> bool;

    /// Number of messages scheduled on this session but not yet written.
    fn scheduled_write_messages(&self) -> u64;

    /// Number of bytes scheduled on this session but not yet written.
    fn scheduled_write_bytes(&self) -> u64;

    /// The service that owns this session.
    fn service(&self) -> &dyn ServiceStats;
}
