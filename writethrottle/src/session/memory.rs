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

//! In-memory session accounting.
//!
//! This module provides atomic-counter implementations of [`Session`] and
//! [`ServiceStats`]. They are useful for testing, benchmarking and for
//! embedding the throttle in pipelines that keep their own queues.

use super::{ServiceStats, Session, SessionId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// In-memory service accounting shared by many [`MemorySession`]s.
///
/// # Examples
///
/// ```rust
/// use writethrottle::session::{MemoryService, MemorySession, ServiceStats};
/// use std::sync::Arc;
///
/// let service = Arc::new(MemoryService::new());
/// let a = MemorySession::new(service.clone());
/// let b = MemorySession::new(service.clone());
///
/// a.schedule_write(10);
/// b.schedule_write(20);
/// assert_eq!(service.scheduled_write_messages(), 2);
/// assert_eq!(service.scheduled_write_bytes(), 30);
/// ```
#[derive(Debug, Default)]
pub struct MemoryService {
    messages: AtomicU64,
    bytes: AtomicU64,
    last_session_id: AtomicU64,
}

impl MemoryService {
    /// Creates a service with empty write queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next id for a session accepted by this service.
    fn next_session_id(&self) -> SessionId {
        SessionId::from_raw(self.last_session_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn add(&self, bytes: u64) {
        self.messages.fetch_add(1, Ordering::AcqRel);
        self.bytes.fetch_add(bytes, Ordering::AcqRel);
    }

    fn sub(&self, bytes: u64) {
        saturating_sub(&self.messages, 1);
        saturating_sub(&self.bytes, bytes);
    }
}

impl ServiceStats for MemoryService {
    fn scheduled_write_messages(&self) -> u64 {
        self.messages.load(Ordering::Acquire)
    }

    fn scheduled_write_bytes(&self) -> u64 {
        self.bytes.load(Ordering::Acquire)
    }
}

/// In-memory session with atomic scheduled-write counters.
///
/// Scheduling or completing a write updates both the session and its
/// service, the same way a real connection's bookkeeping would.
///
/// # Examples
///
/// ```rust
/// use writethrottle::session::{MemoryService, MemorySession, Session};
/// use std::sync::Arc;
///
/// let session = MemorySession::new(Arc::new(MemoryService::new()));
/// session.schedule_write(64);
/// session.schedule_write(64);
/// session.complete_write(64);
///
/// assert_eq!(session.scheduled_write_messages(), 1);
/// assert_eq!(session.scheduled_write_bytes(), 64);
///
/// session.close();
/// assert!(session.is_closing());
/// ```
#[derive(Debug)]
pub struct MemorySession {
    id: SessionId,
    service: Arc<MemoryService>,
    messages: AtomicU64,
    bytes: AtomicU64,
    closing: AtomicBool,
}

impl MemorySession {
    /// Creates a new open session owned by `service`, which assigns its id.
    #[must_use]
    pub fn new(service: Arc<MemoryService>) -> Self {
        Self {
            id: service.next_session_id(),
            service,
            messages: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            closing: AtomicBool::new(false),
        }
    }

    /// Records a write of `bytes` as scheduled but not yet sent.
    pub fn schedule_write(&self, bytes: u64) {
        self.messages.fetch_add(1, Ordering::AcqRel);
        self.bytes.fetch_add(bytes, Ordering::AcqRel);
        self.service.add(bytes);
    }

    /// Records that a previously scheduled write of `bytes` finished sending.
    ///
    /// Counters saturate at zero.
    pub fn complete_write(&self, bytes: u64) {
        saturating_sub(&self.messages, 1);
        saturating_sub(&self.bytes, bytes);
        self.service.sub(bytes);
    }

    /// Marks the session as closing.
    pub fn close(&self) {
        self.closing.store(true, Ordering::Release);
    }

    /// Returns the owning service.
    #[must_use]
    pub fn memory_service(&self) -> &Arc<MemoryService> {
        &self.service
    }
}

impl Session for MemorySession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }

    fn scheduled_write_messages(&self) -> u64 {
        self.messages.load(Ordering::Acquire)
    }

    fn scheduled_write_bytes(&self) -> u64 {
        self.bytes.load(Ordering::Acquire)
    }

    fn service(&self) -> &dyn ServiceStats {
        self.service.as_ref()
    }
}

fn saturating_sub(counter: &AtomicU64, amount: u64) {
    // fetch_update only fails when the closure returns None, which it never does
    let _ = counter.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
        Some(current.saturating_sub(amount))
    });
}
