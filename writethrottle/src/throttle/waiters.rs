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

//! Blocked producer coordination.
//!
//! All producers blocked on one filter share a single condition variable.
//! A wakeup is broadcast to every waiter, whichever session drained, and
//! each waiter re-checks its own readiness before returning. Spurious
//! wakeups are absorbed the same way.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// How a blocking wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockOutcome {
    /// The readiness predicate returned `true`.
    Ready,
    /// The deadline passed while the predicate was still `false`.
    TimedOut,
}

/// The set of producers currently blocked inside a filter.
#[derive(Debug, Default)]
pub(crate) struct Waiters {
    count: Mutex<usize>,
    condvar: Condvar,
}

/// Keeps a producer counted as waiting for as long as it holds the lock or
/// sleeps on the condition. Dropping it uncounts the producer, even when the
/// readiness predicate panics.
struct Registration<'a> {
    guard: MutexGuard<'a, usize>,
}

impl<'a> Registration<'a> {
    fn new(mut guard: MutexGuard<'a, usize>) -> Self {
        *guard += 1;
        #[cfg(feature = "observability")]
        metrics::gauge!("writethrottle.waiters").increment(1.0);
        Self { guard }
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        *self.guard -= 1;
        #[cfg(feature = "observability")]
        metrics::gauge!("writethrottle.waiters").decrement(1.0);
    }
}

impl Waiters {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Blocks the calling thread until `ready` returns `true`.
    ///
    /// `ready` is evaluated with the lock held, so a [`wake`](Self::wake)
    /// issued after the state it observes has changed is never missed. With
    /// `timeout` set, gives up once the deadline passes and a final check
    /// still fails.
    pub(crate) fn block_until<F>(&self, ready: F, timeout: Option<Duration>) -> BlockOutcome
    where
        F: Fn() -> bool,
    {
        let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
        let mut registration = Registration::new(self.count.lock());

        loop {
            if ready() {
                return BlockOutcome::Ready;
            }
            match deadline {
                None => self.condvar.wait(&mut registration.guard),
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return BlockOutcome::TimedOut;
                    }
                    // A timed-out wait loops back for one last readiness check.
                    let _ = self
                        .condvar
                        .wait_until(&mut registration.guard, deadline);
                }
            }
        }
    }

    /// Wakes every blocked producer.
    ///
    /// Returns `true` if there was anyone to wake. The count is checked under
    /// the lock so a producer that is about to sleep cannot miss the signal.
    pub(crate) fn wake(&self) -> bool {
        let count = self.count.lock();
        if *count == 0 {
            return false;
        }
        self.condvar.notify_all();
        true
    }

    /// Number of producers currently blocked.
    pub(crate) fn count(&self) -> usize {
        *self.count.lock()
    }
}
