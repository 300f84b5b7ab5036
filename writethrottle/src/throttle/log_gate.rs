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

//! Log-flood suppression.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Admits at most one warning per interval.
///
/// The lock is separate from the one used for blocking producers, so a
/// burst of throttled writers contending here never delays a wakeup.
#[derive(Debug, Default)]
pub(crate) struct LogGate {
    last_logged: Mutex<Option<Instant>>,
}

impl LogGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a warning may be emitted at `now`, recording `now`
    /// as the last warning time.
    ///
    /// The first call always succeeds. Later calls succeed only once strictly
    /// more than `interval` has passed since the last admitted warning.
    pub(crate) fn try_acquire(&self, now: Instant, interval: Duration) -> bool {
        let mut last = self.last_logged.lock();
        match *last {
            Some(previous) if now.saturating_duration_since(previous) <= interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}
