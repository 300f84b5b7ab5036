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

//! Shared pipeline fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use writethrottle::filter::{NextFilter, WriteRequest, WriteRequestId};
use writethrottle::session::Session;
use writethrottle::FilterError;

/// End of the pipeline that records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingNext {
    writes: Mutex<Vec<WriteRequestId>>,
    sent: AtomicUsize,
    exceptions: Mutex<Vec<String>>,
    closed: AtomicUsize,
    fail_exceptions: AtomicBool,
}

impl RecordingNext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `exception_caught` return the cause instead of swallowing it.
    pub fn failing_exceptions() -> Self {
        let next = Self::default();
        next.fail_exceptions.store(true, Ordering::SeqCst);
        next
    }

    pub fn writes(&self) -> Vec<WriteRequestId> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn exceptions(&self) -> Vec<String> {
        self.exceptions.lock().unwrap().clone()
    }

    pub fn closed_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl NextFilter for RecordingNext {
    fn filter_write(
        &self,
        _session: &dyn Session,
        request: WriteRequest,
    ) -> Result<(), FilterError> {
        self.writes.lock().unwrap().push(request.id());
        Ok(())
    }

    fn message_sent(
        &self,
        _session: &dyn Session,
        _request: &WriteRequest,
    ) -> Result<(), FilterError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn exception_caught(
        &self,
        _session: &dyn Session,
        cause: FilterError,
    ) -> Result<(), FilterError> {
        self.exceptions.lock().unwrap().push(cause.to_string());
        if self.fail_exceptions.load(Ordering::SeqCst) {
            Err(cause)
        } else {
            Ok(())
        }
    }

    fn session_closed(&self, _session: &dyn Session) -> Result<(), FilterError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A request with `len` zero bytes.
pub fn request(len: usize) -> WriteRequest {
    WriteRequest::new(vec![0u8; len])
}
