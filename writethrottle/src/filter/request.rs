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

//! Outbound write requests.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique write request IDs.
static NEXT_WRITE_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// A unique identifier for a write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WriteRequestId(u64);

impl WriteRequestId {
    fn next() -> Self {
        Self(NEXT_WRITE_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the ID as a u64.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// A message on its way to the wire.
///
/// Filters take requests by value. A filter that refuses a write hands the
/// request back inside its error.
///
/// # Examples
///
/// ```rust
/// use writethrottle::filter::WriteRequest;
///
/// let request = WriteRequest::new(b"ping".to_vec());
/// assert_eq!(request.len(), 4);
/// assert_eq!(request.message(), b"ping");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    id: WriteRequestId,
    message: Vec<u8>,
}

impl WriteRequest {
    /// Creates a request with a fresh ID.
    pub fn new(message: impl Into<Vec<u8>>) -> Self {
        Self {
            id: WriteRequestId::next(),
            message: message.into(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn id(&self) -> WriteRequestId {
        self.id
    }

    /// Returns the encoded message.
    #[must_use]
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Returns the message length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.message.len()
    }

    /// Returns `true` if the message is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
    }

    /// Consumes the request and returns the message.
    #[must_use]
    pub fn into_message(self) -> Vec<u8> {
        self.message
    }
}

impl fmt::Display for WriteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WriteRequest({}, {} bytes)", self.id.0, self.message.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = WriteRequest::new(vec![]);
        let b = WriteRequest::new(vec![]);
        assert_ne!(a.id(), b.id());
        assert!(a.id() < b.id());
    }

    #[test]
    fn test_accessors() {
        let request = WriteRequest::new(b"abc".to_vec());
        assert_eq!(request.len(), 3);
        assert!(!request.is_empty());
        assert!(WriteRequest::new(Vec::new()).is_empty());
        assert!(request.to_string().ends_with("3 bytes)"));
    }
}
