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

//! Session identifiers.

use std::fmt;

/// Identifies a session within the service that owns it.
///
/// The service assigns ids as it accepts sessions, so an id is only
/// meaningful next to its service. Ids carry no ordering; they exist to tag
/// throttle warnings so an operator can tell which connection was flooding
/// its write queue.
///
/// # Example
///
/// ```rust
/// use writethrottle::session::SessionId;
///
/// let id = SessionId::from_raw(42);
/// assert_eq!(id.as_u64(), 42);
/// assert_eq!(id.to_string(), "session-42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct SessionId(u64);

impl SessionId {
    /// Wraps a raw id handed out by a service.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        assert_eq!(SessionId::from_raw(7).as_u64(), 7);
        assert_eq!(SessionId::from_raw(7), SessionId::from_raw(7));
        assert_ne!(SessionId::from_raw(7), SessionId::from_raw(8));
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionId::from_raw(7).to_string(), "session-7");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&SessionId::from_raw(9)).unwrap();
        assert_eq!(json, "9");
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SessionId::from_raw(9));
    }
}
