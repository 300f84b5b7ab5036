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

//! Filter pipeline traits.

use super::WriteRequest;
use crate::error::FilterError;
use crate::session::Session;

/// The remainder of the pipeline after the current filter.
///
/// The hosting pipeline supplies an implementation when it invokes a
/// [`WriteFilter`]. Writes travel toward the wire; sent, exception and
/// closed events travel back toward the application.
pub trait NextFilter: Send + Sync {
    /// Passes a write to the next stage.
    fn filter_write(&self, session: &dyn Session, request: WriteRequest)
    -> Result<(), FilterError>;

    /// Passes a sent notification to the next stage.
    fn message_sent(&self, session: &dyn Session, request: &WriteRequest)
    -> Result<(), FilterError>;

    /// Passes a pipeline error to the next stage.
    fn exception_caught(&self, session: &dyn Session, cause: FilterError)
    -> Result<(), FilterError>;

    /// Passes a closed notification to the next stage.
    fn session_closed(&self, session: &dyn Session) -> Result<(), FilterError>;
}

/// A stage in the write pipeline.
///
/// Every hook forwards unchanged by default, so a filter only overrides the
/// events it cares about.
///
/// # Examples
///
/// ```rust
/// use writethrottle::filter::{NextFilter, WriteFilter, WriteRequest};
/// use writethrottle::session::Session;
/// use writethrottle::FilterError;
///
/// /// Drops empty writes and forwards everything else.
/// struct SkipEmpty;
///
/// impl WriteFilter for SkipEmpty {
///     fn name(&self) -> &str {
///         "SkipEmpty"
///     }
///
///     fn filter_write(
///         &self,
///         next: &dyn NextFilter,
///         session: &dyn Session,
///         request: WriteRequest,
///     ) -> Result<(), FilterError> {
///         if request.is_empty() {
///             return Ok(());
///         }
///         next.filter_write(session, request)
///     }
/// }
/// ```
pub trait WriteFilter: Send + Sync {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Called for every outbound write.
    fn filter_write(
        &self,
        next: &dyn NextFilter,
        session: &dyn Session,
        request: WriteRequest,
    ) -> Result<(), FilterError> {
        next.filter_write(session, request)
    }

    /// Called once a write has been fully sent.
    fn message_sent(
        &self,
        next: &dyn NextFilter,
        session: &dyn Session,
        request: &WriteRequest,
    ) -> Result<(), FilterError> {
        next.message_sent(session, request)
    }

    /// Called when a stage of the pipeline failed.
    fn exception_caught(
        &self,
        next: &dyn NextFilter,
        session: &dyn Session,
        cause: FilterError,
    ) -> Result<(), FilterError> {
        next.exception_caught(session, cause)
    }

    /// Called when the session has closed.
    fn session_closed(
        &self,
        next: &dyn NextFilter,
        session: &dyn Session,
    ) -> Result<(), FilterError> {
        next.session_closed(session)
    }
}
