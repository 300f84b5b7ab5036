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

//! Integration tests for producers blocked by the throttle.

mod common;

use common::{RecordingNext, request};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use writethrottle::filter::WriteFilter;
use writethrottle::session::{MemoryService, MemorySession};
use writethrottle::throttle::{ThrottleSettings, WriteThrottleFilter, WriteThrottlePolicy};
use writethrottle::{FilterError, WriteError};

const RELEASE_TIMEOUT: Duration = Duration::from_secs(5);

fn blocking_filter(policy: WriteThrottlePolicy, local_messages: i64) -> Arc<WriteThrottleFilter> {
    Arc::new(WriteThrottleFilter::new(
        ThrottleSettings::default()
            .with_policy(policy)
            .with_limits(local_messages, 0, 0, 0),
    ))
}

/// Issues one write on a blocking-pool thread.
fn spawn_writer(
    filter: &Arc<WriteThrottleFilter>,
    next: &Arc<RecordingNext>,
    session: &Arc<MemorySession>,
) -> JoinHandle<Result<(), FilterError>> {
    let filter = filter.clone();
    let next = next.clone();
    let session = session.clone();
    tokio::task::spawn_blocking(move || {
        filter.filter_write(next.as_ref(), session.as_ref(), request(16))
    })
}

async fn wait_for_waiters(filter: &WriteThrottleFilter, expected: usize) {
    timeout(RELEASE_TIMEOUT, async {
        while filter.waiting_writers() != expected {
            sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("producers never blocked");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_block_released_by_message_sent() {
    let filter = blocking_filter(WriteThrottlePolicy::Block, 5);
    let next = Arc::new(RecordingNext::new());
    let session = Arc::new(MemorySession::new(Arc::new(MemoryService::new())));
    for _ in 0..5 {
        session.schedule_write(16);
    }

    let writer = spawn_writer(&filter, &next, &session);
    wait_for_waiters(&filter, 1).await;
    assert_eq!(next.write_count(), 0);

    // A sent event without any drain wakes the producer, which blocks again.
    filter.message_sent(next.as_ref(), session.as_ref(), &request(16)).unwrap();
    sleep(Duration::from_millis(20)).await;
    assert!(!writer.is_finished());
    assert_eq!(filter.waiting_writers(), 1);

    session.complete_write(16);
    filter.message_sent(next.as_ref(), session.as_ref(), &request(16)).unwrap();

    timeout(RELEASE_TIMEOUT, writer)
        .await
        .expect("producer was not released")
        .unwrap()
        .unwrap();
    assert_eq!(next.write_count(), 1);
    assert_eq!(next.sent_count(), 2);
    assert_eq!(filter.waiting_writers(), 0);

    let metrics = filter.metrics();
    assert_eq!(metrics.throttled_writes, 1);
    assert_eq!(metrics.blocked_writes, 1);
    assert_eq!(metrics.wakeups, 2);
    assert_eq!(metrics.warnings_logged, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_one_wake_releases_every_ready_producer() {
    let filter = blocking_filter(WriteThrottlePolicy::Block, 1);
    let next = Arc::new(RecordingNext::new());
    let session = Arc::new(MemorySession::new(Arc::new(MemoryService::new())));
    session.schedule_write(16);

    let writers: Vec<_> = (0..3)
        .map(|_| spawn_writer(&filter, &next, &session))
        .collect();
    wait_for_waiters(&filter, 3).await;

    session.complete_write(16);
    filter.message_sent(next.as_ref(), session.as_ref(), &request(16)).unwrap();

    for writer in writers {
        timeout(RELEASE_TIMEOUT, writer)
            .await
            .expect("producer was not released")
            .unwrap()
            .unwrap();
    }
    assert_eq!(next.write_count(), 3);
    assert_eq!(filter.metrics().wakeups, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_woken_producer_rechecks_its_own_session() {
    let filter = blocking_filter(WriteThrottlePolicy::Block, 1);
    let next = Arc::new(RecordingNext::new());
    let service = Arc::new(MemoryService::new());
    let drained = Arc::new(MemorySession::new(service.clone()));
    let stalled = Arc::new(MemorySession::new(service.clone()));
    drained.schedule_write(16);
    stalled.schedule_write(16);

    let released = spawn_writer(&filter, &next, &drained);
    let still_blocked = spawn_writer(&filter, &next, &stalled);
    wait_for_waiters(&filter, 2).await;

    // One broadcast wakes both; only the drained session is ready.
    drained.complete_write(16);
    filter.message_sent(next.as_ref(), drained.as_ref(), &request(16)).unwrap();

    timeout(RELEASE_TIMEOUT, released)
        .await
        .expect("producer was not released")
        .unwrap()
        .unwrap();
    wait_for_waiters(&filter, 1).await;
    sleep(Duration::from_millis(20)).await;
    assert!(!still_blocked.is_finished());
    assert_eq!(next.write_count(), 1);

    // Closing the stalled session releases its producer.
    stalled.close();
    filter.session_closed(next.as_ref(), stalled.as_ref()).unwrap();

    timeout(RELEASE_TIMEOUT, still_blocked)
        .await
        .expect("producer was not released on close")
        .unwrap()
        .unwrap();
    assert_eq!(next.write_count(), 2);
    assert_eq!(next.closed_count(), 1);
    assert_eq!(filter.waiting_writers(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_exception_wakes_even_when_forwarding_fails() {
    let filter = blocking_filter(WriteThrottlePolicy::Block, 1);
    let next = Arc::new(RecordingNext::failing_exceptions());
    let session = Arc::new(MemorySession::new(Arc::new(MemoryService::new())));
    session.schedule_write(16);

    let writer = spawn_writer(&filter, &next, &session);
    wait_for_waiters(&filter, 1).await;

    // The queue drains as part of a failure, with no sent event.
    session.complete_write(16);
    let error = filter
        .exception_caught(
            next.as_ref(),
            session.as_ref(),
            std::io::Error::other("connection reset").into(),
        )
        .unwrap_err();
    assert!(error.is_io_error());

    timeout(RELEASE_TIMEOUT, writer)
        .await
        .expect("producer was not released by exception")
        .unwrap()
        .unwrap();
    assert_eq!(next.exceptions().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_log_and_block_warns_then_waits() {
    let filter = blocking_filter(WriteThrottlePolicy::LogAndBlock, 2);
    let next = Arc::new(RecordingNext::new());
    let session = Arc::new(MemorySession::new(Arc::new(MemoryService::new())));
    session.schedule_write(16);
    session.schedule_write(16);

    let first = spawn_writer(&filter, &next, &session);
    let second = spawn_writer(&filter, &next, &session);
    wait_for_waiters(&filter, 2).await;
    assert_eq!(filter.metrics().warnings_logged, 1);
    assert_eq!(filter.metrics().warnings_suppressed, 1);

    session.complete_write(16);
    filter.message_sent(next.as_ref(), session.as_ref(), &request(16)).unwrap();

    for writer in [first, second] {
        timeout(RELEASE_TIMEOUT, writer)
            .await
            .expect("producer was not released")
            .unwrap()
            .unwrap();
    }
    assert_eq!(next.write_count(), 2);
    assert_eq!(filter.metrics().blocked_writes, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_block_timeout_returns_request() {
    let filter = Arc::new(WriteThrottleFilter::new(
        ThrottleSettings::default()
            .with_policy(WriteThrottlePolicy::Block)
            .with_limits(1, 0, 0, 0)
            .with_block_timeout(Some(Duration::from_millis(50))),
    ));
    let next = Arc::new(RecordingNext::new());
    let session = Arc::new(MemorySession::new(Arc::new(MemoryService::new())));
    session.schedule_write(16);

    let error = timeout(RELEASE_TIMEOUT, spawn_writer(&filter, &next, &session))
        .await
        .expect("bounded wait never returned")
        .unwrap()
        .unwrap_err();

    assert!(error.is_timeout());
    assert!(!error.is_throttled());
    match error {
        FilterError::Write(WriteError::BlockTimedOut {
            request,
            waited,
            message,
        }) => {
            assert_eq!(request.len(), 16);
            assert!(waited >= Duration::from_millis(50));
            assert!(message.contains("local: 1 / 1 msgs"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(next.write_count(), 0);
    assert_eq!(filter.waiting_writers(), 0);
    assert_eq!(filter.metrics().timed_out_writes, 1);
    assert_eq!(filter.metrics().failed_writes(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_relaxing_limit_then_waking_releases() {
    let filter = blocking_filter(WriteThrottlePolicy::Block, 1);
    let next = Arc::new(RecordingNext::new());
    let session = Arc::new(MemorySession::new(Arc::new(MemoryService::new())));
    session.schedule_write(16);

    let writer = spawn_writer(&filter, &next, &session);
    wait_for_waiters(&filter, 1).await;

    filter.config().set_local_max_scheduled_write_messages(0);
    filter.wake();

    timeout(RELEASE_TIMEOUT, writer)
        .await
        .expect("producer was not released")
        .unwrap()
        .unwrap();
    assert_eq!(next.write_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_producers_drain_to_completion() {
    let filter = blocking_filter(WriteThrottlePolicy::Block, 4);
    let next = Arc::new(RecordingNext::new());
    let session = Arc::new(MemorySession::new(Arc::new(MemoryService::new())));
    for _ in 0..4 {
        session.schedule_write(16);
    }

    let writers: Vec<_> = (0..16)
        .map(|_| spawn_writer(&filter, &next, &session))
        .collect();
    wait_for_waiters(&filter, 16).await;

    // Drain the queue one message at a time, as a transport would.
    for _ in 0..4 {
        session.complete_write(16);
        filter.message_sent(next.as_ref(), session.as_ref(), &request(16)).unwrap();
    }

    for writer in writers {
        timeout(RELEASE_TIMEOUT, writer)
            .await
            .expect("producer was not released")
            .unwrap()
            .unwrap();
    }
    assert_eq!(next.write_count(), 16);
    assert_eq!(filter.waiting_writers(), 0);
}
