// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry request plumbing.
//!
//! The processor decides that an item should be retried; the mechanics of
//! re-enqueueing live here. Requests travel over a bounded mpsc channel, so
//! retry handling is asynchronous relative to the poll cycle that raised it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use herald_core::{QueueItem, RetryQueueStore};

use crate::backoff::{BackoffPolicy, epoch_ms};

/// A request to schedule one more delivery attempt for a campaign contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRequest {
    pub campaign_id: String,
    pub contact_id: String,
    pub tenant_id: String,
    /// Attempts completed so far, including the failure that raised this
    /// request. The handler increments before re-enqueueing.
    pub attempt_count: u32,
}

impl RetryRequest {
    pub fn for_item(item: &QueueItem) -> Self {
        Self {
            campaign_id: item.campaign_id.clone(),
            contact_id: item.contact_id.clone(),
            tenant_id: item.tenant_id.clone(),
            attempt_count: item.attempt_count,
        }
    }
}

/// Turns retry requests back into queue entries.
///
/// Failures to serialize or to reach the store are logged and swallowed:
/// this handler runs at the tail of the retry pipeline with no synchronous
/// caller able to act on an error.
pub struct RetryHandler {
    store: Arc<dyn RetryQueueStore>,
    queue_name: String,
    policy: BackoffPolicy,
}

impl RetryHandler {
    pub fn new(store: Arc<dyn RetryQueueStore>, queue_name: String, policy: BackoffPolicy) -> Self {
        Self {
            store,
            queue_name,
            policy,
        }
    }

    /// Consume retry requests until the channel closes or cancellation fires.
    pub async fn run(self, mut rx: mpsc::Receiver<RetryRequest>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("retry handler stopping");
                    // The processor already removed the queue entries behind
                    // these requests; schedule everything still buffered
                    // before exiting or those items are gone.
                    rx.close();
                    while let Some(request) = rx.recv().await {
                        self.handle(request).await;
                    }
                    break;
                }
                request = rx.recv() => {
                    match request {
                        Some(request) => self.handle(request).await,
                        None => {
                            debug!("retry channel closed");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Re-enqueue one item with its attempt counter advanced and a due-time
    /// computed by the backoff policy.
    pub async fn handle(&self, request: RetryRequest) {
        self.handle_at(request, epoch_ms()).await;
    }

    /// Like [`handle`](Self::handle) with an injected clock, for tests.
    pub async fn handle_at(&self, request: RetryRequest, now_ms: i64) {
        let item = QueueItem {
            campaign_id: request.campaign_id,
            contact_id: request.contact_id,
            tenant_id: request.tenant_id,
            attempt_count: request.attempt_count.saturating_add(1),
        };
        let due_at_ms = self.policy.next_due_at_ms(item.attempt_count, now_ms);

        if let Err(e) = self
            .store
            .enqueue(&self.queue_name, &item, due_at_ms)
            .await
        {
            // Best-effort by design: nothing upstream can react to this.
            warn!(
                campaign_id = %item.campaign_id,
                contact_id = %item.contact_id,
                error = %e,
                "failed to re-enqueue retry; dropping"
            );
        } else {
            debug!(
                campaign_id = %item.campaign_id,
                contact_id = %item.contact_id,
                attempt = item.attempt_count,
                due_at_ms,
                "retry scheduled"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_test_utils::MemoryQueue;

    fn policy(base_secs: u64) -> BackoffPolicy {
        BackoffPolicy {
            base_delay_ms: (base_secs as i64) * 1_000,
            max_delay_ms: 3_600_000,
        }
    }

    #[tokio::test]
    async fn handle_reenqueues_with_incremented_attempt_and_backoff() {
        let store = Arc::new(MemoryQueue::new());
        let handler = RetryHandler::new(store.clone(), "q".into(), policy(30));

        let item = QueueItem::new("c1", "p1", "t1");
        handler.handle_at(RetryRequest::for_item(&item), 1_000).await;

        let expected = item.next_attempt();
        assert_eq!(store.score_of("q", &expected).await, Some(31_000));
        assert_eq!(store.len("q").await, 1);
    }

    #[tokio::test]
    async fn run_drains_pending_requests_then_stops_on_channel_close() {
        let store = Arc::new(MemoryQueue::new());
        let handler = RetryHandler::new(store.clone(), "q".into(), policy(0));

        let (tx, rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let item = QueueItem::new("c1", "p1", "t1");
        tx.send(RetryRequest::for_item(&item)).await.unwrap();
        drop(tx);

        handler.run(rx, cancel).await;
        assert_eq!(store.len("q").await, 1);
    }

    #[tokio::test]
    async fn cancellation_drains_buffered_requests_before_stopping() {
        let store = Arc::new(MemoryQueue::new());
        let handler = RetryHandler::new(store.clone(), "q".into(), policy(0));

        let (tx, rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        tx.send(RetryRequest::for_item(&QueueItem::new("c1", "p1", "t1")))
            .await
            .unwrap();
        tx.send(RetryRequest::for_item(&QueueItem::new("c1", "p2", "t1")))
            .await
            .unwrap();
        cancel.cancel();

        tokio::time::timeout(std::time::Duration::from_secs(1), handler.run(rx, cancel))
            .await
            .expect("run should stop after draining");
        assert_eq!(store.len("q").await, 2);
    }

    #[tokio::test]
    async fn cancellation_stops_the_run_loop() {
        let store = Arc::new(MemoryQueue::new());
        let handler = RetryHandler::new(store, "q".into(), policy(0));

        let (_tx, rx) = mpsc::channel::<RetryRequest>(1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Returns promptly despite the open channel.
        tokio::time::timeout(std::time::Duration::from_secs(1), handler.run(rx, cancel))
            .await
            .expect("run should stop on cancellation");
    }
}
