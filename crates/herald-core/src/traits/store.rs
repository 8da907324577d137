// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry queue store and dead-letter sink contracts.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{QueueItem, ScoredEntry};

/// A durable, score-ordered set keyed by queue name.
///
/// Entries are serialized [`QueueItem`]s scored by their not-before
/// timestamp (milliseconds since epoch). The store is the only shared
/// mutable resource in the dispatch path; `fetch_due` and `remove` are
/// deliberately separate steps, so a crash between fetch and processing
/// re-delivers the entry on the next poll (at-least-once).
#[async_trait]
pub trait RetryQueueStore: Send + Sync + 'static {
    /// Inserts the item with the given due-time score.
    ///
    /// Re-inserting the same serialized item updates its score rather than
    /// appending a duplicate (sorted-set add-or-update semantics).
    async fn enqueue(
        &self,
        queue: &str,
        item: &QueueItem,
        due_at_ms: i64,
    ) -> Result<(), HeraldError>;

    /// Returns entries with `score <= now_ms`, ascending by score, capped at
    /// `limit`. Must not remove entries as a side effect.
    async fn fetch_due(
        &self,
        queue: &str,
        now_ms: i64,
        limit: usize,
    ) -> Result<Vec<ScoredEntry>, HeraldError>;

    /// Removes the exact serialized entry. Removing a non-existent entry is
    /// a no-op, not an error (tolerates concurrent double-processing).
    async fn remove(&self, queue: &str, entry: &ScoredEntry) -> Result<(), HeraldError>;
}

/// Permanent archive for items that exhausted their retry budget.
#[async_trait]
pub trait DeadLetterSink: Send + Sync + 'static {
    /// Archives one item with its final failure reason.
    async fn archive(&self, item: &QueueItem, reason: &str) -> Result<(), HeraldError>;
}
