// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementations of the store contracts.
//!
//! `MemoryQueue` mirrors the sorted-set semantics of the SQLite store
//! without any I/O, enabling deterministic processor tests with manual
//! clock injection.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use herald_core::{
    CampaignMessage, CampaignRepository, DeadLetterSink, HeraldError, QueueItem, RetryQueueStore,
    ScoredEntry,
};

/// In-memory score-ordered queue store.
#[derive(Default)]
pub struct MemoryQueue {
    // queue name -> payload -> score
    queues: Mutex<HashMap<String, HashMap<String, i64>>>,
    fail_fetches: Mutex<bool>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `fetch_due` calls fail, simulating a transient store
    /// outage.
    pub async fn set_fetch_error(&self, fail: bool) {
        *self.fail_fetches.lock().await = fail;
    }

    /// Total entries across all scores in the named queue.
    pub async fn len(&self, queue: &str) -> usize {
        self.queues
            .lock()
            .await
            .get(queue)
            .map_or(0, HashMap::len)
    }

    pub async fn is_empty(&self, queue: &str) -> bool {
        self.len(queue).await == 0
    }

    /// The score currently stored for an item, if present.
    pub async fn score_of(&self, queue: &str, item: &QueueItem) -> Option<i64> {
        let payload = item.encode().ok()?;
        self.queues
            .lock()
            .await
            .get(queue)
            .and_then(|entries| entries.get(&payload))
            .copied()
    }
}

#[async_trait]
impl RetryQueueStore for MemoryQueue {
    async fn enqueue(
        &self,
        queue: &str,
        item: &QueueItem,
        due_at_ms: i64,
    ) -> Result<(), HeraldError> {
        let payload = item.encode()?;
        self.queues
            .lock()
            .await
            .entry(queue.to_string())
            .or_default()
            .insert(payload, due_at_ms);
        Ok(())
    }

    async fn fetch_due(
        &self,
        queue: &str,
        now_ms: i64,
        limit: usize,
    ) -> Result<Vec<ScoredEntry>, HeraldError> {
        if *self.fail_fetches.lock().await {
            return Err(HeraldError::Store {
                source: "simulated store outage".into(),
            });
        }
        let queues = self.queues.lock().await;
        let mut due: Vec<ScoredEntry> = queues
            .get(queue)
            .into_iter()
            .flatten()
            .filter(|(_, score)| **score <= now_ms)
            .map(|(payload, score)| ScoredEntry {
                payload: payload.clone(),
                score: *score,
            })
            .collect();
        due.sort_by(|a, b| a.score.cmp(&b.score).then(a.payload.cmp(&b.payload)));
        due.truncate(limit);
        Ok(due)
    }

    async fn remove(&self, queue: &str, entry: &ScoredEntry) -> Result<(), HeraldError> {
        if let Some(entries) = self.queues.lock().await.get_mut(queue) {
            entries.remove(&entry.payload);
        }
        Ok(())
    }
}

/// In-memory dead-letter archive.
#[derive(Default)]
pub struct MemoryDeadLetters {
    records: Mutex<Vec<(QueueItem, String)>>,
}

impl MemoryDeadLetters {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<(QueueItem, String)> {
        self.records.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl DeadLetterSink for MemoryDeadLetters {
    async fn archive(&self, item: &QueueItem, reason: &str) -> Result<(), HeraldError> {
        self.records
            .lock()
            .await
            .push((item.clone(), reason.to_string()));
        Ok(())
    }
}

/// In-memory campaign repository keyed by (campaign, contact, tenant).
#[derive(Default)]
pub struct MemoryCampaigns {
    messages: Mutex<HashMap<(String, String, String), CampaignMessage>>,
    fail_resolves: Mutex<bool>,
}

impl MemoryCampaigns {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, item: &QueueItem, message: CampaignMessage) {
        self.messages.lock().await.insert(
            (
                item.campaign_id.clone(),
                item.contact_id.clone(),
                item.tenant_id.clone(),
            ),
            message,
        );
    }

    /// Make subsequent `resolve` calls fail.
    pub async fn set_resolve_error(&self, fail: bool) {
        *self.fail_resolves.lock().await = fail;
    }
}

#[async_trait]
impl CampaignRepository for MemoryCampaigns {
    async fn resolve(&self, item: &QueueItem) -> Result<Option<CampaignMessage>, HeraldError> {
        if *self.fail_resolves.lock().await {
            return Err(HeraldError::Store {
                source: "simulated repository outage".into(),
            });
        }
        Ok(self
            .messages
            .lock()
            .await
            .get(&(
                item.campaign_id.clone(),
                item.contact_id.clone(),
                item.tenant_id.clone(),
            ))
            .cloned())
    }
}
