// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the Herald store contracts.

use async_trait::async_trait;
use tracing::debug;

use herald_config::model::StorageConfig;
use herald_core::{
    CampaignMessage, CampaignRepository, DeadLetterSink, HeraldError, QueueItem, RetryQueueStore,
    ScoredEntry,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store.
///
/// Wraps a [`Database`] handle and delegates all operations to the typed
/// query modules. One `SqliteStore` serves as the retry queue store, the
/// dead-letter sink, and the campaign repository; the dispatch core holds it
/// behind the three separate trait objects.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the database at the configured path and run migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, HeraldError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite store initialized");
        Ok(Self { db })
    }

    /// Returns the underlying database handle for auxiliary operations
    /// (campaign message seeding, dead-letter inspection).
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoint and close the underlying connection.
    pub async fn close(&self) -> Result<(), HeraldError> {
        self.db.close().await
    }
}

#[async_trait]
impl RetryQueueStore for SqliteStore {
    async fn enqueue(
        &self,
        queue: &str,
        item: &QueueItem,
        due_at_ms: i64,
    ) -> Result<(), HeraldError> {
        queries::retry_queue::enqueue(&self.db, queue, item, due_at_ms).await
    }

    async fn fetch_due(
        &self,
        queue: &str,
        now_ms: i64,
        limit: usize,
    ) -> Result<Vec<ScoredEntry>, HeraldError> {
        queries::retry_queue::fetch_due(&self.db, queue, now_ms, limit).await
    }

    async fn remove(&self, queue: &str, entry: &ScoredEntry) -> Result<(), HeraldError> {
        queries::retry_queue::remove(&self.db, queue, entry).await
    }
}

#[async_trait]
impl DeadLetterSink for SqliteStore {
    async fn archive(&self, item: &QueueItem, reason: &str) -> Result<(), HeraldError> {
        queries::dead_letters::archive(&self.db, item, reason).await
    }
}

#[async_trait]
impl CampaignRepository for SqliteStore {
    async fn resolve(&self, item: &QueueItem) -> Result<Option<CampaignMessage>, HeraldError> {
        queries::campaigns::resolve(&self.db, item).await
    }
}
