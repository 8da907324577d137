// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The campaign queue processor.
//!
//! A stateless polling loop over the retry queue store: each cycle fetches a
//! bounded batch of due entries, attempts dispatch through the messaging
//! service, and routes failures to retry or the dead-letter archive.
//!
//! Delivery is at-least-once. Fetch and remove are separate store
//! operations, so a crash between them re-delivers the entry on the next
//! poll, and two replicas polling the same store may both attempt the same
//! entry. Providers must tolerate duplicates.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use herald_config::model::DispatchConfig;
use herald_core::{
    CampaignRepository, DeadLetterSink, HeraldError, QueueItem, RetryQueueStore, ScoredEntry,
};
use herald_messaging::MessagingService;

use crate::backoff::epoch_ms;
use crate::retry::RetryRequest;

/// Counters for one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Due entries fetched this cycle.
    pub fetched: usize,
    /// Sends that succeeded; entries removed.
    pub delivered: usize,
    /// Failed sends handed to the retry pipeline.
    pub retried: usize,
    /// Items archived after exhausting their attempt budget.
    pub dead_lettered: usize,
    /// Entries discarded without a send (poison payload, vanished campaign).
    pub dropped: usize,
}

/// Polls the retry queue store and dispatches due campaign messages.
///
/// The processor holds no item state between cycles; the store owns all
/// durable queue state.
pub struct CampaignProcessor {
    store: Arc<dyn RetryQueueStore>,
    repository: Arc<dyn CampaignRepository>,
    messaging: Arc<MessagingService>,
    dead_letters: Arc<dyn DeadLetterSink>,
    retry_tx: mpsc::Sender<RetryRequest>,
    config: DispatchConfig,
}

impl CampaignProcessor {
    pub fn new(
        store: Arc<dyn RetryQueueStore>,
        repository: Arc<dyn CampaignRepository>,
        messaging: Arc<MessagingService>,
        dead_letters: Arc<dyn DeadLetterSink>,
        retry_tx: mpsc::Sender<RetryRequest>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            store,
            repository,
            messaging,
            dead_letters,
            retry_tx,
            config,
        }
    }

    /// Drive poll cycles until cancellation.
    ///
    /// An in-flight cycle always finishes before the loop stops, so no item
    /// is abandoned mid-send. A failed cycle is logged and retried on the
    /// next tick; the loop itself never dies.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            queue = %self.config.queue_name,
            poll_interval_secs = self.config.poll_interval_secs,
            batch_limit = self.config.batch_limit,
            "campaign processor started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("campaign processor stopping");
                    break;
                }
                _ = ticker.tick() => {
                    match self.process_cycle().await {
                        Ok(stats) if stats.fetched > 0 => {
                            info!(
                                fetched = stats.fetched,
                                delivered = stats.delivered,
                                retried = stats.retried,
                                dead_lettered = stats.dead_lettered,
                                dropped = stats.dropped,
                                "poll cycle complete"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(error = %e, "poll cycle aborted; retrying next tick");
                        }
                    }
                }
            }
        }
    }

    /// Run one poll cycle against the current wall clock.
    pub async fn process_cycle(&self) -> Result<CycleStats, HeraldError> {
        self.process_cycle_at(epoch_ms()).await
    }

    /// Run one poll cycle with an injected clock, for tests.
    ///
    /// A transient store failure on fetch aborts the whole cycle; per-entry
    /// failures only affect that entry.
    pub async fn process_cycle_at(&self, now_ms: i64) -> Result<CycleStats, HeraldError> {
        let entries = self
            .store
            .fetch_due(&self.config.queue_name, now_ms, self.config.batch_limit)
            .await?;

        let mut stats = CycleStats {
            fetched: entries.len(),
            ..CycleStats::default()
        };

        for entry in &entries {
            self.process_entry(entry, &mut stats).await;
        }

        Ok(stats)
    }

    async fn process_entry(&self, entry: &ScoredEntry, stats: &mut CycleStats) {
        let item = match entry.decode() {
            Ok(item) => item,
            Err(e) => {
                // Poison payloads would otherwise be re-fetched forever.
                warn!(error = %e, payload = %entry.payload, "dropping undecodable queue entry");
                self.discard(entry).await;
                stats.dropped += 1;
                return;
            }
        };

        let message = match self.repository.resolve(&item).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!(
                    campaign_id = %item.campaign_id,
                    contact_id = %item.contact_id,
                    "campaign contact no longer exists; dropping entry"
                );
                self.discard(entry).await;
                stats.dropped += 1;
                return;
            }
            Err(e) => {
                // Leave the entry in place; it stays due for the next cycle.
                warn!(
                    campaign_id = %item.campaign_id,
                    contact_id = %item.contact_id,
                    error = %e,
                    "campaign lookup failed; deferring entry"
                );
                return;
            }
        };

        let result = match message.media_url.as_deref() {
            Some(media_url) => {
                self.messaging
                    .send_media_message(&message.destination, media_url, Some(&message.body))
                    .await
            }
            None => {
                self.messaging
                    .send_message(&message.destination, &message.body)
                    .await
            }
        };

        if result.success {
            debug!(
                campaign_id = %item.campaign_id,
                contact_id = %item.contact_id,
                provider = %result.provider,
                message_id = result.message_id.as_deref().unwrap_or_default(),
                "dispatched"
            );
            self.discard(entry).await;
            stats.delivered += 1;
            return;
        }

        // Attempts completed, counting the failure we just observed.
        let attempts_done = item.attempt_count.saturating_add(1);
        if attempts_done >= self.config.max_attempts {
            match self
                .dead_letters
                .archive(&item, result.error_reason())
                .await
            {
                Ok(()) => {
                    warn!(
                        campaign_id = %item.campaign_id,
                        contact_id = %item.contact_id,
                        attempts = attempts_done,
                        reason = result.error_reason(),
                        "attempts exhausted; dead-lettered"
                    );
                    self.discard(entry).await;
                    stats.dead_lettered += 1;
                }
                Err(e) => {
                    // Never drop a terminal failure silently: keep the entry
                    // so the next cycle retries the archive.
                    warn!(
                        campaign_id = %item.campaign_id,
                        contact_id = %item.contact_id,
                        error = %e,
                        "dead-letter archive failed; deferring entry"
                    );
                }
            }
            return;
        }

        match self.retry_tx.try_send(RetryRequest::for_item(&item)) {
            Ok(()) => {
                self.discard(entry).await;
                stats.retried += 1;
            }
            Err(e) => {
                // Channel full or closed: keep the entry due; the next cycle
                // re-attempts the send at the same attempt count.
                warn!(
                    campaign_id = %item.campaign_id,
                    contact_id = %item.contact_id,
                    error = %e,
                    "retry channel unavailable; deferring entry"
                );
            }
        }
    }

    /// Remove an entry, tolerating store hiccups: a failed remove leaves the
    /// entry to be re-processed, which the at-least-once contract allows.
    async fn discard(&self, entry: &ScoredEntry) {
        if let Err(e) = self.store.remove(&self.config.queue_name, entry).await {
            warn!(error = %e, "failed to remove queue entry; it may be re-processed");
        }
    }

    /// Enqueue a fresh item due at `due_at_ms` (fan-out entry point).
    pub async fn enqueue_item(&self, item: &QueueItem, due_at_ms: i64) -> Result<(), HeraldError> {
        self.store
            .enqueue(&self.config.queue_name, item, due_at_ms)
            .await
    }
}
