// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald serve` command implementation.
//!
//! Opens SQLite storage, registers configured messaging adapters, spawns the
//! retry handler, and runs the campaign processor loop until a shutdown
//! signal arrives.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use herald_config::HeraldConfig;
use herald_core::error::HeraldError;
use herald_core::{CampaignRepository, DeadLetterSink, MessagingAdapter, RetryQueueStore};
use herald_dispatch::{BackoffPolicy, CampaignProcessor, RetryHandler};
use herald_messaging::MessagingService;
use herald_storage::SqliteStore;
use herald_whatsapp::WhatsAppAdapter;

use crate::shutdown;

/// Runs the `herald serve` command.
///
/// Supports graceful shutdown via signal handlers: the current poll cycle
/// completes, the retry handler drains, and the store is checkpointed before
/// exit.
pub async fn run_serve(config: HeraldConfig) -> Result<(), HeraldError> {
    init_tracing(&config.service.log_level);

    info!("starting herald serve");

    let store = Arc::new(SqliteStore::open(&config.storage).await?);

    let mut adapters: Vec<Arc<dyn MessagingAdapter>> = Vec::new();
    if config.whatsapp.access_token.is_some() {
        let whatsapp = WhatsAppAdapter::from_config(&config.whatsapp).map_err(|e| {
            error!(error = %e, "failed to initialize WhatsApp adapter");
            e
        })?;
        adapters.push(Arc::new(whatsapp));
        info!("whatsapp adapter registered");
    } else {
        info!("whatsapp adapter skipped (no access_token configured)");
    }

    let messaging = Arc::new(MessagingService::new(adapters)?);
    if let Some(active) = config.provider.active.as_deref() {
        messaging.switch_adapter(active)?;
    }
    match messaging.current_provider() {
        Some(provider) => info!(provider = %provider, "messaging service ready"),
        None => warn!("no messaging adapter configured; every send will fail until one is added"),
    }

    let cancel = shutdown::install_signal_handler();

    let (retry_tx, retry_rx) = mpsc::channel(config.dispatch.retry_channel_capacity.max(1));
    let retry_handler = RetryHandler::new(
        store.clone() as Arc<dyn RetryQueueStore>,
        config.dispatch.queue_name.clone(),
        BackoffPolicy::from_config(&config.dispatch),
    );
    let retry_task = tokio::spawn(retry_handler.run(retry_rx, cancel.clone()));

    let processor = CampaignProcessor::new(
        store.clone() as Arc<dyn RetryQueueStore>,
        store.clone() as Arc<dyn CampaignRepository>,
        messaging,
        store.clone() as Arc<dyn DeadLetterSink>,
        retry_tx,
        config.dispatch.clone(),
    );
    processor.run(cancel.clone()).await;

    // Close the retry channel so the handler task can finish.
    drop(processor);
    if let Err(e) = retry_task.await {
        warn!(error = %e, "retry handler task failed during shutdown");
    }

    store.close().await?;
    info!("herald serve stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("herald={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
