// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald enqueue` command implementation.
//!
//! Manual fan-out injection: writes the rendered message (when given) and a
//! due queue entry straight into the store. The running `serve` loop picks
//! the entry up on its next poll.

use clap::Args;
use tracing::debug;

use herald_config::HeraldConfig;
use herald_core::error::HeraldError;
use herald_core::{CampaignMessage, QueueItem, RetryQueueStore};
use herald_dispatch::backoff::epoch_ms;
use herald_storage::{SqliteStore, queries};

/// Arguments for `herald enqueue`.
#[derive(Args, Debug)]
pub struct EnqueueArgs {
    /// Campaign identifier.
    #[arg(long)]
    pub campaign: String,

    /// Contact identifier.
    #[arg(long)]
    pub contact: String,

    /// Tenant identifier.
    #[arg(long)]
    pub tenant: String,

    /// Due time in milliseconds since the epoch; defaults to now.
    #[arg(long)]
    pub at_ms: Option<i64>,

    /// Destination address; with --body, also stores the rendered message.
    #[arg(long, requires = "body")]
    pub to: Option<String>,

    /// Message body.
    #[arg(long, requires = "to")]
    pub body: Option<String>,

    /// Optional media URL attached to the stored message.
    #[arg(long, requires = "to")]
    pub media_url: Option<String>,
}

/// Runs the `herald enqueue` command.
pub async fn run_enqueue(config: HeraldConfig, args: EnqueueArgs) -> Result<(), HeraldError> {
    let store = SqliteStore::open(&config.storage).await?;
    let item = QueueItem::new(args.campaign, args.contact, args.tenant);

    if let (Some(to), Some(body)) = (args.to.as_ref(), args.body.as_ref()) {
        let message = CampaignMessage {
            destination: to.clone(),
            body: body.clone(),
            media_url: args.media_url.clone(),
        };
        queries::campaigns::upsert_message(store.database(), &item, &message).await?;
        debug!(destination = %to, "stored rendered message");
    }

    let due_at_ms = args.at_ms.unwrap_or_else(epoch_ms);
    store
        .enqueue(&config.dispatch.queue_name, &item, due_at_ms)
        .await?;

    println!(
        "enqueued campaign={} contact={} tenant={} due_at_ms={due_at_ms}",
        item.campaign_id, item.contact_id, item.tenant_id
    );

    store.close().await
}
