// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign repository contract.
//!
//! Persistence of campaign and contact entities lives outside the dispatch
//! core; the processor only needs to turn a queue item into something
//! sendable.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{CampaignMessage, QueueItem};

/// Resolves a queue item to its destination and rendered message body.
#[async_trait]
pub trait CampaignRepository: Send + Sync + 'static {
    /// Looks up the campaign/contact pair behind a queue item.
    ///
    /// `Ok(None)` means the campaign or contact no longer exists; the caller
    /// drops the item rather than retrying it.
    async fn resolve(&self, item: &QueueItem) -> Result<Option<CampaignMessage>, HeraldError>;
}
