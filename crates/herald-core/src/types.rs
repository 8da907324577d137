// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Value types shared across the Herald workspace.

use serde::{Deserialize, Serialize};

use crate::error::HeraldError;

/// One pending dispatch attempt for a single campaign contact.
///
/// A queue item is addressable by `(campaign_id, contact_id)` within a
/// tenant. The serialized JSON form is the member value held in the retry
/// queue store, so field order matters for idempotent re-adds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Opaque identifier, stable for the campaign run.
    pub campaign_id: String,
    /// Opaque identifier, stable for the recipient.
    pub contact_id: String,
    /// Tenant isolation key; every queue item carries its tenant.
    pub tenant_id: String,
    /// Number of completed send attempts. Starts at 0.
    #[serde(default)]
    pub attempt_count: u32,
}

impl QueueItem {
    pub fn new(
        campaign_id: impl Into<String>,
        contact_id: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            contact_id: contact_id.into(),
            tenant_id: tenant_id.into(),
            attempt_count: 0,
        }
    }

    /// Canonical serialized form used as the store member value.
    pub fn encode(&self) -> Result<String, HeraldError> {
        serde_json::to_string(self).map_err(|e| HeraldError::Store {
            source: Box::new(e),
        })
    }

    /// Copy of this item with the attempt counter advanced by one.
    #[must_use]
    pub fn next_attempt(&self) -> Self {
        Self {
            attempt_count: self.attempt_count.saturating_add(1),
            ..self.clone()
        }
    }
}

/// A serialized queue item plus its due-time score, as held in the store.
///
/// The score is milliseconds since the Unix epoch; the entry is due when
/// `score <= now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredEntry {
    pub payload: String,
    pub score: i64,
}

impl ScoredEntry {
    /// Decode the payload back into a [`QueueItem`].
    ///
    /// Fails for poison payloads (entries written by an incompatible
    /// producer); the processor drops those rather than retrying them.
    pub fn decode(&self) -> Result<QueueItem, HeraldError> {
        serde_json::from_str(&self.payload).map_err(|e| HeraldError::Store {
            source: Box::new(e),
        })
    }
}

/// Outcome of one send attempt through a messaging adapter.
///
/// Constructed only through [`MessageResult::delivered`] and
/// [`MessageResult::failed`], so a result never carries both a provider
/// message id and an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResult {
    pub success: bool,
    /// Provider-assigned identifier; present only on success.
    pub message_id: Option<String>,
    /// Provider-specific status string (e.g. "accepted", "queued").
    pub status: Option<String>,
    /// Human-readable failure reason; present only on failure.
    pub error: Option<String>,
    /// Name of the adapter that produced this result, or "none".
    pub provider: String,
}

impl MessageResult {
    pub fn delivered(
        message_id: impl Into<String>,
        status: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            status: Some(status.into()),
            error: None,
            provider: provider.into(),
        }
    }

    pub fn failed(error: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            status: None,
            error: Some(error.into()),
            provider: provider.into(),
        }
    }

    /// The failure reason, or a placeholder for results that carry none.
    pub fn error_reason(&self) -> &str {
        self.error.as_deref().unwrap_or("unknown failure")
    }
}

/// Normalized inbound webhook message, produced only by adapter parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Provider-assigned message identifier.
    pub message_id: String,
    /// Provider-addressable sender identifier (e.g. phone number).
    pub from: String,
    /// Text body, if the message carried one.
    pub body: Option<String>,
    /// Media reference, if the message carried one.
    pub media_url: Option<String>,
    /// RFC 3339 timestamp of the message.
    pub timestamp: String,
    /// Name of the adapter that parsed this message.
    pub provider: String,
}

/// A queue item resolved into something sendable.
///
/// Produced by a [`CampaignRepository`](crate::traits::CampaignRepository);
/// the dispatch core never constructs destinations or bodies itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignMessage {
    /// Provider-addressable destination (e.g. phone number in provider format).
    pub destination: String,
    /// Rendered message body for this contact.
    pub body: String,
    /// Optional dereferenceable media resource.
    pub media_url: Option<String>,
}
