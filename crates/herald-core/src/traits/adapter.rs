// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging adapter trait: the capability contract every provider implements.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{IncomingMessage, MessageResult};

/// Adapter for one external messaging provider.
///
/// Every provider implements the full capability set; all five operations are
/// required methods, so a partial implementation cannot compile. Adapters are
/// stateless singletons registered once at start-up and shared behind `Arc`.
///
/// Send operations report ordinary provider-side failures (rate limit,
/// invalid number) as failed [`MessageResult`]s, never as `Err`. Only
/// transport-level catastrophes (provider fully unreachable) may propagate
/// as [`HeraldError::Provider`].
#[async_trait]
pub trait MessagingAdapter: Send + Sync + 'static {
    /// Stable provider name, unique among registered adapters.
    ///
    /// Used as the switching key by the messaging service.
    fn provider_name(&self) -> &str;

    /// Sends a text message to a provider-addressable destination.
    async fn send_message(&self, to: &str, body: &str) -> Result<MessageResult, HeraldError>;

    /// Sends a media message. `media_url` must be a resource the provider
    /// can fetch (or that the adapter re-uploads).
    async fn send_media_message(
        &self,
        to: &str,
        media_url: &str,
        caption: Option<&str>,
    ) -> Result<MessageResult, HeraldError>;

    /// Parses a raw inbound webhook payload into a normalized message.
    ///
    /// Fails with [`HeraldError::Parse`] when the payload does not match the
    /// provider's known webhook shape; never partially populates a message.
    fn parse_incoming_message(&self, raw: &str) -> Result<IncomingMessage, HeraldError>;

    /// Verifies a webhook signature against the provider secret.
    ///
    /// Pure predicate with constant-time comparison for HMAC-based schemes.
    /// Returns false (never errors) on malformed signature input.
    fn validate_webhook(&self, raw: &[u8], signature: &str) -> bool;
}
