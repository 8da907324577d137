// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging adapter for deterministic testing.
//!
//! `MockAdapter` implements `MessagingAdapter` with scriptable send outcomes
//! and captured outbound messages for assertion in tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use herald_core::{HeraldError, IncomingMessage, MessageResult, MessagingAdapter};

/// One captured send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub body: String,
    pub media_url: Option<String>,
}

/// A mock messaging provider for testing.
///
/// Sends succeed by default with a generated message id. Failed outcomes are
/// scripted with [`queue_failure`](Self::queue_failure); a transport-level
/// fault (an `Err` from the send methods) with
/// [`fail_transport`](Self::fail_transport).
pub struct MockAdapter {
    name: String,
    sent: Mutex<Vec<SentMessage>>,
    scripted: Mutex<VecDeque<MessageResult>>,
    transport_down: Mutex<bool>,
}

impl MockAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sent: Mutex::new(Vec::new()),
            scripted: Mutex::new(VecDeque::new()),
            transport_down: Mutex::new(false),
        }
    }

    /// Script the next send to report a provider-side failure.
    pub async fn queue_failure(&self, error: impl Into<String>) {
        let result = MessageResult::failed(error, self.name.clone());
        self.scripted.lock().await.push_back(result);
    }

    /// Make every send return a transport-level `Err` until cleared.
    pub async fn fail_transport(&self) {
        *self.transport_down.lock().await = true;
    }

    /// Restore transport-level connectivity.
    pub async fn restore_transport(&self) {
        *self.transport_down.lock().await = false;
    }

    /// All messages captured by the send methods.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Count of captured sends.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    async fn attempt(&self, sent: SentMessage) -> Result<MessageResult, HeraldError> {
        if *self.transport_down.lock().await {
            return Err(HeraldError::Provider {
                message: format!("{} unreachable", self.name),
                source: None,
            });
        }
        self.sent.lock().await.push(sent);
        if let Some(result) = self.scripted.lock().await.pop_front() {
            return Ok(result);
        }
        Ok(MessageResult::delivered(
            format!("mock-{}", uuid::Uuid::new_v4()),
            "accepted",
            self.name.clone(),
        ))
    }
}

#[async_trait]
impl MessagingAdapter for MockAdapter {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn send_message(&self, to: &str, body: &str) -> Result<MessageResult, HeraldError> {
        self.attempt(SentMessage {
            to: to.to_string(),
            body: body.to_string(),
            media_url: None,
        })
        .await
    }

    async fn send_media_message(
        &self,
        to: &str,
        media_url: &str,
        caption: Option<&str>,
    ) -> Result<MessageResult, HeraldError> {
        self.attempt(SentMessage {
            to: to.to_string(),
            body: caption.unwrap_or_default().to_string(),
            media_url: Some(media_url.to_string()),
        })
        .await
    }

    fn parse_incoming_message(&self, raw: &str) -> Result<IncomingMessage, HeraldError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| HeraldError::Parse {
                provider: self.name.clone(),
                message: e.to_string(),
            })?;
        let message_id = value
            .get("message_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| HeraldError::Parse {
                provider: self.name.clone(),
                message: "missing message_id".into(),
            })?;
        let from = value
            .get("from")
            .and_then(|v| v.as_str())
            .ok_or_else(|| HeraldError::Parse {
                provider: self.name.clone(),
                message: "missing from".into(),
            })?;
        Ok(IncomingMessage {
            message_id: message_id.to_string(),
            from: from.to_string(),
            body: value
                .get("body")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            media_url: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            provider: self.name.clone(),
        })
    }

    fn validate_webhook(&self, _raw: &[u8], signature: &str) -> bool {
        signature == "valid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_send_is_delivered_and_captured() {
        let adapter = MockAdapter::new("mock");
        let result = adapter.send_message("+1555", "hello").await.unwrap();
        assert!(result.success);
        assert_eq!(result.provider, "mock");
        assert_eq!(adapter.sent_count().await, 1);
        assert_eq!(adapter.sent_messages().await[0].body, "hello");
    }

    #[tokio::test]
    async fn scripted_failure_is_consumed_in_order() {
        let adapter = MockAdapter::new("mock");
        adapter.queue_failure("rate limited").await;

        let first = adapter.send_message("+1555", "a").await.unwrap();
        assert!(!first.success);
        assert_eq!(first.error.as_deref(), Some("rate limited"));

        let second = adapter.send_message("+1555", "b").await.unwrap();
        assert!(second.success);
    }

    #[tokio::test]
    async fn transport_fault_is_an_err_and_captures_nothing() {
        let adapter = MockAdapter::new("mock");
        adapter.fail_transport().await;

        assert!(adapter.send_message("+1555", "a").await.is_err());
        assert_eq!(adapter.sent_count().await, 0);

        adapter.restore_transport().await;
        assert!(adapter.send_message("+1555", "a").await.is_ok());
    }

    #[test]
    fn parse_rejects_malformed_payloads() {
        let adapter = MockAdapter::new("mock");
        assert!(adapter.parse_incoming_message("not json").is_err());
        assert!(adapter.parse_incoming_message(r#"{"from":"x"}"#).is_err());

        let parsed = adapter
            .parse_incoming_message(r#"{"message_id":"m1","from":"+1555","body":"hi"}"#)
            .unwrap();
        assert_eq!(parsed.message_id, "m1");
        assert_eq!(parsed.body.as_deref(), Some("hi"));
    }
}
