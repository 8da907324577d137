// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API adapter.
//!
//! Sends go to `POST {api_base}/{phone_number_id}/messages` as text or
//! link-media payloads. Platform-level rejections (a Graph error body) are
//! reported as failed [`MessageResult`]s and feed the retry pipeline;
//! connection-level failures surface as [`HeraldError::Provider`].

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::Sha256;
use tracing::{debug, warn};

use herald_config::model::WhatsAppConfig;
use herald_core::{HeraldError, IncomingMessage, MessageResult, MessagingAdapter};

pub const PROVIDER_NAME: &str = "whatsapp";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Successful Graph send response; only the first message id is used.
#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessageId>,
}

#[derive(Debug, Deserialize)]
struct SentMessageId {
    id: String,
}

/// Graph error envelope.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

/// Messaging adapter for the WhatsApp Cloud API.
pub struct WhatsAppAdapter {
    client: reqwest::Client,
    phone_number_id: String,
    app_secret: Option<String>,
    api_base: String,
}

impl WhatsAppAdapter {
    /// Builds an adapter from configuration.
    ///
    /// Fails if `access_token` or `phone_number_id` is missing; a missing
    /// `app_secret` leaves sends working but makes every webhook signature
    /// invalid.
    pub fn from_config(config: &WhatsAppConfig) -> Result<Self, HeraldError> {
        let access_token = config
            .access_token
            .as_deref()
            .ok_or_else(|| HeraldError::Config("whatsapp access_token is not set".to_string()))?;
        let phone_number_id = config.phone_number_id.clone().ok_or_else(|| {
            HeraldError::Config("whatsapp phone_number_id is not set".to_string())
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|e| HeraldError::Config(format!("invalid access token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| HeraldError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            phone_number_id,
            app_secret: config.app_secret.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.api_base, self.phone_number_id)
    }

    async fn post_message(&self, payload: Value) -> Result<MessageResult, HeraldError> {
        let response = self
            .client
            .post(self.messages_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| HeraldError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| HeraldError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if status.is_success() {
            let parsed: SendResponse =
                serde_json::from_str(&body).map_err(|e| HeraldError::Provider {
                    message: format!("unexpected send response: {e}"),
                    source: Some(Box::new(e)),
                })?;
            let Some(sent) = parsed.messages.into_iter().next() else {
                return Ok(MessageResult::failed(
                    "send response carried no message id",
                    PROVIDER_NAME,
                ));
            };
            debug!(message_id = %sent.id, "message accepted");
            return Ok(MessageResult::delivered(sent.id, "accepted", PROVIDER_NAME));
        }

        // Graph rejections come with a structured error body; keep the raw
        // body as the reason when it does not parse.
        let reason = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(parsed) => match parsed.error.code {
                Some(code) => format!("{} (code {code})", parsed.error.message),
                None => parsed.error.message,
            },
            Err(_) => format!("HTTP {status}: {body}"),
        };
        warn!(status = %status, reason = %reason, "message rejected");
        Ok(MessageResult::failed(reason, PROVIDER_NAME))
    }

    fn parse_error(&self, message: impl Into<String>) -> HeraldError {
        HeraldError::Parse {
            provider: PROVIDER_NAME.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl MessagingAdapter for WhatsAppAdapter {
    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn send_message(&self, to: &str, body: &str) -> Result<MessageResult, HeraldError> {
        self.post_message(json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": { "body": body },
        }))
        .await
    }

    async fn send_media_message(
        &self,
        to: &str,
        media_url: &str,
        caption: Option<&str>,
    ) -> Result<MessageResult, HeraldError> {
        let mut image = json!({ "link": media_url });
        if let Some(caption) = caption {
            image["caption"] = Value::String(caption.to_string());
        }
        self.post_message(json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "image",
            "image": image,
        }))
        .await
    }

    /// Walks the webhook envelope down to the first inbound message:
    /// `entry[].changes[].value.messages[]`.
    fn parse_incoming_message(&self, raw: &str) -> Result<IncomingMessage, HeraldError> {
        let payload: Value = serde_json::from_str(raw)
            .map_err(|e| self.parse_error(format!("invalid JSON: {e}")))?;

        let message = payload
            .get("entry")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.get("changes").and_then(Value::as_array))
            .flatten()
            .filter_map(|change| change.get("value"))
            .filter_map(|value| value.get("messages").and_then(Value::as_array))
            .flatten()
            .next()
            .ok_or_else(|| self.parse_error("no messages in webhook payload"))?;

        let message_id = message
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| self.parse_error("message is missing id"))?;
        let from = message
            .get("from")
            .and_then(Value::as_str)
            .ok_or_else(|| self.parse_error("message is missing sender"))?;
        let timestamp = message
            .get("timestamp")
            .and_then(Value::as_str)
            .ok_or_else(|| self.parse_error("message is missing timestamp"))?;

        let body = message
            .pointer("/text/body")
            .and_then(Value::as_str)
            .map(str::to_string);
        let media_url = message
            .pointer("/image/link")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(IncomingMessage {
            message_id: message_id.to_string(),
            from: from.to_string(),
            body,
            media_url,
            timestamp: timestamp.to_string(),
            provider: PROVIDER_NAME.to_string(),
        })
    }

    /// Verifies an `X-Hub-Signature-256` style header (`sha256=<hex>`)
    /// against the raw request body. Malformed or missing inputs are simply
    /// invalid; verification is constant-time.
    fn validate_webhook(&self, raw: &[u8], signature: &str) -> bool {
        let Some(secret) = self.app_secret.as_deref() else {
            return false;
        };
        let Some(digest_hex) = signature.strip_prefix("sha256=") else {
            return false;
        };
        let Ok(expected) = hex::decode(digest_hex.trim()) else {
            return false;
        };
        let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(raw);
        mac.verify_slice(&expected).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_base: &str) -> WhatsAppConfig {
        WhatsAppConfig {
            access_token: Some("test-token".to_string()),
            phone_number_id: Some("15551230000".to_string()),
            app_secret: Some("app-secret".to_string()),
            api_base: api_base.to_string(),
        }
    }

    fn adapter_for(server: &MockServer) -> WhatsAppAdapter {
        WhatsAppAdapter::from_config(&config(&server.uri())).unwrap()
    }

    #[test]
    fn from_config_requires_credentials() {
        let mut cfg = config("https://example.invalid");
        cfg.access_token = None;
        assert!(WhatsAppAdapter::from_config(&cfg).is_err());

        let mut cfg = config("https://example.invalid");
        cfg.phone_number_id = None;
        assert!(WhatsAppAdapter::from_config(&cfg).is_err());
    }

    #[tokio::test]
    async fn text_send_posts_bearer_auth_and_returns_message_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/15551230000/messages"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "messaging_product": "whatsapp",
                "to": "15551238888",
                "type": "text",
                "text": { "body": "hello" },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messaging_product": "whatsapp",
                "messages": [{ "id": "wamid.abc123" }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = adapter_for(&server)
            .send_message("15551238888", "hello")
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.message_id.as_deref(), Some("wamid.abc123"));
        assert_eq!(result.provider, "whatsapp");
    }

    #[tokio::test]
    async fn media_send_uses_image_link_with_caption() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/15551230000/messages"))
            .and(body_partial_json(serde_json::json!({
                "type": "image",
                "image": {
                    "link": "https://cdn.example/banner.jpg",
                    "caption": "new arrivals",
                },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [{ "id": "wamid.media1" }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = adapter_for(&server)
            .send_media_message("15551238888", "https://cdn.example/banner.jpg", Some("new arrivals"))
            .await
            .unwrap();
        assert!(result.success);
    }

    #[tokio::test]
    async fn graph_error_body_becomes_failed_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/15551230000/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "message": "Recipient is not a valid WhatsApp user", "code": 131026 },
            })))
            .mount(&server)
            .await;

        let result = adapter_for(&server)
            .send_message("15551238888", "hello")
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Recipient is not a valid WhatsApp user (code 131026)")
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_a_provider_error() {
        // RFC 2606 reserves .invalid, so resolution always fails.
        let adapter = WhatsAppAdapter::from_config(&config("http://graph.invalid")).unwrap();
        let err = adapter.send_message("15551238888", "hello").await;
        assert!(matches!(err, Err(HeraldError::Provider { .. })));
    }

    fn webhook_payload() -> String {
        serde_json::json!({
            "entry": [{
                "changes": [{
                    "value": {
                        "metadata": { "phone_number_id": "15551230000" },
                        "messages": [{
                            "id": "wamid.inbound1",
                            "from": "15551238888",
                            "timestamp": "1760100000",
                            "text": { "body": "hi there" },
                        }],
                    },
                }],
            }],
        })
        .to_string()
    }

    fn offline_adapter() -> WhatsAppAdapter {
        WhatsAppAdapter::from_config(&config("http://127.0.0.1:9")).unwrap()
    }

    #[test]
    fn parse_walks_the_webhook_envelope() {
        let adapter = offline_adapter();

        let parsed = adapter.parse_incoming_message(&webhook_payload()).unwrap();
        assert_eq!(parsed.message_id, "wamid.inbound1");
        assert_eq!(parsed.from, "15551238888");
        assert_eq!(parsed.body.as_deref(), Some("hi there"));
        assert_eq!(parsed.timestamp, "1760100000");
        assert_eq!(parsed.provider, "whatsapp");
    }

    #[test]
    fn parse_rejects_status_only_and_malformed_payloads() {
        let adapter = offline_adapter();

        assert!(adapter.parse_incoming_message("not json").is_err());
        // Delivery-status callbacks carry no messages array.
        let statuses = serde_json::json!({
            "entry": [{ "changes": [{ "value": { "statuses": [{ "id": "wamid.x" }] } }] }],
        })
        .to_string();
        assert!(adapter.parse_incoming_message(&statuses).is_err());
    }

    #[test]
    fn parse_rejects_messages_with_missing_fields() {
        let adapter = offline_adapter();

        for field in ["id", "from", "timestamp"] {
            let mut payload: serde_json::Value =
                serde_json::from_str(&webhook_payload()).unwrap();
            payload["entry"][0]["changes"][0]["value"]["messages"][0]
                .as_object_mut()
                .unwrap()
                .remove(field);
            let err = adapter
                .parse_incoming_message(&payload.to_string())
                .unwrap_err();
            assert!(matches!(err, HeraldError::Parse { .. }), "field: {field}");
        }
    }

    #[test]
    fn webhook_signature_round_trips_and_rejects_tampering() {
        let adapter = offline_adapter();
        let body = webhook_payload();

        let mut mac = Hmac::<Sha256>::new_from_slice(b"app-secret").unwrap();
        mac.update(body.as_bytes());
        let signature = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

        assert!(adapter.validate_webhook(body.as_bytes(), &signature));
        assert!(!adapter.validate_webhook(b"tampered body", &signature));
        assert!(!adapter.validate_webhook(body.as_bytes(), "sha256=deadbeef"));
        assert!(!adapter.validate_webhook(body.as_bytes(), "md5=abc"));
        assert!(!adapter.validate_webhook(body.as_bytes(), "sha256=not-hex"));
    }

    #[test]
    fn missing_app_secret_makes_every_signature_invalid() {
        let mut cfg = config("http://127.0.0.1:9");
        cfg.app_secret = None;
        let adapter = WhatsAppAdapter::from_config(&cfg).unwrap();
        assert!(!adapter.validate_webhook(b"body", "sha256=00"));
    }
}
