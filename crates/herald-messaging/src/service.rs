// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter registry and active-provider pass-through.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{info, warn};

use herald_core::{HeraldError, IncomingMessage, MessageResult, MessagingAdapter};

/// Provider name reported when no adapter is configured.
const NO_PROVIDER: &str = "none";

/// The currently selected adapter.
///
/// Wrapped in its own allocation so the pointer can be swapped atomically;
/// a send already dispatched to the old adapter completes on the old adapter.
struct ActiveAdapter {
    adapter: Arc<dyn MessagingAdapter>,
}

/// Registry of messaging adapters plus the active-provider pointer.
///
/// Adapters are registered once at start-up and shared immutably; switching
/// is lock-free and non-transactional with in-flight sends.
pub struct MessagingService {
    adapters: HashMap<String, Arc<dyn MessagingAdapter>>,
    current: ArcSwapOption<ActiveAdapter>,
}

impl MessagingService {
    /// Build a service from the full set of registered adapters.
    ///
    /// The first adapter in registration order becomes the active one. An
    /// empty set is a valid configuration: every send operation degrades to
    /// an explicit failed result until an adapter is registered.
    ///
    /// Fails loudly when two adapters claim the same provider name.
    pub fn new(adapters: Vec<Arc<dyn MessagingAdapter>>) -> Result<Self, HeraldError> {
        let mut registry: HashMap<String, Arc<dyn MessagingAdapter>> = HashMap::new();
        let mut first: Option<Arc<dyn MessagingAdapter>> = None;

        for adapter in adapters {
            let name = adapter.provider_name().to_string();
            if registry.contains_key(&name) {
                return Err(HeraldError::Config(format!(
                    "duplicate adapter registration for provider '{name}'"
                )));
            }
            if first.is_none() {
                first = Some(Arc::clone(&adapter));
            }
            registry.insert(name, adapter);
        }

        if let Some(ref adapter) = first {
            info!(provider = adapter.provider_name(), "active provider selected");
        } else {
            warn!("no messaging adapters registered; sends will report failure");
        }

        Ok(Self {
            adapters: registry,
            current: ArcSwapOption::from(
                first.map(|adapter| Arc::new(ActiveAdapter { adapter })),
            ),
        })
    }

    /// Switch the active adapter by provider name.
    pub fn switch_adapter(&self, provider_name: &str) -> Result<(), HeraldError> {
        let adapter = self.adapters.get(provider_name).ok_or_else(|| {
            HeraldError::AdapterNotFound {
                name: provider_name.to_string(),
            }
        })?;
        self.current.store(Some(Arc::new(ActiveAdapter {
            adapter: Arc::clone(adapter),
        })));
        info!(provider = provider_name, "switched active provider");
        Ok(())
    }

    /// Name of the currently active provider, if any.
    pub fn current_provider(&self) -> Option<String> {
        self.current
            .load()
            .as_ref()
            .map(|active| active.adapter.provider_name().to_string())
    }

    /// Names of all registered providers, sorted.
    pub fn registered_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }

    fn active(&self) -> Option<Arc<dyn MessagingAdapter>> {
        self.current
            .load()
            .as_ref()
            .map(|active| Arc::clone(&active.adapter))
    }

    /// Send a text message through the active adapter.
    ///
    /// Always yields a [`MessageResult`]: no configured adapter degrades to
    /// a failed result, and adapter transport faults are folded into one.
    pub async fn send_message(&self, to: &str, body: &str) -> MessageResult {
        let Some(adapter) = self.active() else {
            return MessageResult::failed("No adapter available", NO_PROVIDER);
        };
        match adapter.send_message(to, body).await {
            Ok(result) => result,
            Err(e) => {
                warn!(provider = adapter.provider_name(), error = %e, "send transport fault");
                MessageResult::failed(e.to_string(), adapter.provider_name())
            }
        }
    }

    /// Send a media message through the active adapter. Same contract as
    /// [`send_message`](Self::send_message).
    pub async fn send_media_message(
        &self,
        to: &str,
        media_url: &str,
        caption: Option<&str>,
    ) -> MessageResult {
        let Some(adapter) = self.active() else {
            return MessageResult::failed("No adapter available", NO_PROVIDER);
        };
        match adapter.send_media_message(to, media_url, caption).await {
            Ok(result) => result,
            Err(e) => {
                warn!(provider = adapter.provider_name(), error = %e, "media send transport fault");
                MessageResult::failed(e.to_string(), adapter.provider_name())
            }
        }
    }

    /// Parse a raw webhook payload with the active adapter.
    ///
    /// There is no sensible default parse, so this faults when no adapter is
    /// configured.
    pub fn parse_incoming_message(&self, raw: &str) -> Result<IncomingMessage, HeraldError> {
        let adapter = self.active().ok_or_else(|| {
            HeraldError::Config("no adapter configured for webhook parsing".into())
        })?;
        adapter.parse_incoming_message(raw)
    }

    /// Validate a webhook signature with the active adapter.
    ///
    /// Rejects unverifiable webhooks: returns false when no adapter is
    /// configured.
    pub fn validate_webhook(&self, raw: &[u8], signature: &str) -> bool {
        match self.active() {
            Some(adapter) => adapter.validate_webhook(raw, signature),
            None => false,
        }
    }
}
