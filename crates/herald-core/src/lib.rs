// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Herald campaign dispatch engine.
//!
//! This crate provides the trait contracts, error type, and value types used
//! throughout the Herald workspace: the messaging-adapter capability
//! contract, the score-ordered retry queue store, the dead-letter sink, and
//! the campaign repository collaborator.

pub mod error;
pub mod traits;
pub mod types;

pub use error::HeraldError;
pub use types::{CampaignMessage, IncomingMessage, MessageResult, QueueItem, ScoredEntry};

pub use traits::{CampaignRepository, DeadLetterSink, MessagingAdapter, RetryQueueStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn herald_error_has_all_variants() {
        let _config = HeraldError::Config("test".into());
        let _store = HeraldError::Store {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = HeraldError::Provider {
            message: "test".into(),
            source: None,
        };
        let _not_found = HeraldError::AdapterNotFound {
            name: "test".into(),
        };
        let _parse = HeraldError::Parse {
            provider: "whatsapp".into(),
            message: "test".into(),
        };
        let _internal = HeraldError::Internal("test".into());
    }

    #[test]
    fn adapter_not_found_display_names_the_adapter() {
        let err = HeraldError::AdapterNotFound {
            name: "nonexistent".into(),
        };
        assert_eq!(err.to_string(), "adapter not found: nonexistent");
    }

    #[test]
    fn all_trait_contracts_are_exported() {
        // Compile-time check that the trait contracts are accessible through
        // the public API and remain object-safe.
        fn _assert_adapter(_: &dyn MessagingAdapter) {}
        fn _assert_store(_: &dyn RetryQueueStore) {}
        fn _assert_sink(_: &dyn DeadLetterSink) {}
        fn _assert_repo(_: &dyn CampaignRepository) {}
    }
}
