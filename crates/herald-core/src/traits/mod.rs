// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait contracts for the Herald dispatch engine.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility; the
//! dispatch core only ever holds `Arc<dyn ...>` handles.

pub mod adapter;
pub mod repository;
pub mod store;

pub use adapter::MessagingAdapter;
pub use repository::CampaignRepository;
pub use store::{DeadLetterSink, RetryQueueStore};
