// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch engine for Herald campaign delivery.
//!
//! Two cooperating loops share the durable retry queue store:
//!
//! - [`CampaignProcessor`] polls the queue, attempts sends through the
//!   messaging service, and decides per item between completion, retry, and
//!   dead-lettering.
//! - [`RetryHandler`] receives [`RetryRequest`]s over a bounded channel and
//!   re-enqueues each item with an exponential, capped backoff score.
//!
//! Keeping re-enqueue out of the poll cycle means a slow store never blocks
//! dispatch, at the cost of a bounded window where a crash can lose the
//! in-channel retry (the entry is then already removed). The queue itself is
//! at-least-once; downstream providers see duplicates, never silent loss,
//! for all other failure points.

pub mod backoff;
pub mod processor;
pub mod retry;

pub use backoff::BackoffPolicy;
pub use processor::{CampaignProcessor, CycleStats};
pub use retry::{RetryHandler, RetryRequest};
