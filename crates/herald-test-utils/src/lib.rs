// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory fakes for Herald integration tests.
//!
//! Provides a mock messaging adapter with scriptable outcomes and in-memory
//! implementations of the queue store, dead-letter sink, and campaign
//! repository.

pub mod memory_store;
pub mod mock_adapter;

pub use memory_store::{MemoryCampaigns, MemoryDeadLetters, MemoryQueue};
pub use mock_adapter::{MockAdapter, SentMessage};
