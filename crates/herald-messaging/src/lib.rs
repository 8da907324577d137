// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging service for the Herald dispatch engine.
//!
//! [`MessagingService`] is the single point of truth for which provider is
//! currently active. It holds the set of registered adapters and forwards
//! every operation to the active one, tolerating zero-adapter
//! configurations: callers always receive a `MessageResult` from send
//! operations, never an error.

pub mod service;

pub use service::MessagingService;
