// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API provider adapter for Herald.

pub mod adapter;

pub use adapter::{PROVIDER_NAME, WhatsAppAdapter};
