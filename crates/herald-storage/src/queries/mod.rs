// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the shared [`Database`](crate::Database) handle.

pub mod campaigns;
pub mod dead_letters;
pub mod retry_queue;
