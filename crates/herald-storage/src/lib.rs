// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Herald dispatch engine.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and the score-ordered dispatch
//! queue, dead-letter archive, and campaign message repository.
//!
//! All writes are serialized through `tokio-rusqlite`'s single background
//! thread: [`Database`] wraps a single connection, query modules accept
//! `&Database` and call through `connection().call()`. Do NOT create
//! additional connections for writes.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

pub use database::Database;
pub use store::SqliteStore;
