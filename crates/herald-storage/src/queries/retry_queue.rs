// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Score-ordered queue operations.
//!
//! The queue is a sorted set over serialized [`QueueItem`]s: add-with-score
//! upserts, range-by-score-ascending reads, remove-by-value deletes. Fetching
//! never mutates state, so an entry survives a crash between fetch and
//! processing and is re-delivered on the next poll.

use herald_core::{HeraldError, QueueItem, ScoredEntry};
use rusqlite::params;

use crate::database::Database;

/// Insert the item with the given score, or update the score of an
/// identical existing entry.
pub async fn enqueue(
    db: &Database,
    queue: &str,
    item: &QueueItem,
    due_at_ms: i64,
) -> Result<(), HeraldError> {
    let queue = queue.to_string();
    let payload = item.encode()?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO dispatch_queue (queue_name, payload, score)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (queue_name, payload)
                 DO UPDATE SET score = excluded.score",
                params![queue, payload, due_at_ms],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Entries with `score <= now_ms`, ascending by score, at most `limit`.
pub async fn fetch_due(
    db: &Database,
    queue: &str,
    now_ms: i64,
    limit: usize,
) -> Result<Vec<ScoredEntry>, HeraldError> {
    let queue = queue.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT payload, score FROM dispatch_queue
                 WHERE queue_name = ?1 AND score <= ?2
                 ORDER BY score ASC
                 LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![queue, now_ms, limit as i64], |row| {
                Ok(ScoredEntry {
                    payload: row.get(0)?,
                    score: row.get(1)?,
                })
            })?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Remove the exact serialized entry. Removing a missing entry is a no-op.
pub async fn remove(db: &Database, queue: &str, entry: &ScoredEntry) -> Result<(), HeraldError> {
    let queue = queue.to_string();
    let payload = entry.payload.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM dispatch_queue WHERE queue_name = ?1 AND payload = ?2",
                params![queue, payload],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn item(campaign: &str, contact: &str) -> QueueItem {
        QueueItem::new(campaign, contact, "t1")
    }

    #[tokio::test]
    async fn enqueue_and_fetch_due_roundtrip() {
        let (db, _dir) = setup_db().await;

        enqueue(&db, "q", &item("c1", "p1"), 1_000).await.unwrap();

        let due = fetch_due(&db, "q", 1_000, 10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].score, 1_000);
        assert_eq!(due[0].decode().unwrap(), item("c1", "p1"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fetch_due_never_returns_future_entries() {
        let (db, _dir) = setup_db().await;

        enqueue(&db, "q", &item("c1", "p1"), 500).await.unwrap();
        enqueue(&db, "q", &item("c1", "p2"), 2_000).await.unwrap();

        let due = fetch_due(&db, "q", 1_000, 10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].decode().unwrap().contact_id, "p1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fetch_due_orders_by_ascending_score_and_respects_limit() {
        let (db, _dir) = setup_db().await;

        enqueue(&db, "q", &item("c1", "p3"), 300).await.unwrap();
        enqueue(&db, "q", &item("c1", "p1"), 100).await.unwrap();
        enqueue(&db, "q", &item("c1", "p2"), 200).await.unwrap();

        let due = fetch_due(&db, "q", 1_000, 2).await.unwrap();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].decode().unwrap().contact_id, "p1");
        assert_eq!(due[1].decode().unwrap().contact_id, "p2");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reenqueue_updates_score_instead_of_duplicating() {
        let (db, _dir) = setup_db().await;

        let it = item("c1", "p1");
        enqueue(&db, "q", &it, 1_000).await.unwrap();
        enqueue(&db, "q", &it, 5_000).await.unwrap();

        // Only one entry, with the newer score.
        let all = fetch_due(&db, "q", 10_000, 10).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].score, 5_000);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fetch_does_not_remove_entries() {
        let (db, _dir) = setup_db().await;

        enqueue(&db, "q", &item("c1", "p1"), 100).await.unwrap();

        let first = fetch_due(&db, "q", 1_000, 10).await.unwrap();
        let second = fetch_due(&db, "q", 1_000, 10).await.unwrap();
        assert_eq!(first, second, "fetch must have no removal side effect");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn remove_deletes_exact_entry() {
        let (db, _dir) = setup_db().await;

        enqueue(&db, "q", &item("c1", "p1"), 100).await.unwrap();
        enqueue(&db, "q", &item("c1", "p2"), 100).await.unwrap();

        let due = fetch_due(&db, "q", 1_000, 10).await.unwrap();
        remove(&db, "q", &due[0]).await.unwrap();

        let left = fetch_due(&db, "q", 1_000, 10).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_ne!(left[0].payload, due[0].payload);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn remove_nonexistent_entry_is_a_noop() {
        let (db, _dir) = setup_db().await;

        let ghost = ScoredEntry {
            payload: item("c9", "p9").encode().unwrap(),
            score: 0,
        };
        remove(&db, "q", &ghost).await.unwrap();

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn queues_are_isolated_by_name() {
        let (db, _dir) = setup_db().await;

        enqueue(&db, "q-a", &item("c1", "p1"), 100).await.unwrap();

        let other = fetch_due(&db, "q-b", 1_000, 10).await.unwrap();
        assert!(other.is_empty());

        db.close().await.unwrap();
    }
}
