// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dead-letter archive operations.

use herald_core::{HeraldError, QueueItem};
use rusqlite::params;

use crate::database::Database;

/// One archived row, as read back for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetterRecord {
    pub id: i64,
    pub campaign_id: String,
    pub contact_id: String,
    pub tenant_id: String,
    pub attempt_count: u32,
    pub reason: String,
    pub archived_at: String,
}

/// Archive one item with its final failure reason.
pub async fn archive(db: &Database, item: &QueueItem, reason: &str) -> Result<(), HeraldError> {
    let item = item.clone();
    let reason = reason.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO dead_letters
                     (campaign_id, contact_id, tenant_id, attempt_count, reason)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    item.campaign_id,
                    item.contact_id,
                    item.tenant_id,
                    item.attempt_count,
                    reason
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All archived rows for a tenant, oldest first.
pub async fn list_for_tenant(
    db: &Database,
    tenant_id: &str,
) -> Result<Vec<DeadLetterRecord>, HeraldError> {
    let tenant_id = tenant_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, campaign_id, contact_id, tenant_id, attempt_count, reason, archived_at
                 FROM dead_letters
                 WHERE tenant_id = ?1
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![tenant_id], |row| {
                Ok(DeadLetterRecord {
                    id: row.get(0)?,
                    campaign_id: row.get(1)?,
                    contact_id: row.get(2)?,
                    tenant_id: row.get(3)?,
                    attempt_count: row.get(4)?,
                    reason: row.get(5)?,
                    archived_at: row.get(6)?,
                })
            })?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn archive_and_list_roundtrip() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("dl.db").to_str().unwrap(), true)
            .await
            .unwrap();

        let item = QueueItem {
            campaign_id: "c1".into(),
            contact_id: "p1".into(),
            tenant_id: "t1".into(),
            attempt_count: 3,
        };
        archive(&db, &item, "provider outage").await.unwrap();

        let records = list_for_tenant(&db, "t1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].campaign_id, "c1");
        assert_eq!(records[0].attempt_count, 3);
        assert_eq!(records[0].reason, "provider outage");
        assert!(!records[0].archived_at.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_filters_by_tenant() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("dl2.db").to_str().unwrap(), true)
            .await
            .unwrap();

        archive(&db, &QueueItem::new("c1", "p1", "t1"), "x")
            .await
            .unwrap();
        archive(&db, &QueueItem::new("c2", "p2", "t2"), "y")
            .await
            .unwrap();

        let t1 = list_for_tenant(&db, "t1").await.unwrap();
        assert_eq!(t1.len(), 1);
        assert_eq!(t1[0].tenant_id, "t1");

        db.close().await.unwrap();
    }
}
