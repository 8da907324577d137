// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign message lookup.
//!
//! The fan-out that decides which campaigns exist lives upstream; this module
//! only stores the rendered message per (campaign, contact, tenant) so the
//! processor can resolve queue items into sends.

use herald_core::{CampaignMessage, HeraldError, QueueItem};
use rusqlite::params;

use crate::database::Database;

/// Insert or replace the rendered message for one campaign contact.
pub async fn upsert_message(
    db: &Database,
    item: &QueueItem,
    message: &CampaignMessage,
) -> Result<(), HeraldError> {
    let item = item.clone();
    let message = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO campaign_messages
                     (campaign_id, contact_id, tenant_id, destination, body, media_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (campaign_id, contact_id, tenant_id)
                 DO UPDATE SET destination = excluded.destination,
                               body = excluded.body,
                               media_url = excluded.media_url",
                params![
                    item.campaign_id,
                    item.contact_id,
                    item.tenant_id,
                    message.destination,
                    message.body,
                    message.media_url
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up the rendered message behind a queue item. `None` when the
/// campaign or contact no longer exists.
pub async fn resolve(
    db: &Database,
    item: &QueueItem,
) -> Result<Option<CampaignMessage>, HeraldError> {
    let item = item.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT destination, body, media_url FROM campaign_messages
                 WHERE campaign_id = ?1 AND contact_id = ?2 AND tenant_id = ?3",
            )?;
            let result = stmt.query_row(
                params![item.campaign_id, item.contact_id, item.tenant_id],
                |row| {
                    Ok(CampaignMessage {
                        destination: row.get(0)?,
                        body: row.get(1)?,
                        media_url: row.get(2)?,
                    })
                },
            );
            match result {
                Ok(message) => Ok(Some(message)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
