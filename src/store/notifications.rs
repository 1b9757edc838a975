use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

use super::{new_id, now};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub read: bool,
    pub related_entity_id: Option<String>,
    pub related_entity_type: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub related_entity_id: Option<String>,
    pub related_entity_type: Option<String>,
}

pub fn notification_from_row(row: &Row<'_>) -> Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        message: row.get(3)?,
        kind: row.get(4)?,
        read: row.get::<_, i64>(5)? != 0,
        related_entity_id: row.get(6)?,
        related_entity_type: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Notifications are born unread. There is no generic update; `mark_read`
/// is the only transition, so read-state can never move backwards.
pub fn create(conn: &Connection, input: NewNotification) -> Result<Notification> {
    let notification = Notification {
        id: new_id(),
        user_id: input.user_id,
        title: input.title,
        message: input.message,
        kind: input.kind,
        read: false,
        related_entity_id: input.related_entity_id,
        related_entity_type: input.related_entity_type,
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO notifications(id, user_id, title, message, type, read,
                                   related_entity_id, related_entity_type, created_at)
         VALUES(?, ?, ?, ?, ?, 0, ?, ?, ?)",
        params![
            notification.id,
            notification.user_id,
            notification.title,
            notification.message,
            notification.kind,
            notification.related_entity_id,
            notification.related_entity_type,
            notification.created_at
        ],
    )?;
    Ok(notification)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Notification>> {
    conn.query_row(
        "SELECT id, user_id, title, message, type, read, related_entity_id, related_entity_type, created_at
         FROM notifications WHERE id = ?",
        [id],
        notification_from_row,
    )
    .optional()
}

/// Newest first. This ordering is user-visible in the notification tray,
/// so the rowid tiebreak keeps same-instant rows stable too.
pub fn list_for_user(conn: &Connection, user_id: &str) -> Result<Vec<Notification>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, title, message, type, read, related_entity_id, related_entity_type, created_at
         FROM notifications
         WHERE user_id = ?
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map([user_id], notification_from_row)?;
    rows.collect()
}

/// Unread only, in insertion order.
pub fn list_unread(conn: &Connection, user_id: &str) -> Result<Vec<Notification>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, title, message, type, read, related_entity_id, related_entity_type, created_at
         FROM notifications
         WHERE user_id = ? AND read = 0
         ORDER BY rowid",
    )?;
    let rows = stmt.query_map([user_id], notification_from_row)?;
    rows.collect()
}

/// Sets read on one notification. Returns false only for an unknown id;
/// marking an already-read notification again is a no-op that still
/// reports true.
pub fn mark_read(conn: &Connection, id: &str) -> Result<bool> {
    // SQLite counts a matched row as changed even when the value already
    // was 1, so changed == 0 means the id does not exist.
    let changed = conn.execute("UPDATE notifications SET read = 1 WHERE id = ?", [id])?;
    Ok(changed > 0)
}

pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM notifications WHERE id = ?", [id])?;
    Ok(changed > 0)
}
