use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

use super::{new_id, now};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub subject_id: Option<String>,
    pub priority: String,
    pub completed: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub kind: String,
    pub subject_id: Option<String>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub date: Option<String>,
    pub kind: Option<String>,
    pub subject_id: Option<Option<String>>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
}

pub fn event_from_row(row: &Row<'_>) -> Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        date: row.get(4)?,
        kind: row.get(5)?,
        subject_id: row.get(6)?,
        priority: row.get(7)?,
        completed: row.get::<_, i64>(8)? != 0,
        created_at: row.get(9)?,
    })
}

pub fn create(conn: &Connection, input: NewEvent) -> Result<Event> {
    let event = Event {
        id: new_id(),
        user_id: input.user_id,
        title: input.title,
        description: input.description,
        date: input.date,
        kind: input.kind,
        subject_id: input.subject_id,
        priority: input.priority.unwrap_or_else(|| "medium".to_string()),
        completed: input.completed.unwrap_or(false),
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO events(id, user_id, title, description, date, type, subject_id,
                            priority, completed, created_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            event.id,
            event.user_id,
            event.title,
            event.description,
            event.date,
            event.kind,
            event.subject_id,
            event.priority,
            event.completed as i64,
            event.created_at
        ],
    )?;
    Ok(event)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Event>> {
    conn.query_row(
        "SELECT id, user_id, title, description, date, type, subject_id, priority, completed, created_at
         FROM events WHERE id = ?",
        [id],
        event_from_row,
    )
    .optional()
}

pub fn list_for_user(conn: &Connection, user_id: &str) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, title, description, date, type, subject_id, priority, completed, created_at
         FROM events WHERE user_id = ? ORDER BY rowid",
    )?;
    let rows = stmt.query_map([user_id], event_from_row)?;
    rows.collect()
}

/// Events strictly after `after`, soonest first. Timestamps are the fixed
/// width RFC 3339 strings, so the comparison and sort happen on the raw
/// column. Ties on the same instant fall back to insertion order.
pub fn list_upcoming(conn: &Connection, user_id: &str, after: &str, limit: i64) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, title, description, date, type, subject_id, priority, completed, created_at
         FROM events
         WHERE user_id = ? AND date > ?
         ORDER BY date ASC, rowid ASC
         LIMIT ?",
    )?;
    let rows = stmt.query_map(params![user_id, after, limit], event_from_row)?;
    rows.collect()
}

pub fn update(conn: &Connection, id: &str, patch: EventPatch) -> Result<Option<Event>> {
    let mut fields: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(title) = patch.title {
        fields.push("title = ?".to_string());
        values.push(Value::Text(title));
    }
    if let Some(description) = patch.description {
        fields.push("description = ?".to_string());
        values.push(match description {
            Some(d) => Value::Text(d),
            None => Value::Null,
        });
    }
    if let Some(date) = patch.date {
        fields.push("date = ?".to_string());
        values.push(Value::Text(date));
    }
    if let Some(kind) = patch.kind {
        fields.push("type = ?".to_string());
        values.push(Value::Text(kind));
    }
    if let Some(subject_id) = patch.subject_id {
        fields.push("subject_id = ?".to_string());
        values.push(match subject_id {
            Some(s) => Value::Text(s),
            None => Value::Null,
        });
    }
    if let Some(priority) = patch.priority {
        fields.push("priority = ?".to_string());
        values.push(Value::Text(priority));
    }
    if let Some(completed) = patch.completed {
        fields.push("completed = ?".to_string());
        values.push(Value::Integer(if completed { 1 } else { 0 }));
    }
    if fields.is_empty() {
        return get(conn, id);
    }
    values.push(Value::Text(id.to_string()));
    let sql = format!("UPDATE events SET {} WHERE id = ?", fields.join(", "));
    let changed = conn.execute(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Ok(None);
    }
    get(conn, id)
}

pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM events WHERE id = ?", [id])?;
    Ok(changed > 0)
}
