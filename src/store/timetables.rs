use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Result, Row};
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{new_id, now};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timetable {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub schedule: JsonValue,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewTimetable {
    pub user_id: String,
    pub name: String,
    pub schedule: JsonValue,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct TimetablePatch {
    pub name: Option<String>,
    pub schedule: Option<JsonValue>,
    pub is_active: Option<bool>,
}

fn schedule_string(schedule: &JsonValue) -> String {
    serde_json::to_string(schedule).unwrap_or_else(|_| "null".to_string())
}

pub fn timetable_from_row(row: &Row<'_>) -> Result<Timetable> {
    let raw: String = row.get(3)?;
    Ok(Timetable {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        schedule: serde_json::from_str(&raw).unwrap_or(JsonValue::Null),
        is_active: row.get::<_, i64>(4)? != 0,
        created_at: row.get(5)?,
    })
}

pub fn create(conn: &Connection, input: NewTimetable) -> Result<Timetable> {
    let timetable = Timetable {
        id: new_id(),
        user_id: input.user_id,
        name: input.name,
        schedule: input.schedule,
        is_active: input.is_active.unwrap_or(true),
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO timetables(id, user_id, name, schedule_json, is_active, created_at)
         VALUES(?, ?, ?, ?, ?, ?)",
        params![
            timetable.id,
            timetable.user_id,
            timetable.name,
            schedule_string(&timetable.schedule),
            timetable.is_active as i64,
            timetable.created_at
        ],
    )?;
    Ok(timetable)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Timetable>> {
    conn.query_row(
        "SELECT id, user_id, name, schedule_json, is_active, created_at
         FROM timetables WHERE id = ?",
        [id],
        timetable_from_row,
    )
    .optional()
}

pub fn list_for_user(conn: &Connection, user_id: &str) -> Result<Vec<Timetable>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, schedule_json, is_active, created_at
         FROM timetables WHERE user_id = ? ORDER BY rowid",
    )?;
    let rows = stmt.query_map([user_id], timetable_from_row)?;
    rows.collect()
}

/// First active timetable in insertion order. Nothing stops several rows
/// being active at once; which one wins is this query-time convention,
/// not a stored invariant.
pub fn active_for_user(conn: &Connection, user_id: &str) -> Result<Option<Timetable>> {
    conn.query_row(
        "SELECT id, user_id, name, schedule_json, is_active, created_at
         FROM timetables
         WHERE user_id = ? AND is_active = 1
         ORDER BY rowid LIMIT 1",
        [user_id],
        timetable_from_row,
    )
    .optional()
}

pub fn update(conn: &Connection, id: &str, patch: TimetablePatch) -> Result<Option<Timetable>> {
    let mut fields: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(name) = patch.name {
        fields.push("name = ?".to_string());
        values.push(Value::Text(name));
    }
    if let Some(schedule) = patch.schedule {
        fields.push("schedule_json = ?".to_string());
        values.push(Value::Text(schedule_string(&schedule)));
    }
    if let Some(is_active) = patch.is_active {
        fields.push("is_active = ?".to_string());
        values.push(Value::Integer(if is_active { 1 } else { 0 }));
    }
    if fields.is_empty() {
        return get(conn, id);
    }
    values.push(Value::Text(id.to_string()));
    let sql = format!("UPDATE timetables SET {} WHERE id = ?", fields.join(", "));
    let changed = conn.execute(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Ok(None);
    }
    get(conn, id)
}

pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM timetables WHERE id = ?", [id])?;
    Ok(changed > 0)
}
