use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

use super::{new_id, now};

pub const DEFAULT_COLOR: &str = "#7341ff";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub total_lectures: i64,
    pub attended_lectures: i64,
    pub required_percentage: i64,
    pub color: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewSubject {
    pub user_id: String,
    pub name: String,
    pub total_lectures: Option<i64>,
    pub attended_lectures: Option<i64>,
    pub required_percentage: Option<i64>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub total_lectures: Option<i64>,
    pub attended_lectures: Option<i64>,
    pub required_percentage: Option<i64>,
    pub color: Option<String>,
}

pub fn subject_from_row(row: &Row<'_>) -> Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        total_lectures: row.get(3)?,
        attended_lectures: row.get(4)?,
        required_percentage: row.get(5)?,
        color: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn create(conn: &Connection, input: NewSubject) -> Result<Subject> {
    let subject = Subject {
        id: new_id(),
        user_id: input.user_id,
        name: input.name,
        total_lectures: input.total_lectures.unwrap_or(0),
        attended_lectures: input.attended_lectures.unwrap_or(0),
        required_percentage: input.required_percentage.unwrap_or(75),
        color: input.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO subjects(id, user_id, name, total_lectures, attended_lectures,
                              required_percentage, color, created_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            subject.id,
            subject.user_id,
            subject.name,
            subject.total_lectures,
            subject.attended_lectures,
            subject.required_percentage,
            subject.color,
            subject.created_at
        ],
    )?;
    Ok(subject)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Subject>> {
    conn.query_row(
        "SELECT id, user_id, name, total_lectures, attended_lectures, required_percentage, color, created_at
         FROM subjects WHERE id = ?",
        [id],
        subject_from_row,
    )
    .optional()
}

/// Oldest first; creation order is the stable listing order.
pub fn list_for_user(conn: &Connection, user_id: &str) -> Result<Vec<Subject>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, total_lectures, attended_lectures, required_percentage, color, created_at
         FROM subjects WHERE user_id = ? ORDER BY rowid",
    )?;
    let rows = stmt.query_map([user_id], subject_from_row)?;
    rows.collect()
}

pub fn update(conn: &Connection, id: &str, patch: SubjectPatch) -> Result<Option<Subject>> {
    let mut fields: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(name) = patch.name {
        fields.push("name = ?".to_string());
        values.push(Value::Text(name));
    }
    if let Some(total) = patch.total_lectures {
        fields.push("total_lectures = ?".to_string());
        values.push(Value::Integer(total));
    }
    if let Some(attended) = patch.attended_lectures {
        fields.push("attended_lectures = ?".to_string());
        values.push(Value::Integer(attended));
    }
    if let Some(required) = patch.required_percentage {
        fields.push("required_percentage = ?".to_string());
        values.push(Value::Integer(required));
    }
    if let Some(color) = patch.color {
        fields.push("color = ?".to_string());
        values.push(Value::Text(color));
    }
    if fields.is_empty() {
        return get(conn, id);
    }
    values.push(Value::Text(id.to_string()));
    let sql = format!("UPDATE subjects SET {} WHERE id = ?", fields.join(", "));
    let changed = conn.execute(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Ok(None);
    }
    get(conn, id)
}

pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM subjects WHERE id = ?", [id])?;
    Ok(changed > 0)
}
