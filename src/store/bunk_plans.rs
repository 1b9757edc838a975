use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

use super::{new_id, now};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BunkPlan {
    pub id: String,
    pub user_id: String,
    pub group_id: Option<String>,
    pub subject_id: String,
    pub planned_date: String,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewBunkPlan {
    pub user_id: String,
    pub group_id: Option<String>,
    pub subject_id: String,
    pub planned_date: String,
    pub reason: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BunkPlanPatch {
    pub group_id: Option<Option<String>>,
    pub planned_date: Option<String>,
    pub reason: Option<Option<String>>,
    pub status: Option<String>,
}

pub fn plan_from_row(row: &Row<'_>) -> Result<BunkPlan> {
    Ok(BunkPlan {
        id: row.get(0)?,
        user_id: row.get(1)?,
        group_id: row.get(2)?,
        subject_id: row.get(3)?,
        planned_date: row.get(4)?,
        reason: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn create(conn: &Connection, input: NewBunkPlan) -> Result<BunkPlan> {
    let plan = BunkPlan {
        id: new_id(),
        user_id: input.user_id,
        group_id: input.group_id,
        subject_id: input.subject_id,
        planned_date: input.planned_date,
        reason: input.reason,
        status: input.status.unwrap_or_else(|| "planned".to_string()),
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO bunk_plans(id, user_id, group_id, subject_id, planned_date,
                                reason, status, created_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            plan.id,
            plan.user_id,
            plan.group_id,
            plan.subject_id,
            plan.planned_date,
            plan.reason,
            plan.status,
            plan.created_at
        ],
    )?;
    Ok(plan)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<BunkPlan>> {
    conn.query_row(
        "SELECT id, user_id, group_id, subject_id, planned_date, reason, status, created_at
         FROM bunk_plans WHERE id = ?",
        [id],
        plan_from_row,
    )
    .optional()
}

pub fn list_for_user(conn: &Connection, user_id: &str) -> Result<Vec<BunkPlan>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, group_id, subject_id, planned_date, reason, status, created_at
         FROM bunk_plans WHERE user_id = ? ORDER BY rowid",
    )?;
    let rows = stmt.query_map([user_id], plan_from_row)?;
    rows.collect()
}

/// Plans shared with a group, insertion order. The group id is stored as
/// given; plans pointing at a deleted group still list here.
pub fn list_for_group(conn: &Connection, group_id: &str) -> Result<Vec<BunkPlan>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, group_id, subject_id, planned_date, reason, status, created_at
         FROM bunk_plans WHERE group_id = ? ORDER BY rowid",
    )?;
    let rows = stmt.query_map([group_id], plan_from_row)?;
    rows.collect()
}

pub fn update(conn: &Connection, id: &str, patch: BunkPlanPatch) -> Result<Option<BunkPlan>> {
    let mut fields: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(group_id) = patch.group_id {
        fields.push("group_id = ?".to_string());
        values.push(match group_id {
            Some(g) => Value::Text(g),
            None => Value::Null,
        });
    }
    if let Some(planned_date) = patch.planned_date {
        fields.push("planned_date = ?".to_string());
        values.push(Value::Text(planned_date));
    }
    if let Some(reason) = patch.reason {
        fields.push("reason = ?".to_string());
        values.push(match reason {
            Some(r) => Value::Text(r),
            None => Value::Null,
        });
    }
    if let Some(status) = patch.status {
        fields.push("status = ?".to_string());
        values.push(Value::Text(status));
    }
    if fields.is_empty() {
        return get(conn, id);
    }
    values.push(Value::Text(id.to_string()));
    let sql = format!("UPDATE bunk_plans SET {} WHERE id = ?", fields.join(", "));
    let changed = conn.execute(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Ok(None);
    }
    get(conn, id)
}

pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM bunk_plans WHERE id = ?", [id])?;
    Ok(changed > 0)
}
