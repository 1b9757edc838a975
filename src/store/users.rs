use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

use super::{new_id, now};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
}

/// Changeable user fields. `id` and `created_at` are identity and never
/// move. `avatar: Some(None)` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<Option<String>>,
}

pub fn user_from_row(row: &Row<'_>) -> Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        avatar: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub fn create(conn: &Connection, input: NewUser) -> Result<User> {
    let user = User {
        id: new_id(),
        username: input.username,
        email: input.email,
        name: input.name,
        avatar: input.avatar,
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO users(id, username, email, name, avatar, created_at)
         VALUES(?, ?, ?, ?, ?, ?)",
        params![
            user.id,
            user.username,
            user.email,
            user.name,
            user.avatar,
            user.created_at
        ],
    )?;
    Ok(user)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<User>> {
    conn.query_row(
        "SELECT id, username, email, name, avatar, created_at FROM users WHERE id = ?",
        [id],
        user_from_row,
    )
    .optional()
}

pub fn get_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    conn.query_row(
        "SELECT id, username, email, name, avatar, created_at FROM users WHERE email = ?",
        [email],
        user_from_row,
    )
    .optional()
}

pub fn get_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    conn.query_row(
        "SELECT id, username, email, name, avatar, created_at FROM users WHERE username = ?",
        [username],
        user_from_row,
    )
    .optional()
}

pub fn update(conn: &Connection, id: &str, patch: UserPatch) -> Result<Option<User>> {
    let mut fields: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(username) = patch.username {
        fields.push("username = ?".to_string());
        values.push(Value::Text(username));
    }
    if let Some(email) = patch.email {
        fields.push("email = ?".to_string());
        values.push(Value::Text(email));
    }
    if let Some(name) = patch.name {
        fields.push("name = ?".to_string());
        values.push(Value::Text(name));
    }
    if let Some(avatar) = patch.avatar {
        fields.push("avatar = ?".to_string());
        values.push(match avatar {
            Some(a) => Value::Text(a),
            None => Value::Null,
        });
    }
    if fields.is_empty() {
        return get(conn, id);
    }
    values.push(Value::Text(id.to_string()));
    let sql = format!("UPDATE users SET {} WHERE id = ?", fields.join(", "));
    let changed = conn.execute(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Ok(None);
    }
    get(conn, id)
}

pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM users WHERE id = ?", [id])?;
    Ok(changed > 0)
}
