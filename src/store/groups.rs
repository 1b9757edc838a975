use rand::Rng;
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

use super::users::User;
use super::{new_id, now};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub code: String,
    pub created_by: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub id: String,
    pub group_id: String,
    pub user_id: String,
    pub joined_at: String,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub code: Option<String>,
    pub created_by: String,
    pub description: Option<String>,
}

/// Membership rows have no patch: every column is identity, so the only
/// write operations on them are join and leave.
#[derive(Debug, Clone, Default)]
pub struct GroupPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

const CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random 6-character join code, uppercase letters and digits.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

pub fn group_from_row(row: &Row<'_>) -> Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        created_by: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn member_from_row(row: &Row<'_>) -> Result<GroupMember> {
    Ok(GroupMember {
        id: row.get(0)?,
        group_id: row.get(1)?,
        user_id: row.get(2)?,
        joined_at: row.get(3)?,
    })
}

/// Creates the group and joins the creator, atomically. A group never
/// exists without its creator's membership.
pub fn create(conn: &Connection, input: NewGroup) -> Result<(Group, GroupMember)> {
    let group = Group {
        id: new_id(),
        name: input.name,
        code: input.code.unwrap_or_else(generate_code),
        created_by: input.created_by,
        description: input.description,
        created_at: now(),
    };
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO groups(id, name, code, created_by, description, created_at)
         VALUES(?, ?, ?, ?, ?, ?)",
        params![
            group.id,
            group.name,
            group.code,
            group.created_by,
            group.description,
            group.created_at
        ],
    )?;
    let member = insert_member(&tx, &group.id, &group.created_by)?;
    tx.commit()?;
    Ok((group, member))
}

fn insert_member(conn: &Connection, group_id: &str, user_id: &str) -> Result<GroupMember> {
    let member = GroupMember {
        id: new_id(),
        group_id: group_id.to_string(),
        user_id: user_id.to_string(),
        joined_at: now(),
    };
    conn.execute(
        "INSERT INTO group_members(id, group_id, user_id, joined_at) VALUES(?, ?, ?, ?)",
        params![member.id, member.group_id, member.user_id, member.joined_at],
    )?;
    Ok(member)
}

/// Adds a membership unconditionally. Joining a group twice stores two
/// rows; callers that want one must check first.
pub fn join(conn: &Connection, group_id: &str, user_id: &str) -> Result<GroupMember> {
    insert_member(conn, group_id, user_id)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Group>> {
    conn.query_row(
        "SELECT id, name, code, created_by, description, created_at FROM groups WHERE id = ?",
        [id],
        group_from_row,
    )
    .optional()
}

/// Exact, case-sensitive code match.
pub fn find_by_code(conn: &Connection, code: &str) -> Result<Option<Group>> {
    conn.query_row(
        "SELECT id, name, code, created_by, description, created_at FROM groups WHERE code = ?",
        [code],
        group_from_row,
    )
    .optional()
}

/// Groups the user belongs to, one row per membership in join order. A
/// membership whose group was deleted has nothing to show and is dropped
/// here; a double join lists the group twice.
pub fn list_for_user(conn: &Connection, user_id: &str) -> Result<Vec<Group>> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.name, g.code, g.created_by, g.description, g.created_at
         FROM group_members m
         JOIN groups g ON g.id = m.group_id
         WHERE m.user_id = ?
         ORDER BY m.rowid",
    )?;
    let rows = stmt.query_map([user_id], group_from_row)?;
    rows.collect()
}

/// Memberships of a group with each member's user row. The user side is
/// `None` when the membership references a user that no longer exists;
/// the caller decides whether that is tolerable.
pub fn members_with_users(
    conn: &Connection,
    group_id: &str,
) -> Result<Vec<(GroupMember, Option<User>)>> {
    let mut stmt = conn.prepare(
        "SELECT m.id, m.group_id, m.user_id, m.joined_at,
                u.id, u.username, u.email, u.name, u.avatar, u.created_at
         FROM group_members m
         LEFT JOIN users u ON u.id = m.user_id
         WHERE m.group_id = ?
         ORDER BY m.rowid",
    )?;
    let rows = stmt.query_map([group_id], |row| {
        let member = member_from_row(row)?;
        let user = match row.get::<_, Option<String>>(4)? {
            Some(id) => Some(User {
                id,
                username: row.get(5)?,
                email: row.get(6)?,
                name: row.get(7)?,
                avatar: row.get(8)?,
                created_at: row.get(9)?,
            }),
            None => None,
        };
        Ok((member, user))
    })?;
    rows.collect()
}

pub fn member_count(conn: &Connection, group_id: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM group_members WHERE group_id = ?",
        [group_id],
        |row| row.get(0),
    )
}

/// Total membership rows across every group the user belongs to. Each
/// group counts once even when the user holds duplicate memberships in
/// it, and deleted groups are out, mirroring `list_for_user`.
pub fn member_count_across_user_groups(conn: &Connection, user_id: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM group_members m
         WHERE m.group_id IN (
            SELECT DISTINCT gm.group_id
            FROM group_members gm
            JOIN groups g ON g.id = gm.group_id
            WHERE gm.user_id = ?
         )",
        [user_id],
        |row| row.get(0),
    )
}

/// Removes one membership, the oldest, matching the pair. Returns false
/// when the user was not a member. With duplicate joins, each leave peels
/// off a single row.
pub fn leave(conn: &Connection, group_id: &str, user_id: &str) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM group_members WHERE id = (
            SELECT id FROM group_members
            WHERE group_id = ? AND user_id = ?
            ORDER BY rowid LIMIT 1
         )",
        params![group_id, user_id],
    )?;
    Ok(changed > 0)
}

pub fn get_member(conn: &Connection, id: &str) -> Result<Option<GroupMember>> {
    conn.query_row(
        "SELECT id, group_id, user_id, joined_at FROM group_members WHERE id = ?",
        [id],
        member_from_row,
    )
    .optional()
}

pub fn delete_member(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM group_members WHERE id = ?", [id])?;
    Ok(changed > 0)
}

pub fn update(conn: &Connection, id: &str, patch: GroupPatch) -> Result<Option<Group>> {
    let mut fields: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(name) = patch.name {
        fields.push("name = ?".to_string());
        values.push(Value::Text(name));
    }
    if let Some(description) = patch.description {
        fields.push("description = ?".to_string());
        values.push(match description {
            Some(d) => Value::Text(d),
            None => Value::Null,
        });
    }
    if fields.is_empty() {
        return get(conn, id);
    }
    values.push(Value::Text(id.to_string()));
    let sql = format!("UPDATE groups SET {} WHERE id = ?", fields.join(", "));
    let changed = conn.execute(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Ok(None);
    }
    get(conn, id)
}

/// Deletes the group row only. Memberships and plans keep their now
/// dangling group id; listing joins skip them.
pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM groups WHERE id = ?", [id])?;
    Ok(changed > 0)
}
