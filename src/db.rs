use rusqlite::{params, Connection};

use crate::store::now;

/// Opens the in-memory store and creates the schema. All state lives and
/// dies with the process; nothing is written to disk.
///
/// No FOREIGN KEY clauses anywhere: deletes never cascade, and a row may
/// outlive whatever it references. Readers that join across tables decide
/// per call site how to treat a dangling reference.
pub fn open_memory() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            avatar TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects(
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            total_lectures INTEGER NOT NULL DEFAULT 0,
            attended_lectures INTEGER NOT NULL DEFAULT 0,
            required_percentage INTEGER NOT NULL DEFAULT 75,
            color TEXT NOT NULL DEFAULT '#7341ff',
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subjects_user ON subjects(user_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS groups(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT NOT NULL UNIQUE,
            created_by TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // No UNIQUE(group_id, user_id): joining twice stores two memberships.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS group_members(
            id TEXT PRIMARY KEY,
            group_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            joined_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_group_members_group ON group_members(group_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_group_members_user ON group_members(user_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events(
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            date TEXT NOT NULL,
            type TEXT NOT NULL,
            subject_id TEXT,
            priority TEXT NOT NULL DEFAULT 'medium',
            completed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_user_date ON events(user_id, date)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS notifications(
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            type TEXT NOT NULL,
            read INTEGER NOT NULL DEFAULT 0,
            related_entity_id TEXT,
            related_entity_type TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, created_at)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bunk_plans(
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            group_id TEXT,
            subject_id TEXT NOT NULL,
            planned_date TEXT NOT NULL,
            reason TEXT,
            status TEXT NOT NULL DEFAULT 'planned',
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bunk_plans_user ON bunk_plans(user_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bunk_plans_group ON bunk_plans(group_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS timetables(
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            schedule_json TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_timetables_user ON timetables(user_id)",
        [],
    )?;

    Ok(conn)
}

/// Seeds the demo account and its three subjects so a fresh daemon has
/// something to show. Subject numbers land one in each attendance zone
/// under the default 75% rule.
pub fn seed_demo(conn: &Connection) -> anyhow::Result<()> {
    let ts = now();
    conn.execute(
        "INSERT INTO users(id, username, email, name, avatar, created_at)
         VALUES(?, ?, ?, ?, ?, ?)",
        params![
            "demo-user-1",
            "johndoe",
            "john@example.com",
            "John Doe",
            "https://images.unsplash.com/photo-1535713875002-d1d0cf377fde?ixlib=rb-4.0.3&auto=format&fit=crop&w=32&h=32",
            ts,
        ],
    )?;

    let subjects = [
        ("subject-1", "Mathematics", 30i64, 26i64, "#10b981"),
        ("subject-2", "Physics", 25, 19, "#f59e0b"),
        ("subject-3", "Chemistry", 28, 19, "#ef4444"),
    ];
    for (id, name, total, attended, color) in subjects {
        conn.execute(
            "INSERT INTO subjects(id, user_id, name, total_lectures, attended_lectures,
                                  required_percentage, color, created_at)
             VALUES(?, ?, ?, ?, ?, 75, ?, ?)",
            params![id, "demo-user-1", name, total, attended, color, now()],
        )?;
    }

    Ok(())
}
