use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Per-process state handed to every handler. The store connection is
/// built once at startup and owned here; handlers receive it explicitly
/// instead of reaching for a global.
pub struct AppState {
    pub conn: Connection,
}
