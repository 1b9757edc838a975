pub mod bunk_plans;
pub mod events;
pub mod groups;
pub mod notifications;
pub mod subjects;
pub mod timetables;
pub mod users;

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Fresh opaque id for a new row.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current instant as RFC 3339 UTC with fixed microsecond precision and a
/// `Z` suffix. Fixed width keeps lexicographic order on the TEXT columns
/// identical to chronological order, so queries sort and compare the raw
/// strings.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
