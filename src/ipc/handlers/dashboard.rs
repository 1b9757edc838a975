use serde_json::json;

use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::store::{self, events, groups, subjects};

/// How many upcoming events the dashboard looks at.
const UPCOMING_LIMIT: i64 = 5;

fn handle_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let subject_list = match subjects::list_for_user(&state.conn, &user_id) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    // Overall attendance is the ratio of the summed counters, not the mean
    // of per-subject percentages; a 40-lecture subject weighs more than a
    // 10-lecture one.
    let total: i64 = subject_list.iter().map(|s| s.total_lectures).sum();
    let attended: i64 = subject_list.iter().map(|s| s.attended_lectures).sum();
    let overall = if total > 0 {
        attended as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let safe_to_bunk: i64 = subject_list
        .iter()
        .map(|s| {
            calc::calculate_attendance(
                s.attended_lectures,
                s.total_lectures,
                s.required_percentage as f64,
            )
            .can_bunk
        })
        .sum();

    let upcoming = match events::list_upcoming(&state.conn, &user_id, &store::now(), UPCOMING_LIMIT)
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let group_members = match groups::member_count_across_user_groups(&state.conn, &user_id) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    ok(
        &req.id,
        json!({
            "stats": {
                "overallAttendance": format!("{:.1}", overall),
                "safeToBunk": safe_to_bunk,
                "upcomingEvents": upcoming.len(),
                "groupMembers": group_members,
            }
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.stats" => Some(handle_stats(state, req)),
        _ => None,
    }
}
