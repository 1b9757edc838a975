use serde_json::{json, Map, Value as JsonValue};

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_opt_bool, parse_opt_string, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::timetables;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match timetables::list_for_user(&state.conn, &user_id) {
        Ok(list) => ok(&req.id, json!({ "timetables": list })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_active(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match timetables::active_for_user(&state.conn, &user_id) {
        // No active timetable is an ordinary answer, not an error.
        Ok(active) => ok(&req.id, json!({ "timetable": active })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let schedule = match req.params.get("schedule") {
        Some(v) if !v.is_null() => v.clone(),
        _ => return err(&req.id, "bad_params", "missing schedule", None),
    };
    let is_active = match parse_opt_bool(req.params.get("isActive")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("isActive {}", m), None),
    };

    let input = timetables::NewTimetable {
        user_id,
        name,
        schedule,
        is_active,
    };
    match timetables::create(&state.conn, input) {
        Ok(timetable) => ok(&req.id, json!({ "timetable": timetable })),
        Err(e) => err(&req.id, "db_insert_failed", e.to_string(), None),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let timetable_id = match required_str(req, "timetableId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing patch", None);
    };

    let mut patch = timetables::TimetablePatch::default();
    for (k, v) in patch_obj {
        match k.as_str() {
            "name" => {
                let Some(s) = v.as_str() else {
                    return err(&req.id, "bad_params", "patch.name must be string", None);
                };
                let s = s.trim();
                if s.is_empty() {
                    return err(&req.id, "bad_params", "patch.name must not be empty", None);
                }
                patch.name = Some(s.to_string());
            }
            "schedule" => {
                if v.is_null() {
                    return err(&req.id, "bad_params", "patch.schedule must not be null", None);
                }
                patch.schedule = Some(v.clone());
            }
            "isActive" => {
                let Some(b) = v.as_bool() else {
                    return err(&req.id, "bad_params", "patch.isActive must be boolean", None);
                };
                patch.is_active = Some(b);
            }
            _ => return err(&req.id, "bad_params", format!("unknown patch field: {}", k), None),
        }
    }

    match timetables::update(&state.conn, &timetable_id, patch) {
        Ok(Some(timetable)) => ok(&req.id, json!({ "timetable": timetable })),
        Ok(None) => err(&req.id, "not_found", "timetable not found", None),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

/// Best-effort Day,Time,Subject parsing. Blank lines are dropped before
/// the header skip, rows missing any of the three cells are ignored, and
/// extra cells are ignored too.
fn parse_csv_schedule(csv: &str) -> JsonValue {
    let lines: Vec<&str> = csv.lines().filter(|l| !l.trim().is_empty()).collect();
    let mut schedule = Map::new();
    for line in lines.iter().skip(1) {
        let mut cells = line.split(',');
        let (Some(day), Some(time), Some(subject)) = (cells.next(), cells.next(), cells.next())
        else {
            continue;
        };
        let (day, time, subject) = (day.trim(), time.trim(), subject.trim());
        if day.is_empty() || time.is_empty() || subject.is_empty() {
            continue;
        }
        let slots = schedule
            .entry(day.to_string())
            .or_insert_with(|| JsonValue::Array(Vec::new()));
        if let Some(arr) = slots.as_array_mut() {
            arr.push(json!({ "time": time, "subject": subject }));
        }
    }
    JsonValue::Object(schedule)
}

fn handle_import_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let csv = match required_str(req, "csv") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let name = match parse_opt_string(req.params.get("name")) {
        Ok(v) => v.unwrap_or_else(|| "Uploaded Timetable".to_string()),
        Err(m) => return err(&req.id, "bad_params", format!("name {}", m), None),
    };

    let schedule = parse_csv_schedule(&csv);
    let input = timetables::NewTimetable {
        user_id,
        name,
        schedule,
        is_active: Some(true),
    };
    match timetables::create(&state.conn, input) {
        Ok(timetable) => ok(&req.id, json!({ "timetable": timetable })),
        Err(e) => err(&req.id, "db_insert_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "timetables.list" => Some(handle_list(state, req)),
        "timetables.active" => Some(handle_active(state, req)),
        "timetables.create" => Some(handle_create(state, req)),
        "timetables.update" => Some(handle_update(state, req)),
        "timetables.importCsv" => Some(handle_import_csv(state, req)),
        _ => None,
    }
}
