use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    parse_datetime_utc, parse_opt_bool, parse_opt_i64, parse_opt_string, required_str,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, events};

const EVENT_TYPES: [&str; 5] = ["exam", "assignment", "lab", "quiz", "project"];
const PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match events::list_for_user(&state.conn, &user_id) {
        Ok(list) => ok(&req.id, json!({ "events": list })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_upcoming(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let limit = match parse_opt_i64(req.params.get("limit")) {
        Ok(v) => v.unwrap_or(10),
        Err(m) => return err(&req.id, "bad_params", format!("limit {}", m), None),
    };
    if limit < 1 {
        return err(&req.id, "bad_params", "limit must be >= 1", None);
    }
    match events::list_upcoming(&state.conn, &user_id, &store::now(), limit) {
        Ok(list) => ok(&req.id, json!({ "events": list })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let title = match required_str(req, "title") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let date = match required_str(req, "date") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let date = match parse_datetime_utc(&date) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("date {}", m), None),
    };
    let kind = match required_str(req, "type") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if !EVENT_TYPES.contains(&kind.as_str()) {
        return err(
            &req.id,
            "bad_params",
            format!("type must be one of {}", EVENT_TYPES.join(", ")),
            None,
        );
    }
    let description = match parse_opt_string(req.params.get("description")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("description {}", m), None),
    };
    let subject_id = match parse_opt_string(req.params.get("subjectId")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("subjectId {}", m), None),
    };
    let priority = match parse_opt_string(req.params.get("priority")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("priority {}", m), None),
    };
    if let Some(p) = &priority {
        if !PRIORITIES.contains(&p.as_str()) {
            return err(
                &req.id,
                "bad_params",
                format!("priority must be one of {}", PRIORITIES.join(", ")),
                None,
            );
        }
    }
    let completed = match parse_opt_bool(req.params.get("completed")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("completed {}", m), None),
    };

    let input = events::NewEvent {
        user_id,
        title,
        description,
        date,
        kind,
        subject_id,
        priority,
        completed,
    };
    match events::create(&state.conn, input) {
        Ok(event) => ok(&req.id, json!({ "event": event })),
        Err(e) => err(&req.id, "db_insert_failed", e.to_string(), None),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let event_id = match required_str(req, "eventId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing patch", None);
    };

    let mut patch = events::EventPatch::default();
    for (k, v) in patch_obj {
        match k.as_str() {
            "title" => {
                let Some(s) = v.as_str() else {
                    return err(&req.id, "bad_params", "patch.title must be string", None);
                };
                let s = s.trim();
                if s.is_empty() {
                    return err(&req.id, "bad_params", "patch.title must not be empty", None);
                }
                patch.title = Some(s.to_string());
            }
            "description" => {
                if v.is_null() {
                    patch.description = Some(None);
                } else if let Some(s) = v.as_str() {
                    patch.description = Some(Some(s.trim().to_string()));
                } else {
                    return err(&req.id, "bad_params", "patch.description must be string or null", None);
                }
            }
            "date" => {
                let Some(s) = v.as_str() else {
                    return err(&req.id, "bad_params", "patch.date must be string", None);
                };
                match parse_datetime_utc(s) {
                    Ok(d) => patch.date = Some(d),
                    Err(m) => return err(&req.id, "bad_params", format!("patch.date {}", m), None),
                }
            }
            "type" => {
                let Some(s) = v.as_str() else {
                    return err(&req.id, "bad_params", "patch.type must be string", None);
                };
                if !EVENT_TYPES.contains(&s) {
                    return err(
                        &req.id,
                        "bad_params",
                        format!("patch.type must be one of {}", EVENT_TYPES.join(", ")),
                        None,
                    );
                }
                patch.kind = Some(s.to_string());
            }
            "subjectId" => {
                if v.is_null() {
                    patch.subject_id = Some(None);
                } else if let Some(s) = v.as_str() {
                    patch.subject_id = Some(Some(s.trim().to_string()));
                } else {
                    return err(&req.id, "bad_params", "patch.subjectId must be string or null", None);
                }
            }
            "priority" => {
                let Some(s) = v.as_str() else {
                    return err(&req.id, "bad_params", "patch.priority must be string", None);
                };
                if !PRIORITIES.contains(&s) {
                    return err(
                        &req.id,
                        "bad_params",
                        format!("patch.priority must be one of {}", PRIORITIES.join(", ")),
                        None,
                    );
                }
                patch.priority = Some(s.to_string());
            }
            "completed" => {
                let Some(b) = v.as_bool() else {
                    return err(&req.id, "bad_params", "patch.completed must be boolean", None);
                };
                patch.completed = Some(b);
            }
            _ => return err(&req.id, "bad_params", format!("unknown patch field: {}", k), None),
        }
    }

    match events::update(&state.conn, &event_id, patch) {
        Ok(Some(event)) => ok(&req.id, json!({ "event": event })),
        Ok(None) => err(&req.id, "not_found", "event not found", None),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let event_id = match required_str(req, "eventId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match events::delete(&state.conn, &event_id) {
        Ok(true) => ok(&req.id, json!({ "deleted": true })),
        Ok(false) => err(&req.id, "not_found", "event not found", None),
        Err(e) => err(&req.id, "db_delete_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "events.list" => Some(handle_list(state, req)),
        "events.upcoming" => Some(handle_upcoming(state, req)),
        "events.create" => Some(handle_create(state, req)),
        "events.update" => Some(handle_update(state, req)),
        "events.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
