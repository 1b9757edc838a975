use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_opt_i64, parse_opt_string, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::subjects;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match subjects::list_for_user(&state.conn, &user_id) {
        Ok(list) => ok(&req.id, json!({ "subjects": list })),
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
    let total_lectures = match parse_opt_i64(req.params.get("totalLectures")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("totalLectures {}", m), None),
    };
    if total_lectures.is_some_and(|n| n < 0) {
        return err(&req.id, "bad_params", "totalLectures must be >= 0", None);
    }
    let attended_lectures = match parse_opt_i64(req.params.get("attendedLectures")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("attendedLectures {}", m), None),
    };
    if attended_lectures.is_some_and(|n| n < 0) {
        return err(&req.id, "bad_params", "attendedLectures must be >= 0", None);
    }
    let required_percentage = match parse_opt_i64(req.params.get("requiredPercentage")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("requiredPercentage {}", m), None),
    };
    if required_percentage.is_some_and(|n| !(0..=100).contains(&n)) {
        return err(&req.id, "bad_params", "requiredPercentage must be within 0..=100", None);
    }
    let color = match parse_opt_string(req.params.get("color")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("color {}", m), None),
    };

    let input = subjects::NewSubject {
        user_id,
        name,
        total_lectures,
        attended_lectures,
        required_percentage,
        color,
    };
    match subjects::create(&state.conn, input) {
        Ok(subject) => ok(&req.id, json!({ "subject": subject })),
        Err(e) => err(&req.id, "db_insert_failed", e.to_string(), None),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject_id = match required_str(req, "subjectId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing patch", None);
    };

    let mut patch = subjects::SubjectPatch::default();
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
            "totalLectures" => {
                let Some(n) = v.as_i64() else {
                    return err(&req.id, "bad_params", "patch.totalLectures must be integer", None);
                };
                if n < 0 {
                    return err(&req.id, "bad_params", "patch.totalLectures must be >= 0", None);
                }
                patch.total_lectures = Some(n);
            }
            "attendedLectures" => {
                let Some(n) = v.as_i64() else {
                    return err(&req.id, "bad_params", "patch.attendedLectures must be integer", None);
                };
                if n < 0 {
                    return err(&req.id, "bad_params", "patch.attendedLectures must be >= 0", None);
                }
                patch.attended_lectures = Some(n);
            }
            "requiredPercentage" => {
                let Some(n) = v.as_i64() else {
                    return err(&req.id, "bad_params", "patch.requiredPercentage must be integer", None);
                };
                if !(0..=100).contains(&n) {
                    return err(
                        &req.id,
                        "bad_params",
                        "patch.requiredPercentage must be within 0..=100",
                        None,
                    );
                }
                patch.required_percentage = Some(n);
            }
            "color" => {
                let Some(s) = v.as_str() else {
                    return err(&req.id, "bad_params", "patch.color must be string", None);
                };
                let s = s.trim();
                if s.is_empty() {
                    return err(&req.id, "bad_params", "patch.color must not be empty", None);
                }
                patch.color = Some(s.to_string());
            }
            _ => return err(&req.id, "bad_params", format!("unknown patch field: {}", k), None),
        }
    }

    match subjects::update(&state.conn, &subject_id, patch) {
        Ok(Some(subject)) => ok(&req.id, json!({ "subject": subject })),
        Ok(None) => err(&req.id, "not_found", "subject not found", None),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject_id = match required_str(req, "subjectId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match subjects::delete(&state.conn, &subject_id) {
        Ok(true) => ok(&req.id, json!({ "deleted": true })),
        Ok(false) => err(&req.id, "not_found", "subject not found", None),
        Err(e) => err(&req.id, "db_delete_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.list" => Some(handle_list(state, req)),
        "subjects.create" => Some(handle_create(state, req)),
        "subjects.update" => Some(handle_update(state, req)),
        "subjects.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
