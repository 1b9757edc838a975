use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_datetime_utc, parse_opt_string, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::bunk_plans;

const PLAN_STATUSES: [&str; 3] = ["planned", "executed", "cancelled"];

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match bunk_plans::list_for_user(&state.conn, &user_id) {
        Ok(list) => ok(&req.id, json!({ "plans": list })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_list_by_group(state: &mut AppState, req: &Request) -> serde_json::Value {
    let group_id = match required_str(req, "groupId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match bunk_plans::list_for_group(&state.conn, &group_id) {
        Ok(list) => ok(&req.id, json!({ "plans": list })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subject_id = match required_str(req, "subjectId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let planned_date = match required_str(req, "plannedDate") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let planned_date = match parse_datetime_utc(&planned_date) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("plannedDate {}", m), None),
    };
    let group_id = match parse_opt_string(req.params.get("groupId")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("groupId {}", m), None),
    };
    let reason = match parse_opt_string(req.params.get("reason")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("reason {}", m), None),
    };
    let status = match parse_opt_string(req.params.get("status")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("status {}", m), None),
    };
    if let Some(s) = &status {
        if !PLAN_STATUSES.contains(&s.as_str()) {
            return err(
                &req.id,
                "bad_params",
                format!("status must be one of {}", PLAN_STATUSES.join(", ")),
                None,
            );
        }
    }

    let input = bunk_plans::NewBunkPlan {
        user_id,
        group_id,
        subject_id,
        planned_date,
        reason,
        status,
    };
    match bunk_plans::create(&state.conn, input) {
        Ok(plan) => ok(&req.id, json!({ "plan": plan })),
        Err(e) => err(&req.id, "db_insert_failed", e.to_string(), None),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let plan_id = match required_str(req, "planId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing patch", None);
    };

    let mut patch = bunk_plans::BunkPlanPatch::default();
    for (k, v) in patch_obj {
        match k.as_str() {
            "groupId" => {
                if v.is_null() {
                    patch.group_id = Some(None);
                } else if let Some(s) = v.as_str() {
                    patch.group_id = Some(Some(s.trim().to_string()));
                } else {
                    return err(&req.id, "bad_params", "patch.groupId must be string or null", None);
                }
            }
            "plannedDate" => {
                let Some(s) = v.as_str() else {
                    return err(&req.id, "bad_params", "patch.plannedDate must be string", None);
                };
                match parse_datetime_utc(s) {
                    Ok(d) => patch.planned_date = Some(d),
                    Err(m) => {
                        return err(&req.id, "bad_params", format!("patch.plannedDate {}", m), None)
                    }
                }
            }
            "reason" => {
                if v.is_null() {
                    patch.reason = Some(None);
                } else if let Some(s) = v.as_str() {
                    patch.reason = Some(Some(s.trim().to_string()));
                } else {
                    return err(&req.id, "bad_params", "patch.reason must be string or null", None);
                }
            }
            "status" => {
                let Some(s) = v.as_str() else {
                    return err(&req.id, "bad_params", "patch.status must be string", None);
                };
                if !PLAN_STATUSES.contains(&s) {
                    return err(
                        &req.id,
                        "bad_params",
                        format!("patch.status must be one of {}", PLAN_STATUSES.join(", ")),
                        None,
                    );
                }
                patch.status = Some(s.to_string());
            }
            _ => return err(&req.id, "bad_params", format!("unknown patch field: {}", k), None),
        }
    }

    match bunk_plans::update(&state.conn, &plan_id, patch) {
        Ok(Some(plan)) => ok(&req.id, json!({ "plan": plan })),
        Ok(None) => err(&req.id, "not_found", "plan not found", None),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "plans.list" => Some(handle_list(state, req)),
        "plans.listByGroup" => Some(handle_list_by_group(state, req)),
        "plans.create" => Some(handle_create(state, req)),
        "plans.update" => Some(handle_update(state, req)),
        _ => None,
    }
}
