use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_opt_string, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::groups;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match groups::list_for_user(&state.conn, &user_id) {
        Ok(list) => ok(&req.id, json!({ "groups": list })),
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
    let description = match parse_opt_string(req.params.get("description")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("description {}", m), None),
    };
    let code = match parse_opt_string(req.params.get("code")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("code {}", m), None),
    };
    if let Some(code) = &code {
        if code.chars().count() != 6 {
            return err(&req.id, "bad_params", "code must be exactly 6 characters", None);
        }
    }

    let input = groups::NewGroup {
        name,
        code,
        created_by: user_id,
        description,
    };
    match groups::create(&state.conn, input) {
        Ok((group, member)) => ok(&req.id, json!({ "group": group, "member": member })),
        // UNIQUE(code) collisions land here; the tx has already rolled back.
        Err(e) => err(&req.id, "db_insert_failed", e.to_string(), None),
    }
}

fn handle_join(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let code = match required_str(req, "code") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let group = match groups::find_by_code(&state.conn, &code) {
        Ok(Some(g)) => g,
        Ok(None) => return err(&req.id, "not_found", "group not found", None),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    // Joining twice is allowed and stores a second membership.
    match groups::join(&state.conn, &group.id, &user_id) {
        Ok(member) => ok(&req.id, json!({ "group": group, "member": member })),
        Err(e) => err(&req.id, "db_insert_failed", e.to_string(), None),
    }
}

fn handle_members(state: &mut AppState, req: &Request) -> serde_json::Value {
    let group_id = match required_str(req, "groupId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let rows = match groups::members_with_users(&state.conn, &group_id) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let mut members = Vec::with_capacity(rows.len());
    for (member, user) in rows {
        // A membership pointing at a deleted user is a real inconsistency;
        // report it instead of skipping the row or crashing.
        let Some(user) = user else {
            return err(
                &req.id,
                "integrity",
                format!("membership {} references missing user {}", member.id, member.user_id),
                None,
            );
        };
        let mut entry = json!(member);
        entry["user"] = json!(user);
        members.push(entry);
    }
    ok(&req.id, json!({ "members": members }))
}

fn handle_leave(state: &mut AppState, req: &Request) -> serde_json::Value {
    let group_id = match required_str(req, "groupId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match groups::leave(&state.conn, &group_id, &user_id) {
        Ok(true) => ok(&req.id, json!({ "left": true })),
        Ok(false) => err(&req.id, "not_found", "not a member of this group", None),
        Err(e) => err(&req.id, "db_delete_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "groups.list" => Some(handle_list(state, req)),
        "groups.create" => Some(handle_create(state, req)),
        "groups.join" => Some(handle_join(state, req)),
        "groups.members" => Some(handle_members(state, req)),
        "groups.leave" => Some(handle_leave(state, req)),
        _ => None,
    }
}
