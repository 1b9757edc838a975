use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_opt_string, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::users;

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match users::get(&state.conn, &user_id) {
        Ok(Some(user)) => ok(&req.id, json!({ "user": user })),
        Ok(None) => err(&req.id, "not_found", "user not found", None),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_get_by_email(state: &mut AppState, req: &Request) -> serde_json::Value {
    let email = match required_str(req, "email") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match users::get_by_email(&state.conn, &email) {
        Ok(Some(user)) => ok(&req.id, json!({ "user": user })),
        Ok(None) => err(&req.id, "not_found", "user not found", None),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let username = match required_str(req, "username") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let email = match required_str(req, "email") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let avatar = match parse_opt_string(req.params.get("avatar")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("avatar {}", m), None),
    };

    let input = users::NewUser {
        username,
        email,
        name,
        avatar,
    };
    match users::create(&state.conn, input) {
        Ok(user) => ok(&req.id, json!({ "user": user })),
        // UNIQUE(username) / UNIQUE(email) collisions land here.
        Err(e) => err(&req.id, "db_insert_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "user.get" => Some(handle_get(state, req)),
        "user.getByEmail" => Some(handle_get_by_email(state, req)),
        "user.create" => Some(handle_create(state, req)),
        _ => None,
    }
}
