use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_opt_string, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::notifications;

const NOTIFICATION_TYPES: [&str; 4] = ["warning", "info", "success", "error"];

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match notifications::list_for_user(&state.conn, &user_id) {
        Ok(list) => ok(&req.id, json!({ "notifications": list })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_unread(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match notifications::list_unread(&state.conn, &user_id) {
        Ok(list) => ok(&req.id, json!({ "notifications": list })),
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
    let message = match required_str(req, "message") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let kind = match required_str(req, "type") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if !NOTIFICATION_TYPES.contains(&kind.as_str()) {
        return err(
            &req.id,
            "bad_params",
            format!("type must be one of {}", NOTIFICATION_TYPES.join(", ")),
            None,
        );
    }
    let related_entity_id = match parse_opt_string(req.params.get("relatedEntityId")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("relatedEntityId {}", m), None),
    };
    let related_entity_type = match parse_opt_string(req.params.get("relatedEntityType")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("relatedEntityType {}", m), None),
    };

    let input = notifications::NewNotification {
        user_id,
        title,
        message,
        kind,
        related_entity_id,
        related_entity_type,
    };
    match notifications::create(&state.conn, input) {
        Ok(notification) => ok(&req.id, json!({ "notification": notification })),
        Err(e) => err(&req.id, "db_insert_failed", e.to_string(), None),
    }
}

fn handle_mark_read(state: &mut AppState, req: &Request) -> serde_json::Value {
    let notification_id = match required_str(req, "notificationId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match notifications::mark_read(&state.conn, &notification_id) {
        Ok(true) => ok(&req.id, json!({ "read": true })),
        Ok(false) => err(&req.id, "not_found", "notification not found", None),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "notifications.list" => Some(handle_list(state, req)),
        "notifications.unread" => Some(handle_unread(state, req)),
        "notifications.create" => Some(handle_create(state, req)),
        "notifications.markRead" => Some(handle_mark_read(state, req)),
        _ => None,
    }
}
