use serde_json::json;

/// Success envelope: echoes the request id alongside the result.
pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

/// Failure envelope. `code` is a short machine string (`bad_params`,
/// `not_found`, `db_query_failed`, ...); `message` is for humans and
/// `details` is an optional structured payload.
pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut resp = json!({
        "id": id,
        "ok": false,
        "error": {
            "code": code,
            "message": message.into(),
        },
    });
    if let Some(d) = details {
        resp["error"]["details"] = d;
    }
    resp
}
