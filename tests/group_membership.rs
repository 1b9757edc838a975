use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_bunkbuddyd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn bunkbuddyd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> &str {
    assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(false));
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str())
        .expect("error code")
}

fn create_user(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    username: &str,
) -> String {
    let result = request_ok(
        stdin,
        reader,
        id,
        "user.create",
        json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "name": username,
        }),
    );
    result
        .get("user")
        .and_then(|u| u.get("id"))
        .and_then(|v| v.as_str())
        .expect("user id")
        .to_string()
}

#[test]
fn create_joins_creator_and_lists_immediately() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "groups.create",
        json!({ "userId": "demo-user-1", "name": "Study Squad", "description": "evening sessions" }),
    );
    let group = created.get("group").expect("group");
    let group_id = group.get("id").and_then(|v| v.as_str()).expect("group id");
    let code = group.get("code").and_then(|v| v.as_str()).expect("code");
    assert_eq!(code.len(), 6);
    assert!(code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(
        created
            .get("member")
            .and_then(|m| m.get("userId"))
            .and_then(|v| v.as_str()),
        Some("demo-user-1")
    );

    let members = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "groups.members",
        json!({ "groupId": group_id }),
    );
    let rows = members
        .get("members")
        .and_then(|v| v.as_array())
        .expect("members");
    assert_eq!(rows.len(), 1, "creator is the only member");
    assert_eq!(
        rows[0]
            .get("user")
            .and_then(|u| u.get("username"))
            .and_then(|v| v.as_str()),
        Some("johndoe")
    );

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "groups.list",
        json!({ "userId": "demo-user-1" }),
    );
    let names: Vec<&str> = listed
        .get("groups")
        .and_then(|v| v.as_array())
        .expect("groups")
        .iter()
        .filter_map(|g| g.get("name").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(names, vec!["Study Squad"]);
}

#[test]
fn join_by_code_and_leave_one_row_at_a_time() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "groups.create",
        json!({ "userId": "demo-user-1", "name": "Lab Partners" }),
    );
    let group_id = created
        .get("group")
        .and_then(|g| g.get("id"))
        .and_then(|v| v.as_str())
        .expect("group id")
        .to_string();
    let code = created
        .get("group")
        .and_then(|g| g.get("code"))
        .and_then(|v| v.as_str())
        .expect("code")
        .to_string();

    let friend = create_user(&mut stdin, &mut reader, "2", "amrita");

    let joined = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "groups.join",
        json!({ "userId": friend, "code": code }),
    );
    assert_eq!(
        joined
            .get("group")
            .and_then(|g| g.get("id"))
            .and_then(|v| v.as_str()),
        Some(group_id.as_str())
    );

    // Joining again through the same code is allowed and adds a second
    // membership row.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "groups.join",
        json!({ "userId": friend, "code": code }),
    );

    let members = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "groups.members",
        json!({ "groupId": group_id }),
    );
    let rows = members
        .get("members")
        .and_then(|v| v.as_array())
        .expect("members");
    assert_eq!(rows.len(), 3, "creator + duplicate joiner twice");

    // The duplicate joiner sees the group listed once per membership.
    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "groups.list",
        json!({ "userId": friend }),
    );
    assert_eq!(
        listed.get("groups").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(2)
    );

    // Each leave peels off exactly one membership.
    let left = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "groups.leave",
        json!({ "groupId": group_id, "userId": friend }),
    );
    assert_eq!(left.get("left").and_then(|v| v.as_bool()), Some(true));

    let members = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "groups.members",
        json!({ "groupId": group_id }),
    );
    assert_eq!(
        members.get("members").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(2)
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "groups.leave",
        json!({ "groupId": group_id, "userId": friend }),
    );
    let resp = request(
        &mut stdin,
        &mut reader,
        "10",
        "groups.leave",
        json!({ "groupId": group_id, "userId": friend }),
    );
    assert_eq!(error_code(&resp), "not_found", "no membership left to remove");
}

#[test]
fn join_with_unknown_code_is_not_found() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "groups.join",
        json!({ "userId": "demo-user-1", "code": "ZZZZZZ" }),
    );
    assert_eq!(error_code(&resp), "not_found");
}

#[test]
fn caller_supplied_code_is_kept_but_validated() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "groups.create",
        json!({ "userId": "demo-user-1", "name": "Short Code", "code": "ABC" }),
    );
    assert_eq!(error_code(&resp), "bad_params");

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "groups.create",
        json!({ "userId": "demo-user-1", "name": "Fixed Code", "code": "AB12CD" }),
    );
    assert_eq!(
        created
            .get("group")
            .and_then(|g| g.get("code"))
            .and_then(|v| v.as_str()),
        Some("AB12CD")
    );

    // Codes are unique; reusing one is an insert failure.
    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "groups.create",
        json!({ "userId": "demo-user-1", "name": "Copycat", "code": "AB12CD" }),
    );
    assert_eq!(error_code(&resp), "db_insert_failed");
}
