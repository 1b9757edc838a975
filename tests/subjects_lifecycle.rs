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

#[test]
fn create_applies_documented_defaults() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "subjects.create",
        json!({ "userId": "demo-user-1", "name": "Biology" }),
    );
    let subject = result.get("subject").expect("subject");
    assert_eq!(subject.get("totalLectures").and_then(|v| v.as_i64()), Some(0));
    assert_eq!(subject.get("attendedLectures").and_then(|v| v.as_i64()), Some(0));
    assert_eq!(subject.get("requiredPercentage").and_then(|v| v.as_i64()), Some(75));
    assert_eq!(subject.get("color").and_then(|v| v.as_str()), Some("#7341ff"));
    assert!(subject.get("id").and_then(|v| v.as_str()).is_some());
    assert!(subject.get("createdAt").and_then(|v| v.as_str()).is_some());

    // The new subject lists after the three seeded ones.
    let list = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "subjects.list",
        json!({ "userId": "demo-user-1" }),
    );
    let names: Vec<&str> = list
        .get("subjects")
        .and_then(|v| v.as_array())
        .expect("subjects")
        .iter()
        .filter_map(|s| s.get("name").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(names, vec!["Mathematics", "Physics", "Chemistry", "Biology"]);
}

#[test]
fn update_patches_only_named_fields() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "subjects.create",
        json!({
            "userId": "demo-user-1",
            "name": "History",
            "totalLectures": 12,
            "attendedLectures": 9,
            "requiredPercentage": 80,
            "color": "#123456"
        }),
    );
    let subject_id = created
        .get("subject")
        .and_then(|s| s.get("id"))
        .and_then(|v| v.as_str())
        .expect("subject id")
        .to_string();

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "subjects.update",
        json!({
            "subjectId": subject_id,
            "patch": { "attendedLectures": 10, "name": "World History" }
        }),
    );
    let subject = updated.get("subject").expect("subject");
    assert_eq!(subject.get("name").and_then(|v| v.as_str()), Some("World History"));
    assert_eq!(subject.get("attendedLectures").and_then(|v| v.as_i64()), Some(10));
    // Untouched fields survive the patch.
    assert_eq!(subject.get("totalLectures").and_then(|v| v.as_i64()), Some(12));
    assert_eq!(subject.get("requiredPercentage").and_then(|v| v.as_i64()), Some(80));
    assert_eq!(subject.get("color").and_then(|v| v.as_str()), Some("#123456"));

    // An empty patch is a no-op that still returns the row.
    let unchanged = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "subjects.update",
        json!({ "subjectId": subject.get("id").and_then(|v| v.as_str()).expect("id"), "patch": {} }),
    );
    assert_eq!(
        unchanged
            .get("subject")
            .and_then(|s| s.get("name"))
            .and_then(|v| v.as_str()),
        Some("World History")
    );
}

#[test]
fn update_rejects_unknown_and_invalid_patch_fields() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "subjects.update",
        json!({ "subjectId": "subject-1", "patch": { "ownerId": "someone-else" } }),
    );
    assert_eq!(error_code(&resp), "bad_params");

    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "subjects.update",
        json!({ "subjectId": "subject-1", "patch": { "requiredPercentage": 250 } }),
    );
    assert_eq!(error_code(&resp), "bad_params");

    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "subjects.update",
        json!({ "subjectId": "subject-1", "patch": { "totalLectures": -5 } }),
    );
    assert_eq!(error_code(&resp), "bad_params");

    // A rejected patch must not partially apply.
    let list = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "subjects.list",
        json!({ "userId": "demo-user-1" }),
    );
    let math = list
        .get("subjects")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .expect("first subject");
    assert_eq!(math.get("totalLectures").and_then(|v| v.as_i64()), Some(30));
    assert_eq!(math.get("requiredPercentage").and_then(|v| v.as_i64()), Some(75));
}

#[test]
fn update_unknown_subject_is_not_found() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "subjects.update",
        json!({ "subjectId": "no-such-subject", "patch": { "name": "Ghost" } }),
    );
    assert_eq!(error_code(&resp), "not_found");
}

#[test]
fn delete_removes_and_second_delete_is_not_found() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "subjects.create",
        json!({ "userId": "demo-user-1", "name": "Doomed" }),
    );
    let subject_id = created
        .get("subject")
        .and_then(|s| s.get("id"))
        .and_then(|v| v.as_str())
        .expect("subject id")
        .to_string();

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "subjects.delete",
        json!({ "subjectId": subject_id }),
    );
    assert_eq!(deleted.get("deleted").and_then(|v| v.as_bool()), Some(true));

    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "subjects.delete",
        json!({ "subjectId": subject_id }),
    );
    assert_eq!(error_code(&resp), "not_found");

    let list = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "subjects.list",
        json!({ "userId": "demo-user-1" }),
    );
    let names: Vec<&str> = list
        .get("subjects")
        .and_then(|v| v.as_array())
        .expect("subjects")
        .iter()
        .filter_map(|s| s.get("name").and_then(|v| v.as_str()))
        .collect();
    assert!(!names.contains(&"Doomed"));
}
