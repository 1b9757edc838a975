use serde_json::json;

use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_opt_f64, required_i64, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::subjects;

fn calculation_json(attended: i64, total: i64, required: f64) -> serde_json::Value {
    let summary = calc::calculate_attendance(attended, total, required);
    let meter = calc::bunkometer_status(summary.current_percentage, required);
    json!({
        "calculation": summary,
        "bunkometer": meter,
        "attendanceColor": calc::attendance_color(summary.current_percentage, required),
        "progressBarColor": calc::progress_bar_color(summary.current_percentage, required),
    })
}

fn handle_calculate(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let attended = match required_i64(req, "attended") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let total = match required_i64(req, "total") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if attended < 0 || total < 0 {
        return err(&req.id, "bad_params", "attended and total must be >= 0", None);
    }
    let required = match parse_opt_f64(req.params.get("requiredPercentage")) {
        Ok(v) => v.unwrap_or(calc::DEFAULT_REQUIRED_PERCENTAGE),
        Err(m) => return err(&req.id, "bad_params", format!("requiredPercentage {}", m), None),
    };
    if !(0.0..=100.0).contains(&required) {
        return err(&req.id, "bad_params", "requiredPercentage must be within 0..=100", None);
    }

    ok(&req.id, calculation_json(attended, total, required))
}

fn handle_subject(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject_id = match required_str(req, "subjectId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subject = match subjects::get(&state.conn, &subject_id) {
        Ok(Some(s)) => s,
        Ok(None) => return err(&req.id, "not_found", "subject not found", None),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let mut result = calculation_json(
        subject.attended_lectures,
        subject.total_lectures,
        subject.required_percentage as f64,
    );
    result["subject"] = json!(subject);
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.calculate" => Some(handle_calculate(state, req)),
        "attendance.subject" => Some(handle_subject(state, req)),
        _ => None,
    }
}
