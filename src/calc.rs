use serde::Serialize;

/// Standard institutional minimum used whenever a subject does not carry
/// its own requirement.
pub const DEFAULT_REQUIRED_PERCENTAGE: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Safe,
    Warning,
    Danger,
}

/// Single owner of the zone thresholds. `calculate_attendance` and the
/// presentation helpers below all classify through here, so they cannot
/// disagree at a boundary.
fn classify(percentage: f64, required: f64) -> AttendanceStatus {
    if percentage < required {
        AttendanceStatus::Danger
    } else if percentage < required + 10.0 {
        AttendanceStatus::Warning
    } else {
        AttendanceStatus::Safe
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub current_percentage: f64,
    pub can_bunk: i64,
    pub must_attend: i64,
    pub status: AttendanceStatus,
}

/// Core attendance math. `required_percentage` is a percent in [0, 100].
///
/// The required-lecture count rounds up: a 75% rule over 30 lectures means
/// 23 attended, not 22.5. With `total == 0` everything collapses to zero
/// and the status comes straight from the formula (0 < required).
pub fn calculate_attendance(attended: i64, total: i64, required_percentage: f64) -> AttendanceSummary {
    let current_percentage = if total > 0 {
        (attended as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    let required_lectures = ((required_percentage / 100.0) * total as f64).ceil() as i64;
    let can_bunk = (attended - required_lectures).max(0);
    let must_attend = (required_lectures - attended).max(0);

    AttendanceSummary {
        current_percentage,
        can_bunk,
        must_attend,
        status: classify(current_percentage, required_percentage),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BunkometerStatus {
    pub status: &'static str,
    pub color: &'static str,
    pub bg_color: &'static str,
}

/// Dashboard bunk-o-meter labels and style tokens for a zone.
pub fn bunkometer_status(percentage: f64, required: f64) -> BunkometerStatus {
    match classify(percentage, required) {
        AttendanceStatus::Safe => BunkometerStatus {
            status: "Safe zone",
            color: "text-green-600 dark:text-green-400",
            bg_color: "bg-green-100 dark:bg-green-900",
        },
        AttendanceStatus::Warning => BunkometerStatus {
            status: "Warning zone",
            color: "text-yellow-600 dark:text-yellow-400",
            bg_color: "bg-yellow-100 dark:bg-yellow-900",
        },
        AttendanceStatus::Danger => BunkometerStatus {
            status: "Danger zone",
            color: "text-red-600 dark:text-red-400",
            bg_color: "bg-red-100 dark:bg-red-900",
        },
    }
}

/// Text color token for an attendance figure.
pub fn attendance_color(percentage: f64, required: f64) -> &'static str {
    match classify(percentage, required) {
        AttendanceStatus::Safe => "text-green-600 dark:text-green-400",
        AttendanceStatus::Warning => "text-yellow-600 dark:text-yellow-400",
        AttendanceStatus::Danger => "text-red-600 dark:text-red-400",
    }
}

/// Progress bar fill token for an attendance figure.
pub fn progress_bar_color(percentage: f64, required: f64) -> &'static str {
    match classify(percentage, required) {
        AttendanceStatus::Safe => "bg-green-500",
        AttendanceStatus::Warning => "bg-yellow-500",
        AttendanceStatus::Danger => "bg-red-500",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_exact_ratio_times_hundred() {
        let s = calculate_attendance(26, 30, 75.0);
        assert!((s.current_percentage - 26.0 / 30.0 * 100.0).abs() < 1e-9);

        let s = calculate_attendance(19, 25, 75.0);
        assert!((s.current_percentage - 76.0).abs() < 1e-9);
    }

    #[test]
    fn required_lectures_round_up() {
        // 75% of 30 is 22.5, so 23 lectures are required: 26 attended
        // leaves 3 to spare.
        let s = calculate_attendance(26, 30, 75.0);
        assert_eq!(s.can_bunk, 3);
        assert_eq!(s.must_attend, 0);

        // 75% of 28 is exactly 21; 19 attended means 2 short.
        let s = calculate_attendance(19, 28, 75.0);
        assert_eq!(s.can_bunk, 0);
        assert_eq!(s.must_attend, 2);
    }

    #[test]
    fn can_bunk_and_must_attend_never_both_positive() {
        for total in [1i64, 7, 20, 30, 50] {
            for attended in 0..=total {
                let s = calculate_attendance(attended, total, 75.0);
                assert!(s.can_bunk >= 0);
                assert!(s.must_attend >= 0);
                assert!(
                    s.can_bunk == 0 || s.must_attend == 0,
                    "both positive at {attended}/{total}"
                );
            }
        }
    }

    #[test]
    fn both_counters_can_be_zero_at_the_exact_requirement() {
        // 75% of 25 is 18.75 -> 19 required; 19 attended sits exactly on
        // the line.
        let s = calculate_attendance(19, 25, 75.0);
        assert_eq!(s.can_bunk, 0);
        assert_eq!(s.must_attend, 0);
        assert_eq!(s.status, AttendanceStatus::Warning);
    }

    #[test]
    fn status_zones_match_demo_subjects() {
        // The three seeded subjects land one in each zone.
        assert_eq!(calculate_attendance(26, 30, 75.0).status, AttendanceStatus::Safe);
        assert_eq!(calculate_attendance(19, 25, 75.0).status, AttendanceStatus::Warning);
        assert_eq!(calculate_attendance(19, 28, 75.0).status, AttendanceStatus::Danger);
    }

    #[test]
    fn status_boundaries_are_half_open() {
        // Exactly at required -> warning; exactly at required + 10 -> safe.
        assert_eq!(calculate_attendance(3, 4, 75.0).status, AttendanceStatus::Warning);
        assert_eq!(calculate_attendance(17, 20, 85.0).status, AttendanceStatus::Warning);
        assert_eq!(calculate_attendance(17, 20, 75.0).status, AttendanceStatus::Safe);
        assert_eq!(calculate_attendance(14, 20, 75.0).status, AttendanceStatus::Danger);
    }

    #[test]
    fn zero_total_collapses_to_zero() {
        let s = calculate_attendance(0, 0, 75.0);
        assert_eq!(s.current_percentage, 0.0);
        assert_eq!(s.can_bunk, 0);
        assert_eq!(s.must_attend, 0);
        // 0 < 75, so the formula says danger even with nothing scheduled.
        assert_eq!(s.status, AttendanceStatus::Danger);
    }

    #[test]
    fn zero_required_never_needs_attendance() {
        let s = calculate_attendance(0, 10, 0.0);
        assert_eq!(s.must_attend, 0);
        assert_eq!(s.can_bunk, 0);
        // 0 >= 0 but 0 < 10, per the formula.
        assert_eq!(s.status, AttendanceStatus::Warning);
    }

    #[test]
    fn bunkometer_agrees_with_calculator_at_every_boundary() {
        for (pct, label) in [
            (74.999, "Danger zone"),
            (75.0, "Warning zone"),
            (84.999, "Warning zone"),
            (85.0, "Safe zone"),
        ] {
            assert_eq!(bunkometer_status(pct, 75.0).status, label);
        }
    }

    #[test]
    fn bunkometer_style_tokens_per_zone() {
        let safe = bunkometer_status(95.0, 75.0);
        assert_eq!(safe.color, "text-green-600 dark:text-green-400");
        assert_eq!(safe.bg_color, "bg-green-100 dark:bg-green-900");

        let danger = bunkometer_status(40.0, 75.0);
        assert_eq!(danger.status, "Danger zone");
        assert_eq!(danger.bg_color, "bg-red-100 dark:bg-red-900");
    }

    #[test]
    fn color_helpers_share_the_zone_thresholds() {
        assert_eq!(attendance_color(85.0, 75.0), "text-green-600 dark:text-green-400");
        assert_eq!(attendance_color(75.0, 75.0), "text-yellow-600 dark:text-yellow-400");
        assert_eq!(attendance_color(74.0, 75.0), "text-red-600 dark:text-red-400");
        assert_eq!(progress_bar_color(85.0, 75.0), "bg-green-500");
        assert_eq!(progress_bar_color(75.0, 75.0), "bg-yellow-500");
        assert_eq!(progress_bar_color(74.0, 75.0), "bg-red-500");
    }

    #[test]
    fn status_serializes_lowercase() {
        let s = calculate_attendance(26, 30, 75.0);
        let v = serde_json::to_value(s).unwrap();
        assert_eq!(v["status"], "safe");
        assert_eq!(v["canBunk"], 3);
        assert!(v.get("currentPercentage").is_some());
    }
}
