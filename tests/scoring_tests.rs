// SPDX-License-Identifier: MIT

//! End-to-end scoring scenarios against the default rule table.
//!
//! These exercise the scoring engine the way the submit and admin-edit
//! flows drive it: look up a rule, derive units from the raw value, score,
//! and (for edits) rescore the same value against changed rates.

use chrono::NaiveDate;
use spartan_games::error::ValidationFailure;
use spartan_games::models::{default_rules, ActivityRule, InputType, SubmissionValue};
use spartan_games::services::scoring::score;
use spartan_games::time_utils::{current_week, is_within_current_week};

fn rule(key: &str) -> ActivityRule {
    default_rules("2026-08-24T00:00:00Z")
        .into_iter()
        .find(|r| r.activity_key == key)
        .unwrap_or_else(|| panic!("no default rule for {}", key))
}

#[test]
fn running_miles_without_teammate() {
    let r = rule("running");

    let s = score(
        r.points_per_unit,
        r.teammate_bonus,
        r.input_type,
        &SubmissionValue::Number(2.5),
        false,
        1.0,
    )
    .unwrap();

    assert_eq!(s.units, 2.5);
    assert_eq!(s.base_points, 25);
    assert_eq!(s.points_awarded, 25);
}

#[test]
fn running_miles_with_teammate_adds_flat_bonus() {
    let r = rule("running");

    let s = score(
        r.points_per_unit,
        r.teammate_bonus,
        r.input_type,
        &SubmissionValue::Number(2.5),
        true,
        1.0,
    )
    .unwrap();

    assert_eq!(s.base_points, 25);
    assert_eq!(s.points_awarded, 40);
}

#[test]
fn boolean_activity_scores_one_unit() {
    let r = rule("calorie_goal");
    assert_eq!(r.input_type, InputType::Boolean);

    let s = score(
        r.points_per_unit,
        r.teammate_bonus,
        r.input_type,
        &SubmissionValue::Boolean(true),
        false,
        1.0,
    )
    .unwrap();

    assert_eq!(s.units, 1.0);
    assert_eq!(s.points_awarded, 10);
}

#[test]
fn unchecked_boolean_is_rejected_not_zero_points() {
    let r = rule("calorie_goal");

    let err = score(
        r.points_per_unit,
        r.teammate_bonus,
        r.input_type,
        &SubmissionValue::Boolean(false),
        false,
        1.0,
    )
    .unwrap_err();

    assert_eq!(err, ValidationFailure::BoolUnchecked);
}

#[test]
fn text_activity_scores_one_unit() {
    let r = rule("win_tournament");
    assert_eq!(r.input_type, InputType::Text);

    let s = score(
        r.points_per_unit,
        r.teammate_bonus,
        r.input_type,
        &SubmissionValue::Text("Spartan Sprint".to_string()),
        false,
        1.0,
    )
    .unwrap();

    assert_eq!(s.units, 1.0);
    assert_eq!(s.base_points, 10);
}

#[test]
fn admin_reprice_same_value_different_rates() {
    // The admin-edit flow rescores the stored value against the rule's
    // current rates rather than the snapshot taken at submit time.
    let original = score(
        10.0,
        15,
        InputType::Number,
        &SubmissionValue::Number(2.5),
        false,
        1.0,
    )
    .unwrap();
    assert_eq!(original.points_awarded, 25);

    let repriced = score(
        12.0,
        15,
        InputType::Number,
        &SubmissionValue::Number(2.5),
        false,
        1.0,
    )
    .unwrap();
    assert_eq!(repriced.points_awarded, 30);
}

#[test]
fn edit_preserves_stored_multiplier() {
    let doubled = score(
        10.0,
        15,
        InputType::Number,
        &SubmissionValue::Number(2.5),
        true,
        2.0,
    )
    .unwrap();

    // (25 + 15) * 2.0
    assert_eq!(doubled.points_awarded, 80);
}

#[test]
fn fractional_rate_floors_but_never_hits_zero() {
    let s = score(
        0.1,
        0,
        InputType::Number,
        &SubmissionValue::Number(0.5),
        false,
        1.0,
    )
    .unwrap();

    // floor(0.05) would be 0; positivity floor lifts it to 1
    assert_eq!(s.base_points, 1);
    assert_eq!(s.points_awarded, 1);
}

#[test]
fn all_default_rules_score_a_plain_submission() {
    for r in default_rules("2026-08-24T00:00:00Z") {
        let value = match r.input_type {
            InputType::Number => SubmissionValue::Number(1.0),
            InputType::Text => SubmissionValue::Text("entry".to_string()),
            InputType::Boolean => SubmissionValue::Boolean(true),
        };

        let s = score(
            r.points_per_unit,
            r.teammate_bonus,
            r.input_type,
            &value,
            false,
            1.0,
        )
        .unwrap_or_else(|e| panic!("{} failed to score: {}", r.activity_key, e));

        assert!(s.points_awarded >= 1, "{}", r.activity_key);
    }
}

#[test]
fn week_window_is_monday_to_monday() {
    // 2026-08-26 is a Wednesday
    let today = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
    let (start, end) = current_week(today);

    assert_eq!(start, NaiveDate::from_ymd_opt(2026, 8, 24).unwrap());
    assert_eq!(end, NaiveDate::from_ymd_opt(2026, 8, 31).unwrap());

    // Monday is inside the window, next Monday is not
    assert!(is_within_current_week(start, today));
    assert!(!is_within_current_week(end, today));
    assert!(!is_within_current_week(start.pred_opt().unwrap(), today));
}
