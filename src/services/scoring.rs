// SPDX-License-Identifier: MIT

//! Scoring engine: a pure mapping from (rule rates, raw value, teammate
//! flag, multiplier) to awarded points.
//!
//! The same function runs on the initial-submission path and the admin-edit
//! path. Which rates are passed in differs by caller: create snapshots the
//! rule at submit time, edit re-reads the current rule.

use crate::error::ValidationFailure;
use crate::models::{InputType, SubmissionValue};

/// Result of scoring one submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// Units the raw value was interpreted as
    pub units: f64,
    /// `max(1, floor(points_per_unit * units))`
    pub base_points: i64,
    /// `max(1, floor((base_points + bonus) * multiplier))`
    pub points_awarded: i64,
}

/// Derive scoring units from a raw value under the rule's input type.
///
/// number: the value itself; text: 1 for non-blank text; boolean: 1 when
/// checked. An unchecked boolean means "did not happen" and is rejected
/// rather than stored as a zero-point row.
pub fn derive_units(
    input_type: InputType,
    value: &SubmissionValue,
) -> Result<f64, ValidationFailure> {
    match (input_type, value) {
        (InputType::Number, SubmissionValue::Number(n)) => {
            if !n.is_finite() {
                Err(ValidationFailure::ValueNotFinite)
            } else {
                Ok(*n)
            }
        }
        (InputType::Text, SubmissionValue::Text(t)) => {
            if t.trim().is_empty() {
                Err(ValidationFailure::EmptyTextValue)
            } else {
                Ok(1.0)
            }
        }
        (InputType::Boolean, SubmissionValue::Boolean(true)) => Ok(1.0),
        (InputType::Boolean, SubmissionValue::Boolean(false)) => {
            Err(ValidationFailure::BoolUnchecked)
        }
        _ => Err(ValidationFailure::WrongValueKind),
    }
}

/// Score one submission.
///
/// Deterministic: fixed inputs always produce the same score. Both stored
/// point fields carry a positivity floor of 1, so fractional rates can
/// never produce a zero-point row.
pub fn score(
    points_per_unit: f64,
    teammate_bonus: i64,
    input_type: InputType,
    value: &SubmissionValue,
    did_with_teammate: bool,
    multiplier: f64,
) -> Result<Score, ValidationFailure> {
    if !points_per_unit.is_finite() || points_per_unit < 0.0 {
        return Err(ValidationFailure::InvalidPointsPerUnit);
    }
    if teammate_bonus < 0 {
        return Err(ValidationFailure::InvalidTeammateBonus);
    }
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(ValidationFailure::InvalidMultiplier);
    }

    let units = derive_units(input_type, value)?;
    if !units.is_finite() || units <= 0.0 {
        return Err(ValidationFailure::NonPositiveUnits);
    }

    let raw_base = points_per_unit * units;
    if !raw_base.is_finite() {
        return Err(ValidationFailure::PointsNotPositive);
    }
    let base_points = (raw_base.floor() as i64).max(1);

    let bonus = if did_with_teammate { teammate_bonus } else { 0 };

    // Rule validation bounds the rates, but stored rows predating a bound
    // change could still carry extreme values; saturate instead of wrapping.
    let raw_awarded = (base_points.saturating_add(bonus) as f64) * multiplier;
    if !raw_awarded.is_finite() {
        return Err(ValidationFailure::PointsNotPositive);
    }
    let points_awarded = (raw_awarded.floor() as i64).max(1);

    Ok(Score {
        units,
        base_points,
        points_awarded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(n: f64) -> SubmissionValue {
        SubmissionValue::Number(n)
    }

    #[test]
    fn test_numeric_submission_without_teammate() {
        let s = score(10.0, 15, InputType::Number, &number(2.5), false, 1.0).unwrap();
        assert_eq!(s.units, 2.5);
        assert_eq!(s.base_points, 25);
        assert_eq!(s.points_awarded, 25);
    }

    #[test]
    fn test_numeric_submission_with_teammate() {
        let s = score(10.0, 15, InputType::Number, &number(2.5), true, 1.0).unwrap();
        assert_eq!(s.points_awarded, 40);
    }

    #[test]
    fn test_boolean_checked_counts_as_one_unit() {
        let s = score(
            10.0,
            15,
            InputType::Boolean,
            &SubmissionValue::Boolean(true),
            false,
            1.0,
        )
        .unwrap();
        assert_eq!(s.units, 1.0);
        assert_eq!(s.base_points, 10);
        assert_eq!(s.points_awarded, 10);
    }

    #[test]
    fn test_boolean_unchecked_rejected() {
        let err = score(
            10.0,
            15,
            InputType::Boolean,
            &SubmissionValue::Boolean(false),
            false,
            1.0,
        )
        .unwrap_err();
        assert_eq!(err, ValidationFailure::BoolUnchecked);
    }

    #[test]
    fn test_text_counts_as_one_unit() {
        let s = score(
            10.0,
            15,
            InputType::Text,
            &SubmissionValue::Text("State Championship".to_string()),
            false,
            1.0,
        )
        .unwrap();
        assert_eq!(s.units, 1.0);
        assert_eq!(s.base_points, 10);
    }

    #[test]
    fn test_blank_text_rejected() {
        let err = score(
            10.0,
            15,
            InputType::Text,
            &SubmissionValue::Text("   ".to_string()),
            false,
            1.0,
        )
        .unwrap_err();
        assert_eq!(err, ValidationFailure::EmptyTextValue);
    }

    #[test]
    fn test_zero_numeric_value_rejected() {
        let err = score(10.0, 15, InputType::Number, &number(0.0), false, 1.0).unwrap_err();
        assert_eq!(err, ValidationFailure::NonPositiveUnits);
    }

    #[test]
    fn test_negative_numeric_value_rejected() {
        let err = score(10.0, 15, InputType::Number, &number(-3.0), false, 1.0).unwrap_err();
        assert_eq!(err, ValidationFailure::NonPositiveUnits);
    }

    #[test]
    fn test_non_finite_value_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = score(10.0, 15, InputType::Number, &number(bad), false, 1.0).unwrap_err();
            assert_eq!(err, ValidationFailure::ValueNotFinite);
        }
    }

    #[test]
    fn test_value_kind_must_match_input_type() {
        let err = score(
            10.0,
            15,
            InputType::Number,
            &SubmissionValue::Text("5".to_string()),
            false,
            1.0,
        )
        .unwrap_err();
        assert_eq!(err, ValidationFailure::WrongValueKind);
    }

    #[test]
    fn test_positivity_floor_near_zero_rate() {
        // 0.001 * 0.5 floors to 0; both stored fields bottom out at 1.
        let s = score(0.001, 0, InputType::Number, &number(0.5), false, 1.0).unwrap();
        assert_eq!(s.base_points, 1);
        assert_eq!(s.points_awarded, 1);

        // A zero rate is a valid rule; the floor still applies.
        let s = score(0.0, 0, InputType::Number, &number(100.0), false, 1.0).unwrap();
        assert_eq!(s.base_points, 1);
        assert_eq!(s.points_awarded, 1);
    }

    #[test]
    fn test_fractional_points_floor_down() {
        let s = score(10.0, 15, InputType::Number, &number(2.49), false, 1.0).unwrap();
        assert_eq!(s.base_points, 24);
        assert_eq!(s.points_awarded, 24);
    }

    #[test]
    fn test_teammate_additivity() {
        for (ppu, bonus, units) in [(10.0, 15, 2.5), (3.3, 7, 4.0), (0.5, 100, 9.9)] {
            let without = score(ppu, bonus, InputType::Number, &number(units), false, 1.0).unwrap();
            let with = score(ppu, bonus, InputType::Number, &number(units), true, 1.0).unwrap();
            assert_eq!(with.base_points, without.base_points);
            assert_eq!(with.points_awarded - without.points_awarded, bonus);
        }
    }

    #[test]
    fn test_extreme_bonus_saturates_instead_of_overflowing() {
        let s = score(10.0, i64::MAX, InputType::Number, &number(2.5), true, 1.0).unwrap();
        assert_eq!(s.base_points, 25);
        assert!(s.points_awarded >= 1);

        // Without the teammate flag the huge bonus never enters the sum.
        let s = score(10.0, i64::MAX, InputType::Number, &number(2.5), false, 1.0).unwrap();
        assert_eq!(s.points_awarded, 25);
    }

    #[test]
    fn test_determinism() {
        let a = score(7.3, 12, InputType::Number, &number(3.7), true, 1.0).unwrap();
        for _ in 0..100 {
            let b = score(7.3, 12, InputType::Number, &number(3.7), true, 1.0).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_multiplier_scales_total_not_base() {
        let s = score(10.0, 15, InputType::Number, &number(2.0), true, 2.0).unwrap();
        assert_eq!(s.base_points, 20);
        assert_eq!(s.points_awarded, 70); // (20 + 15) * 2
    }

    #[test]
    fn test_invalid_rates_rejected() {
        assert_eq!(
            score(-1.0, 15, InputType::Number, &number(1.0), false, 1.0).unwrap_err(),
            ValidationFailure::InvalidPointsPerUnit
        );
        assert_eq!(
            score(10.0, -1, InputType::Number, &number(1.0), false, 1.0).unwrap_err(),
            ValidationFailure::InvalidTeammateBonus
        );
        assert_eq!(
            score(10.0, 15, InputType::Number, &number(1.0), false, 0.0).unwrap_err(),
            ValidationFailure::InvalidMultiplier
        );
    }
}
