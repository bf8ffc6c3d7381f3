//! Pregnancy weight gain evaluator
//!
//! BMI-bucketed recommended gain (IOM bands), adjusted for twins, with the
//! expected weight at a given week interpolated linearly over 40 weeks.

use serde::Serialize;

use super::error::{CalcError, CalcResult};
use super::form::{float_or, int_or, FormValue};

const METERS_PER_INCH: f64 = 0.0254;
const KG_PER_LB: f64 = 0.453_592_37;
const TERM_WEEKS: f64 = 40.0;
const TWINS_EXTRA: (f64, f64) = (10.0, 15.0);

/// BMI category for the pre-pregnancy weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Upper bounds are exclusive. A BMI in [24.9, 25) matches neither the
    /// normal nor the overweight band and falls through to obese.
    pub fn for_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 24.9 {
            BmiCategory::Normal
        } else if (25.0..29.9).contains(&bmi) {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    /// Recommended total gain for a single pregnancy, in lbs
    pub fn recommended_range(&self) -> (f64, f64) {
        match self {
            BmiCategory::Underweight => (28.0, 40.0),
            BmiCategory::Normal => (25.0, 35.0),
            BmiCategory::Overweight => (15.0, 25.0),
            BmiCategory::Obese => (11.0, 20.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// Body measurements in feet/inches and pounds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BodyMetrics {
    pub height_feet: f64,
    pub height_inches: f64,
    pub current_weight: f64,
    pub pre_pregnancy_weight: f64,
    pub week: i64,
    pub twins: bool,
}

/// Raw weight-gain form fields
#[derive(Debug, Clone, Default)]
pub struct WeightGainForm {
    pub height_ft: Option<FormValue>,
    pub height_in: Option<FormValue>,
    pub current_weight: Option<FormValue>,
    pub pre_pregnancy_weight: Option<FormValue>,
    pub week: Option<FormValue>,
    pub twins: Option<FormValue>,
}

impl BodyMetrics {
    /// Missing fields count as zero; anything non-numeric is rejected
    pub fn from_form(form: &WeightGainForm) -> CalcResult<Self> {
        let metrics = (|| -> Result<Self, String> {
            Ok(Self {
                height_feet: float_or(form.height_ft.as_ref(), 0.0, "height_ft")?,
                height_inches: float_or(form.height_in.as_ref(), 0.0, "height_in")?,
                current_weight: float_or(form.current_weight.as_ref(), 0.0, "current_weight")?,
                pre_pregnancy_weight: float_or(
                    form.pre_pregnancy_weight.as_ref(),
                    0.0,
                    "pre_pregnancy_weight",
                )?,
                week: int_or(form.week.as_ref(), 0, "week")?,
                twins: form.twins.as_ref().is_some_and(FormValue::is_checked),
            })
        })();
        metrics.map_err(CalcError::InvalidMetrics)
    }

    pub fn height_meters(&self) -> f64 {
        (self.height_feet * 12.0 + self.height_inches) * METERS_PER_INCH
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightGainResult {
    pub bmi: f64,
    pub category: BmiCategory,
    pub recommended_range_lbs: (f64, f64),
    pub expected_weight_range_lbs: (f64, f64),
    pub actual_gain_lbs: f64,
}

impl WeightGainResult {
    pub fn weight_gain_range(&self) -> String {
        format_range(self.recommended_range_lbs)
    }

    /// Always one decimal, e.g. "130.0 - 130.0 lbs"
    pub fn expected_weight_range(&self) -> String {
        let (min, max) = self.expected_weight_range_lbs;
        format!("{:.1} - {:.1} lbs", min, max)
    }

    pub fn actual_weight_gain(&self) -> String {
        format!("{:.1} lbs", self.actual_gain_lbs)
    }
}

/// Guideline bands are whole pounds, e.g. "25 - 35 lbs"
fn format_range((min, max): (f64, f64)) -> String {
    format!("{} - {} lbs", min, max)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Evaluate weight gain. `week` is not clamped, so weeks past 40 extrapolate.
pub fn compute_weight_gain(metrics: &BodyMetrics) -> CalcResult<WeightGainResult> {
    let inputs = [
        metrics.height_feet,
        metrics.height_inches,
        metrics.current_weight,
        metrics.pre_pregnancy_weight,
    ];
    if inputs.iter().any(|v| !v.is_finite()) {
        return Err(CalcError::InvalidMetrics("values must be finite".to_string()));
    }

    let height_m = metrics.height_meters();
    if height_m <= 0.0 {
        return Err(CalcError::InvalidMetrics("height must be greater than zero".to_string()));
    }

    // weights are entered in pounds, BMI is kg/m^2
    let bmi = metrics.pre_pregnancy_weight * KG_PER_LB / (height_m * height_m);
    let category = BmiCategory::for_bmi(bmi);

    let (mut min_gain, mut max_gain) = category.recommended_range();
    if metrics.twins {
        min_gain += TWINS_EXTRA.0;
        max_gain += TWINS_EXTRA.1;
    }

    let progress = metrics.week as f64 / TERM_WEEKS;
    let expected_min = metrics.pre_pregnancy_weight + min_gain * progress;
    let expected_max = metrics.pre_pregnancy_weight + max_gain * progress;

    Ok(WeightGainResult {
        bmi: round1(bmi),
        category,
        recommended_range_lbs: (min_gain, max_gain),
        expected_weight_range_lbs: (round1(expected_min), round1(expected_max)),
        actual_gain_lbs: round1(metrics.current_weight - metrics.pre_pregnancy_weight),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(feet: f64, inches: f64, pre: f64, current: f64, week: i64, twins: bool) -> BodyMetrics {
        BodyMetrics {
            height_feet: feet,
            height_inches: inches,
            current_weight: current,
            pre_pregnancy_weight: pre,
            week,
            twins,
        }
    }

    #[test]
    fn test_normal_bmi_bucket() {
        let result = compute_weight_gain(&metrics(5.0, 5.0, 130.0, 145.0, 20, false)).unwrap();
        assert_eq!(result.bmi, 21.6);
        assert_eq!(result.category, BmiCategory::Normal);
        assert_eq!(result.recommended_range_lbs, (25.0, 35.0));
        assert_eq!(result.expected_weight_range_lbs, (142.5, 147.5));
        assert_eq!(result.actual_gain_lbs, 15.0);
        assert_eq!(result.weight_gain_range(), "25 - 35 lbs");
        assert_eq!(result.actual_weight_gain(), "15.0 lbs");
    }

    #[test]
    fn test_twins_adjustment() {
        let result = compute_weight_gain(&metrics(5.0, 5.0, 130.0, 130.0, 0, true)).unwrap();
        assert_eq!(result.recommended_range_lbs, (35.0, 50.0));
        assert_eq!(result.expected_weight_range_lbs, (130.0, 130.0));
        assert_eq!(result.weight_gain_range(), "35 - 50 lbs");
        assert_eq!(result.expected_weight_range(), "130.0 - 130.0 lbs");
        assert_eq!(result.actual_weight_gain(), "0.0 lbs");
    }

    #[test]
    fn test_zero_height_is_invalid() {
        let result = compute_weight_gain(&metrics(0.0, 0.0, 130.0, 140.0, 10, false));
        assert!(matches!(result, Err(CalcError::InvalidMetrics(_))));
    }

    #[test]
    fn test_week_is_not_clamped() {
        let result = compute_weight_gain(&metrics(5.0, 5.0, 130.0, 130.0, 80, false)).unwrap();
        assert_eq!(result.expected_weight_range_lbs, (180.0, 200.0));
    }

    #[test]
    fn test_bucket_edges() {
        assert_eq!(BmiCategory::for_bmi(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::for_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::for_bmi(24.89), BmiCategory::Normal);
        assert_eq!(BmiCategory::for_bmi(24.9), BmiCategory::Obese);
        assert_eq!(BmiCategory::for_bmi(24.95), BmiCategory::Obese);
        assert_eq!(BmiCategory::for_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::for_bmi(29.89), BmiCategory::Overweight);
        assert_eq!(BmiCategory::for_bmi(29.9), BmiCategory::Obese);
    }

    #[test]
    fn test_bmi_between_bands_gets_obese_range() {
        // 5'5", 149.95 lb rounds to a BMI of 25.0 but is just under it unrounded
        let result = compute_weight_gain(&metrics(5.0, 5.0, 149.95, 149.95, 0, false)).unwrap();
        assert_eq!(result.bmi, 25.0);
        assert_eq!(result.category, BmiCategory::Obese);
        assert_eq!(result.recommended_range_lbs, (11.0, 20.0));
    }

    #[test]
    fn test_from_form() {
        let form = WeightGainForm {
            height_ft: Some(FormValue::Text("5".into())),
            height_in: Some(FormValue::Number(5.0)),
            current_weight: Some(FormValue::Text("145".into())),
            pre_pregnancy_weight: Some(FormValue::Number(130.0)),
            week: Some(FormValue::Text("20".into())),
            twins: Some(FormValue::Text("on".into())),
        };
        let parsed = BodyMetrics::from_form(&form).unwrap();
        assert_eq!(parsed, metrics(5.0, 5.0, 130.0, 145.0, 20, true));

        let bad = WeightGainForm {
            current_weight: Some(FormValue::Text("heavy".into())),
            ..Default::default()
        };
        assert!(matches!(BodyMetrics::from_form(&bad), Err(CalcError::InvalidMetrics(_))));
    }
}
