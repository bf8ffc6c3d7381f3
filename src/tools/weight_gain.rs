//! Weight gain calculator tool

use serde::Serialize;

use crate::calculators::{compute_weight_gain, BodyMetrics, WeightGainForm};

use super::Outcome;

#[derive(Debug, Serialize)]
pub struct WeightGainResponse {
    pub bmi: f64,
    pub bmi_category: &'static str,
    pub weight_gain_range: String,
    pub expected_weight_range: String,
    pub actual_weight_gain: String,
    pub twins: bool,
}

pub fn calculate_weight_gain(form: &WeightGainForm) -> Outcome<WeightGainResponse> {
    let result = BodyMetrics::from_form(form).and_then(|metrics| {
        compute_weight_gain(&metrics).map(|result| (metrics, result))
    });

    match result {
        Ok((metrics, result)) => Outcome::Done(WeightGainResponse {
            bmi: result.bmi,
            bmi_category: result.category.as_str(),
            weight_gain_range: result.weight_gain_range(),
            expected_weight_range: result.expected_weight_range(),
            actual_weight_gain: result.actual_weight_gain(),
            twins: metrics.twins,
        }),
        Err(e) => Outcome::failed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::FormValue;

    #[test]
    fn test_response_strings() {
        let form = WeightGainForm {
            height_ft: Some(FormValue::Number(5.0)),
            height_in: Some(FormValue::Number(5.0)),
            current_weight: Some(FormValue::Number(140.5)),
            pre_pregnancy_weight: Some(FormValue::Number(130.0)),
            week: Some(FormValue::Number(20.0)),
            twins: None,
        };
        let response = calculate_weight_gain(&form).done().unwrap();
        assert_eq!(response.bmi, 21.6);
        assert_eq!(response.bmi_category, "Normal weight");
        assert_eq!(response.weight_gain_range, "25 - 35 lbs");
        assert_eq!(response.expected_weight_range, "142.5 - 147.5 lbs");
        assert_eq!(response.actual_weight_gain, "10.5 lbs");
    }

    #[test]
    fn test_missing_height_reports_error() {
        let outcome = calculate_weight_gain(&WeightGainForm::default());
        let error = outcome.error().unwrap();
        assert!(error.starts_with("Invalid input. Please enter valid numbers."));
    }
}
