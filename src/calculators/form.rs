//! Lenient form values
//!
//! Calculator inputs arrive the way a web form would post them: as JSON numbers,
//! numeric strings, or not at all.

use rmcp::schemars;
use serde::Deserialize;

/// A form field that may be sent as a number or as text
#[derive(Debug, Clone, PartialEq, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum FormValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl FormValue {
    /// Read as a float. Blank text counts as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FormValue::Number(n) => Some(*n),
            FormValue::Flag(_) => None,
            FormValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Read as a whole number; `7.0` is accepted, `7.5` is not
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FormValue::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            FormValue::Number(_) | FormValue::Flag(_) => None,
            FormValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Checkbox semantics: `true`, `"on"`, `"true"`, `"yes"`, `"1"` and non-zero numbers
    pub fn is_checked(&self) -> bool {
        match self {
            FormValue::Flag(b) => *b,
            FormValue::Number(n) => *n != 0.0,
            FormValue::Text(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "on" | "true" | "yes" | "1"
            ),
        }
    }

    /// Empty or whitespace-only text
    pub fn is_blank(&self) -> bool {
        matches!(self, FormValue::Text(s) if s.trim().is_empty())
    }
}

/// Whole-number field with a default for a missing or blank value.
///
/// `Err` carries the field name when a value is present but not an integer.
pub fn int_or(value: Option<&FormValue>, default: i64, field: &str) -> Result<i64, String> {
    match value {
        None => Ok(default),
        Some(v) if v.is_blank() => Ok(default),
        Some(v) => v
            .as_i64()
            .ok_or_else(|| format!("{} must be a whole number", field)),
    }
}

/// Float field with a default for a missing value
pub fn float_or(value: Option<&FormValue>, default: f64, field: &str) -> Result<f64, String> {
    match value {
        None => Ok(default),
        Some(v) => v.as_f64().ok_or_else(|| format!("{} must be a number", field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_number_or_text() {
        let n: FormValue = serde_json::from_str("5").unwrap();
        let t: FormValue = serde_json::from_str("\"5\"").unwrap();
        let b: FormValue = serde_json::from_str("true").unwrap();
        assert_eq!(n.as_i64(), Some(5));
        assert_eq!(t.as_i64(), Some(5));
        assert!(b.is_checked());
    }

    #[test]
    fn test_int_or_defaults() {
        assert_eq!(int_or(None, 28, "cycle_length"), Ok(28));
        let blank = FormValue::Text("  ".into());
        assert_eq!(int_or(Some(&blank), 3, "embryo_age"), Ok(3));
        let bad = FormValue::Text("abc".into());
        assert!(int_or(Some(&bad), 0, "us_weeks").is_err());
        let frac = FormValue::Number(7.5);
        assert!(int_or(Some(&frac), 0, "us_weeks").is_err());
    }

    #[test]
    fn test_float_or() {
        let text = FormValue::Text("5.5".into());
        assert_eq!(float_or(Some(&text), 0.0, "height_in"), Ok(5.5));
        assert_eq!(float_or(None, 0.0, "height_in"), Ok(0.0));
        let bad = FormValue::Text("tall".into());
        assert!(float_or(Some(&bad), 0.0, "height_in").is_err());
    }

    #[test]
    fn test_checkbox_values() {
        assert!(FormValue::Text("on".into()).is_checked());
        assert!(!FormValue::Text("off".into()).is_checked());
        assert!(!FormValue::Flag(false).is_checked());
    }
}
