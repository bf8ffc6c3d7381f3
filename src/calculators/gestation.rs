//! Gestation calculator
//!
//! Anchors a pregnancy timeline from one of five dating methods and derives the
//! due date, the current gestational week, trimester and a fetal size reference.
//!
//! All arithmetic is on calendar dates. Gestational age counts from the LMP
//! equivalent, two weeks before conception.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::{CalcError, CalcResult};
use super::fetal_size::{self, FetalSize};
use super::form::FormValue;

/// Days from conception to the estimated due date
pub const CONCEPTION_TO_DUE_DAYS: i64 = 266;
/// Days from the last menstrual period to the estimated due date
pub const LMP_TO_DUE_DAYS: i64 = 280;
/// Offset between conception and the LMP-equivalent start of pregnancy
pub const LMP_TO_CONCEPTION_DAYS: i64 = 14;

pub const DEFAULT_CYCLE_LENGTH: i64 = 28;
pub const DEFAULT_EMBRYO_AGE: i64 = 3;

/// Accepted input date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How the pregnancy is dated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatingMethod {
    Ultrasound,
    Lmp,
    ConceptionDate,
    DueDate,
    IvfTransfer,
}

impl DatingMethod {
    pub const ALL: [DatingMethod; 5] = [
        DatingMethod::Ultrasound,
        DatingMethod::Lmp,
        DatingMethod::ConceptionDate,
        DatingMethod::DueDate,
        DatingMethod::IvfTransfer,
    ];

    /// Label as shown on the calculator form
    pub fn as_str(&self) -> &'static str {
        match self {
            DatingMethod::Ultrasound => "Ultrasound",
            DatingMethod::Lmp => "LMP",
            DatingMethod::ConceptionDate => "Conception Date",
            DatingMethod::DueDate => "Due Date",
            DatingMethod::IvfTransfer => "IVF Transfer Date",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "ultrasound" | "us" => Some(DatingMethod::Ultrasound),
            "lmp" | "last menstrual period" => Some(DatingMethod::Lmp),
            "conception date" | "conception" => Some(DatingMethod::ConceptionDate),
            "due date" | "due" => Some(DatingMethod::DueDate),
            "ivf transfer date" | "ivf transfer" | "ivf" => Some(DatingMethod::IvfTransfer),
            _ => None,
        }
    }
}

/// Pregnancy trimester
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trimester {
    First,
    Second,
    Third,
}

impl Trimester {
    pub const ALL: [Trimester; 3] = [Trimester::First, Trimester::Second, Trimester::Third];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trimester::First => "First Trimester",
            Trimester::Second => "Second Trimester",
            Trimester::Third => "Third Trimester",
        }
    }

    /// Short name used in the exercise catalogue ("First", "Second", "Third")
    pub fn short_name(&self) -> &'static str {
        match self {
            Trimester::First => "First",
            Trimester::Second => "Second",
            Trimester::Third => "Third",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase().replace('_', " ");
        let key = lower.strip_suffix("trimester").unwrap_or(&lower).trim();
        match key {
            "first" => Some(Trimester::First),
            "second" => Some(Trimester::Second),
            "third" => Some(Trimester::Third),
            _ => None,
        }
    }

    /// Weeks up to 13 are first trimester, up to 26 second, the rest third
    pub fn for_week(week: i64) -> Self {
        if week <= 13 {
            Trimester::First
        } else if week <= 26 {
            Trimester::Second
        } else {
            Trimester::Third
        }
    }
}

/// Method-specific numbers. Absent values take the method's default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodParameters {
    pub us_weeks: Option<i64>,
    pub us_days: Option<i64>,
    pub cycle_length: Option<i64>,
    pub embryo_age: Option<i64>,
}

/// A validated dating request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatingInput {
    pub method: DatingMethod,
    pub reference_date: NaiveDate,
    pub parameters: MethodParameters,
}

/// Raw calculator form fields
#[derive(Debug, Clone, Default)]
pub struct GestationForm {
    pub date_type: Option<String>,
    pub input_date: Option<String>,
    pub us_weeks: Option<FormValue>,
    pub us_days: Option<FormValue>,
    pub cycle_length: Option<FormValue>,
    pub embryo_age: Option<FormValue>,
}

impl DatingInput {
    pub fn new(method: DatingMethod, reference_date: NaiveDate) -> Self {
        Self {
            method,
            reference_date,
            parameters: MethodParameters::default(),
        }
    }

    pub fn with_parameters(mut self, parameters: MethodParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Parse form fields. Only the parameters the chosen method uses are read.
    pub fn from_form(form: &GestationForm) -> CalcResult<Self> {
        let raw_date = form
            .input_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CalcError::InvalidDateFormat("Input date is required".to_string()))?;

        let reference_date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
            CalcError::InvalidDateFormat(format!("'{}' does not match YYYY-MM-DD", raw_date))
        })?;

        let label = form.date_type.as_deref().unwrap_or_default();
        let method = DatingMethod::from_str(label)
            .ok_or_else(|| CalcError::UnsupportedDatingMethod(label.to_string()))?;

        let present = |value: &Option<FormValue>, field: &str| -> CalcResult<Option<i64>> {
            match value {
                Some(v) if !v.is_blank() => v.as_i64().map(Some).ok_or_else(|| {
                    CalcError::Computation(format!("{} must be a whole number", field))
                }),
                _ => Ok(None),
            }
        };

        let mut parameters = MethodParameters::default();
        match method {
            DatingMethod::Ultrasound => {
                parameters.us_weeks = present(&form.us_weeks, "us_weeks")?;
                parameters.us_days = present(&form.us_days, "us_days")?;
            }
            DatingMethod::Lmp => {
                parameters.cycle_length = present(&form.cycle_length, "cycle_length")?;
            }
            DatingMethod::IvfTransfer => {
                parameters.embryo_age = present(&form.embryo_age, "embryo_age")?;
            }
            DatingMethod::ConceptionDate | DatingMethod::DueDate => {}
        }

        Ok(Self {
            method,
            reference_date,
            parameters,
        })
    }
}

/// Derived pregnancy timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GestationResult {
    pub due_date: NaiveDate,
    pub conception_date: NaiveDate,
    /// 1-indexed gestational week; not clamped, so nonsensical dates can give <= 0
    pub current_week: i64,
    pub trimester: Trimester,
    pub fetal_size: FetalSize,
    pub fetal_size_description: String,
    /// Negative once the due date has passed
    pub days_remaining: i64,
    pub week_message: &'static str,
}

fn shift(date: NaiveDate, days: i64) -> CalcResult<NaiveDate> {
    let delta = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(delta)
    } else {
        date.checked_sub_days(delta)
    };
    shifted.ok_or_else(|| {
        CalcError::Computation(format!("date {} shifted by {} days is out of range", date, days))
    })
}

/// Anchor conception and due dates for a dating input
pub fn anchor_dates(input: &DatingInput) -> CalcResult<(NaiveDate, NaiveDate)> {
    let reference = input.reference_date;
    let params = &input.parameters;

    let (conception, due) = match input.method {
        DatingMethod::Ultrasound => {
            let weeks = params.us_weeks.unwrap_or(0);
            let days = params.us_days.unwrap_or(0);
            let total_days = weeks
                .checked_mul(7)
                .and_then(|d| d.checked_add(days))
                .ok_or_else(|| CalcError::Computation("ultrasound age overflow".to_string()))?;
            let offset = LMP_TO_CONCEPTION_DAYS
                .checked_sub(total_days)
                .ok_or_else(|| CalcError::Computation("ultrasound age overflow".to_string()))?;
            let conception = shift(reference, offset)?;
            (conception, shift(conception, CONCEPTION_TO_DUE_DAYS)?)
        }
        DatingMethod::Lmp => {
            let cycle_length = params.cycle_length.unwrap_or(DEFAULT_CYCLE_LENGTH);
            let ovulation_day = cycle_length - LMP_TO_CONCEPTION_DAYS;
            (shift(reference, ovulation_day)?, shift(reference, LMP_TO_DUE_DAYS)?)
        }
        DatingMethod::ConceptionDate => (reference, shift(reference, CONCEPTION_TO_DUE_DAYS)?),
        DatingMethod::DueDate => (shift(reference, -CONCEPTION_TO_DUE_DAYS)?, reference),
        DatingMethod::IvfTransfer => {
            let embryo_age = params.embryo_age.unwrap_or(DEFAULT_EMBRYO_AGE);
            let conception = shift(reference, -embryo_age)?;
            (conception, shift(conception, CONCEPTION_TO_DUE_DAYS)?)
        }
    };

    Ok((conception, due))
}

/// Gestational week on `today` for a pregnancy conceived on `conception`
pub fn current_week(conception: NaiveDate, today: NaiveDate) -> i64 {
    let days_pregnant = today.signed_duration_since(conception).num_days() + LMP_TO_CONCEPTION_DAYS;
    days_pregnant.div_euclid(7) + 1
}

/// Canned message for a gestational week
pub fn week_message(week: i64) -> &'static str {
    match week {
        w if w < 1 => "Please check your dates.",
        w if w < 4 => "Early pregnancy - Implantation is occurring.",
        w if w < 8 => "Major organs and structures are beginning to form.",
        w if w < 13 => "First trimester - Baby's basic body structure is developing.",
        w if w < 27 => "Second trimester - Period of rapid growth and development.",
        w if w < 37 => "Third trimester - Baby is gaining weight and preparing for birth.",
        _ => "Full term - Baby could arrive any day now!",
    }
}

/// Compute the full timeline for `input` as seen on `today`
pub fn compute_gestation(input: &DatingInput, today: NaiveDate) -> CalcResult<GestationResult> {
    let (conception_date, due_date) = anchor_dates(input)?;

    let week = current_week(conception_date, today);
    let fetal_size = fetal_size::for_week(week);

    Ok(GestationResult {
        due_date,
        conception_date,
        current_week: week,
        trimester: Trimester::for_week(week),
        fetal_size,
        fetal_size_description: fetal_size.describe(),
        days_remaining: due_date.signed_duration_since(today).num_days(),
        week_message: week_message(week),
    })
}
