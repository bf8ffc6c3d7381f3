//! Bloom status tool
//!
//! Runtime status of the service, plus the usage guide handed to assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Usage guide for AI assistants
pub const INSTRUCTIONS: &str = r#"
# Bloom Usage Guide

Bloom is a pregnancy companion. It dates a pregnancy, suggests a day of meals,
checks weight gain against BMI guidance, answers symptom questions, finds
hospitals and books appointments.

---

## Users

Most tools take a `user_id`. Get one from `register_user` or `login_user`.
Calculators (`calculate_due_date`, `generate_diet_plan`, `calculate_weight_gain`)
work without an account.

- `register_user` {name, phone, password, email?}
  A phone number can only be registered once.
- `login_user` {phone, password} returns the user id.
- `update_email` {user_id, email} is needed before confirmation and reminder
  mail can be sent.

---

## Due Date Calculator

`calculate_due_date` {date_type, input_date, ...}

| date_type | input_date means | extra fields |
|-----------|------------------|--------------|
| LMP | first day of the last period | cycle_length (default 28) |
| Conception Date | date of conception | |
| Due Date | known due date | |
| IVF Transfer Date | transfer date | embryo_age in days (default 3) |
| Ultrasound | scan date | us_weeks, us_days (default 0) |

Dates are YYYY-MM-DD. Numbers may be sent as numbers or strings; blank means
the default. Pass `user_id` to save the result; `list_pregnancy_records` shows
the saved history.

The answer has the due date, current week, trimester, baby size (weeks 1-20)
and days remaining. Bad input comes back as `{"error": "..."}`; show that
message to the user as is.

**Dates:** use a calendar tool for "today" rather than guessing.

---

## Diet Plan

`generate_diet_plan` {trimester, condition, diet, culture}

Each choice adds or replaces meals in the plan, in that order. Later choices
win for the same meal. A hydration note is always added. Labels that match
nothing are listed under `ignored` and have no effect. `diet_options` lists
the accepted labels.

---

## Weight Gain

`calculate_weight_gain` {height_ft, height_in, pre_pregnancy_weight,
current_weight, week, twins?}

Heights in feet and inches, weights in pounds. Returns BMI, its category, the
recommended total gain, the expected weight range for the week and the gain so
far.

---

## Symptom Checker

`symptom_chat` {user_id, message}

Answers are general information, not medical advice; say so. When context
awareness is on the recent conversation is used.
`clear_symptom_chat` starts a new conversation. `list_symptoms` shows past
questions.

---

## Hospitals and Appointments

1. `list_specializations` for the accepted labels
2. `find_hospitals` {location, specialization}
3. `book_appointment` {user_id, hospital_name, specialization, date, time}
   with date YYYY-MM-DD and time HH:MM (24 hour)

`list_appointments` and `cancel_appointment` manage bookings.
`send_appointment_reminders` mails users whose appointment starts in 15 to
120 minutes. Each appointment gets one reminder. Appointments of users
without an email are skipped and not retried.

---

## Records, Profile, Preferences, Exercises

- `upload_health_record` {user_id, source_path} copies a local file in.
- `list_health_records`, `get_health_record` {user_id, file_name}
- `get_profile`, `save_profile` (only the fields sent are changed)
- `get_preferences`, `save_preferences` (dark_mode, theme_color, show_nsfw,
  language)
- `list_exercises` {trimester?}
"#;

/// Runtime status of the Bloom service
#[derive(Debug, Clone, Serialize)]
pub struct BloomStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,

    pub chat_configured: bool,
    pub hospital_source: &'static str,
}

/// Collects runtime information for `bloom_status`
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    chat_configured: bool,
    hospital_source: &'static str,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, chat_configured: bool, hospital_source: &'static str) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            chat_configured,
            hospital_source,
        }
    }

    pub fn get_status(&self) -> BloomStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        BloomStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
            chat_configured: self.chat_configured,
            hospital_source: self.hospital_source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_process() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bloom.db");
        std::fs::write(&path, b"0123456789").unwrap();

        let status = StatusTracker::new(path, false, "Offline directory").get_status();
        assert_eq!(status.database_size_bytes, Some(10));
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
        assert!(!status.chat_configured);
    }

    #[test]
    fn test_missing_database_has_no_size() {
        let status = StatusTracker::new(PathBuf::from("/nonexistent/bloom.db"), true, "Google Maps").get_status();
        assert_eq!(status.database_size_bytes, None);
    }

    #[test]
    fn test_instructions_name_every_tool_group() {
        for tool in ["calculate_due_date", "generate_diet_plan", "calculate_weight_gain", "symptom_chat", "book_appointment"] {
            assert!(INSTRUCTIONS.contains(tool), "{} missing", tool);
        }
    }
}
