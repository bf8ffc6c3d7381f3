//! Fetal size reference table
//!
//! Approximate crown-rump length, weight and a familiar comparison for weeks 1-20.
//! Later weeks have no entry and report the placeholder.

use serde::Serialize;

/// Size reference for one gestational week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetalSize {
    pub size: &'static str,
    pub weight: &'static str,
    pub comparison: &'static str,
}

impl FetalSize {
    const fn new(size: &'static str, weight: &'static str, comparison: &'static str) -> Self {
        Self { size, weight, comparison }
    }

    /// One-line description, e.g. "16 mm and 1.5g (about the size of a Raspberry)"
    pub fn describe(&self) -> String {
        format!(
            "{} and {} (about the size of a {})",
            self.size, self.weight, self.comparison
        )
    }
}

pub const NOT_AVAILABLE: FetalSize =
    FetalSize::new("Not available", "Not available", "Not available");

/// Indexed by week - 1
const FETAL_SIZE_TABLE: [FetalSize; 20] = [
    FetalSize::new("0.1 mm", "too small to weigh", "Invisible to naked eye"),
    FetalSize::new("0.2 mm", "too small to weigh", "Poppy seed"),
    FetalSize::new("0.9 mm", "too small to weigh", "Sesame seed"),
    FetalSize::new("2.5 mm", "0.001g", "Rice grain"),
    FetalSize::new("5 mm", "0.05g", "Apple seed"),
    FetalSize::new("8 mm", "0.2g", "Sweet pea"),
    FetalSize::new("13 mm", "1g", "Blueberry"),
    FetalSize::new("16 mm", "1.5g", "Raspberry"),
    FetalSize::new("23 mm", "2.5g", "Green olive"),
    FetalSize::new("31 mm", "4g", "Prune"),
    FetalSize::new("41 mm", "7g", "Fig"),
    FetalSize::new("53 mm", "14g", "Lime"),
    FetalSize::new("74 mm", "23g", "Lemon"),
    FetalSize::new("87 mm", "43g", "Orange"),
    FetalSize::new("97 mm", "70g", "Apple"),
    FetalSize::new("116 mm", "100g", "Avocado"),
    FetalSize::new("133 mm", "140g", "Pear"),
    FetalSize::new("144 mm", "190g", "Bell pepper"),
    FetalSize::new("152 mm", "240g", "Mango"),
    FetalSize::new("160 mm", "300g", "Banana"),
];

/// Look up a week, or `None` outside 1-20
pub fn lookup(week: i64) -> Option<FetalSize> {
    let index = usize::try_from(week.checked_sub(1)?).ok()?;
    FETAL_SIZE_TABLE.get(index).copied()
}

/// Look up a week, falling back to [`NOT_AVAILABLE`]
pub fn for_week(week: i64) -> FetalSize {
    lookup(week).unwrap_or(NOT_AVAILABLE)
}
