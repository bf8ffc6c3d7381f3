//! Diet plan tools

use serde::Serialize;

use crate::calculators::diet::HYDRATION_NOTE;
use crate::calculators::{compose_diet_plan, Cuisine, DietPreferences, DietType, HealthCondition, MealPlan, Trimester};

#[derive(Debug, Serialize)]
pub struct DietPlanResponse {
    pub plan: MealPlan,
    /// Labels that matched nothing and were left out of the plan
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DietOptionsResponse {
    pub trimesters: Vec<&'static str>,
    pub conditions: Vec<&'static str>,
    pub diets: Vec<&'static str>,
    pub cultures: Vec<&'static str>,
    pub hydration: &'static str,
}

/// Build the day's plan. Unknown labels are skipped, never rejected.
pub fn generate_diet_plan(trimester: &str, condition: &str, diet: &str, culture: &str) -> DietPlanResponse {
    let prefs = DietPreferences::from_labels(trimester, condition, diet, culture);

    let ignored = [
        (trimester, prefs.trimester.is_some()),
        (condition, prefs.condition.is_some()),
        (diet, prefs.diet.is_some()),
        (culture, prefs.cuisine.is_some()),
    ]
    .into_iter()
    .filter(|(label, matched)| !matched && !label.trim().is_empty() && !label.trim().eq_ignore_ascii_case("none"))
    .map(|(label, _)| label.to_string())
    .collect();

    DietPlanResponse {
        plan: compose_diet_plan(&prefs),
        ignored,
    }
}

pub fn diet_options() -> DietOptionsResponse {
    DietOptionsResponse {
        trimesters: Trimester::ALL.iter().map(|t| t.as_str()).collect(),
        conditions: HealthCondition::ALL.iter().map(|c| c.as_str()).collect(),
        diets: DietType::ALL.iter().map(|d| d.as_str()).collect(),
        cultures: Cuisine::ALL.iter().map(|c| c.as_str()).collect(),
        hydration: HYDRATION_NOTE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_json_shape() {
        let response = generate_diet_plan("Second Trimester", "None", "Vegetarian", "Indian");
        assert!(response.ignored.is_empty());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["plan"]["Breakfast"], "Poha with peanuts & curry leaves");
        assert_eq!(json["plan"]["Evening Snack"], "Boiled egg with flaxseed");
        assert_eq!(json["plan"]["Hydration"], HYDRATION_NOTE);
        assert!(json.get("ignored").is_none());
    }

    #[test]
    fn test_unknown_labels_reported() {
        let response = generate_diet_plan("First Trimester", "Gout", "Vegan", "");
        assert_eq!(response.ignored, vec!["Gout".to_string()]);
        assert_eq!(response.plan.len(), 6);
    }

    #[test]
    fn test_options_cover_every_label() {
        let options = diet_options();
        assert_eq!(options.trimesters.len(), 3);
        assert_eq!(options.conditions[0], "None");
        assert!(options.diets.contains(&"Non-Vegetarian"));
        assert_eq!(options.cultures.len(), 4);
    }
}
