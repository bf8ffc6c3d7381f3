//! Diet plan composer
//!
//! A plan is built from four static override layers applied in a fixed order:
//! trimester base, health condition, diet type, then cuisine. Each layer only
//! touches the slots it names and later layers win. A hydration note is always
//! appended last.
//!
//! Unrecognized or absent preferences contribute an empty layer rather than an
//! error, so the previous layer's meals stand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::gestation::Trimester;

pub const HYDRATION_NOTE: &str =
    "At least 10 glasses of water, including coconut water & herbal teas.";

/// A slot in the daily plan, ordered as served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MealSlot {
    Breakfast,
    Snack,
    Lunch,
    #[serde(rename = "Evening Snack")]
    EveningSnack,
    Dinner,
    Hydration,
}

impl MealSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Snack => "Snack",
            MealSlot::Lunch => "Lunch",
            MealSlot::EveningSnack => "Evening Snack",
            MealSlot::Dinner => "Dinner",
            MealSlot::Hydration => "Hydration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCondition {
    NoCondition,
    GestationalDiabetes,
    Hypertension,
    Anemia,
    Nausea,
    Constipation,
}

impl HealthCondition {
    pub const ALL: [HealthCondition; 6] = [
        HealthCondition::NoCondition,
        HealthCondition::GestationalDiabetes,
        HealthCondition::Hypertension,
        HealthCondition::Anemia,
        HealthCondition::Nausea,
        HealthCondition::Constipation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthCondition::NoCondition => "None",
            HealthCondition::GestationalDiabetes => "Gestational Diabetes",
            HealthCondition::Hypertension => "Hypertension",
            HealthCondition::Anemia => "Anemia",
            HealthCondition::Nausea => "Nausea",
            HealthCondition::Constipation => "Constipation",
        }
    }

    /// Form labels, case-insensitive, or their snake_case names
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', " ").as_str() {
            "none" | "no condition" => Some(HealthCondition::NoCondition),
            "gestational diabetes" => Some(HealthCondition::GestationalDiabetes),
            "hypertension" => Some(HealthCondition::Hypertension),
            "anemia" => Some(HealthCondition::Anemia),
            "nausea" => Some(HealthCondition::Nausea),
            "constipation" => Some(HealthCondition::Constipation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietType {
    Vegetarian,
    Vegan,
    NonVegetarian,
}

impl DietType {
    pub const ALL: [DietType; 3] = [DietType::Vegetarian, DietType::Vegan, DietType::NonVegetarian];

    pub fn as_str(&self) -> &'static str {
        match self {
            DietType::Vegetarian => "Vegetarian",
            DietType::Vegan => "Vegan",
            DietType::NonVegetarian => "Non-Vegetarian",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "vegetarian" => Some(DietType::Vegetarian),
            "vegan" => Some(DietType::Vegan),
            "non-vegetarian" => Some(DietType::NonVegetarian),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cuisine {
    Indian,
    Mediterranean,
    Western,
    Asian,
}

impl Cuisine {
    pub const ALL: [Cuisine; 4] = [Cuisine::Indian, Cuisine::Mediterranean, Cuisine::Western, Cuisine::Asian];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cuisine::Indian => "Indian",
            Cuisine::Mediterranean => "Mediterranean",
            Cuisine::Western => "Western",
            Cuisine::Asian => "Asian",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "indian" => Some(Cuisine::Indian),
            "mediterranean" => Some(Cuisine::Mediterranean),
            "western" => Some(Cuisine::Western),
            "asian" => Some(Cuisine::Asian),
            _ => None,
        }
    }
}

/// Diet form selections. `None` means the field was unrecognized or left out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietPreferences {
    pub trimester: Option<Trimester>,
    pub condition: Option<HealthCondition>,
    pub diet: Option<DietType>,
    pub cuisine: Option<Cuisine>,
}

impl DietPreferences {
    /// Build from form labels, dropping any label that doesn't match
    pub fn from_labels(trimester: &str, condition: &str, diet: &str, cuisine: &str) -> Self {
        Self {
            trimester: Trimester::from_str(trimester),
            condition: HealthCondition::from_str(condition),
            diet: DietType::from_str(diet),
            cuisine: Cuisine::from_str(cuisine),
        }
    }
}

/// One override layer: the slots it sets and their text
pub type Layer = &'static [(MealSlot, &'static str)];

const EMPTY: Layer = &[];

/// Meal plan keyed by slot; iterates in serving order
pub type MealPlan = BTreeMap<MealSlot, String>;

pub fn trimester_layer(trimester: Option<Trimester>) -> Layer {
    use MealSlot::*;
    match trimester {
        Some(Trimester::First) => &[
            (Breakfast, "Whole grain toast with avocado & boiled egg"),
            (Snack, "Ginger tea with crackers"),
            (Lunch, "Vegetable soup with whole grain bread"),
            (EveningSnack, "Fruit salad with almonds"),
            (Dinner, "Light khichdi with mint chutney"),
        ],
        Some(Trimester::Second) => &[
            (Breakfast, "Oats with chia seeds, banana, and walnuts"),
            (Snack, "Greek yogurt with berries"),
            (Lunch, "Grilled chicken with quinoa and spinach salad"),
            (EveningSnack, "Boiled egg with flaxseed"),
            (Dinner, "Palak paneer with brown rice"),
        ],
        Some(Trimester::Third) => &[
            (Breakfast, "Ragi porridge with dates & almonds"),
            (Snack, "Milk with dry fruits"),
            (Lunch, "Lentil curry with spinach and brown rice"),
            (EveningSnack, "Sesame laddoo with coconut water"),
            (Dinner, "Stuffed paratha with vegetable soup"),
        ],
        None => EMPTY,
    }
}

pub fn condition_layer(condition: Option<HealthCondition>) -> Layer {
    use MealSlot::*;
    match condition {
        Some(HealthCondition::GestationalDiabetes) => &[
            (Breakfast, "Oats with chia, flaxseed & cinnamon (low GI)"),
            (Snack, "Roasted chickpeas and cucumber sticks"),
            (Lunch, "Grilled chicken with quinoa and leafy greens (low GI)"),
            (EveningSnack, "Nuts, seeds, and berries (low sugar)"),
        ],
        Some(HealthCondition::Hypertension) => &[
            (Breakfast, "Banana smoothie with flaxseed"),
            (Snack, "Watermelon salad with mint"),
            (Lunch, "Grilled salmon with sweet potato & spinach"),
            (EveningSnack, "Yogurt with flaxseed"),
        ],
        Some(HealthCondition::Anemia) => &[
            (Breakfast, "Beetroot and carrot smoothie"),
            (Snack, "Dates stuffed with almonds"),
            (Lunch, "Spinach dal with brown rice"),
            (EveningSnack, "Pomegranate juice"),
        ],
        Some(HealthCondition::Nausea) => &[
            (Breakfast, "Dry toast with ginger lemon tea"),
            (Snack, "Crackers with nut butter"),
            (Lunch, "Light vegetable broth with rice crackers"),
        ],
        Some(HealthCondition::Constipation) => &[
            (Breakfast, "Flaxseed oatmeal with prunes"),
            (Snack, "Papaya cubes with lemon"),
            (Lunch, "Palak curry with brown rice"),
            (EveningSnack, "Chia pudding with mango"),
        ],
        Some(HealthCondition::NoCondition) | None => EMPTY,
    }
}

pub fn diet_layer(diet: Option<DietType>) -> Layer {
    use MealSlot::*;
    match diet {
        Some(DietType::Vegetarian) => &[
            (Lunch, "Palak paneer with quinoa"),
            (Dinner, "Rajma curry with brown rice & salad"),
        ],
        Some(DietType::Vegan) => &[
            (Lunch, "Chickpea quinoa salad"),
            (Dinner, "Tofu stir fry with millet"),
        ],
        Some(DietType::NonVegetarian) => &[
            (Lunch, "Chicken curry with brown rice"),
            (Dinner, "Grilled fish with roasted vegetables"),
        ],
        None => EMPTY,
    }
}

pub fn cuisine_layer(cuisine: Option<Cuisine>) -> Layer {
    use MealSlot::*;
    match cuisine {
        Some(Cuisine::Indian) => &[
            (Breakfast, "Poha with peanuts & curry leaves"),
            (Lunch, "Dal tadka with roti and vegetable sabzi"),
            (Dinner, "Aloo methi with curd and roti"),
        ],
        Some(Cuisine::Mediterranean) => &[
            (Breakfast, "Greek yogurt with figs, walnuts & honey"),
            (Lunch, "Falafel bowl with hummus & tabbouleh"),
            (Dinner, "Grilled eggplant with tahini sauce and couscous"),
        ],
        Some(Cuisine::Western) => &[
            (Breakfast, "Scrambled eggs with avocado toast"),
            (Lunch, "Chicken Caesar salad"),
            (Dinner, "Baked salmon with quinoa and vegetables"),
        ],
        Some(Cuisine::Asian) => &[
            (Breakfast, "Rice porridge with vegetables"),
            (Lunch, "Stir-fried tofu with vegetables & rice"),
            (Dinner, "Miso soup with vegetable sushi (cooked options)"),
        ],
        None => EMPTY,
    }
}

/// Overlay `layer` onto `plan`; the layer wins on every slot it names
pub fn merge_layer(mut plan: MealPlan, layer: Layer) -> MealPlan {
    for &(slot, text) in layer {
        plan.insert(slot, text.to_string());
    }
    plan
}

/// Layers for a set of preferences, in application order
pub fn layers_for(prefs: &DietPreferences) -> [Layer; 4] {
    [
        trimester_layer(prefs.trimester),
        condition_layer(prefs.condition),
        diet_layer(prefs.diet),
        cuisine_layer(prefs.cuisine),
    ]
}

/// Compose the daily plan for a set of preferences
pub fn compose_diet_plan(prefs: &DietPreferences) -> MealPlan {
    let mut plan = layers_for(prefs)
        .into_iter()
        .fold(MealPlan::new(), merge_layer);
    plan.insert(MealSlot::Hydration, HYDRATION_NOTE.to_string());
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(plan: &MealPlan, slot: MealSlot) -> &str {
        plan.get(&slot).map(String::as_str).unwrap_or("")
    }

    #[test]
    fn test_cuisine_layer_wins() {
        let prefs = DietPreferences::from_labels("Second Trimester", "None", "Vegetarian", "Indian");
        let plan = compose_diet_plan(&prefs);

        assert_eq!(slot(&plan, MealSlot::Breakfast), "Poha with peanuts & curry leaves");
        assert_eq!(slot(&plan, MealSlot::Lunch), "Dal tadka with roti and vegetable sabzi");
        assert_eq!(slot(&plan, MealSlot::Dinner), "Aloo methi with curd and roti");
        // untouched by later layers
        assert_eq!(slot(&plan, MealSlot::Snack), "Greek yogurt with berries");
        assert_eq!(slot(&plan, MealSlot::Hydration), HYDRATION_NOTE);
        assert_eq!(plan.len(), 6);
    }

    #[test]
    fn test_condition_survives_without_cuisine() {
        let prefs = DietPreferences::from_labels("First Trimester", "Gestational Diabetes", "Vegan", "None");
        assert_eq!(prefs.cuisine, None);
        let plan = compose_diet_plan(&prefs);

        assert_eq!(slot(&plan, MealSlot::Breakfast), "Oats with chia, flaxseed & cinnamon (low GI)");
        assert_eq!(slot(&plan, MealSlot::EveningSnack), "Nuts, seeds, and berries (low sugar)");
        // diet layer overrides the condition lunch
        assert_eq!(slot(&plan, MealSlot::Lunch), "Chickpea quinoa salad");
        assert_eq!(slot(&plan, MealSlot::Dinner), "Tofu stir fry with millet");
    }

    #[test]
    fn test_diet_layer_touches_only_lunch_and_dinner() {
        let base = merge_layer(MealPlan::new(), trimester_layer(Some(Trimester::Third)));
        let merged = merge_layer(base.clone(), diet_layer(Some(DietType::NonVegetarian)));

        for s in [MealSlot::Breakfast, MealSlot::Snack, MealSlot::EveningSnack] {
            assert_eq!(base.get(&s), merged.get(&s));
        }
        assert_eq!(slot(&merged, MealSlot::Lunch), "Chicken curry with brown rice");
        assert_eq!(slot(&merged, MealSlot::Dinner), "Grilled fish with roasted vegetables");
    }

    #[test]
    fn test_unknown_labels_are_skipped() {
        let prefs = DietPreferences::from_labels("Fourth Trimester", "Gout", "Carnivore", "Martian");
        assert_eq!(prefs, DietPreferences::default());

        let plan = compose_diet_plan(&prefs);
        assert_eq!(plan.len(), 1);
        assert_eq!(slot(&plan, MealSlot::Hydration), HYDRATION_NOTE);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let prefs = DietPreferences::from_labels("Third Trimester", "Anemia", "Vegetarian", "Asian");
        let first = serde_json::to_string(&compose_diet_plan(&prefs)).unwrap();
        let second = serde_json::to_string(&compose_diet_plan(&prefs)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_plan_serializes_in_serving_order() {
        let prefs = DietPreferences::from_labels("First Trimester", "None", "Vegan", "Western");
        let json = serde_json::to_string(&compose_diet_plan(&prefs)).unwrap();
        let keys = ["\"Breakfast\"", "\"Snack\"", "\"Lunch\"", "\"Evening Snack\"", "\"Dinner\"", "\"Hydration\""];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_labels_round_trip() {
        for c in HealthCondition::ALL {
            assert_eq!(HealthCondition::from_str(c.as_str()), Some(c));
        }
        for d in DietType::ALL {
            assert_eq!(DietType::from_str(d.as_str()), Some(d));
        }
        for c in Cuisine::ALL {
            assert_eq!(Cuisine::from_str(c.as_str()), Some(c));
        }
        for t in Trimester::ALL {
            assert_eq!(Trimester::from_str(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_only_labels_and_snake_case_names_parse() {
        assert_eq!(HealthCondition::from_str("no_condition"), Some(HealthCondition::NoCondition));
        assert_eq!(HealthCondition::from_str("gestational_diabetes"), Some(HealthCondition::GestationalDiabetes));
        assert_eq!(DietType::from_str("non_vegetarian"), Some(DietType::NonVegetarian));
        assert_eq!(Trimester::from_str("Second Trimester"), Some(Trimester::Second));
        assert_eq!(Trimester::from_str("third_trimester"), Some(Trimester::Third));

        for alias in ["diabetes", "high blood pressure", "anaemia", "morning sickness"] {
            assert_eq!(HealthCondition::from_str(alias), None, "{}", alias);
        }
        for alias in ["veg", "nonvegetarian", "non-veg"] {
            assert_eq!(DietType::from_str(alias), None, "{}", alias);
        }
        for alias in ["1", "2nd", "3rd trimester"] {
            assert_eq!(Trimester::from_str(alias), None, "{}", alias);
        }
    }
}
