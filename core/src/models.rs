use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// How a category's entries collapse into one number per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// Daily value is the sum of the day's entries.
    Sum,
    /// Daily value is the most recently logged entry of the day.
    Latest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Calories,
    Water,
    Steps,
    Sleep,
    Workout,
    Weight,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub color: &'static str,
    pub default_goal: f64,
    pub mode: AggregationMode,
}

const CATALOG: [CategoryInfo; 6] = [
    CategoryInfo {
        key: "calories",
        label: "Calories",
        unit: "kcal",
        color: "#FFD700",
        default_goal: 2500.0,
        mode: AggregationMode::Sum,
    },
    CategoryInfo {
        key: "water",
        label: "Water",
        unit: "ml",
        color: "#00E0FF",
        default_goal: 3000.0,
        mode: AggregationMode::Sum,
    },
    CategoryInfo {
        key: "steps",
        label: "Steps",
        unit: "steps",
        color: "#2ed573",
        default_goal: 10000.0,
        mode: AggregationMode::Sum,
    },
    CategoryInfo {
        key: "sleep",
        label: "Sleep",
        unit: "hrs",
        color: "#a55eea",
        default_goal: 8.0,
        mode: AggregationMode::Sum,
    },
    CategoryInfo {
        key: "workout",
        label: "Workout",
        unit: "min",
        color: "#ff7f50",
        default_goal: 60.0,
        mode: AggregationMode::Sum,
    },
    CategoryInfo {
        key: "weight",
        label: "Weight",
        unit: "kg",
        color: "#ff4757",
        default_goal: 75.0,
        mode: AggregationMode::Latest,
    },
];

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Calories,
        Category::Water,
        Category::Steps,
        Category::Sleep,
        Category::Workout,
        Category::Weight,
    ];

    #[must_use]
    pub fn info(self) -> &'static CategoryInfo {
        &CATALOG[self as usize]
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        self.info().key
    }

    #[must_use]
    pub fn mode(self) -> AggregationMode {
        self.info().mode
    }

    #[must_use]
    pub fn default_goal(self) -> f64 {
        self.info().default_goal
    }

    /// Decimal places used when showing this category's values.
    #[must_use]
    pub fn display_precision(self) -> usize {
        usize::from(self.info().unit == "kg")
    }

    #[must_use]
    pub fn format_value(self, value: f64) -> String {
        let precision = self.display_precision();
        format!("{value:.precision$}")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let lower = s.trim().to_lowercase();
        match Category::ALL.into_iter().find(|c| c.key() == lower) {
            Some(category) => Ok(category),
            None => bail!(
                "Invalid category '{s}'. Must be one of: {}",
                Category::ALL.map(Category::key).join(", ")
            ),
        }
    }
}

/// One logged observation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub label: String,
    pub value: f64,
    pub timestamp: NaiveDateTime,
}

impl Entry {
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// One day of the rolling chart window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub completed: f64,
    pub goal: f64,
    pub remaining: f64,
}

/// Everything a report view needs for one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    pub label: &'static str,
    pub unit: &'static str,
    pub color: &'static str,
    pub mode: AggregationMode,
    pub progress: Progress,
    pub series: Vec<DailyPoint>,
}

// --- Body mass index ---

const KG_PER_LB: f64 = 0.453_592;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lbs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    Cm,
    M,
}

impl WeightUnit {
    #[must_use]
    pub fn to_kg(self, weight: f64) -> f64 {
        match self {
            Self::Kg => weight,
            Self::Lbs => weight * KG_PER_LB,
        }
    }
}

impl HeightUnit {
    #[must_use]
    pub fn to_meters(self, height: f64) -> f64 {
        match self {
            Self::Cm => height / 100.0,
            Self::M => height,
        }
    }
}

impl FromStr for WeightUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "kg" => Ok(Self::Kg),
            "lbs" | "lb" => Ok(Self::Lbs),
            _ => bail!("Invalid weight unit '{s}'. Use 'kg' or 'lbs'"),
        }
    }
}

impl FromStr for HeightUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "cm" => Ok(Self::Cm),
            "m" => Ok(Self::M),
            _ => bail!("Invalid height unit '{s}'. Use 'cm' or 'm'"),
        }
    }
}

/// Body mass index (kg/m²), or `None` when either measurement is not positive.
#[must_use]
pub fn body_mass_index(
    weight: f64,
    weight_unit: WeightUnit,
    height: f64,
    height_unit: HeightUnit,
) -> Option<f64> {
    if !(weight > 0.0 && height > 0.0) {
        return None;
    }
    let kg = weight_unit.to_kg(weight);
    let meters = height_unit.to_meters(height);
    Some(kg / (meters * meters))
}

/// WHO adult bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiClass {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiClass {
    #[must_use]
    pub fn of(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }
}

impl fmt::Display for BmiClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_matches_variants() {
        for category in Category::ALL {
            assert_eq!(category.key(), category.to_string());
            assert_eq!(category.key().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_only_weight_uses_latest() {
        for category in Category::ALL {
            let expected = if category == Category::Weight {
                AggregationMode::Latest
            } else {
                AggregationMode::Sum
            };
            assert_eq!(category.mode(), expected, "{category}");
        }
    }

    #[test]
    fn test_default_goals() {
        assert_eq!(Category::Calories.default_goal(), 2500.0);
        assert_eq!(Category::Water.default_goal(), 3000.0);
        assert_eq!(Category::Steps.default_goal(), 10000.0);
        assert_eq!(Category::Sleep.default_goal(), 8.0);
        assert_eq!(Category::Workout.default_goal(), 60.0);
        assert_eq!(Category::Weight.default_goal(), 75.0);
    }

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!("Water".parse::<Category>().unwrap(), Category::Water);
        assert_eq!(" STEPS ".parse::<Category>().unwrap(), Category::Steps);
    }

    #[test]
    fn test_category_parse_invalid() {
        let err = "protein".parse::<Category>().unwrap_err();
        assert!(err.to_string().contains("calories, water, steps"));
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serializes_as_key() {
        let json = serde_json::to_string(&Category::Workout).unwrap();
        assert_eq!(json, "\"workout\"");
    }

    #[test]
    fn test_format_value_precision() {
        assert_eq!(Category::Weight.format_value(69.54), "69.5");
        assert_eq!(Category::Calories.format_value(248.4), "248");
        assert_eq!(Category::Sleep.format_value(7.0), "7");
    }

    #[test]
    fn test_bmi_metric() {
        let bmi = body_mass_index(70.0, WeightUnit::Kg, 175.0, HeightUnit::Cm).unwrap();
        assert!((bmi - 22.857).abs() < 0.001);
    }

    #[test]
    fn test_bmi_imperial_weight_and_meters() {
        let bmi = body_mass_index(154.0, WeightUnit::Lbs, 1.75, HeightUnit::M).unwrap();
        // 154 lbs = 69.853 kg
        assert!((bmi - 22.809).abs() < 0.001);
    }

    #[test]
    fn test_bmi_rejects_non_positive() {
        assert!(body_mass_index(0.0, WeightUnit::Kg, 175.0, HeightUnit::Cm).is_none());
        assert!(body_mass_index(70.0, WeightUnit::Kg, -1.0, HeightUnit::Cm).is_none());
        assert!(body_mass_index(f64::NAN, WeightUnit::Kg, 175.0, HeightUnit::Cm).is_none());
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!("LB".parse::<WeightUnit>().unwrap(), WeightUnit::Lbs);
        assert_eq!("m".parse::<HeightUnit>().unwrap(), HeightUnit::M);
        assert!("stone".parse::<WeightUnit>().is_err());
        assert!("ft".parse::<HeightUnit>().is_err());
    }

    #[test]
    fn test_bmi_class_bands() {
        assert_eq!(BmiClass::of(18.4), BmiClass::Underweight);
        assert_eq!(BmiClass::of(18.5), BmiClass::Normal);
        assert_eq!(BmiClass::of(24.99), BmiClass::Normal);
        assert_eq!(BmiClass::of(25.0), BmiClass::Overweight);
        assert_eq!(BmiClass::of(30.0), BmiClass::Obese);
        assert_eq!(BmiClass::of(22.0).to_string(), "Normal");
    }
}
