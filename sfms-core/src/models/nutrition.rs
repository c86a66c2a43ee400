use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::meal_type::MealType;
use super::user::UserId;

/// Nutrient quantities of one meal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl Nutrients {
    pub fn new(calories: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> Self {
        Self {
            calories,
            protein_g,
            carbs_g,
            fat_g,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("calories", self.calories),
            ("protein", self.protein_g),
            ("carbs", self.carbs_g),
            ("fat", self.fat_g),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must not be negative, got {}", name, value));
            }
        }
        Ok(())
    }
}

impl std::ops::AddAssign for Nutrients {
    fn add_assign(&mut self, other: Self) {
        self.calories += other.calories;
        self.protein_g += other.protein_g;
        self.carbs_g += other.carbs_g;
        self.fat_g += other.fat_g;
    }
}

impl fmt::Display for Nutrients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Calories: {:.0} | Protein: {:.0}g | Carbs: {:.0}g | Fat: {:.0}g",
            self.calories, self.protein_g, self.carbs_g, self.fat_g
        )
    }
}

/// Input for logging a meal.
#[derive(Debug, Clone)]
pub struct MealDetails {
    pub meal_type: MealType,
    pub description: String,
    pub nutrients: Nutrients,
    pub date: NaiveDate,
}

impl MealDetails {
    pub fn new(
        meal_type: MealType,
        description: impl Into<String>,
        nutrients: Nutrients,
        date: NaiveDate,
    ) -> Self {
        Self {
            meal_type,
            description: description.into(),
            nutrients,
            date,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("meal description must not be empty".to_string());
        }
        self.nutrients.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEntry {
    pub id: Uuid,
    pub user_id: UserId,
    pub meal_type: MealType,
    pub description: String,
    #[serde(flatten)]
    pub nutrients: Nutrients,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl NutritionEntry {
    pub fn new(user_id: impl Into<UserId>, details: MealDetails) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            meal_type: details.meal_type,
            description: details.description.trim().to_string(),
            nutrients: details.nutrients,
            date: details.date,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for NutritionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {:10} {}\n            {}",
            self.date, self.meal_type, self.description, self.nutrients
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, 15).unwrap()
    }

    #[test]
    fn test_nutrients_validate() {
        assert!(Nutrients::new(350.0, 12.0, 45.0, 10.0).validate().is_ok());
        let err = Nutrients::new(350.0, -1.0, 45.0, 10.0).validate().unwrap_err();
        assert!(err.contains("protein"));
        assert!(Nutrients::new(f64::INFINITY, 0.0, 0.0, 0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_nutrients_add_assign() {
        let mut total = Nutrients::default();
        total += Nutrients::new(100.0, 10.0, 20.0, 5.0);
        total += Nutrients::new(50.0, 5.0, 0.0, 1.0);
        assert_eq!(total, Nutrients::new(150.0, 15.0, 20.0, 6.0));
    }

    #[test]
    fn test_meal_details_requires_description() {
        let details = MealDetails::new(MealType::Lunch, "  ", Nutrients::default(), date());
        assert!(details.validate().unwrap_err().contains("description"));
    }

    #[test]
    fn test_entry_serializes_flat_nutrients() {
        let details = MealDetails::new(
            MealType::Breakfast,
            "Oatmeal with fruit",
            Nutrients::new(350.0, 12.0, 45.0, 10.0),
            date(),
        );
        let entry = NutritionEntry::new("tester", details);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["calories"], 350.0);
        assert_eq!(value["meal_type"], "breakfast");
        assert!(value.get("nutrients").is_none());
    }

    #[test]
    fn test_entry_display() {
        let details = MealDetails::new(
            MealType::Dinner,
            "Pasta",
            Nutrients::new(650.0, 25.0, 80.0, 28.0),
            date(),
        );
        let output = format!("{}", NutritionEntry::new("tester", details));
        assert!(output.contains("dinner"));
        assert!(output.contains("Pasta"));
        assert!(output.contains("Calories: 650 | Protein: 25g"));
    }
}
