use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Users are identified by their username.
pub type UserId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" | "o" => Ok(Gender::Other),
            _ => Err(format!(
                "Invalid gender '{}'. Valid options: male, female, other",
                s
            )),
        }
    }
}

/// Personal attributes shown on the profile and used for calorie estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        age: u32,
        gender: Gender,
        height_cm: f64,
        weight_kg: f64,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            gender,
            height_cm,
            weight_kg,
        }
    }

    /// Checks the ranges accepted at registration and on profile edits.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if !(1..=120).contains(&self.age) {
            return Err(format!("age must be between 1 and 120, got {}", self.age));
        }
        if !self.height_cm.is_finite() || self.height_cm < 1.0 || self.height_cm > 300.0 {
            return Err(format!(
                "height must be between 1 and 300 cm, got {}",
                self.height_cm
            ));
        }
        if !self.weight_kg.is_finite() || self.weight_kg < 1.0 || self.weight_kg > 500.0 {
            return Err(format!(
                "weight must be between 1 and 500 kg, got {}",
                self.weight_kg
            ));
        }
        Ok(())
    }

    /// Body mass index, kg/m².
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_kg / (height_m * height_m)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: UserId,
    pub password_hash: String,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: impl Into<UserId>,
        password_hash: impl Into<String>,
        profile: Profile,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            profile,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &UserId {
        &self.username
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.profile;
        writeln!(f, "{} ({})", p.name, self.username)?;
        writeln!(f, "{}", "=".repeat(30))?;
        writeln!(f, "Age:    {}", p.age)?;
        writeln!(f, "Gender: {}", p.gender)?;
        writeln!(f, "Height: {:.1} cm", p.height_cm)?;
        writeln!(f, "Weight: {:.1} kg", p.weight_kg)?;
        write!(f, "BMI:    {:.1}", p.bmi())
    }
}
