use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Running,
    Cycling,
    Swimming,
    Walking,
    Strength,
    Yoga,
    Hiit,
    Other,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 8] = [
        WorkoutType::Running,
        WorkoutType::Cycling,
        WorkoutType::Swimming,
        WorkoutType::Walking,
        WorkoutType::Strength,
        WorkoutType::Yoga,
        WorkoutType::Hiit,
        WorkoutType::Other,
    ];

    /// Metabolic equivalent of the activity.
    pub fn met(&self) -> f64 {
        match self {
            WorkoutType::Running => 9.8,
            WorkoutType::Cycling => 7.5,
            WorkoutType::Swimming => 8.0,
            WorkoutType::Walking => 3.5,
            WorkoutType::Strength => 5.0,
            WorkoutType::Yoga => 2.5,
            WorkoutType::Hiit => 8.0,
            WorkoutType::Other => 4.0,
        }
    }

    /// Estimated kcal burned: MET × body weight (kg) × hours.
    pub fn estimate_calories(&self, weight_kg: f64, duration_minutes: u32) -> f64 {
        (self.met() * weight_kg * f64::from(duration_minutes) / 60.0).round()
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkoutType::Running => "running",
            WorkoutType::Cycling => "cycling",
            WorkoutType::Swimming => "swimming",
            WorkoutType::Walking => "walking",
            WorkoutType::Strength => "strength",
            WorkoutType::Yoga => "yoga",
            WorkoutType::Hiit => "hiit",
            WorkoutType::Other => "other",
        };
        f.pad(name)
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "running" | "run" => Ok(WorkoutType::Running),
            "cycling" | "bike" => Ok(WorkoutType::Cycling),
            "swimming" | "swim" => Ok(WorkoutType::Swimming),
            "walking" | "walk" => Ok(WorkoutType::Walking),
            "strength" | "weights" => Ok(WorkoutType::Strength),
            "yoga" => Ok(WorkoutType::Yoga),
            "hiit" => Ok(WorkoutType::Hiit),
            "other" => Ok(WorkoutType::Other),
            _ => Err(format!(
                "Invalid workout type '{}'. Valid options: running, cycling, swimming, \
                 walking, strength, yoga, hiit, other",
                s
            )),
        }
    }
}

/// Input for logging a workout, as collected by a front end.
#[derive(Debug, Clone)]
pub struct WorkoutDetails {
    pub workout_type: WorkoutType,
    /// Raw minutes; rejected unless positive.
    pub duration_minutes: i64,
    pub date: NaiveDate,
    /// Overrides the MET estimate when the user knows the figure.
    pub calories_burned: Option<f64>,
    pub notes: Option<String>,
}

impl WorkoutDetails {
    pub fn new(workout_type: WorkoutType, duration_minutes: i64, date: NaiveDate) -> Self {
        Self {
            workout_type,
            duration_minutes,
            date,
            calories_burned: None,
            notes: None,
        }
    }

    pub fn with_calories(mut self, calories: f64) -> Self {
        self.calories_burned = Some(calories);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns the validated duration.
    pub fn validate(&self) -> Result<u32, String> {
        if self.duration_minutes <= 0 {
            return Err(format!(
                "duration must be a positive number of minutes, got {}",
                self.duration_minutes
            ));
        }
        let minutes = u32::try_from(self.duration_minutes)
            .map_err(|_| format!("duration of {} minutes is too long", self.duration_minutes))?;
        if let Some(calories) = self.calories_burned {
            if !calories.is_finite() || calories < 0.0 {
                return Err(format!("calories must not be negative, got {}", calories));
            }
        }
        Ok(minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: UserId,
    pub workout_type: WorkoutType,
    pub duration_minutes: u32,
    pub date: NaiveDate,
    pub calories_burned: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Workout {
    pub fn new(
        user_id: impl Into<UserId>,
        workout_type: WorkoutType,
        duration_minutes: u32,
        date: NaiveDate,
        calories_burned: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            workout_type,
            duration_minutes,
            date,
            calories_burned,
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl fmt::Display for Workout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {:10} {:>4} min  {:>6.0} kcal",
            self.date, self.workout_type, self.duration_minutes, self.calories_burned
        )?;
        if let Some(notes) = &self.notes {
            write!(f, "  ({})", notes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, 15).unwrap()
    }

    #[test]
    fn test_estimate_calories() {
        // 9.8 MET * 70 kg * 0.5 h
        assert_eq!(WorkoutType::Running.estimate_calories(70.0, 30), 343.0);
        assert_eq!(WorkoutType::Walking.estimate_calories(80.0, 60), 280.0);
    }

    #[test]
    fn test_workout_type_from_str() {
        assert_eq!("Running".parse::<WorkoutType>().unwrap(), WorkoutType::Running);
        assert_eq!("swim".parse::<WorkoutType>().unwrap(), WorkoutType::Swimming);
        assert_eq!("HIIT".parse::<WorkoutType>().unwrap(), WorkoutType::Hiit);
        assert!("jousting".parse::<WorkoutType>().is_err());
    }

    #[test]
    fn test_workout_type_display_parses_back() {
        for workout_type in WorkoutType::ALL {
            let parsed: WorkoutType = workout_type.to_string().parse().unwrap();
            assert_eq!(parsed, workout_type);
        }
    }

    #[test]
    fn test_details_validate_rejects_non_positive_duration() {
        let details = WorkoutDetails::new(WorkoutType::Running, -5, date());
        assert!(details.validate().unwrap_err().contains("positive"));

        let details = WorkoutDetails::new(WorkoutType::Running, 0, date());
        assert!(details.validate().is_err());
    }

    #[test]
    fn test_details_validate_rejects_negative_calories() {
        let details = WorkoutDetails::new(WorkoutType::Yoga, 30, date()).with_calories(-10.0);
        assert!(details.validate().unwrap_err().contains("calories"));
    }

    #[test]
    fn test_details_validate_returns_minutes() {
        let details = WorkoutDetails::new(WorkoutType::Yoga, 45, date());
        assert_eq!(details.validate().unwrap(), 45);
    }

    #[test]
    fn test_workout_display() {
        let workout = Workout::new("tester", WorkoutType::Running, 30, date(), 343.0)
            .with_notes("Morning run");
        let output = format!("{}", workout);
        assert!(output.contains("2023-10-15"));
        assert!(output.contains("running"));
        assert!(output.contains("30 min"));
        assert!(output.contains("Morning run"));
    }
}
