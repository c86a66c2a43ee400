use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::nutrition::NutritionEntry;
use super::user::UserId;
use super::workout::Workout;

/// What a goal measures. Progress is always derived from logged records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalMetric {
    WorkoutMinutes,
    WorkoutCount,
    CaloriesBurned,
    CaloriesConsumed,
    ProteinGrams,
}

impl GoalMetric {
    pub const ALL: [GoalMetric; 5] = [
        GoalMetric::WorkoutMinutes,
        GoalMetric::WorkoutCount,
        GoalMetric::CaloriesBurned,
        GoalMetric::CaloriesConsumed,
        GoalMetric::ProteinGrams,
    ];

    pub fn unit(&self) -> &'static str {
        match self {
            GoalMetric::WorkoutMinutes => "min",
            GoalMetric::WorkoutCount => "workouts",
            GoalMetric::CaloriesBurned | GoalMetric::CaloriesConsumed => "kcal",
            GoalMetric::ProteinGrams => "g",
        }
    }
}

impl fmt::Display for GoalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GoalMetric::WorkoutMinutes => "workout_minutes",
            GoalMetric::WorkoutCount => "workout_count",
            GoalMetric::CaloriesBurned => "calories_burned",
            GoalMetric::CaloriesConsumed => "calories_consumed",
            GoalMetric::ProteinGrams => "protein_grams",
        };
        f.pad(name)
    }
}

impl FromStr for GoalMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "workout_minutes" | "minutes" => Ok(GoalMetric::WorkoutMinutes),
            "workout_count" | "workouts" => Ok(GoalMetric::WorkoutCount),
            "calories_burned" | "burned" => Ok(GoalMetric::CaloriesBurned),
            "calories_consumed" | "consumed" => Ok(GoalMetric::CaloriesConsumed),
            "protein_grams" | "protein" => Ok(GoalMetric::ProteinGrams),
            _ => Err(format!(
                "Invalid goal metric '{}'. Valid options: workout_minutes, workout_count, \
                 calories_burned, calories_consumed, protein_grams",
                s
            )),
        }
    }
}

/// Input for setting a goal.
#[derive(Debug, Clone)]
pub struct GoalDetails {
    pub metric: GoalMetric,
    pub target_value: f64,
    /// Defaults to the day the goal is set.
    pub start_date: Option<NaiveDate>,
    pub deadline: NaiveDate,
}

impl GoalDetails {
    pub fn new(metric: GoalMetric, target_value: f64, deadline: NaiveDate) -> Self {
        Self {
            metric,
            target_value,
            start_date: None,
            deadline,
        }
    }

    pub fn starting(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn validate(&self, start_date: NaiveDate) -> Result<(), String> {
        if !self.target_value.is_finite() || self.target_value <= 0.0 {
            return Err(format!(
                "target value must be positive, got {}",
                self.target_value
            ));
        }
        if self.deadline < start_date {
            return Err(format!(
                "deadline {} is before start date {}",
                self.deadline, start_date
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: UserId,
    pub metric: GoalMetric,
    pub target_value: f64,
    pub start_date: NaiveDate,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(
        user_id: impl Into<UserId>,
        metric: GoalMetric,
        target_value: f64,
        start_date: NaiveDate,
        deadline: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            metric,
            target_value,
            start_date,
            deadline,
            progress: 0.0,
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// True if `date` falls inside the goal window (inclusive).
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.deadline
    }

    /// Aggregates the goal's metric over the records inside its window.
    ///
    /// Records belonging to other users are ignored.
    pub fn measure<'a>(
        &self,
        workouts: impl IntoIterator<Item = &'a Workout>,
        meals: impl IntoIterator<Item = &'a NutritionEntry>,
    ) -> f64 {
        let workouts = workouts
            .into_iter()
            .filter(|w| w.user_id == self.user_id && self.covers(w.date));
        let meals = meals
            .into_iter()
            .filter(|m| m.user_id == self.user_id && self.covers(m.date));

        match self.metric {
            GoalMetric::WorkoutMinutes => workouts.map(|w| f64::from(w.duration_minutes)).sum(),
            GoalMetric::WorkoutCount => workouts.count() as f64,
            GoalMetric::CaloriesBurned => workouts.map(|w| w.calories_burned).sum(),
            GoalMetric::CaloriesConsumed => meals.map(|m| m.nutrients.calories).sum(),
            GoalMetric::ProteinGrams => meals.map(|m| m.nutrients.protein_g).sum(),
        }
    }

    /// Recomputes `progress` and `completed`. Returns true if either changed.
    pub fn refresh<'a>(
        &mut self,
        workouts: impl IntoIterator<Item = &'a Workout>,
        meals: impl IntoIterator<Item = &'a NutritionEntry>,
    ) -> bool {
        let progress = self.measure(workouts, meals);
        let completed = progress >= self.target_value;
        let changed = progress != self.progress || completed != self.completed;
        self.progress = progress;
        self.completed = completed;
        changed
    }

    /// Progress as a percentage of the target, clamped to 0..=100.
    pub fn progress_percent(&self) -> f64 {
        percent_of(self.progress, self.target_value)
    }
}

pub(crate) fn percent_of(value: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (value / target * 100.0).clamp(0.0, 100.0)
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.completed { "done" } else { "open" };
        write!(
            f,
            "{:18} {:>8.0} / {:<8.0} {:8} {:>5.1}%  {} → {}  [{}]",
            self.metric,
            self.progress,
            self.target_value,
            self.metric.unit(),
            self.progress_percent(),
            self.start_date,
            self.deadline,
            status
        )
    }
}
