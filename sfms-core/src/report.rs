//! Aggregated views over a user's logged records.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

use crate::models::{
    percent_of, Goal, GoalMetric, Nutrients, NutritionEntry, UserId, Workout, WorkoutType,
};

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if start > end {
            return Err(format!("range start {} is after end {}", start, end));
        }
        Ok(Self { start, end })
    }

    /// The `days` days ending on `end`, inclusive. Fails when the window
    /// reaches before the earliest representable date.
    pub fn last_days(end: NaiveDate, days: u32) -> Result<Self, String> {
        let span = u64::from(days.max(1)) - 1;
        let start = end
            .checked_sub_days(Days::new(span))
            .ok_or_else(|| format!("a {}-day window ending {} is out of range", days, end))?;
        Ok(Self { start, end })
    }

    /// Every date since the beginning of the calendar. Used for full listings.
    pub fn all() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeBreakdown {
    pub workout_type: WorkoutType,
    pub count: usize,
    pub minutes: u64,
    pub calories: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub count: usize,
    pub total_minutes: u64,
    pub average_minutes: f64,
    pub total_calories: f64,
    pub by_type: Vec<TypeBreakdown>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NutritionSummary {
    pub entries: usize,
    pub totals: Nutrients,
    /// Averaged over days with at least one entry.
    pub average_daily_calories: f64,
}

/// Activity on one day of the range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub minutes: u64,
    pub calories_burned: f64,
    pub calories_consumed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    pub metric: GoalMetric,
    pub target_value: f64,
    pub progress: f64,
    pub percent: f64,
    pub deadline: NaiveDate,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub user_id: UserId,
    pub range: DateRange,
    pub workouts: WorkoutSummary,
    pub nutrition: NutritionSummary,
    pub daily: Vec<DailyPoint>,
    pub goals: Vec<GoalProgress>,
}

impl DailyPoint {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            minutes: 0,
            calories_burned: 0.0,
            calories_consumed: 0.0,
        }
    }
}

impl Report {
    /// Builds a report for `user_id`.
    ///
    /// Workout and nutrition figures only count records dated inside `range`;
    /// goal progress is measured over each goal's own window.
    pub fn compute<'a>(
        user_id: &str,
        range: DateRange,
        workouts: impl IntoIterator<Item = &'a Workout> + Clone,
        meals: impl IntoIterator<Item = &'a NutritionEntry> + Clone,
        goals: impl IntoIterator<Item = &'a Goal>,
    ) -> Self {
        let in_range_workouts: Vec<&Workout> = workouts
            .clone()
            .into_iter()
            .filter(|w| w.user_id == user_id && range.contains(w.date))
            .collect();
        let in_range_meals: Vec<&NutritionEntry> = meals
            .clone()
            .into_iter()
            .filter(|m| m.user_id == user_id && range.contains(m.date))
            .collect();

        let goals = goals
            .into_iter()
            .filter(|g| g.user_id == user_id)
            .map(|g| {
                let progress = g.measure(workouts.clone(), meals.clone());
                GoalProgress {
                    goal_id: g.id,
                    metric: g.metric,
                    target_value: g.target_value,
                    progress,
                    percent: percent_of(progress, g.target_value),
                    deadline: g.deadline,
                    completed: progress >= g.target_value,
                }
            })
            .collect();

        Self {
            user_id: user_id.to_string(),
            range,
            workouts: summarize_workouts(&in_range_workouts),
            nutrition: summarize_nutrition(&in_range_meals),
            daily: daily_series(&in_range_workouts, &in_range_meals),
            goals,
        }
    }
}

fn summarize_workouts(workouts: &[&Workout]) -> WorkoutSummary {
    let count = workouts.len();
    let total_minutes: u64 = workouts.iter().map(|w| u64::from(w.duration_minutes)).sum();
    let total_calories = workouts.iter().map(|w| w.calories_burned).sum();
    let average_minutes = if count == 0 {
        0.0
    } else {
        total_minutes as f64 / count as f64
    };

    let mut by_type: BTreeMap<WorkoutType, TypeBreakdown> = BTreeMap::new();
    for workout in workouts {
        let entry = by_type
            .entry(workout.workout_type)
            .or_insert_with(|| TypeBreakdown {
                workout_type: workout.workout_type,
                count: 0,
                minutes: 0,
                calories: 0.0,
            });
        entry.count += 1;
        entry.minutes += u64::from(workout.duration_minutes);
        entry.calories += workout.calories_burned;
    }

    WorkoutSummary {
        count,
        total_minutes,
        average_minutes,
        total_calories,
        by_type: by_type.into_values().collect(),
    }
}

fn summarize_nutrition(meals: &[&NutritionEntry]) -> NutritionSummary {
    let mut totals = Nutrients::default();
    let mut days = BTreeSet::new();
    for meal in meals {
        totals += meal.nutrients;
        days.insert(meal.date);
    }
    let average_daily_calories = if days.is_empty() {
        0.0
    } else {
        totals.calories / days.len() as f64
    };

    NutritionSummary {
        entries: meals.len(),
        totals,
        average_daily_calories,
    }
}

fn daily_series(workouts: &[&Workout], meals: &[&NutritionEntry]) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, DailyPoint> = BTreeMap::new();
    for workout in workouts {
        let point = days
            .entry(workout.date)
            .or_insert_with(|| DailyPoint::empty(workout.date));
        point.minutes += u64::from(workout.duration_minutes);
        point.calories_burned += workout.calories_burned;
    }
    for meal in meals {
        let point = days
            .entry(meal.date)
            .or_insert_with(|| DailyPoint::empty(meal.date));
        point.calories_consumed += meal.nutrients.calories;
    }
    days.into_values().collect()
}
