//! SFMS Core Library
//!
//! Users, workouts, meals and goals kept in a single JSON data file, plus
//! the reports computed over them. Front ends drive everything through
//! [`FitnessService`], implemented by [`DataManager`].

pub mod error;
pub mod manager;
pub mod models;
pub mod password;
pub mod report;
pub mod service;
pub mod store;

pub use error::{FitnessError, Result};
pub use manager::DataManager;
pub use models::{
    Gender, Goal, GoalDetails, GoalMetric, MealDetails, MealType, Nutrients, NutritionEntry,
    Profile, User, UserId, Workout, WorkoutDetails, WorkoutType,
};
pub use report::{DailyPoint, DateRange, GoalProgress, Report};
pub use service::FitnessService;
pub use store::{Collections, RecordStore, StorageError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
