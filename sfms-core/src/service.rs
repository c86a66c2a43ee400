//! The operations every front end drives.

use crate::error::Result;
use crate::models::{
    Goal, GoalDetails, MealDetails, NutritionEntry, Profile, User, UserId, Workout,
    WorkoutDetails,
};
use crate::report::{DateRange, Report};

/// Capability set shared by the command CLI and the interactive menu.
///
/// Mutating operations are durable when they return `Ok`: the change has
/// been written to the data file.
pub trait FitnessService {
    /// Creates a user. Fails with `DuplicateUser` if the username is taken.
    fn register_user(&mut self, username: &str, password: &str, profile: Profile)
        -> Result<UserId>;

    /// Checks credentials and returns the user. Fails with `InvalidCredentials`.
    fn authenticate(&mut self, username: &str, password: &str) -> Result<User>;

    fn get_user(&self, user_id: &str) -> Result<User>;

    fn update_profile(&mut self, user_id: &str, profile: Profile) -> Result<User>;

    fn change_password(&mut self, user_id: &str, current: &str, new: &str) -> Result<()>;

    /// Removes the user together with all of their records.
    fn delete_user(&mut self, user_id: &str) -> Result<()>;

    fn log_workout(&mut self, user_id: &str, details: WorkoutDetails) -> Result<Workout>;

    fn log_meal(&mut self, user_id: &str, details: MealDetails) -> Result<NutritionEntry>;

    fn set_goal(&mut self, user_id: &str, details: GoalDetails) -> Result<Goal>;

    /// Workouts dated inside `range`, oldest first.
    fn workouts_for(&self, user_id: &str, range: DateRange) -> Result<Vec<Workout>>;

    /// Meals dated inside `range`, oldest first.
    fn meals_for(&self, user_id: &str, range: DateRange) -> Result<Vec<NutritionEntry>>;

    /// All goals of the user, by deadline.
    fn goals_for(&self, user_id: &str) -> Result<Vec<Goal>>;

    /// Aggregates the user's records inside `range`. Never mutates.
    fn compute_report(&self, user_id: &str, range: DateRange) -> Result<Report>;
}
