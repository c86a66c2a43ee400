mod goal;
mod meal_type;
mod nutrition;
mod user;
mod workout;

pub(crate) use goal::percent_of;
pub use goal::{Goal, GoalDetails, GoalMetric};
pub use meal_type::MealType;
pub use nutrition::{MealDetails, Nutrients, NutritionEntry};
pub use user::{Gender, Profile, User, UserId};
pub use workout::{Workout, WorkoutDetails, WorkoutType};
