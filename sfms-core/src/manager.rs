//! Business rules over the record store.

use chrono::Local;
use std::path::PathBuf;

use crate::error::{FitnessError, Result};
use crate::models::{
    Goal, GoalDetails, MealDetails, NutritionEntry, Profile, User, UserId, Workout,
    WorkoutDetails,
};
use crate::password;
use crate::report::{DateRange, Report};
use crate::service::FitnessService;
use crate::store::{Collections, RecordStore};

/// Owns the record store and persists after every mutation.
#[derive(Debug)]
pub struct DataManager {
    store: RecordStore,
    /// Set when a save failed and memory is ahead of disk.
    dirty: bool,
}

impl DataManager {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            dirty: false,
        }
    }

    /// Loads the data file at `path`. A malformed file is a `Storage` error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(RecordStore::load(path)?))
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// True if an earlier save failed and the data file is behind.
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Flushes anything a failed save left behind and releases the store.
    pub fn close(mut self) -> Result<()> {
        if self.dirty {
            self.persist()?;
            tracing::info!("Saved pending changes on close");
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        match self.store.save() {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                tracing::warn!(error = %e, "Change kept in memory but not saved");
                Err(FitnessError::Unsaved(e))
            }
        }
    }

    fn require_user(&self, user_id: &str) -> Result<&User> {
        self.store.data().users.get(user_id).ok_or_else(|| {
            tracing::warn!(user = user_id, "Rejected operation for unknown user");
            FitnessError::UnknownUser(user_id.to_string())
        })
    }

    /// Re-derives progress for every goal of `user_id`.
    fn refresh_goals(&mut self, user_id: &str) {
        let Collections {
            workouts,
            nutrition,
            goals,
            ..
        } = self.store.data_mut();
        for goal in goals.values_mut().filter(|g| g.user_id == user_id) {
            let was_completed = goal.completed;
            goal.refresh(workouts.values(), nutrition.values());
            if goal.completed && !was_completed {
                tracing::info!(user = user_id, goal = %goal.id, metric = %goal.metric, "Goal completed");
            }
        }
    }
}

fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(FitnessError::Validation(
            "username must not be empty".to_string(),
        ));
    }
    if username.trim() != username || username.chars().any(char::is_whitespace) {
        return Err(FitnessError::Validation(format!(
            "username '{}' must not contain whitespace",
            username
        )));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(FitnessError::Validation(
            "password must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl FitnessService for DataManager {
    fn register_user(
        &mut self,
        username: &str,
        password: &str,
        profile: Profile,
    ) -> Result<UserId> {
        validate_username(username)?;
        if self.store.data().users.contains_key(username) {
            tracing::warn!(user = username, "Registration rejected: username exists");
            return Err(FitnessError::DuplicateUser(username.to_string()));
        }
        validate_password(password)?;
        profile.validate().map_err(FitnessError::Validation)?;

        let user = User::new(username, password::hash(password), profile);
        let id = user.username.clone();
        self.store.data_mut().users.insert(id.clone(), user);
        self.persist()?;

        tracing::info!(user = %id, "Registered user");
        Ok(id)
    }

    fn authenticate(&mut self, username: &str, password: &str) -> Result<User> {
        let Some(user) = self.store.data().users.get(username) else {
            tracing::warn!(user = username, "Authentication failed: unknown user");
            return Err(FitnessError::InvalidCredentials);
        };
        if !password::verify(password, &user.password_hash) {
            tracing::warn!(user = username, "Authentication failed: wrong password");
            return Err(FitnessError::InvalidCredentials);
        }

        if password::needs_upgrade(&user.password_hash) {
            if let Some(user) = self.store.data_mut().users.get_mut(username) {
                user.password_hash = password::hash(password);
            }
            match self.persist() {
                Ok(()) => tracing::info!(user = username, "Upgraded stored password hash"),
                Err(e) => tracing::warn!(user = username, error = %e, "Password upgrade not saved"),
            }
        }

        tracing::info!(user = username, "User authenticated");
        self.get_user(username)
    }

    fn get_user(&self, user_id: &str) -> Result<User> {
        self.require_user(user_id).cloned()
    }

    fn update_profile(&mut self, user_id: &str, profile: Profile) -> Result<User> {
        self.require_user(user_id)?;
        profile.validate().map_err(FitnessError::Validation)?;

        if let Some(user) = self.store.data_mut().users.get_mut(user_id) {
            user.profile = profile;
        }
        self.persist()?;

        tracing::info!(user = user_id, "Updated profile");
        self.get_user(user_id)
    }

    fn change_password(&mut self, user_id: &str, current: &str, new: &str) -> Result<()> {
        let user = self.require_user(user_id)?;
        if !password::verify(current, &user.password_hash) {
            tracing::warn!(user = user_id, "Password change rejected");
            return Err(FitnessError::InvalidCredentials);
        }
        validate_password(new)?;

        if let Some(user) = self.store.data_mut().users.get_mut(user_id) {
            user.password_hash = password::hash(new);
        }
        self.persist()?;

        tracing::info!(user = user_id, "Changed password");
        Ok(())
    }

    fn delete_user(&mut self, user_id: &str) -> Result<()> {
        self.require_user(user_id)?;

        let data = self.store.data_mut();
        data.users.shift_remove(user_id);
        data.workouts.retain(|_, w| w.user_id != user_id);
        data.nutrition.retain(|_, m| m.user_id != user_id);
        data.goals.retain(|_, g| g.user_id != user_id);
        self.persist()?;

        tracing::info!(user = user_id, "Deleted user and their records");
        Ok(())
    }

    fn log_workout(&mut self, user_id: &str, details: WorkoutDetails) -> Result<Workout> {
        let weight_kg = self.require_user(user_id)?.profile.weight_kg;
        let minutes = details.validate().map_err(FitnessError::Validation)?;

        let calories = details
            .calories_burned
            .unwrap_or_else(|| details.workout_type.estimate_calories(weight_kg, minutes));
        let mut workout = Workout::new(
            user_id,
            details.workout_type,
            minutes,
            details.date,
            calories,
        );
        if let Some(notes) = details.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            workout = workout.with_notes(notes);
        }

        self.store
            .data_mut()
            .workouts
            .insert(workout.id, workout.clone());
        self.refresh_goals(user_id);
        self.persist()?;

        tracing::info!(
            user = user_id,
            workout_type = %workout.workout_type,
            minutes,
            "Logged workout"
        );
        Ok(workout)
    }

    fn log_meal(&mut self, user_id: &str, details: MealDetails) -> Result<NutritionEntry> {
        self.require_user(user_id)?;
        details.validate().map_err(FitnessError::Validation)?;

        let entry = NutritionEntry::new(user_id, details);
        self.store
            .data_mut()
            .nutrition
            .insert(entry.id, entry.clone());
        self.refresh_goals(user_id);
        self.persist()?;

        tracing::info!(user = user_id, meal_type = %entry.meal_type, "Logged meal");
        Ok(entry)
    }

    fn set_goal(&mut self, user_id: &str, details: GoalDetails) -> Result<Goal> {
        self.require_user(user_id)?;
        let start_date = details
            .start_date
            .unwrap_or_else(|| Local::now().date_naive());
        details
            .validate(start_date)
            .map_err(FitnessError::Validation)?;

        let mut goal = Goal::new(
            user_id,
            details.metric,
            details.target_value,
            start_date,
            details.deadline,
        );
        let data = self.store.data();
        goal.refresh(data.workouts.values(), data.nutrition.values());

        self.store.data_mut().goals.insert(goal.id, goal.clone());
        self.persist()?;

        tracing::info!(user = user_id, metric = %goal.metric, target = goal.target_value, "Set goal");
        Ok(goal)
    }

    fn workouts_for(&self, user_id: &str, range: DateRange) -> Result<Vec<Workout>> {
        self.require_user(user_id)?;
        let mut workouts: Vec<Workout> = self
            .store
            .data()
            .workouts
            .values()
            .filter(|w| w.user_id == user_id && range.contains(w.date))
            .cloned()
            .collect();
        workouts.sort_by_key(|w| w.date);
        Ok(workouts)
    }

    fn meals_for(&self, user_id: &str, range: DateRange) -> Result<Vec<NutritionEntry>> {
        self.require_user(user_id)?;
        let mut meals: Vec<NutritionEntry> = self
            .store
            .data()
            .nutrition
            .values()
            .filter(|m| m.user_id == user_id && range.contains(m.date))
            .cloned()
            .collect();
        meals.sort_by_key(|m| (m.date, m.meal_type));
        Ok(meals)
    }

    fn goals_for(&self, user_id: &str) -> Result<Vec<Goal>> {
        self.require_user(user_id)?;
        let mut goals: Vec<Goal> = self
            .store
            .data()
            .goals
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        goals.sort_by_key(|g| g.deadline);
        Ok(goals)
    }

    fn compute_report(&self, user_id: &str, range: DateRange) -> Result<Report> {
        self.require_user(user_id)?;
        if range.start > range.end {
            return Err(FitnessError::Validation(format!(
                "range start {} is after end {}",
                range.start, range.end
            )));
        }

        let data = self.store.data();
        Ok(Report::compute(
            user_id,
            range,
            data.workouts.values(),
            data.nutrition.values(),
            data.goals.values(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, GoalMetric, MealType, Nutrients, WorkoutType};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn test_manager() -> (DataManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let manager = DataManager::open(temp_dir.path().join("fitness_data.json")).unwrap();
        (manager, temp_dir)
    }

    fn profile() -> Profile {
        Profile::new("Test User", 25, Gender::Male, 175.0, 70.0)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, d).unwrap()
    }

    fn october() -> DateRange {
        DateRange::new(day(1), day(31)).unwrap()
    }

    fn registered() -> (DataManager, TempDir) {
        let (mut manager, temp) = test_manager();
        manager
            .register_user("testuser", "password", profile())
            .unwrap();
        (manager, temp)
    }

    #[test]
    fn test_register_persists_hashed_password() {
        let (manager, _temp) = registered();

        let text = fs::read_to_string(manager.store().path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["users"][0]["username"], "testuser");
        assert_eq!(value["users"][0]["profile"]["name"], "Test User");
        assert_ne!(value["users"][0]["password_hash"], "password");
    }

    #[test]
    fn test_register_duplicate_user_keeps_original() {
        let (mut manager, _temp) = registered();

        let other = Profile::new("Another User", 30, Gender::Female, 165.0, 60.0);
        let err = manager
            .register_user("testuser", "different", other)
            .unwrap_err();

        assert!(matches!(err, FitnessError::DuplicateUser(ref name) if name == "testuser"));
        let user = manager.get_user("testuser").unwrap();
        assert_eq!(user.profile.name, "Test User");
        assert!(manager.authenticate("testuser", "password").is_ok());
    }

    #[test]
    fn test_register_validation() {
        let (mut manager, _temp) = test_manager();

        let err = manager.register_user("", "pw", profile()).unwrap_err();
        assert!(matches!(err, FitnessError::Validation(_)));

        let err = manager.register_user("two words", "pw", profile()).unwrap_err();
        assert!(matches!(err, FitnessError::Validation(_)));

        let err = manager.register_user("someone", "", profile()).unwrap_err();
        assert!(matches!(err, FitnessError::Validation(_)));

        let mut bad = profile();
        bad.age = 200;
        let err = manager.register_user("someone", "pw", bad).unwrap_err();
        assert!(matches!(err, FitnessError::Validation(_)));

        assert!(manager.store().data().users.is_empty());
        assert!(!manager.store().path().exists());
    }

    #[test]
    fn test_authenticate() {
        let (mut manager, _temp) = registered();

        let user = manager.authenticate("testuser", "password").unwrap();
        assert_eq!(user.username, "testuser");

        let err = manager.authenticate("testuser", "wrongpassword").unwrap_err();
        assert!(matches!(err, FitnessError::InvalidCredentials));

        let err = manager.authenticate("nobody", "password").unwrap_err();
        assert!(matches!(err, FitnessError::InvalidCredentials));
    }

    #[test]
    fn test_authenticate_rejects_single_character_mutations() {
        let (mut manager, _temp) = registered();
        let password = "password";
        for i in 0..password.len() {
            let mut chars: Vec<char> = password.chars().collect();
            chars[i] = if chars[i] == 'z' { 'y' } else { 'z' };
            let mutated: String = chars.into_iter().collect();
            let err = manager.authenticate("testuser", &mutated).unwrap_err();
            assert!(matches!(err, FitnessError::InvalidCredentials));
        }
    }

    #[test]
    fn test_authenticate_upgrades_legacy_hash() {
        let (mut manager, _temp) = registered();
        // Simulate a file written by an older version: unsalted SHA-256 hex.
        manager
            .store
            .data_mut()
            .users
            .get_mut("testuser")
            .unwrap()
            .password_hash =
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8".to_string();

        manager.authenticate("testuser", "password").unwrap();

        let reloaded = DataManager::open(manager.store().path()).unwrap();
        let stored = &reloaded.get_user("testuser").unwrap().password_hash;
        assert!(stored.starts_with("sha256$"));
        assert!(password::verify("password", stored));
    }

    #[test]
    fn test_log_workout_unknown_user_does_not_mutate() {
        let (mut manager, _temp) = registered();
        let before = manager.store().data().clone();

        let details = WorkoutDetails::new(WorkoutType::Running, 30, day(15));
        let err = manager.log_workout("ghost", details).unwrap_err();

        assert!(matches!(err, FitnessError::UnknownUser(ref id) if id == "ghost"));
        assert_eq!(manager.store().data(), &before);
    }

    #[test]
    fn test_log_workout_rejects_negative_duration() {
        let (mut manager, _temp) = registered();

        let details = WorkoutDetails::new(WorkoutType::Running, -30, day(15));
        let err = manager.log_workout("testuser", details).unwrap_err();

        assert!(matches!(err, FitnessError::Validation(_)));
        assert!(manager.store().data().workouts.is_empty());
    }

    #[test]
    fn test_log_workout_estimates_calories_and_persists() {
        let (mut manager, _temp) = registered();

        let details =
            WorkoutDetails::new(WorkoutType::Running, 30, day(15)).with_notes("  Morning run ");
        let workout = manager.log_workout("testuser", details).unwrap();

        assert_eq!(workout.calories_burned, 343.0);
        assert_eq!(workout.notes.as_deref(), Some("Morning run"));

        let reloaded = DataManager::open(manager.store().path()).unwrap();
        assert_eq!(reloaded.store().data().workouts.get(&workout.id), Some(&workout));
    }

    #[test]
    fn test_log_workout_uses_explicit_calories() {
        let (mut manager, _temp) = registered();

        let details = WorkoutDetails::new(WorkoutType::Other, 30, day(15)).with_calories(123.0);
        let workout = manager.log_workout("testuser", details).unwrap();

        assert_eq!(workout.calories_burned, 123.0);
    }

    #[test]
    fn test_log_meal() {
        let (mut manager, _temp) = registered();

        let details = MealDetails::new(
            MealType::Breakfast,
            "Oatmeal with fruit",
            Nutrients::new(350.0, 12.0, 45.0, 10.0),
            day(15),
        );
        let entry = manager.log_meal("testuser", details).unwrap();
        assert_eq!(entry.user_id, "testuser");

        let bad = MealDetails::new(
            MealType::Lunch,
            "Mystery",
            Nutrients::new(-5.0, 0.0, 0.0, 0.0),
            day(15),
        );
        let err = manager.log_meal("testuser", bad).unwrap_err();
        assert!(matches!(err, FitnessError::Validation(_)));

        let meals = manager.meals_for("testuser", october()).unwrap();
        assert_eq!(meals.len(), 1);
    }

    #[test]
    fn test_set_goal_unknown_user() {
        let (mut manager, _temp) = registered();
        let details = GoalDetails::new(GoalMetric::WorkoutMinutes, 100.0, day(31)).starting(day(1));
        let err = manager.set_goal("ghost", details).unwrap_err();
        assert!(matches!(err, FitnessError::UnknownUser(_)));
        assert!(manager.store().data().goals.is_empty());
    }

    #[test]
    fn test_goal_progress_follows_logged_workouts() {
        let (mut manager, _temp) = registered();

        manager
            .log_workout("testuser", WorkoutDetails::new(WorkoutType::Yoga, 15, day(2)))
            .unwrap();
        let details = GoalDetails::new(GoalMetric::WorkoutMinutes, 100.0, day(31)).starting(day(1));
        let goal = manager.set_goal("testuser", details).unwrap();
        assert_eq!(goal.progress, 15.0);

        manager
            .log_workout("testuser", WorkoutDetails::new(WorkoutType::Yoga, 25, day(3)))
            .unwrap();

        let goals = manager.goals_for("testuser").unwrap();
        assert_eq!(goals[0].progress, 40.0);
        assert_eq!(goals[0].progress_percent(), 40.0);
        assert!(!goals[0].completed);

        manager
            .log_workout("testuser", WorkoutDetails::new(WorkoutType::Yoga, 60, day(4)))
            .unwrap();
        let goals = manager.goals_for("testuser").unwrap();
        assert!(goals[0].completed);
    }

    #[test]
    fn test_compute_report() {
        let (mut manager, _temp) = registered();
        for (d, minutes) in [(1, 20), (2, 30), (3, 40)] {
            manager
                .log_workout(
                    "testuser",
                    WorkoutDetails::new(WorkoutType::Cycling, minutes, day(d)),
                )
                .unwrap();
        }
        let before = manager.store().data().clone();

        let report = manager.compute_report("testuser", october()).unwrap();

        assert_eq!(report.workouts.total_minutes, 90);
        assert_eq!(report.workouts.average_minutes, 30.0);
        assert_eq!(manager.store().data(), &before);
    }

    #[test]
    fn test_compute_report_rejects_inverted_range() {
        let (manager, _temp) = registered();
        let range = DateRange {
            start: day(10),
            end: day(1),
        };
        let err = manager.compute_report("testuser", range).unwrap_err();
        assert!(matches!(err, FitnessError::Validation(_)));
    }

    #[test]
    fn test_listings_are_chronological() {
        let (mut manager, _temp) = registered();
        for d in [5, 1, 3] {
            manager
                .log_workout("testuser", WorkoutDetails::new(WorkoutType::Walking, 10, day(d)))
                .unwrap();
        }
        let dates: Vec<_> = manager
            .workouts_for("testuser", october())
            .unwrap()
            .into_iter()
            .map(|w| w.date)
            .collect();
        assert_eq!(dates, vec![day(1), day(3), day(5)]);

        let range = DateRange::new(day(2), day(4)).unwrap();
        assert_eq!(manager.workouts_for("testuser", range).unwrap().len(), 1);
    }

    #[test]
    fn test_update_profile_and_change_password() {
        let (mut manager, _temp) = registered();

        let mut updated = profile();
        updated.name = "Updated Name".to_string();
        updated.age = 26;
        let user = manager.update_profile("testuser", updated).unwrap();
        assert_eq!(user.profile.age, 26);

        let err = manager
            .change_password("testuser", "wrong", "newpass")
            .unwrap_err();
        assert!(matches!(err, FitnessError::InvalidCredentials));

        manager
            .change_password("testuser", "password", "newpass")
            .unwrap();
        assert!(manager.authenticate("testuser", "password").is_err());
        assert!(manager.authenticate("testuser", "newpass").is_ok());

        let reloaded = DataManager::open(manager.store().path()).unwrap();
        assert_eq!(
            reloaded.get_user("testuser").unwrap().profile.name,
            "Updated Name"
        );
    }

    #[test]
    fn test_delete_user_cascades() {
        let (mut manager, _temp) = registered();
        manager
            .register_user("other", "password", profile())
            .unwrap();
        manager
            .log_workout("testuser", WorkoutDetails::new(WorkoutType::Running, 30, day(1)))
            .unwrap();
        manager
            .log_workout("other", WorkoutDetails::new(WorkoutType::Running, 30, day(1)))
            .unwrap();
        manager
            .set_goal(
                "testuser",
                GoalDetails::new(GoalMetric::WorkoutCount, 5.0, day(31)).starting(day(1)),
            )
            .unwrap();

        manager.delete_user("testuser").unwrap();

        let data = manager.store().data();
        assert!(!data.users.contains_key("testuser"));
        assert!(data.workouts.values().all(|w| w.user_id == "other"));
        assert_eq!(data.workouts.len(), 1);
        assert!(data.goals.is_empty());

        let err = manager.delete_user("testuser").unwrap_err();
        assert!(matches!(err, FitnessError::UnknownUser(_)));
    }

    #[test]
    fn test_open_malformed_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fitness_data.json");
        fs::write(&path, "[1, 2").unwrap();

        let err = DataManager::open(&path).unwrap_err();
        assert!(matches!(err, FitnessError::Storage(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_open_rejects_records_without_owner() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fitness_data.json");
        let meal = NutritionEntry::new(
            "ghost",
            MealDetails::new(
                MealType::Snack,
                "Apple",
                Nutrients::new(95.0, 0.5, 25.0, 0.3),
                NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
            ),
        );
        let doc = serde_json::json!({ "nutrition": [meal] });
        fs::write(&path, doc.to_string()).unwrap();

        let err = DataManager::open(&path).unwrap_err();
        assert!(matches!(err, FitnessError::Storage(_)));
        assert!(err.to_string().contains("unknown user 'ghost'"));
    }

    #[test]
    fn test_failed_save_is_reported_as_unsaved() {
        let temp_dir = TempDir::new().unwrap();
        let parent = temp_dir.path().join("data");
        let mut manager = DataManager::open(parent.join("fitness_data.json")).unwrap();
        // The data file's parent becomes a regular file, so every save fails.
        fs::write(&parent, "").unwrap();

        let err = manager
            .register_user("testuser", "password", profile())
            .unwrap_err();

        assert!(matches!(err, FitnessError::Unsaved(_)));
        assert!(err.to_string().contains("not saved"));
        assert!(manager.has_unsaved_changes());
        // Memory is ahead of disk.
        assert!(manager.get_user("testuser").is_ok());
        assert!(manager.close().is_err());
    }

    #[test]
    fn test_close_without_changes_writes_nothing() {
        let (manager, temp) = test_manager();
        manager.close().unwrap();
        assert!(!temp.path().join("fitness_data.json").exists());
    }
}
