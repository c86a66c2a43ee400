//! Numbered interactive menu.
//!
//! Reads choices and field values line by line from any `BufRead`, so the
//! whole flow can be scripted. End of input exits like option 7.

use chrono::{Local, NaiveDate};
use sfms_core::{
    DateRange, FitnessError, FitnessService, GoalDetails, GoalMetric, MealDetails, MealType,
    Nutrients, Profile, UserId, WorkoutDetails, WorkoutType,
};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::display;

const MENU: &str = "\
1. Register
2. Login
3. Log workout
4. Log meal
5. Set goal
6. View report
7. Exit";

pub struct Menu<'a, R, W> {
    service: &'a mut dyn FitnessService,
    input: R,
    output: W,
    session: Option<UserId>,
    report_days: u32,
}

type ActionResult = Result<(), Box<dyn Error>>;

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(service: &'a mut dyn FitnessService, input: R, output: W, report_days: u32) -> Self {
        Self {
            service,
            input,
            output,
            session: None,
            report_days,
        }
    }

    /// Runs until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "Smart Fitness Management System")?;
        loop {
            writeln!(self.output)?;
            if let Some(user) = &self.session {
                writeln!(self.output, "Logged in as {}", user)?;
            }
            writeln!(self.output, "{}", MENU)?;

            let choice = match self.prompt("Choose an option: ") {
                Ok(choice) => choice,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
                Err(e) => return Err(e),
            };

            let outcome = match choice.as_str() {
                "1" => self.register(),
                "2" => self.login(),
                "3" => self.log_workout(),
                "4" => self.log_meal(),
                "5" => self.set_goal(),
                "6" => self.view_report(),
                "7" => {
                    writeln!(self.output, "Goodbye!")?;
                    return Ok(());
                }
                other => {
                    writeln!(self.output, "Invalid option '{}'", other)?;
                    continue;
                }
            };

            if let Err(e) = outcome {
                match e.downcast::<io::Error>() {
                    Ok(io_err) if io_err.kind() == io::ErrorKind::UnexpectedEof => {
                        writeln!(self.output)?;
                        return Ok(());
                    }
                    Ok(io_err) => return Err(*io_err),
                    Err(e) => {
                        writeln!(self.output, "Error: {}", e)?;
                        let unrecoverable = e
                            .downcast_ref::<FitnessError>()
                            .is_some_and(|err| !err.is_recoverable());
                        if unrecoverable {
                            writeln!(
                                self.output,
                                "The data file could not be written. Saving is retried on exit."
                            )?;
                        }
                    }
                }
            }
        }
    }

    fn prompt(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
        }
        Ok(line.trim().to_string())
    }

    fn ask<T>(&mut self, label: &str) -> Result<T, Box<dyn Error>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.prompt(label)?;
        raw.parse::<T>()
            .map_err(|e| format!("Invalid value '{}': {}", raw, e).into())
    }

    /// Blank input yields `None`.
    fn ask_optional<T>(&mut self, label: &str) -> Result<Option<T>, Box<dyn Error>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.prompt(label)?;
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value '{}': {}", raw, e).into())
    }

    fn ask_date(&mut self, label: &str) -> Result<NaiveDate, Box<dyn Error>> {
        Ok(self
            .ask_optional::<NaiveDate>(label)?
            .unwrap_or_else(|| Local::now().date_naive()))
    }

    fn current_user(&self) -> Result<UserId, Box<dyn Error>> {
        self.session
            .clone()
            .ok_or_else(|| "Please log in first (option 2)".into())
    }

    fn register(&mut self) -> ActionResult {
        let username = self.prompt("Username: ")?;
        let password = self.prompt("Password: ")?;
        let name = self.prompt("Name: ")?;
        let age: u32 = self.ask("Age: ")?;
        let gender = self.ask("Gender (male/female/other): ")?;
        let height: f64 = self.ask("Height (cm): ")?;
        let weight: f64 = self.ask("Weight (kg): ")?;

        let profile = Profile::new(name, age, gender, height, weight);
        let id = self.service.register_user(&username, &password, profile)?;
        writeln!(self.output, "Registered '{}'. You can now log in.", id)?;
        Ok(())
    }

    fn login(&mut self) -> ActionResult {
        let username = self.prompt("Username: ")?;
        let password = self.prompt("Password: ")?;

        match self.service.authenticate(&username, &password) {
            Ok(user) => {
                writeln!(self.output, "Welcome, {}!", user.profile.name)?;
                self.session = Some(user.username);
                Ok(())
            }
            Err(e @ FitnessError::InvalidCredentials) => {
                self.session = None;
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn log_workout(&mut self) -> ActionResult {
        let user = self.current_user()?;
        let workout_type: WorkoutType =
            self.ask(&format!("Type ({}): ", choices(&WorkoutType::ALL)))?;
        let duration: i64 = self.ask("Duration (minutes): ")?;
        let date = self.ask_date("Date (YYYY-MM-DD, blank for today): ")?;
        let calories: Option<f64> = self.ask_optional("Calories burned (blank to estimate): ")?;
        let notes = self.prompt("Notes (optional): ")?;

        let mut details = WorkoutDetails::new(workout_type, duration, date);
        if let Some(c) = calories {
            details = details.with_calories(c);
        }
        if !notes.is_empty() {
            details = details.with_notes(notes);
        }

        let workout = self.service.log_workout(&user, details)?;
        writeln!(self.output, "Logged: {}", workout)?;
        Ok(())
    }

    fn log_meal(&mut self) -> ActionResult {
        let user = self.current_user()?;
        let meal_type: MealType = self.ask(&format!("Meal ({}): ", choices(&MealType::ALL)))?;
        let description = self.prompt("Description: ")?;
        let calories: f64 = self.ask("Calories: ")?;
        let protein: f64 = self.ask_optional("Protein (g): ")?.unwrap_or(0.0);
        let carbs: f64 = self.ask_optional("Carbs (g): ")?.unwrap_or(0.0);
        let fat: f64 = self.ask_optional("Fat (g): ")?.unwrap_or(0.0);
        let date = self.ask_date("Date (YYYY-MM-DD, blank for today): ")?;

        let details = MealDetails::new(
            meal_type,
            description,
            Nutrients::new(calories, protein, carbs, fat),
            date,
        );
        let entry = self.service.log_meal(&user, details)?;
        writeln!(self.output, "Logged: {}", entry)?;
        Ok(())
    }

    fn set_goal(&mut self) -> ActionResult {
        let user = self.current_user()?;
        let metric: GoalMetric = self.ask(&format!("Metric ({}): ", choices(&GoalMetric::ALL)))?;
        let target: f64 = self.ask("Target: ")?;
        let deadline: NaiveDate = self.ask("Deadline (YYYY-MM-DD): ")?;
        let start: Option<NaiveDate> =
            self.ask_optional("Start date (YYYY-MM-DD, blank for today): ")?;

        let mut details = GoalDetails::new(metric, target, deadline);
        if let Some(s) = start {
            details = details.starting(s);
        }
        let goal = self.service.set_goal(&user, details)?;
        writeln!(self.output, "Goal set: {}", goal)?;
        Ok(())
    }

    fn view_report(&mut self) -> ActionResult {
        let user = self.current_user()?;
        let label = format!("Days to include (blank for {}): ", self.report_days);
        let days: u32 = self.ask_optional(&label)?.unwrap_or(self.report_days);
        if days == 0 {
            return Err("Days must be at least 1".into());
        }

        let range = DateRange::last_days(Local::now().date_naive(), days)?;
        let report = self.service.compute_report(&user, range)?;
        display::write_report(&mut self.output, &report, true)?;
        Ok(())
    }
}

fn choices<T: std::fmt::Display>(options: &[T]) -> String {
    options
        .iter()
        .map(|o| o.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
