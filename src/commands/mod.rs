mod config_cmd;
mod goal;
mod meal;
mod report;
mod user;
mod workout;

pub use config_cmd::ConfigCommand;
pub use goal::GoalCommand;
pub use meal::MealCommand;
pub use report::ReportCommand;
pub use user::UserCommand;
pub use workout::WorkoutCommand;

use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use sfms_core::{DateRange, FitnessService, User};
use std::io::{self, Write};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Who a command acts for.
#[derive(Args)]
pub struct Credentials {
    /// Username
    #[arg(long, short)]
    pub user: String,

    /// Password (prompted for when omitted)
    #[arg(long, env = "SFMS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl Credentials {
    pub fn password(&self) -> io::Result<String> {
        match &self.password {
            Some(p) => Ok(p.clone()),
            None => prompt("Password: "),
        }
    }

    /// Authenticates against `service`, prompting for the password if needed.
    pub fn login(
        &self,
        service: &mut dyn FitnessService,
    ) -> Result<User, Box<dyn std::error::Error>> {
        let password = self.password()?;
        Ok(service.authenticate(&self.user, &password)?)
    }
}

/// Reads one trimmed line from stdin after printing `label`.
pub fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "No input available",
        ));
    }
    Ok(input.trim().to_string())
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", s))
}

/// `--date` argument, defaulting to today.
pub fn date_or_today(date: &Option<String>) -> Result<NaiveDate, String> {
    match date {
        Some(d) => parse_date(d),
        None => Ok(Local::now().date_naive()),
    }
}

/// `--from`/`--to` arguments. `to` defaults to today, `from` to `days` days ending on `to`.
pub fn resolve_range(
    from: &Option<String>,
    to: &Option<String>,
    days: u32,
) -> Result<DateRange, String> {
    let to_date = date_or_today(to)?;
    match from {
        Some(d) => DateRange::new(parse_date(d)?, to_date),
        None => DateRange::last_days(to_date, days),
    }
}
