use clap::{Args, Subcommand};
use sfms_core::{FitnessService, WorkoutDetails, WorkoutType};

use super::{date_or_today, resolve_range, Credentials, OutputFormat};
use crate::config::Config;
use crate::display;

#[derive(Args)]
pub struct WorkoutCommand {
    #[command(subcommand)]
    pub command: WorkoutSubcommand,
}

#[derive(Subcommand)]
pub enum WorkoutSubcommand {
    /// Log a workout
    Log {
        #[command(flatten)]
        credentials: Credentials,

        /// Workout type (running, cycling, swimming, walking, strength, yoga, hiit, other)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        workout_type: String,

        /// Duration in minutes
        #[arg(long, short = 'm', allow_negative_numbers = true)]
        duration: i64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Calories burned; estimated from type, duration and weight when omitted
        #[arg(long)]
        calories: Option<f64>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List logged workouts
    List {
        #[command(flatten)]
        credentials: Credentials,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Start date (YYYY-MM-DD), defaults to the configured report window
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        to: Option<String>,
    },
}

impl WorkoutCommand {
    pub fn run(
        self,
        service: &mut dyn FitnessService,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match self.command {
            WorkoutSubcommand::Log {
                credentials,
                workout_type,
                duration,
                date,
                calories,
                notes,
            } => {
                let workout_type: WorkoutType = workout_type.parse().map_err(|e: String| e)?;
                let date = date_or_today(&date)?;
                let user = credentials.login(service)?;

                let mut details = WorkoutDetails::new(workout_type, duration, date);
                if let Some(c) = calories {
                    details = details.with_calories(c);
                }
                if let Some(n) = notes {
                    details = details.with_notes(n);
                }

                let workout = service.log_workout(&user.username, details)?;
                println!("Logged workout:");
                println!();
                println!("  {}", workout);
                println!("  ID: {}", workout.id);
                Ok(())
            }

            WorkoutSubcommand::List {
                credentials,
                format,
                from,
                to,
            } => {
                let range = resolve_range(&from, &to, config.report_days.value)?;
                let user = credentials.login(service)?;
                let workouts = service.workouts_for(&user.username, range)?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&workouts)?);
                    }
                    OutputFormat::Text => {
                        if workouts.is_empty() {
                            println!("No workouts found for {}", range);
                            return Ok(());
                        }
                        display::write_workouts(&mut std::io::stdout(), &workouts)?;
                    }
                }
                Ok(())
            }
        }
    }
}
