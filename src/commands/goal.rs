use clap::{Args, Subcommand};
use sfms_core::{FitnessService, GoalDetails, GoalMetric};

use super::{parse_date, Credentials, OutputFormat};
use crate::display;

#[derive(Args)]
pub struct GoalCommand {
    #[command(subcommand)]
    pub command: GoalSubcommand,
}

#[derive(Subcommand)]
pub enum GoalSubcommand {
    /// Set a new goal
    Set {
        #[command(flatten)]
        credentials: Credentials,

        /// What to measure (workout_minutes, workout_count, calories_burned,
        /// calories_consumed, protein_grams)
        #[arg(long)]
        metric: String,

        /// Target value in the metric's unit
        #[arg(long, allow_negative_numbers = true)]
        target: f64,

        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: String,

        /// First day that counts toward the goal (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<String>,
    },

    /// List goals and their progress
    List {
        #[command(flatten)]
        credentials: Credentials,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl GoalCommand {
    pub fn run(self, service: &mut dyn FitnessService) -> Result<(), Box<dyn std::error::Error>> {
        match self.command {
            GoalSubcommand::Set {
                credentials,
                metric,
                target,
                deadline,
                start,
            } => {
                let metric: GoalMetric = metric.parse().map_err(|e: String| e)?;
                let mut details = GoalDetails::new(metric, target, parse_date(&deadline)?);
                if let Some(s) = start {
                    details = details.starting(parse_date(&s)?);
                }
                let user = credentials.login(service)?;

                let goal = service.set_goal(&user.username, details)?;
                println!("Set goal:");
                println!();
                println!("  {}", goal);
                println!("  ID: {}", goal.id);
                Ok(())
            }

            GoalSubcommand::List {
                credentials,
                format,
            } => {
                let user = credentials.login(service)?;
                let goals = service.goals_for(&user.username)?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&goals)?);
                    }
                    OutputFormat::Text => {
                        if goals.is_empty() {
                            println!("No goals set for '{}'", user.username);
                            return Ok(());
                        }
                        display::write_goals(&mut std::io::stdout(), &goals)?;
                    }
                }
                Ok(())
            }
        }
    }
}
