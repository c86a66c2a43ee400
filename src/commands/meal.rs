use clap::{Args, Subcommand};
use sfms_core::{FitnessService, MealDetails, MealType, Nutrients};

use super::{date_or_today, resolve_range, Credentials, OutputFormat};
use crate::config::Config;
use crate::display;

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Log a meal
    Log {
        #[command(flatten)]
        credentials: Credentials,

        /// Meal type (breakfast, lunch, dinner, snack)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: String,

        /// What was eaten
        #[arg(long)]
        description: String,

        /// Calories (kcal)
        #[arg(long, allow_negative_numbers = true)]
        calories: f64,

        /// Protein in grams
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        protein: f64,

        /// Carbohydrates in grams
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        carbs: f64,

        /// Fat in grams
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        fat: f64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// View meal history
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

impl MealCommand {
    pub fn run(
        self,
        service: &mut dyn FitnessService,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match self.command {
            MealSubcommand::Log {
                credentials,
                meal_type,
                description,
                calories,
                protein,
                carbs,
                fat,
                date,
            } => {
                let meal_type: MealType = meal_type.parse().map_err(|e: String| e)?;
                let date = date_or_today(&date)?;
                let user = credentials.login(service)?;

                let details = MealDetails::new(
                    meal_type,
                    description,
                    Nutrients::new(calories, protein, carbs, fat),
                    date,
                );
                let entry = service.log_meal(&user.username, details)?;

                println!("Logged meal:");
                println!();
                println!("{}", entry);
                println!("  ID: {}", entry.id);
                Ok(())
            }

            MealSubcommand::List {
                credentials,
                format,
                from,
                to,
            } => {
                let range = resolve_range(&from, &to, config.report_days.value)?;
                let user = credentials.login(service)?;
                let meals = service.meals_for(&user.username, range)?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&meals)?);
                    }
                    OutputFormat::Text => {
                        if meals.is_empty() {
                            println!("No meal history found for {}", range);
                            return Ok(());
                        }
                        display::write_meals(&mut std::io::stdout(), &meals)?;
                    }
                }
                Ok(())
            }
        }
    }
}
