use clap::Args;
use sfms_core::FitnessService;

use super::{resolve_range, Credentials, OutputFormat};
use crate::config::Config;
use crate::display;

/// Summarize workouts, nutrition and goals over a date range
#[derive(Args)]
pub struct ReportCommand {
    #[command(flatten)]
    pub credentials: Credentials,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Start date (YYYY-MM-DD), defaults to the configured report window
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub to: Option<String>,

    /// Leave out the per-day charts
    #[arg(long)]
    pub no_charts: bool,
}

impl ReportCommand {
    pub fn run(
        self,
        service: &mut dyn FitnessService,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let range = resolve_range(&self.from, &self.to, config.report_days.value)?;
        let user = self.credentials.login(service)?;
        let report = service.compute_report(&user.username, range)?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                display::write_report(&mut std::io::stdout(), &report, !self.no_charts)?;
            }
        }
        Ok(())
    }
}
