use clap::{Parser, Subcommand};
use sfms_core::{DataManager, FitnessService};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod chart;
mod commands;
mod config;
mod display;
mod menu;

use commands::{
    ConfigCommand, GoalCommand, MealCommand, ReportCommand, UserCommand, WorkoutCommand,
};
use config::Config;
use menu::Menu;

#[derive(Parser)]
#[command(name = "sfms")]
#[command(version)]
#[command(about = "Smart Fitness Management System", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log progress to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register and manage users
    User(UserCommand),

    /// Log and list workouts
    Workout(WorkoutCommand),

    /// Log and list meals
    Meal(MealCommand),

    /// Set and track goals
    Goal(GoalCommand),

    /// Show a summary report with charts
    Report(ReportCommand),

    /// Start the interactive menu (default)
    Menu,

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cli_config_path = cli.config.clone();
    let config = Config::load(cli.config)?;

    // Config commands never touch the data file
    if let Some(Commands::Config(cmd)) = &cli.command {
        return cmd.run(&config, cli_config_path);
    }

    let mut manager = DataManager::open(&config.data_file.value)?;
    tracing::debug!(path = %config.data_file.value.display(), "Opened data file");

    let result = execute_command(cli.command, &mut manager, &config);
    if manager.has_unsaved_changes() {
        tracing::warn!(path = %config.data_file.value.display(), "Retrying save before exit");
    }
    let closed = manager.close();

    result?;
    closed?;
    Ok(())
}

fn execute_command(
    command: Option<Commands>,
    service: &mut dyn FitnessService,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Some(Commands::User(cmd)) => cmd.run(service),
        Some(Commands::Workout(cmd)) => cmd.run(service, config),
        Some(Commands::Meal(cmd)) => cmd.run(service, config),
        Some(Commands::Goal(cmd)) => cmd.run(service),
        Some(Commands::Report(cmd)) => cmd.run(service, config),
        Some(Commands::Menu) | None => {
            let stdin = io::stdin();
            let mut menu = Menu::new(service, stdin.lock(), io::stdout(), config.report_days.value);
            Ok(menu.run()?)
        }
        Some(Commands::Config(_)) => Ok(()),
    }
}

/// Diagnostics go to stderr so menu and command output on stdout stay clean.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "sfms=info,sfms_core=info"
    } else {
        "sfms=warn,sfms_core=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
