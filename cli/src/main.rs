mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{
    ChartMetric, cmd_chart, cmd_delete, cmd_export, cmd_goal_add, cmd_goal_delete, cmd_goal_done,
    cmd_goal_edit, cmd_goal_list, cmd_goal_undo, cmd_history, cmd_import, cmd_log, cmd_overview,
    cmd_settings_set, cmd_settings_show, cmd_show, cmd_update,
};
use crate::config::Config;
use taper_core::service::TaperService;

#[derive(Parser)]
#[command(
    name = "taper",
    version,
    about = "A simple, local-first weight tracker CLI",
    long_about = "\n\n  ████████╗ █████╗ ██████╗ ███████╗██████╗
  ╚══██╔══╝██╔══██╗██╔══██╗██╔════╝██╔══██╗
     ██║   ███████║██████╔╝█████╗  ██████╔╝
     ██║   ██╔══██║██╔═══╝ ██╔══╝  ██╔══██╗
     ██║   ██║  ██║██║     ███████╗██║  ██║
     ╚═╝   ╚═╝  ╚═╝╚═╝     ╚══════╝╚═╝  ╚═╝
        small steps, steady trend.
"
)]
struct Cli {
    /// Profile to use; each profile keeps its own database
    #[arg(short, long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a measurement for a date (one per day; re-logging overwrites)
    Log {
        /// Weight, e.g. "81.5", "81.5kg", "180lbs"
        weight: String,
        /// Waist size, e.g. "92", "92cm", "36in"
        #[arg(short, long)]
        waist: Option<String>,
        /// Date to log for (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Optional notes
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the measurement for a date (default: today)
    Show {
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show measurement history
    History {
        /// Number of entries to show (default: all)
        #[arg(short, long)]
        days: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a measurement by ID
    Update {
        /// Measurement ID
        id: i64,
        /// New weight, e.g. "81.5" or "180lbs"
        #[arg(long)]
        weight: Option<String>,
        /// New waist size, e.g. "92" or "36in"
        #[arg(long)]
        waist: Option<String>,
        /// New date (YYYY-MM-DD or today/yesterday)
        #[arg(long)]
        date: Option<String>,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a measurement by ID
    Delete {
        /// Measurement ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage plan settings (start/goal weight and dates, height)
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Manage weekly activity goals
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Latest measurement, deltas, BMI, and weekly goal progress
    Overview {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Chart a metric over the start-to-goal interval
    Chart {
        /// Metric to chart
        #[arg(value_enum)]
        metric: ChartMetric,
        /// Output the full chart contract as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export all data as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
    /// Import a previously exported JSON file (newer entries win)
    Import {
        /// Path to the export file
        file: std::path::PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Set one or more settings; the rest keep their values
    Set {
        /// Starting weight in kg
        #[arg(long)]
        start_weight: Option<f64>,
        /// Goal weight in kg
        #[arg(long)]
        goal_weight: Option<f64>,
        /// Plan start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        /// Plan goal date (YYYY-MM-DD)
        #[arg(long)]
        goal_date: Option<String>,
        /// Height in cm (enables BMI)
        #[arg(long)]
        height: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Add a weekly goal
    Add {
        /// Activity name, e.g. "Running"
        activity: String,
        /// Target occurrences per week
        frequency: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List goals for the current week
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark one occurrence done (caps at the weekly target)
    Done {
        /// Goal ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Take one occurrence back (stops at 0)
    Undo {
        /// Goal ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a goal's activity and/or weekly frequency
    Edit {
        /// Goal ID
        id: i64,
        /// New activity name
        #[arg(long)]
        activity: Option<String>,
        /// New target occurrences per week
        #[arg(long)]
        frequency: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a goal
    Delete {
        /// Goal ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.profile.as_deref())?;
    let svc = TaperService::new(&config.db_path)?;

    match cli.command {
        Commands::Log {
            weight,
            waist,
            date,
            notes,
            json,
        } => cmd_log(&svc, &weight, waist.as_ref(), date, notes, json),
        Commands::Show { date, json } => cmd_show(&svc, date, json),
        Commands::History { days, json } => cmd_history(&svc, days, json),
        Commands::Update {
            id,
            weight,
            waist,
            date,
            notes,
            json,
        } => cmd_update(&svc, id, weight.as_ref(), waist.as_ref(), date, notes, json),
        Commands::Delete { id, json } => cmd_delete(&svc, id, json),
        Commands::Settings { command } => match command {
            SettingsCommands::Set {
                start_weight,
                goal_weight,
                start_date,
                goal_date,
                height,
                json,
            } => cmd_settings_set(
                &svc,
                start_weight,
                goal_weight,
                start_date,
                goal_date,
                height,
                json,
            ),
            SettingsCommands::Show { json } => cmd_settings_show(&svc, json),
        },
        Commands::Goal { command } => match command {
            GoalCommands::Add {
                activity,
                frequency,
                json,
            } => cmd_goal_add(&svc, &activity, frequency, json),
            GoalCommands::List { json } => cmd_goal_list(&svc, json),
            GoalCommands::Done { id, json } => cmd_goal_done(&svc, id, json),
            GoalCommands::Undo { id, json } => cmd_goal_undo(&svc, id, json),
            GoalCommands::Edit {
                id,
                activity,
                frequency,
                json,
            } => cmd_goal_edit(&svc, id, activity, frequency, json),
            GoalCommands::Delete { id, json } => cmd_goal_delete(&svc, id, json),
        },
        Commands::Overview { json } => cmd_overview(&svc, json),
        Commands::Chart { metric, json } => cmd_chart(&svc, metric, json),
        Commands::Export { output } => cmd_export(&svc, output.as_deref()),
        Commands::Import { file, json } => cmd_import(&svc, &file, json),
    }
}
