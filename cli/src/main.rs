mod commands;
mod config;
mod nutritionix;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    Service, cmd_bmi, cmd_clear, cmd_delete, cmd_entries, cmd_food, cmd_goal_set, cmd_goal_show,
    cmd_log, cmd_report, cmd_suggest,
};
use crate::config::Config;
use crate::nutritionix::NutritionixClient;
use fitsphere_core::entries::{LoadSource, NoRemoteSeed};
use fitsphere_core::service::ReportService;

#[derive(Parser)]
#[command(
    name = "fitsphere",
    version,
    about = "A local-first fitness tracker CLI",
    long_about = "Track calories, water, steps, sleep, workouts and weight against daily goals, \
                  with a five-day trend for each."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a value for a category
    Log {
        /// Category: calories, water, steps, sleep, workout, weight
        category: String,
        /// Value in the category's unit (kcal, ml, steps, hrs, min, kg)
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Label for the entry (default: the category name)
        #[arg(short, long)]
        label: Option<String>,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Time of day (HH:MM, default: now)
        #[arg(long)]
        time: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log calories for a weight of food from the built-in food table
    Food {
        /// Food name (e.g. "chicken", "butter chicken")
        name: String,
        /// Amount in grams
        grams: f64,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Time of day (HH:MM, default: now)
        #[arg(long)]
        time: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest foods from the built-in table
    Suggest {
        /// Part of a food name
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show today's progress and the last five days
    Report {
        /// Category to detail (default: overview of all categories)
        category: Option<String>,
        /// Write the five-day chart as SVG to this path
        #[arg(long, value_name = "PATH")]
        svg: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List entries for a category
    Entries {
        /// Category: calories, water, steps, sleep, workout, weight
        category: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an entry by ID
    Delete {
        /// Category the entry belongs to
        category: String,
        /// Entry ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete every entry in a category
    Clear {
        /// Category to clear
        category: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage daily goals
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Compute body mass index
    Bmi {
        /// Weight (default: latest weight entry, in kg)
        #[arg(short, long)]
        weight: Option<f64>,
        /// Weight unit: kg or lbs
        #[arg(long, default_value = "kg")]
        weight_unit: String,
        /// Height
        #[arg(long)]
        height: f64,
        /// Height unit: cm or m
        #[arg(long, default_value = "cm")]
        height_unit: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Disable API key authentication (for development/testing)
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Show goals (all categories, or one)
    Show {
        /// Category to show
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a daily goal
    Set {
        /// Category: calories, water, steps, sleep, workout, weight
        category: String,
        /// Goal in the category's unit; must be greater than 0
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn open_service(config: &Config) -> Result<Service> {
    let path = config.db_path.to_string_lossy();
    let svc = match &config.nutritionix {
        Some(credentials) => {
            let client = NutritionixClient::new(credentials.clone())?;
            ReportService::new(&path, &client)?
        }
        None => ReportService::new(&path, &NoRemoteSeed)?,
    };
    match svc.load_source() {
        LoadSource::Snapshot => {}
        LoadSource::RemoteSeed => eprintln!("Created example data using Nutritionix values"),
        LoadSource::StaticDefault => eprintln!("Created example data from the built-in food table"),
    }
    Ok(svc)
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let mut svc = open_service(&config)?;

    match cli.command {
        Commands::Suggest { query, json } => cmd_suggest(&query, json),
        Commands::Log {
            category,
            value,
            label,
            date,
            time,
            json,
        } => cmd_log(&mut svc, &category, value, label.as_deref(), date, time, json),
        Commands::Food {
            name,
            grams,
            date,
            time,
            json,
        } => cmd_food(&mut svc, &name, grams, date, time, json),
        Commands::Report {
            category,
            svg,
            json,
        } => cmd_report(&svc, category.as_deref(), svg.as_deref(), json),
        Commands::Entries { category, json } => cmd_entries(&svc, &category, json),
        Commands::Delete { category, id, json } => cmd_delete(&mut svc, &category, &id, json),
        Commands::Clear {
            category,
            yes,
            json,
        } => cmd_clear(&mut svc, &category, yes, json),
        Commands::Goal { command } => match command {
            GoalCommands::Show { category, json } => {
                cmd_goal_show(&svc, category.as_deref(), json)
            }
            GoalCommands::Set {
                category,
                value,
                json,
            } => cmd_goal_set(&mut svc, &category, value, json),
        },
        Commands::Bmi {
            weight,
            weight_unit,
            height,
            height_unit,
            json,
        } => cmd_bmi(&svc, weight, &weight_unit, height, &height_unit, json),
        Commands::Serve {
            port,
            bind,
            no_auth,
        } => {
            let api_key = if no_auth {
                None
            } else {
                Some(config.load_or_create_api_key()?)
            };
            server::start_server(svc, port, &bind, api_key).await
        }
    }
}
