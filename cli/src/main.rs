//! Formkit CLI
//!
//! Command-line interface for form definitions and stored submissions.
//!
//! # Usage
//!
//! ```bash
//! formkit submissions list
//! formkit submissions create -f data.json
//! formkit form check -f form-config.json
//! formkit form fill --set "Name=Alice" --check "Toppings=Cheese,Ham" --submit
//! formkit config set api_url http://localhost:3001/api
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "formkit")]
#[command(version)]
#[command(about = "Formkit Command Line Interface", long_about = None)]
struct Cli {
    /// Submission service base URL
    #[arg(long, env = "FORMKIT_API_URL")]
    api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stored submissions
    Submissions {
        #[command(subcommand)]
        action: SubmissionCommands,
    },
    /// Work with form definitions
    Form {
        #[command(subcommand)]
        action: FormCommands,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum SubmissionCommands {
    /// List all submissions, newest first
    List,
    /// Get submission details
    Get { id: i64 },
    /// Store a form output object read from a JSON file
    Create {
        #[arg(short, long)]
        file: String,
    },
    /// Replace a submission's data
    Update {
        id: i64,
        #[arg(short, long)]
        file: String,
    },
    /// Delete a submission
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum FormCommands {
    /// Lint a form definition
    Check {
        /// Path or http(s) URL of the definition
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Re-export a definition in normalised form
    Export {
        #[arg(short, long)]
        file: Option<String>,
        /// Emit `{ fields, groups }` instead of the bare field array
        #[arg(long)]
        with_groups: bool,
    },
    /// Fill a form from the command line
    Fill {
        #[arg(short, long)]
        file: Option<String>,
        /// LABEL=VALUE; repeat for list entries, use LABEL=KEY=VALUE for maps
        #[arg(long = "set", value_name = "LABEL=VALUE")]
        sets: Vec<String>,
        /// LABEL=OPT,OPT,... for checkbox fields
        #[arg(long = "check", value_name = "LABEL=OPTIONS")]
        checks: Vec<String>,
        /// Send the output to the submission service
        #[arg(long)]
        submit: bool,
        /// Load this submission first and update it on submit
        #[arg(long)]
        edit: Option<i64>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = config::Config::load(cli.profile.as_deref()).unwrap_or_default();
    let format = cli.format.unwrap_or_else(|| config.output_format());
    let api_url = cli.api_url.or(config.api_url.clone());

    let result = match cli.command {
        Commands::Submissions { action } => match commands::client(api_url.as_deref()) {
            Ok(client) => commands::submissions::handle(action, &client, format).await,
            Err(e) => Err(e),
        },
        Commands::Form { action } => match commands::client(api_url.as_deref()) {
            Ok(client) => commands::form::handle(action, &client, &config, format).await,
            Err(e) => Err(e),
        },
        Commands::Config { action } => commands::config::handle(action, cli.profile.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
