//! userdesk - manage user records on a remote REST service from the terminal.
//!
//! Every view reads through a session `QueryCache` and every write goes
//! through `UserMutations`, so after a create, edit or delete the dashboard
//! listing is fetched fresh.

mod commands;
mod render;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use userdesk_core::{FormField, FormState};

/// Directory for a daily rolling log file, in addition to stderr
const LOG_DIR_ENV: &str = "USERDESK_LOG_DIR";

/// Log file name prefix inside `USERDESK_LOG_DIR`
const LOG_FILE_PREFIX: &str = "userdesk.log";

#[derive(Debug, Parser)]
#[command(name = "userdesk", version, about = "Manage user records on a remote REST service")]
struct Cli {
    /// Base URL of the users API (overrides USERDESK_API_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all users
    List,
    /// Show one user's details
    Show { id: String },
    /// Create a new user
    Create(FormArgs),
    /// Edit an existing user; unspecified fields keep their current value
    Edit {
        id: String,
        #[command(flatten)]
        fields: FormArgs,
    },
    /// Delete a user
    Delete { id: String },
    /// Show or change saved settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the config file location and effective settings
    Show,
    /// Save the API base URL
    SetUrl { url: String },
    /// Save the request timeout in seconds
    SetTimeout { secs: u64 },
}

/// Form fields accepted by `create` and `edit`.
#[derive(Debug, Default, Args)]
struct FormArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    website: Option<String>,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    suite: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    zipcode: Option<String>,
    #[arg(long)]
    lat: Option<String>,
    #[arg(long)]
    lng: Option<String>,
    /// Blank a field before submitting (repeatable)
    #[arg(long = "clear", value_name = "FIELD")]
    clear: Vec<FormField>,
}

impl FormArgs {
    /// Overlay the given values onto `form`, clearing first.
    fn apply(&self, form: &mut FormState) {
        for field in &self.clear {
            form.set(*field, "");
        }
        let given = [
            (FormField::Name, &self.name),
            (FormField::Email, &self.email),
            (FormField::Phone, &self.phone),
            (FormField::Company, &self.company),
            (FormField::Website, &self.website),
            (FormField::Street, &self.street),
            (FormField::Suite, &self.suite),
            (FormField::City, &self.city),
            (FormField::Zipcode, &self.zipcode),
            (FormField::Lat, &self.lat),
            (FormField::Lng, &self.lng),
        ];
        for (field, value) in given {
            if let Some(value) = value {
                form.set(field, value.as_str());
            }
        }
    }
}

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();
    debug!(command = ?cli.command, "userdesk starting");

    let outcome = commands::run(cli).await;
    info!("userdesk finished");
    outcome
}
