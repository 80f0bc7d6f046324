//! eventdigest CLI - schema digests of tracking logs.

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod output;

use commands::{analyze, event_type, keys};
use config::{AnalyzeArgs, EventTypeFlags};

#[derive(Parser)]
#[command(name = "eventdigest")]
#[command(about = "Privacy-aware schema digests of tracking logs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one digest file per course from tracking logs
    Analyze(AnalyzeArgs),
    /// Show the canonical signature of an event type
    EventType {
        /// Event type to canonicalize
        event_type: String,
        #[command(flatten)]
        flags: EventTypeFlags,
        /// Username of the event, for identity tagging
        #[arg(long)]
        username: Option<String>,
        /// User id of the event, for identity tagging
        #[arg(long)]
        user_id: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the key paths of one JSON record
    Keys {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Tag values matching the record's username or user id
        #[arg(long)]
        check_user_identity: bool,
        /// Do not report key paths found in the context
        #[arg(long)]
        exclude_context: bool,
        /// Add the `attested` key
        #[arg(long)]
        include_attested_marker: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_tracing();

    let result = match cli.command {
        Commands::Analyze(args) => analyze::run(args),
        Commands::EventType {
            event_type,
            flags,
            username,
            user_id,
            json,
        } => event_type::run(event_type, flags, username, user_id, json),
        Commands::Keys {
            input,
            check_user_identity,
            exclude_context,
            include_attested_marker,
            json,
        } => keys::run(
            input,
            check_user_identity,
            exclude_context,
            include_attested_marker,
            json,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
