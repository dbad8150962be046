use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod api;
mod app;
mod cart;
mod config;
mod error;
mod prompt;
mod recipe;
mod session;

use api::GenerationClient;
use app::App;
use config::GenConfig;
use prompt::Diet;

/// BiteBot — recipe suggestions from whatever is in your kitchen
#[derive(Parser)]
#[command(name = "bitebot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Model to use (defaults to BITEBOT_MODEL or the built-in default)
    #[arg(short = 'm', long)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot recipe suggestion (non-interactive)
    Suggest {
        /// Comma-separated ingredient list
        #[arg(short, long)]
        ingredients: String,

        /// Diet constraint
        #[arg(short, long, value_enum, default_value_t = Diet::All)]
        diet: Diet,

        /// Maximum prep time, free-form (e.g. "10 min")
        #[arg(short = 't', long, default_value = "15 min")]
        time: String,

        /// Photo of available ingredients (jpg/jpeg/png)
        #[arg(short, long)]
        photo: Option<PathBuf>,

        /// Also write the suggestions as plain text to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check API key and connectivity to the generation service
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = GenConfig::from_env(cli.model)?;
    let client = GenerationClient::new(config);

    match cli.command {
        Some(Commands::Suggest {
            ingredients,
            diet,
            time,
            photo,
            output,
        }) => app::run_suggest(client, ingredients, diet, time, photo, output).await,
        Some(Commands::Status) => app::run_status(client).await,
        None => App::new(client).run_interactive().await,
    }
}
