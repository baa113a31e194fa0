//! Nutella CLI - LLM-backed questions over admin users and domains

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use nutella::answer::ProxyAnswerer;
use nutella::config::Config;
use nutella::error::Result;
use nutella::pipeline::{Pipeline, PipelineInput};

/// Nutella - Ask questions about admin users and domains
#[derive(Parser)]
#[command(name = "nutella")]
#[command(about = "Routes admin questions to an LLM with live users/domains data")]
#[command(version)]
pub struct Cli {
    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ask a question; the answer is printed to stdout
    Ask {
        /// The question to answer
        query: String,

        /// Admin API credential, sent on the Basic scheme
        #[arg(long, short = 't')]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Command::Ask { query, token } => ask(cli.config, query, token).await,
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,nutella=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let mut config = if let Some(path) = config_path {
        tracing::info!("Loading config from: {}", path.display());
        read_config_file(&path)?
    } else {
        let default_paths = [
            dirs::home_dir().map(|h| h.join(".nutella").join("config.toml")),
            dirs::config_dir().map(|c| c.join("nutella").join("config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        let mut found = None;
        for path in default_paths.iter().flatten() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                found = Some(read_config_file(path)?);
                break;
            }
        }

        found.unwrap_or_else(|| {
            tracing::info!("No config file found, using defaults");
            Config::default()
        })
    };

    config.apply_env_overrides();
    Ok(config)
}

fn read_config_file(path: &PathBuf) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        nutella::NutellaError::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    toml::from_str(&content)
        .map_err(|e| nutella::NutellaError::Config(format!("Failed to parse config: {e}")))
}

async fn ask(config_path: Option<PathBuf>, query: String, token: Option<String>) -> Result<()> {
    let config = load_config(config_path)?;
    tracing::debug!("Config loaded: {:?}", config);

    let answerer = Arc::new(ProxyAnswerer::new(&config.ai)?);
    let pipeline = Pipeline::new(&config, answerer);

    let output = pipeline
        .run(PipelineInput {
            query,
            auth_token: token,
        })
        .await?;

    println!("{}", output.answer);
    Ok(())
}
