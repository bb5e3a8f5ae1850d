use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

use route_advisor::render::{render_analysis, render_failure};
use route_advisor::{
    AdvisorConfig, ConversationalAssistant, OpenAiClient, OpenWeatherClient, Port,
    RouteAdvisoryGenerator, logging, web,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the route through the given ports, in sailing order
    Analyze {
        /// Port as CODE@LAT,LON, repeat for every port
        #[arg(short, long = "port", value_name = "CODE@LAT,LON", required = true)]
        ports: Vec<Port>,
        /// Print the analysis as JSON instead of the dashboard
        #[arg(long)]
        json: bool,
    },
    /// Ask a question about a saved route analysis
    Ask {
        #[arg(short, long)]
        question: String,
        /// JSON file with the route analysis
        #[arg(long, value_name = "FILE")]
        context: PathBuf,
    },
    /// Run the HTTP API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = AdvisorConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;
    debug!("Configuration loaded");

    match cli.command {
        Commands::Analyze { ports, json } => analyze(&config, &ports, json).await,
        Commands::Ask { question, context } => ask(&config, &question, &context).await,
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            web::run(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn analyze(config: &AdvisorConfig, ports: &[Port], json: bool) -> Result<ExitCode> {
    let weather = Arc::new(OpenWeatherClient::new(&config.weather)?);
    let model = Arc::new(OpenAiClient::for_analysis(&config.model)?);
    let generator = RouteAdvisoryGenerator::new(weather, model);

    match generator.analyze(ports).await {
        Ok(analysis) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                println!("{}", render_analysis(&analysis));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&failure)?);
            } else {
                eprintln!("{}", render_failure(&failure));
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn ask(config: &AdvisorConfig, question: &str, context: &Path) -> Result<ExitCode> {
    let text = std::fs::read_to_string(context)
        .with_context(|| format!("Failed to read {}", context.display()))?;
    let route_data: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", context.display()))?;

    let model = Arc::new(OpenAiClient::for_chat(&config.model)?);
    let assistant = ConversationalAssistant::new(model);

    match assistant.ask(question, &route_data).await {
        Ok(reply) => {
            println!("{reply}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", err.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}
