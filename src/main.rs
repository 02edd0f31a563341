use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibe_studio::ai::{GeminiGenerationClient, ModelCatalog};
use vibe_studio::models::Config;
use vibe_studio::orchestrator::FallbackOrchestrator;
use vibe_studio::server::{router, AppState};

#[derive(Debug, Parser)]
#[command(name = "vibe-studio")]
#[command(about = "Serve photo caption and song suggestions")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Listen address; overrides BIND_ADDR.
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Show which configured models the API key can reach.
    ListModels,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vibe_studio=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let api_key = config.api_key.clone().unwrap_or_else(|| {
        warn!("GOOGLE_AI_API_KEY is not set; generation requests will fail upstream");
        String::new()
    });
    let client =
        GeminiGenerationClient::new(api_key).with_base_url(config.gemini_base_url.clone());

    match args.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(config, client, bind).await,
        Command::ListModels => list_models(&config, &client).await,
    }
}

async fn serve(config: Config, client: GeminiGenerationClient, bind: Option<String>) -> Result<()> {
    let orchestrator = FallbackOrchestrator::new(Arc::new(client), config.models.clone())
        .with_rate_limit_delay(config.rate_limit_delay)
        .with_strict_output(config.strict_output);

    info!(
        "Candidate models, in order: {}",
        orchestrator.candidates().join(", ")
    );
    if config.strict_output {
        info!("Strict output validation enabled");
    }
    let app = router(AppState::new(orchestrator), config.max_body_bytes);

    let addr = bind.unwrap_or_else(|| config.bind_addr.clone());
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn list_models(config: &Config, catalog: &dyn ModelCatalog) -> Result<()> {
    let available = catalog.list_models().await?;

    println!("Configured candidates:");
    for model in &config.models {
        let marker = if available.contains(model) { "✅" } else { "❌" };
        println!("{} {}", marker, model);
    }

    println!("\nOther Gemini models:");
    for model in available
        .iter()
        .filter(|m| m.contains("gemini") && !config.models.contains(*m))
    {
        println!("- {}", model);
    }

    Ok(())
}
