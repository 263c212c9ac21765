use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use veritas_api::AppState;
use veritas_common::observability::{init_logging, LogConfig};
use veritas_config::{VeritasConfig, VeritasConfigLoader};
use veritas_llm::init_llm;
use veritas_search::GoogleSearchClient;
use veritas_verdict::FactChecker;

#[derive(Debug, Parser)]
#[command(name = "veritas-api", version, about = "Claim fact-checking HTTP service")]
struct Cli {
    /// YAML configuration file. Without it, configuration comes from
    /// the environment (including a .env file in the working directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured listen port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => VeritasConfigLoader::new()
            .with_file(path)
            .load()
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => VeritasConfig::from_env()?,
    };
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    init_logging(LogConfig {
        app_name: "veritas-api",
        emit_stderr: true,
        ..LogConfig::default()
    })?;

    tracing::info!(
        target: "api",
        model = cfg.llm.model_label(),
        result_limit = cfg.search.result_limit,
        "starting veritas"
    );

    let search = Arc::new(GoogleSearchClient::new(&cfg.search)?);
    // Fails fast here when the provider is unreachable or the model is absent.
    let llm = init_llm(&cfg.llm).await?;
    let checker = Arc::new(FactChecker::new(
        search,
        llm.clone(),
        cfg.search.result_limit,
        cfg.llm.temperature(),
    ));

    let state = AppState { checker, llm };
    veritas_api::serve(
        state,
        &cfg.server.host,
        cfg.server.port,
        &cfg.server.allowed_origin,
    )
    .await
}
