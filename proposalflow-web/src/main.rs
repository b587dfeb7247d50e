//! `proposalflow-web` binary.

use anyhow::Context;
use clap::Parser;
use proposalflow::config::AppConfig;
use proposalflow::llm::OpenAiClient;
use proposalflow::pipeline::Coordinator;
use proposalflow::stages::stage_table;
use proposalflow::websearch::toolbox_from_config;
use proposalflow_web::{progress_sink, run_server, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn a company URL into an AI use-case proposal")]
struct Args {
    /// Address to listen on; overrides PROPOSALFLOW_BIND
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "proposalflow=info,proposalflow_web=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(bind) = args.bind {
        config = config.with_bind(bind);
    }
    info!(config = ?config, "Configuration loaded");

    let generator = Arc::new(OpenAiClient::new(&config)?);
    info!(model = generator.model(), search_url = %config.search_url, "Pipeline backends ready");
    let toolbox = toolbox_from_config(&config)?;
    let coordinator = Coordinator::new(stage_table(), generator, toolbox)?
        .with_event_sink(Arc::new(progress_sink()));

    run_server(config.bind, AppState::shared(coordinator)).await
}
