//! DevOps copilot server - JSON API over the generation pipeline.

mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use clap::Parser;
use copilot::io::config::resolve_config;
use copilot::logging;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::state::AppState;

/// Used when `RUST_LOG` is unset.
const DEFAULT_LOG_DIRECTIVE: &str = "copilot_server=info,copilot=info";

#[derive(Parser)]
#[command(name = "copilot-server")]
#[command(about = "HTTP API for generating DevOps artifacts, reviews and docs")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Optional TOML config file; environment variables override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not load a `.env` file from the working directory or its parents
    #[arg(long)]
    no_dotenv: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if !args.no_dotenv {
        let _ = dotenvy::dotenv();
    }
    logging::init(DEFAULT_LOG_DIRECTIVE);

    let config = resolve_config(args.config.as_deref())?;
    info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        github_token = config.github.token.is_some(),
        "starting copilot-server"
    );

    let state = AppState::new(config)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", routes::api_router())
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
