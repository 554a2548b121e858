use afrisearch_server::{build_app, AppOptions};
use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Persisted settings file (credentials)
    #[arg(long, default_value = "./afrisearch.toml")]
    settings: PathBuf,
    /// JSON dataset replacing the built-in country table
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// Skip the multi-query pass and start from a single search
    #[arg(long)]
    no_deep_thinking: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut options = AppOptions::new(&args.settings);
    options.dataset_path = args.dataset;
    options.deep_thinking = !args.no_deep_thinking;
    let app: Router = build_app(options)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, settings = %args.settings.display(), "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
