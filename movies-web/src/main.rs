use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use movies_web::config::AppConfig;
use movies_web::{build_state, build_storage, logging, router};

#[derive(Parser)]
#[command(name = "movies-web")]
#[command(about = "Server-rendered Movies web application")]
#[command(version)]
struct Cli {
    /// Port to run the server on (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep data in memory instead of the configured database
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let _log_guard = logging::init_logging(config.environment, &config.log_dir);
    info!(environment = ?config.environment, "Starting movies-web");

    let storage = build_storage(&config, cli.in_memory).await?;
    let app = router::app_router(build_state(&config, storage), &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}{}", addr, router::HEALTH_PATH);

    axum::serve(listener, app).await?;
    Ok(())
}
