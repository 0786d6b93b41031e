use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use smartimg_server::config::APP_NAME;
use smartimg_server::{router, AppState, ServerConfig, UploadDir};

#[derive(Parser)]
#[command(name = "smartimg-server")]
#[command(about = "Analyze, enhance, and transform images with quality metrics", long_about = None)]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(long, value_name = "IP", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Directory transformed images are written to and served from
    #[arg(short, long, value_name = "DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Largest accepted request body, in megabytes
    #[arg(long, value_name = "MB", default_value_t = 20)]
    max_upload_mb: usize,

    /// JPEG quality of transformed outputs (1-100)
    #[arg(long, value_name = "QUALITY", default_value_t = 95)]
    jpeg_quality: u8,

    /// Verbose output
    #[arg(short, long, default_value_t)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose);

    let config = build_config(&args)?;

    let uploads = UploadDir::prepare(&config.upload_dir).with_context(|| {
        format!(
            "Failed to create uploads directory: {}",
            config.upload_dir.display()
        )
    })?;

    let addr = config.addr;
    let app = router(AppState::new(config, uploads));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(addr = %addr, "{APP_NAME} listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shut down");
    Ok(())
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn build_config(args: &Args) -> Result<ServerConfig> {
    let config = ServerConfig {
        addr: SocketAddr::new(args.host, args.port),
        upload_dir: args.upload_dir.clone(),
        max_upload_bytes: args
            .max_upload_mb
            .checked_mul(1024 * 1024)
            .context("Upload limit is too large")?,
        jpeg_quality: args.jpeg_quality,
    };

    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
