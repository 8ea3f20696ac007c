//! prompt2video server binary.
//!
//! Turns a text prompt into a downloadable video by chaining fal.ai's
//! text-to-image and image-to-video APIs, then serving the result from a
//! local output directory.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use prompt2video::config::Config;
use prompt2video::pipeline::VideoPipeline;
use prompt2video::server::{self, AppState};

#[derive(Debug, Parser)]
#[command(name = "prompt2video", version, about = "Prompt-to-video server")]
struct Args {
    /// Path to the config file (default: ./config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(long)]
    port: Option<u16>,

    /// Directory for generated videos (overrides the config file)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let port = args.port.unwrap_or(config.server.port);
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.server.output_dir.clone());

    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        eprintln!(
            "Failed to create output directory '{}': {}",
            output_dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let fal_config = config.fal_config();
    if fal_config.api_key.is_none() {
        log::warn!("FAL_API_KEY is not set; generation requests will fail until it is configured");
    }

    let pipeline = match VideoPipeline::new(fal_config, output_dir.clone()) {
        Ok(pipeline) => Arc::new(pipeline),
        Err(e) => {
            eprintln!("Failed to initialize pipeline: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let app = server::router(
        AppState { pipeline },
        &output_dir,
        &config.server.public_dir,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    log::info!("Prompt-to-video app listening on http://localhost:{}", port);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
