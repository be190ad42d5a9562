//! # Space Media Batcher - Main Entry Point
//!
//! Questo è il punto di ingresso principale del servizio.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento e validazione della configurazione
//! - Avvio del server HTTP
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (porta, config, directory, ffmpeg)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose, `RUST_LOG` vince)
//! 3. Carica il file di configurazione e applica gli override da CLI
//! 4. Verifica la presenza di ffmpeg (solo warning)
//! 5. Avvia il server su `0.0.0.0:<port>`
//!
//! ## Esempio di utilizzo:
//! ```bash
//! PORT=9000 media-batcher --scratch-dir /var/tmp/batches --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use space_media_batcher::platform::PlatformCommands;
use space_media_batcher::{build_router, AppState, Config, FfmpegEncoder};

#[derive(Parser)]
#[command(name = "media-batcher")]
#[command(about = "HTTP service that compresses batches of images and videos into a zip")]
struct Args {
    /// Listen port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// JSON configuration file
    #[arg(short, long, default_value = "media-batcher.json")]
    config: PathBuf,

    /// Root directory for per-batch workspaces (default: system temp directory)
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Directory holding error_debug.log
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// ffmpeg binary name or path
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::from_file(&args.config).await?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(scratch_dir) = args.scratch_dir {
        std::fs::create_dir_all(&scratch_dir)?;
        config.scratch_dir = Some(scratch_dir);
    }
    if let Some(storage_dir) = args.storage_dir {
        config.storage_dir = storage_dir;
    }
    if let Some(ffmpeg) = args.ffmpeg {
        config.ffmpeg_path = ffmpeg;
    }
    config.validate()?;

    info!("Platform: {}", PlatformCommands::system_info());

    let encoder = FfmpegEncoder::new(config.ffmpeg_path.clone());
    if let Err(e) = encoder.check_available().await {
        warn!("⚠️  {}; video batches will fail", e);
    }

    let port = config.port;
    let app = build_router(AppState::new(config, Arc::new(encoder)));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("🚀 Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
