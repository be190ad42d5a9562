//! # Space Media Batcher Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare del servizio
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test di integrazione
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione del servizio e limiti per tipo di media
//! - `error`: Tipi di errore per job, validazione e batch
//! - `media`: Modello dati di un batch (file, qualità)
//! - `validator`: Limiti di numero, dimensione ed estensione
//! - `file_manager`: Tipi di media, nomi file, materializzazione
//! - `image_processor`: Compressione immagini (JPEG/PNG palette/WebP)
//! - `video_processor`: Compressione video con FFmpeg
//! - `optimizer`: Orchestratore del batch e workspace
//! - `archive`: Impacchettamento zip degli output
//! - `metrics` / `debug_log`: Contatori e log di debug su file
//! - `server`: Router HTTP
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use space_media_batcher::{build_router, AppState, Config, FfmpegEncoder};
//!
//! let encoder = Arc::new(FfmpegEncoder::new("ffmpeg"));
//! let app = build_router(AppState::new(Config::default(), encoder));
//! ```

pub mod archive;
pub mod config;
pub mod debug_log;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod media;
pub mod metrics;
pub mod optimizer;
pub mod platform;
pub mod server;
pub mod utils;
pub mod validator;
pub mod video_processor;

pub use archive::{ArchivePackager, PackagedArchive};
pub use config::{Config, MediaLimits};
pub use error::{BatchError, OptimizeError, ValidationError};
pub use file_manager::MediaKind;
pub use media::{InputFile, QualityTier, UploadBatch};
pub use metrics::{AtomicMetrics, MetricsSink};
pub use optimizer::MediaOptimizer;
pub use server::{build_router, AppState};
pub use video_processor::{EncodeParams, FfmpegEncoder, VideoEncoder};
