//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione del servizio.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con porta, directory di lavoro e limiti
//! - Definisce `MediaLimits`, i limiti di un batch per tipo di media
//! - Fornisce validazione robusta dei parametri
//! - Supporta il caricamento della configurazione da file JSON
//!
//! ## Limiti di default:
//! | Tipo   | Max file | Max per file | Max totale | Estensioni                 |
//! |--------|----------|--------------|------------|----------------------------|
//! | image  | 5        | 30 MB        | 150 MB     | jpg jpeg png webp bmp      |
//! | video  | 2        | 150 MB       | 300 MB     | mp4 mov webm               |
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     port: 9000,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::file_manager::MediaKind;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MB: u64 = 1024 * 1024;

/// Count, size and extension limits for one kind of batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLimits {
    /// Maximum number of files in one batch
    pub max_files: usize,
    /// Maximum size of a single file in bytes
    pub max_file_size: u64,
    /// Maximum cumulative size of a batch in bytes
    pub max_total_size: u64,
    /// Allowed extensions, lowercase and without the dot
    pub allowed_extensions: Vec<String>,
}

impl MediaLimits {
    pub fn images() -> Self {
        Self {
            max_files: 5,
            max_file_size: 30 * MB,
            max_total_size: 150 * MB,
            allowed_extensions: Self::extensions(MediaKind::Image),
        }
    }

    pub fn videos() -> Self {
        Self {
            max_files: 2,
            max_file_size: 150 * MB,
            max_total_size: 300 * MB,
            allowed_extensions: Self::extensions(MediaKind::Video),
        }
    }

    fn extensions(kind: MediaKind) -> Vec<String> {
        kind.default_extensions().iter().map(|e| e.to_string()).collect()
    }

    fn validate(&self, kind: MediaKind) -> Result<()> {
        if self.max_files == 0 {
            return Err(anyhow::anyhow!("{} max_files must be greater than 0", kind));
        }
        if self.max_file_size == 0 || self.max_file_size > self.max_total_size {
            return Err(anyhow::anyhow!(
                "{} max_file_size must be between 1 and max_total_size",
                kind
            ));
        }
        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("{} allowed_extensions must not be empty", kind));
        }
        Ok(())
    }
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen port
    pub port: u16,
    /// Root for batch workspaces (None = system temp directory)
    pub scratch_dir: Option<PathBuf>,
    /// Directory holding the plain-text debug log
    pub storage_dir: PathBuf,
    /// ffmpeg binary name or path
    pub ffmpeg_path: PathBuf,
    /// Limits for `POST /api/upload`
    pub image_limits: MediaLimits,
    /// Limits for `POST /api/video/optimize`
    pub video_limits: MediaLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            scratch_dir: None,
            storage_dir: PathBuf::from("storage"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            image_limits: MediaLimits::images(),
            video_limits: MediaLimits::videos(),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow::anyhow!("Port must be greater than 0"));
        }

        self.image_limits.validate(MediaKind::Image)?;
        self.video_limits.validate(MediaKind::Video)?;

        if let Some(ref scratch_dir) = self.scratch_dir {
            if !scratch_dir.is_dir() {
                return Err(anyhow::anyhow!(
                    "Scratch path is not a directory: {}",
                    scratch_dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Limits applying to a kind of batch
    pub fn limits(&self, kind: MediaKind) -> &MediaLimits {
        match kind {
            MediaKind::Image => &self.image_limits,
            MediaKind::Video => &self.video_limits,
        }
    }

    /// Largest request body the HTTP layer has to accept.
    /// The biggest batch plus room for multipart framing.
    pub fn max_request_bytes(&self) -> usize {
        let largest = self
            .image_limits
            .max_total_size
            .max(self.video_limits.max_total_size);
        (largest + 16 * MB) as usize
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}
