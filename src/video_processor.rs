//! # Video Processing Module
//!
//! Questo modulo comprime un singolo video con un encoder esterno (FFmpeg).
//!
//! ## Responsabilità:
//! - Mappatura del livello di qualità su parametri encoder (CRF + preset)
//! - Controllo dell'estensione di input
//! - Generazione del path di output `optimized_<hex>.mp4`
//! - Invocazione di FFmpeg tramite il trait `VideoEncoder`
//! - Verifica della presenza di `ffmpeg` all'avvio
//!
//! ## Formati supportati:
//! - **Input**: MP4, MOV, WebM
//! - **Output**: MP4 (H.264 + AAC 128k, `+faststart`)
//!
//! ## Parametri per livello:
//! | Livello | CRF | Preset   |
//! |---------|-----|----------|
//! | low     | 32  | veryfast |
//! | avg     | 26  | medium   |
//! | high    | 20  | slow     |
//!
//! ## Esempio:
//! ```rust,ignore
//! let compressor = VideoCompressor::new(
//!     Arc::new(FfmpegEncoder::new("ffmpeg")),
//!     config.video_limits.allowed_extensions.clone(),
//! );
//! let output = compressor.compress(&input, workspace.path(), QualityTier::High).await?;
//! ```

use crate::args;
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::media::QualityTier;
use crate::platform::PlatformCommands;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};
use uuid::Uuid;

/// Lines of encoder stderr kept in error messages
const STDERR_TAIL_LINES: usize = 20;

/// Encoder parameters derived from a quality tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeParams {
    pub crf: u8,
    pub preset: &'static str,
    pub audio_bitrate: &'static str,
}

impl EncodeParams {
    pub fn for_tier(tier: QualityTier) -> Self {
        let (crf, preset) = match tier {
            QualityTier::Low => (32, "veryfast"),
            QualityTier::Avg => (26, "medium"),
            QualityTier::High => (20, "slow"),
        };

        Self {
            crf,
            preset,
            audio_bitrate: "128k",
        }
    }
}

/// Transcodes one video file into another
#[async_trait]
pub trait VideoEncoder: Send + Sync {
    /// Encode `input` into `output`, returning the written path
    async fn encode(
        &self,
        input: &Path,
        output: &Path,
        params: &EncodeParams,
    ) -> Result<PathBuf, OptimizeError>;
}

/// `VideoEncoder` backed by the ffmpeg command line
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn program(&self) -> PathBuf {
        match self.binary.to_str() {
            Some(name) if !name.contains(std::path::MAIN_SEPARATOR) => {
                PathBuf::from(PlatformCommands::instance().get_command(name))
            }
            _ => self.binary.clone(),
        }
    }

    /// Argument list for one transcode
    pub fn build_args(input: &Path, output: &Path, params: &EncodeParams) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        let crf = params.crf.to_string();

        args![
            "-y",
            "-i",
            &*input,
            "-vcodec",
            "libx264",
            "-crf",
            crf.as_str(),
            "-preset",
            params.preset,
            "-movflags",
            "+faststart",
            "-acodec",
            "aac",
            "-b:a",
            params.audio_bitrate,
            &*output,
        ]
    }

    /// Check that the configured binary can be found
    pub async fn check_available(&self) -> Result<(), OptimizeError> {
        if PlatformCommands::instance()
            .is_command_available(&self.program())
            .await
        {
            Ok(())
        } else {
            Err(OptimizeError::MissingDependency(format!(
                "{} is required for video processing",
                self.binary.display()
            )))
        }
    }
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    async fn encode(
        &self,
        input: &Path,
        output: &Path,
        params: &EncodeParams,
    ) -> Result<PathBuf, OptimizeError> {
        let program = self.program();
        debug!(
            "🎬 Running {} on {} (CRF: {}, preset: {})",
            program.display(),
            input.display(),
            params.crf,
            params.preset
        );

        let start_time = Instant::now();
        let result = Command::new(&program)
            .args(Self::build_args(input, output, params))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                OptimizeError::FFmpeg(format!("Failed to execute {}: {}", program.display(), e))
            })?;

        if !result.status.success() {
            return Err(OptimizeError::FFmpeg(format!(
                "{}: {}",
                result.status,
                stderr_tail(&result.stderr)
            )));
        }

        info!(
            "✅ Video encoded in {:.1}s: {}",
            start_time.elapsed().as_secs_f64(),
            output.display()
        );
        Ok(output.to_path_buf())
    }
}

/// Last few lines of captured encoder stderr
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Compresses one video at a time through a `VideoEncoder`
#[derive(Clone)]
pub struct VideoCompressor {
    encoder: Arc<dyn VideoEncoder>,
    allowed_extensions: Vec<String>,
}

impl VideoCompressor {
    pub fn new(encoder: Arc<dyn VideoEncoder>, allowed_extensions: Vec<String>) -> Self {
        Self {
            encoder,
            allowed_extensions,
        }
    }

    /// Compress `input` into a fresh `optimized_<hex>.mp4` under `output_dir`.
    ///
    /// # Errors
    /// - `OptimizeError::UnsupportedFormat` for extensions outside the allow-list
    /// - whatever the encoder reports
    pub async fn compress(
        &self,
        input: &Path,
        output_dir: &Path,
        tier: QualityTier,
    ) -> Result<PathBuf, OptimizeError> {
        if !FileManager::has_allowed_extension(input, &self.allowed_extensions) {
            return Err(OptimizeError::UnsupportedFormat(format!(
                ".{}",
                FileManager::extension_of(input)
            )));
        }

        let output = output_dir.join(format!("optimized_{}.mp4", Uuid::new_v4().simple()));
        let params = EncodeParams::for_tier(tier);
        self.encoder.encode(input, &output, &params).await
    }
}
