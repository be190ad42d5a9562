//! # Task Optimizer Module
//!
//! Worker per l'ottimizzazione di singoli file di un batch.
//!
//! ## Politica errori:
//! - Immagini: estensione non supportata, decode/encode falliti e output
//!   introvabile fanno saltare il file (`Ok(None)`); solo gli errori di
//!   materializzazione nel workspace risalgono come `Err`
//! - Video: qualsiasi errore risale al chiamante

use crate::{
    debug_log::DebugLog,
    error::OptimizeError,
    file_manager::FileManager,
    image_processor::ImageProcessor,
    media::{InputFile, QualityTier},
    optimizer::path_resolver::{PathResolver, ResolvedArtifact},
    video_processor::VideoCompressor,
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Worker per elaborazione singoli file
#[derive(Clone)]
pub struct TaskOptimizer {
    image_extensions: Vec<String>,
    video: VideoCompressor,
    debug_log: DebugLog,
}

impl TaskOptimizer {
    /// Crea nuovo task optimizer
    pub fn new(image_extensions: Vec<String>, video: VideoCompressor, debug_log: DebugLog) -> Self {
        Self {
            image_extensions,
            video,
            debug_log,
        }
    }

    /// Compress one uploaded image inside `workspace`.
    ///
    /// Returns `Ok(None)` when the file is skipped.
    pub async fn process_image(
        &self,
        workspace: &Path,
        file: &InputFile,
        tier: QualityTier,
        request_id: &str,
    ) -> Result<Option<ResolvedArtifact>, OptimizeError> {
        let Some(name) = FileManager::sanitize_filename(&file.filename) else {
            debug!("Skipping upload without a usable filename: {:?}", file.filename);
            self.debug_log
                .append(request_id, &format!("Skipping unsupported file: {}", file.filename))
                .await;
            return Ok(None);
        };

        if !FileManager::has_allowed_extension(Path::new(&name), &self.image_extensions) {
            debug!("Skipping unsupported image type: {}", name);
            self.debug_log
                .append(request_id, &format!("Skipping unsupported file: {}", name))
                .await;
            return Ok(None);
        }

        debug!("📥 {} ({})", name, FileManager::format_size(file.data.len() as u64));
        let input = FileManager::materialize(workspace, &name, &file.data).await?;
        let requested = PathResolver::expected_output_path(workspace, &name);

        let compressed = tokio::task::spawn_blocking(move || {
            ImageProcessor::compress_to_path(&input, &requested, tier)
        })
        .await
        .map_err(OptimizeError::from)
        .and_then(|result| result);

        let reported = match compressed {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                self.debug_log
                    .append(request_id, &format!("Image {} skipped: {}", name, e))
                    .await;
                return Ok(None);
            }
        };

        match PathResolver::resolve(workspace, &name, reported) {
            Ok(artifact) => {
                debug!("Compressed {} -> {}", name, artifact.entry_name());
                Ok(Some(artifact))
            }
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                self.debug_log
                    .append(request_id, &format!("Image {} dropped: {}", name, e))
                    .await;
                Ok(None)
            }
        }
    }

    /// Compress one uploaded video inside `workspace`
    pub async fn process_video(
        &self,
        workspace: &Path,
        file: &InputFile,
        tier: QualityTier,
    ) -> Result<PathBuf, OptimizeError> {
        let name = FileManager::sanitize_filename(&file.filename)
            .ok_or_else(|| OptimizeError::UnsupportedFormat(file.filename.clone()))?;

        debug!("📥 {} ({})", name, FileManager::format_size(file.data.len() as u64));
        let input = FileManager::materialize(workspace, &name, &file.data).await?;
        let output = self.video.compress(&input, workspace, tier).await?;

        if !output.is_file() {
            return Err(OptimizeError::ArtifactMissing(name));
        }

        debug!("Compressed {} -> {}", name, output.display());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaLimits;
    use crate::video_processor::{EncodeParams, VideoEncoder};
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct CopyEncoder;

    #[async_trait]
    impl VideoEncoder for CopyEncoder {
        async fn encode(
            &self,
            input: &Path,
            output: &Path,
            _params: &EncodeParams,
        ) -> Result<PathBuf, OptimizeError> {
            tokio::fs::copy(input, output).await?;
            Ok(output.to_path_buf())
        }
    }

    /// Reports success without writing anything
    struct LyingEncoder;

    #[async_trait]
    impl VideoEncoder for LyingEncoder {
        async fn encode(
            &self,
            _input: &Path,
            output: &Path,
            _params: &EncodeParams,
        ) -> Result<PathBuf, OptimizeError> {
            Ok(output.to_path_buf())
        }
    }

    fn optimizer(dir: &Path, encoder: Arc<dyn VideoEncoder>) -> TaskOptimizer {
        TaskOptimizer::new(
            MediaLimits::images().allowed_extensions,
            VideoCompressor::new(encoder, MediaLimits::videos().allowed_extensions),
            DebugLog::new(&dir.join("storage")),
        )
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, image::ImageOutputFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[tokio::test]
    async fn test_image_is_compressed_in_workspace() {
        let dir = TempDir::new().unwrap();
        let task = optimizer(dir.path(), Arc::new(CopyEncoder));

        let artifact = task
            .process_image(
                dir.path(),
                &InputFile::new("../logo.png", png_bytes()),
                QualityTier::Avg,
                "rid",
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(artifact.entry_name(), "optimized_logo.png");
        assert!(artifact.path.starts_with(dir.path()));
    }

    #[tokio::test]
    async fn test_unsupported_and_corrupt_images_are_skipped() {
        let dir = TempDir::new().unwrap();
        let task = optimizer(dir.path(), Arc::new(CopyEncoder));

        let txt = InputFile::new("notes.txt", b"hello".to_vec());
        assert!(task
            .process_image(dir.path(), &txt, QualityTier::Avg, "rid")
            .await
            .unwrap()
            .is_none());

        let broken = InputFile::new("broken.jpg", b"not a jpeg".to_vec());
        assert!(task
            .process_image(dir.path(), &broken, QualityTier::Avg, "rid")
            .await
            .unwrap()
            .is_none());

        let log = std::fs::read_to_string(dir.path().join("storage/error_debug.log")).unwrap();
        assert!(log.contains("[rid] Skipping unsupported file: notes.txt"));
        assert!(log.contains("[rid] Image broken.jpg skipped"));
    }

    #[tokio::test]
    async fn test_video_output_lands_in_workspace() {
        let dir = TempDir::new().unwrap();
        let task = optimizer(dir.path(), Arc::new(CopyEncoder));

        let output = task
            .process_video(
                dir.path(),
                &InputFile::new("clip.mp4", b"frames".to_vec()),
                QualityTier::High,
            )
            .await
            .unwrap();

        assert_eq!(output.parent(), Some(dir.path()));
        assert_eq!(std::fs::read(&output).unwrap(), b"frames");
    }

    #[tokio::test]
    async fn test_video_without_output_is_error() {
        let dir = TempDir::new().unwrap();
        let task = optimizer(dir.path(), Arc::new(LyingEncoder));

        let err = task
            .process_video(
                dir.path(),
                &InputFile::new("clip.webm", b"x".to_vec()),
                QualityTier::Low,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OptimizeError::ArtifactMissing(_)));
    }
}
