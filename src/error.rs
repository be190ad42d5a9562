//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - `OptimizeError`: errori di un singolo job (decode, encode, ffmpeg, I/O, archivio)
//! - `ValidationError`: rifiuto di un batch prima di qualsiasi elaborazione
//! - `BatchError`: esito fallito di un intero batch, con la classe HTTP da restituire
//!
//! ## Politica di propagazione:
//! - Immagini: gli `OptimizeError` per-file vengono loggati e il file viene saltato
//! - Video: qualsiasi `OptimizeError` diventa `BatchError::Video` (500)
//! - Nessun batch sopravvissuto: `BatchError::NothingProcessed` (400)
//!
//! ## Esempio:
//! ```rust,ignore
//! if !FileManager::has_allowed_extension(path, &self.allowed_extensions) {
//!     return Err(OptimizeError::UnsupportedFormat(ext));
//! }
//! ```

use crate::file_manager::MediaKind;
use std::path::PathBuf;

/// Errors raised while compressing or packaging a single job
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to open image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{format} encoding failed: {message}")]
    Codec {
        format: &'static str,
        message: String,
    },

    #[error("Failed to write image to {path}: {primary}; fallback error: {fallback}")]
    Encode {
        path: PathBuf,
        primary: String,
        fallback: String,
    },

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("FFmpeg error: {0}")]
    FFmpeg(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("No output found for {0}")]
    ArtifactMissing(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Worker task failed: {0}")]
    Task(String),
}

impl OptimizeError {
    pub(crate) fn codec(format: &'static str, message: impl ToString) -> Self {
        Self::Codec {
            format,
            message: message.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for OptimizeError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

/// Reasons a batch is rejected before any processing starts
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No {kind} files uploaded")]
    EmptyBatch { kind: MediaKind },

    #[error("Maximum {max} {kind}s allowed per upload")]
    TooManyFiles { kind: MediaKind, max: usize },

    #[error("Unable to determine file size")]
    SizeIndeterminate { filename: String },

    #[error("Unsupported {kind} type: {extension}")]
    UnsupportedExtension { kind: MediaKind, extension: String },

    #[error("{filename} exceeds {limit_mb} MB limit")]
    FileTooLarge { filename: String, limit_mb: u64 },

    #[error("Total {kind} size exceeds {limit_mb} MB limit")]
    BatchTooLarge { kind: MediaKind, limit_mb: u64 },
}

/// Terminal failure of a whole batch
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("No supported/processed {0} files in upload")]
    NothingProcessed(MediaKind),

    #[error("Video processing failed")]
    Video(#[source] OptimizeError),

    #[error("Processing failed")]
    Infrastructure(#[source] OptimizeError),
}

impl BatchError {
    /// HTTP status class for this failure
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::NothingProcessed(_) => 400,
            Self::Video(_) | Self::Infrastructure(_) => 500,
        }
    }

    /// Description of the underlying cause, only for server-side failures
    pub fn cause(&self) -> Option<String> {
        match self {
            Self::Video(e) | Self::Infrastructure(e) => Some(e.to_string()),
            _ => None,
        }
    }

    /// Whether the batch failure counter should move.
    /// An empty submission is not a failed batch.
    pub fn counts_as_failure(&self) -> bool {
        !matches!(
            self,
            Self::Validation(ValidationError::EmptyBatch { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        let err = ValidationError::TooManyFiles {
            kind: MediaKind::Image,
            max: 5,
        };
        assert_eq!(err.to_string(), "Maximum 5 images allowed per upload");

        let err = ValidationError::FileTooLarge {
            filename: "big.png".to_string(),
            limit_mb: 30,
        };
        assert_eq!(err.to_string(), "big.png exceeds 30 MB limit");

        let err = ValidationError::UnsupportedExtension {
            kind: MediaKind::Video,
            extension: ".avi".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported video type: .avi");
    }

    #[test]
    fn test_batch_error_status() {
        let empty = BatchError::from(ValidationError::EmptyBatch {
            kind: MediaKind::Video,
        });
        assert_eq!(empty.status_code(), 400);
        assert!(!empty.counts_as_failure());
        assert!(empty.cause().is_none());

        let nothing = BatchError::NothingProcessed(MediaKind::Image);
        assert_eq!(nothing.status_code(), 400);
        assert!(nothing.counts_as_failure());
        assert_eq!(
            nothing.to_string(),
            "No supported/processed image files in upload"
        );

        let video = BatchError::Video(OptimizeError::FFmpeg("exit status 1".to_string()));
        assert_eq!(video.status_code(), 500);
        assert_eq!(video.cause().as_deref(), Some("FFmpeg error: exit status 1"));
    }
}
