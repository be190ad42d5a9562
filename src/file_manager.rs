//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file del workspace di un batch.
//!
//! ## Responsabilità:
//! - Determinazione del tipo di media (immagine vs video) dall'estensione
//! - Normalizzazione dei nomi file ricevuti dal client
//! - Materializzazione degli upload nel workspace
//! - Utilità per formattare dimensioni in modo leggibile
//!
//! ## Formati supportati:
//! - **Immagini**: JPG, JPEG, PNG, WebP, BMP
//! - **Video**: MP4, MOV, WebM
//!
//! ## Esempio:
//! ```rust,ignore
//! if !FileManager::has_allowed_extension(&path, &limits.allowed_extensions) {
//!     // skip or reject
//! }
//! let ext = FileManager::extension_of(Path::new("Photo.JPG")); // "jpg"
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Extensions accepted on the image route (lowercase, no dot)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

/// Extensions accepted on the video route (lowercase, no dot)
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm"];

/// Kind of media a batch carries, decided by the route it arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Default allowed extensions for this kind
    pub fn default_extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_EXTENSIONS,
            MediaKind::Video => VIDEO_EXTENSIONS,
        }
    }

    /// Prefix of the scratch directory created for a batch of this kind
    pub fn workspace_prefix(self) -> &'static str {
        match self {
            MediaKind::Image => "ifo_",
            MediaKind::Video => "video_",
        }
    }

    /// File name under which the archive is offered for download
    pub fn download_name(self) -> &'static str {
        match self {
            MediaKind::Image => "optimized_batch.zip",
            MediaKind::Video => "optimized_videos.zip",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Manages file operations inside a batch workspace
pub struct FileManager;

impl FileManager {
    /// Lowercase extension without the leading dot, empty when missing
    pub fn extension_of(path: &Path) -> String {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    /// Check an extension against an allow-list (case-insensitive)
    pub fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
        let ext = Self::extension_of(path);
        !ext.is_empty() && allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext))
    }

    /// Reduce a client supplied filename to its final component.
    ///
    /// Returns `None` when nothing usable is left (`""`, `"."`, `".."`).
    pub fn sanitize_filename(filename: &str) -> Option<String> {
        // Windows separators are not path separators on unix, strip them too
        let last = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
        Path::new(last)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .map(str::to_string)
    }

    /// Write an uploaded payload into the workspace as `input_<hex>_<name>`
    pub async fn materialize(workspace: &Path, filename: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = workspace.join(format!("input_{}_{}", Uuid::new_v4().simple(), filename));
        fs::write(&path, data).await?;
        Ok(path)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
