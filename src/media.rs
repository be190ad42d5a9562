//! # Batch Data Model
//!
//! Tipi che descrivono un batch ricevuto dal client.
//!
//! - `QualityTier`: livello di qualità richiesto (`low`, `avg`, `high`)
//! - `InputFile`: un singolo upload con nome originale, dimensione dichiarata e contenuto
//! - `UploadBatch`: la lista ordinata di upload più tipo di media e qualità

use crate::file_manager::MediaKind;
use bytes::Bytes;
use std::fmt;

/// Quality tier requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityTier {
    Low,
    #[default]
    Avg,
    High,
}

impl QualityTier {
    /// Exact parse: anything that is not `low`, `avg` or `high` means `avg`
    pub fn parse(s: &str) -> Self {
        match s {
            "low" => QualityTier::Low,
            "high" => QualityTier::High,
            _ => QualityTier::Avg,
        }
    }

    /// Encoder quality (0-100) for lossy image formats
    pub fn image_quality(self) -> u8 {
        match self {
            QualityTier::Low => 30,
            QualityTier::Avg => 60,
            QualityTier::High => 85,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityTier::Low => "low",
            QualityTier::Avg => "avg",
            QualityTier::High => "high",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded file
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Filename as sent by the client, possibly empty
    pub filename: String,
    /// Declared size in bytes, `None` when it could not be determined
    pub size: Option<u64>,
    pub data: Bytes,
}

impl InputFile {
    /// File whose declared size is the payload length
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            filename: filename.into(),
            size: Some(data.len() as u64),
            data,
        }
    }
}

/// A batch of uploads for one route
#[derive(Debug, Clone)]
pub struct UploadBatch {
    pub kind: MediaKind,
    pub quality: QualityTier,
    pub files: Vec<InputFile>,
}

impl UploadBatch {
    pub fn new(kind: MediaKind, quality: QualityTier, files: Vec<InputFile>) -> Self {
        Self {
            kind,
            quality,
            files,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
