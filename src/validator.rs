//! # Batch Validator
//!
//! Controlla un batch contro i `MediaLimits` del suo tipo prima di toccare il disco.
//!
//! Le regole sono applicate nell'ordine, ciascuna su tutto il batch, e vince il primo errore:
//! 1. batch vuoto
//! 2. numero di file oltre il massimo
//! 3. dimensione dichiarata sconosciuta
//! 4. estensione non ammessa (solo video: le immagini vengono saltate più avanti)
//! 5. file oltre il limite per file
//! 6. somma delle dimensioni oltre il limite del batch

use crate::config::{MediaLimits, MB};
use crate::error::ValidationError;
use crate::file_manager::{FileManager, MediaKind};
use crate::media::InputFile;
use std::path::Path;

/// Read-only gatekeeper for one kind of batch
pub struct Validator<'a> {
    kind: MediaKind,
    limits: &'a MediaLimits,
}

impl<'a> Validator<'a> {
    pub fn new(kind: MediaKind, limits: &'a MediaLimits) -> Self {
        Self { kind, limits }
    }

    pub fn validate(&self, files: &[InputFile]) -> Result<(), ValidationError> {
        if files.is_empty() {
            return Err(ValidationError::EmptyBatch { kind: self.kind });
        }

        if files.len() > self.limits.max_files {
            return Err(ValidationError::TooManyFiles {
                kind: self.kind,
                max: self.limits.max_files,
            });
        }

        if let Some(file) = files.iter().find(|f| f.size.is_none()) {
            return Err(ValidationError::SizeIndeterminate {
                filename: file.filename.clone(),
            });
        }

        // Unsupported images are skipped during processing, videos are rejected here
        if self.kind == MediaKind::Video {
            for file in files {
                let name = FileManager::sanitize_filename(&file.filename).unwrap_or_default();
                let path = Path::new(&name);
                if !FileManager::has_allowed_extension(path, &self.limits.allowed_extensions) {
                    let ext = FileManager::extension_of(path);
                    return Err(ValidationError::UnsupportedExtension {
                        kind: self.kind,
                        extension: if ext.is_empty() { ext } else { format!(".{}", ext) },
                    });
                }
            }
        }

        let mut total_size = 0u64;
        for file in files {
            let size = file.size.unwrap_or_default();
            if size > self.limits.max_file_size {
                return Err(ValidationError::FileTooLarge {
                    filename: file.filename.clone(),
                    limit_mb: self.limits.max_file_size / MB,
                });
            }
            total_size += size;
        }

        if total_size > self.limits.max_total_size {
            return Err(ValidationError::BatchTooLarge {
                kind: self.kind,
                limit_mb: self.limits.max_total_size / MB,
            });
        }

        Ok(())
    }
}
