//! # Path Resolution Module
//!
//! Centralizza la logica dei path di output dentro il workspace di un batch.
//!
//! Il path restituito dal compressore è autoritativo; la ricerca per prefisso
//! `optimized_<base>` è solo un lookup secondario per quando quel path non esiste.

use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// An output file that is known to have been written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Actual location on disk
    pub path: PathBuf,
    /// Actual extension, lowercase and without the dot
    pub extension: String,
}

impl ResolvedArtifact {
    pub fn new(path: PathBuf) -> Self {
        let extension = FileManager::extension_of(&path);
        Self { path, extension }
    }

    /// Name of the entry inside the archive
    pub fn entry_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Utility per calcolare e ritrovare i path di output
pub struct PathResolver;

impl PathResolver {
    /// Requested output path for an upload: `optimized_<base><ext>` in the workspace
    pub fn expected_output_path(workspace: &Path, original_name: &str) -> PathBuf {
        workspace.join(format!(
            "{}{}",
            Self::output_prefix(original_name),
            Self::dotted_extension(original_name)
        ))
    }

    /// `optimized_<base>`, the prefix every output for this upload starts with
    pub fn output_prefix(original_name: &str) -> String {
        let base = Path::new(original_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        format!("optimized_{}", base)
    }

    fn dotted_extension(original_name: &str) -> String {
        Path::new(original_name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Files directly inside the workspace whose name starts with `prefix`, sorted by name
    pub fn find_by_prefix(workspace: &Path, prefix: &str) -> Vec<PathBuf> {
        let mut matches: Vec<PathBuf> = WalkDir::new(workspace)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(prefix))
            .map(|entry| entry.into_path())
            .collect();
        matches.sort();
        matches
    }

    /// Confirm where the output for `original_name` actually is.
    ///
    /// # Errors
    /// `OptimizeError::ArtifactMissing` when neither the reported path nor any
    /// prefixed file exists.
    pub fn resolve(
        workspace: &Path,
        original_name: &str,
        reported: ResolvedArtifact,
    ) -> Result<ResolvedArtifact, OptimizeError> {
        if reported.exists() {
            return Ok(reported);
        }

        let prefix = Self::output_prefix(original_name);
        debug!(
            "Reported output {} missing, searching workspace for {}*",
            reported.path.display(),
            prefix
        );

        Self::find_by_prefix(workspace, &prefix)
            .into_iter()
            .next()
            .map(ResolvedArtifact::new)
            .ok_or_else(|| OptimizeError::ArtifactMissing(original_name.to_string()))
    }
}
