//! # Archive Packaging Module
//!
//! Raccoglie gli output sopravvissuti di un batch in un unico zip (Deflated)
//! scritto dentro il workspace come `batch_<hex>.zip`.
//!
//! ## Regole:
//! - ogni artifact entra con il suo nome file effettivo
//! - un artifact che non esiste più viene saltato e loggato
//! - un nome già presente nell'archivio viene saltato e loggato, mai sovrascritto
//! - il `Workspace` viaggia dentro `PackagedArchive` e viene rimosso solo quando
//!   l'archivio (o la risposta che lo trasporta) viene rilasciato

use crate::error::OptimizeError;
use crate::file_manager::MediaKind;
use crate::optimizer::path_resolver::ResolvedArtifact;
use crate::optimizer::workspace::Workspace;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// A finished archive together with the workspace that holds it
#[derive(Debug)]
pub struct PackagedArchive {
    pub path: PathBuf,
    pub download_name: &'static str,
    /// Entry names in archive order
    pub entries: Vec<String>,
    pub workspace: Workspace,
}

impl PackagedArchive {
    pub fn into_parts(self) -> (PathBuf, &'static str, Workspace) {
        (self.path, self.download_name, self.workspace)
    }
}

pub struct ArchivePackager;

impl ArchivePackager {
    /// Zip `artifacts` into the workspace.
    ///
    /// On error the workspace is dropped, and with it removed.
    pub async fn package(
        workspace: Workspace,
        artifacts: Vec<ResolvedArtifact>,
        kind: MediaKind,
    ) -> Result<PackagedArchive, OptimizeError> {
        let path = workspace
            .path()
            .join(format!("batch_{}.zip", Uuid::new_v4().simple()));

        let archive_path = path.clone();
        let entries =
            tokio::task::spawn_blocking(move || write_zip(&archive_path, &artifacts)).await??;

        info!(
            "📦 Packaged {} {} file(s) into {}",
            entries.len(),
            kind,
            path.display()
        );

        Ok(PackagedArchive {
            path,
            download_name: kind.download_name(),
            entries,
            workspace,
        })
    }
}

fn write_zip(path: &Path, artifacts: &[ResolvedArtifact]) -> Result<Vec<String>, OptimizeError> {
    let mut zip = ZipWriter::new(BufWriter::new(File::create(path)?));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        let name = artifact.entry_name();

        if !artifact.exists() {
            warn!("Archive: skipping missing output {}", artifact.path.display());
            continue;
        }
        if !seen.insert(name.clone()) {
            warn!("Archive: skipping duplicate entry {}", name);
            continue;
        }

        zip.start_file(name.as_str(), options)?;
        let mut source = File::open(&artifact.path)?;
        let written = io::copy(&mut source, &mut zip)?;
        debug!("Archive: added {} ({} bytes)", name, written);
        entries.push(name);
    }

    let mut writer = zip.finish()?;
    io::Write::flush(&mut writer)?;
    Ok(entries)
}
