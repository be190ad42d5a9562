//! Plain-text debug log appended under the storage directory.
//!
//! Una riga per evento: `<timestamp UTC ISO-8601> [<request-id>] <messaggio>`.
//! Il file non viene mai ruotato e gli errori di scrittura vengono ignorati.
//! Le scritture passano da `tokio::fs`, quindi non bloccano il task della richiesta.

use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub const DEBUG_LOG_FILE: &str = "error_debug.log";

#[derive(Debug, Clone)]
pub struct DebugLog {
    path: PathBuf,
}

impl DebugLog {
    pub fn new(storage_dir: &Path) -> Self {
        Self {
            path: storage_dir.join(DEBUG_LOG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line, mirrored to tracing at debug level
    pub async fn append(&self, request_id: &str, message: &str) {
        tracing::debug!(request_id, "{}", message);

        let line = format!(
            "{} [{}] {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            request_id,
            message
        );

        if let Err(e) = self.write_line(&line).await {
            tracing::trace!("Debug log write failed: {}", e);
        }
    }

    async fn write_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
