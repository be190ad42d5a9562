//! # Progress Tracking Module
//!
//! Macchina a stati di un batch:
//! `Validating → Processing → Packaging → Complete`, con uscita `Failed`
//! da qualsiasi stato. Le transizioni vengono loggate a livello debug.

use crate::file_manager::MediaKind;
use std::fmt;
use std::time::Instant;
use tracing::debug;

/// Lifecycle state of one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Validating,
    Processing,
    Packaging,
    Complete,
    Failed,
}

impl BatchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, BatchState::Complete | BatchState::Failed)
    }

    fn can_advance_to(self, next: BatchState) -> bool {
        use BatchState::*;
        match (self, next) {
            (Validating, Processing) | (Processing, Packaging) | (Packaging, Complete) => true,
            (state, Failed) => !state.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchState::Validating => "validating",
            BatchState::Processing => "processing",
            BatchState::Packaging => "packaging",
            BatchState::Complete => "complete",
            BatchState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracker dello stato e dei conteggi di un singolo batch
#[derive(Debug)]
pub struct ProgressTracker {
    request_id: String,
    kind: MediaKind,
    state: BatchState,
    submitted: usize,
    processed: usize,
    skipped: usize,
    started: Instant,
}

impl ProgressTracker {
    /// Crea un nuovo tracker in stato `Validating`
    pub fn new(request_id: &str, kind: MediaKind, submitted: usize) -> Self {
        debug!(request_id, %kind, submitted, "Batch state: validating");
        Self {
            request_id: request_id.to_string(),
            kind,
            state: BatchState::Validating,
            submitted,
            processed: 0,
            skipped: 0,
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Passa allo stato successivo; le transizioni non valide vengono ignorate
    pub fn advance(&mut self, next: BatchState) {
        if !self.state.can_advance_to(next) {
            debug!(
                request_id = %self.request_id,
                "Ignoring batch transition {} -> {}",
                self.state,
                next
            );
            return;
        }

        debug!(
            request_id = %self.request_id,
            kind = %self.kind,
            processed = self.processed,
            skipped = self.skipped,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Batch state: {} -> {}",
            self.state,
            next
        );
        self.state = next;
    }

    /// Segna il batch come fallito
    pub fn fail(&mut self) {
        self.advance(BatchState::Failed);
    }

    /// Registra un file elaborato con successo
    pub fn add_processed(&mut self) {
        self.processed += 1;
    }

    /// Registra un file saltato
    pub fn add_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Riepilogo leggibile per il log
    pub fn summary(&self) -> String {
        format!(
            "{} batch {}: {}/{} processed, {} skipped in {:.2}s",
            self.kind,
            self.state,
            self.processed,
            self.submitted,
            self.skipped,
            self.started.elapsed().as_secs_f64()
        )
    }
}
