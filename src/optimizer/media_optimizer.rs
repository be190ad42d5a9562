//! # Media Optimizer Main Orchestrator
//!
//! Orchestratore di un batch: valida, elabora i file uno alla volta nel
//! workspace del batch, impacchetta gli output sopravvissuti.
//!
//! ## Flusso:
//! 1. contatori `*_batches` (e `image_files_total`) incrementati all'arrivo
//! 2. `Validator` sui limiti del tipo di media
//! 3. creazione del `Workspace` (`ifo_*` / `video_*`)
//! 4. `TaskOptimizer` per ogni file, in ordine
//! 5. `ArchivePackager` sugli output
//!
//! Ogni esito diverso da successo incrementa `*_failures`, tranne il batch vuoto.

use crate::{
    archive::{ArchivePackager, PackagedArchive},
    config::Config,
    debug_log::DebugLog,
    error::{BatchError, OptimizeError},
    file_manager::MediaKind,
    media::UploadBatch,
    metrics::{self, MetricsSink},
    optimizer::{
        path_resolver::ResolvedArtifact,
        progress_tracker::{BatchState, ProgressTracker},
        task_optimizer::TaskOptimizer,
        workspace::Workspace,
    },
    validator::Validator,
    video_processor::{VideoCompressor, VideoEncoder},
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Orchestratore principale dei batch
#[derive(Clone)]
pub struct MediaOptimizer {
    config: Arc<Config>,
    metrics: Arc<dyn MetricsSink>,
    tasks: TaskOptimizer,
    debug_log: DebugLog,
}

impl MediaOptimizer {
    pub fn new(
        config: Arc<Config>,
        metrics: Arc<dyn MetricsSink>,
        encoder: Arc<dyn VideoEncoder>,
    ) -> Self {
        let debug_log = DebugLog::new(&config.storage_dir);
        let tasks = TaskOptimizer::new(
            config.image_limits.allowed_extensions.clone(),
            VideoCompressor::new(encoder, config.video_limits.allowed_extensions.clone()),
            debug_log.clone(),
        );

        Self {
            config,
            metrics,
            tasks,
            debug_log,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn debug_log(&self) -> &DebugLog {
        &self.debug_log
    }

    /// Dispatch a batch on its media kind
    pub async fn optimize(
        &self,
        batch: UploadBatch,
        request_id: &str,
    ) -> Result<PackagedArchive, BatchError> {
        match batch.kind {
            MediaKind::Image => self.optimize_images(batch, request_id).await,
            MediaKind::Video => self.optimize_videos(batch, request_id).await,
        }
    }

    /// Compress an image batch. Files that cannot be compressed are left out of the archive.
    pub async fn optimize_images(
        &self,
        batch: UploadBatch,
        request_id: &str,
    ) -> Result<PackagedArchive, BatchError> {
        self.debug_log
            .append(
                request_id,
                &format!("Received upload request: {} files", batch.len()),
            )
            .await;
        self.metrics.incr(metrics::IMAGE_BATCHES, 1);
        self.metrics.incr(metrics::IMAGE_FILES_TOTAL, batch.len() as u64);

        let mut tracker = ProgressTracker::new(request_id, MediaKind::Image, batch.len());
        let result = self.run_images(&batch, &mut tracker, request_id).await;
        self.conclude(MediaKind::Image, &mut tracker, result, request_id).await
    }

    /// Compress a video batch. Any failing file fails the whole batch.
    pub async fn optimize_videos(
        &self,
        batch: UploadBatch,
        request_id: &str,
    ) -> Result<PackagedArchive, BatchError> {
        self.debug_log
            .append(
                request_id,
                &format!("Video batch received: {} files", batch.len()),
            )
            .await;
        self.metrics.incr(metrics::VIDEO_BATCHES, 1);

        let mut tracker = ProgressTracker::new(request_id, MediaKind::Video, batch.len());
        let result = self.run_videos(&batch, &mut tracker).await;
        self.conclude(MediaKind::Video, &mut tracker, result, request_id).await
    }

    async fn run_images(
        &self,
        batch: &UploadBatch,
        tracker: &mut ProgressTracker,
        request_id: &str,
    ) -> Result<PackagedArchive, BatchError> {
        self.validate(MediaKind::Image, batch)?;
        tracker.advance(BatchState::Processing);

        let workspace = self
            .create_workspace(MediaKind::Image)
            .map_err(BatchError::Infrastructure)?;

        let mut artifacts: Vec<ResolvedArtifact> = Vec::new();
        for file in &batch.files {
            let outcome = self
                .tasks
                .process_image(workspace.path(), file, batch.quality, request_id)
                .await
                .map_err(BatchError::Infrastructure)?;

            match outcome {
                Some(artifact) => {
                    tracker.add_processed();
                    artifacts.push(artifact);
                }
                None => tracker.add_skipped(),
            }
        }

        if artifacts.is_empty() {
            return Err(BatchError::NothingProcessed(MediaKind::Image));
        }

        tracker.advance(BatchState::Packaging);
        ArchivePackager::package(workspace, artifacts, MediaKind::Image)
            .await
            .map_err(BatchError::Infrastructure)
    }

    async fn run_videos(
        &self,
        batch: &UploadBatch,
        tracker: &mut ProgressTracker,
    ) -> Result<PackagedArchive, BatchError> {
        self.validate(MediaKind::Video, batch)?;
        tracker.advance(BatchState::Processing);

        let workspace = self
            .create_workspace(MediaKind::Video)
            .map_err(BatchError::Video)?;

        let mut artifacts = Vec::with_capacity(batch.len());
        for file in &batch.files {
            let output = self
                .tasks
                .process_video(workspace.path(), file, batch.quality)
                .await
                .map_err(BatchError::Video)?;
            tracker.add_processed();
            artifacts.push(ResolvedArtifact::new(output));
        }

        tracker.advance(BatchState::Packaging);
        ArchivePackager::package(workspace, artifacts, MediaKind::Video)
            .await
            .map_err(BatchError::Video)
    }

    fn validate(&self, kind: MediaKind, batch: &UploadBatch) -> Result<(), BatchError> {
        Validator::new(kind, self.config.limits(kind)).validate(&batch.files)?;
        Ok(())
    }

    fn create_workspace(&self, kind: MediaKind) -> Result<Workspace, OptimizeError> {
        Ok(Workspace::create(
            self.config.scratch_dir.as_deref(),
            kind.workspace_prefix(),
        )?)
    }

    /// Record the outcome of a batch in metrics, logs and tracker
    async fn conclude(
        &self,
        kind: MediaKind,
        tracker: &mut ProgressTracker,
        result: Result<PackagedArchive, BatchError>,
        request_id: &str,
    ) -> Result<PackagedArchive, BatchError> {
        match &result {
            Ok(archive) => {
                tracker.advance(BatchState::Complete);
                let message = match kind {
                    MediaKind::Image => "Image batch processed successfully",
                    MediaKind::Video => "Video batch processed successfully",
                };
                self.debug_log
                    .append(
                        request_id,
                        &format!("{}: {} outputs", message, archive.entries.len()),
                    )
                    .await;
                info!(
                    request_id,
                    processed = tracker.processed(),
                    skipped = tracker.skipped(),
                    "✅ {}",
                    tracker.summary()
                );
            }
            Err(e) => {
                tracker.fail();
                if e.counts_as_failure() {
                    let key = match kind {
                        MediaKind::Image => metrics::IMAGE_FAILURES,
                        MediaKind::Video => metrics::VIDEO_FAILURES,
                    };
                    self.metrics.incr(key, 1);
                }

                match e.cause() {
                    Some(cause) => {
                        error!(request_id, "❌ {}: {}", e, cause);
                        self.debug_log
                            .append(request_id, &format!("{}: {}", e, cause))
                            .await;
                    }
                    None => {
                        warn!(request_id, "Rejected {} batch: {}", kind, e);
                        self.debug_log
                            .append(request_id, &format!("Rejected: {}", e))
                            .await;
                    }
                }
            }
        }

        result
    }
}
