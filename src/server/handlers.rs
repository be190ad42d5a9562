//! HTTP handlers for the batch routes, metrics and health.

use crate::archive::PackagedArchive;
use crate::error::BatchError;
use crate::file_manager::MediaKind;
use crate::media::{InputFile, QualityTier, UploadBatch};
use crate::optimizer::Workspace;
use crate::server::request_context::RequestId;
use crate::server::AppState;
use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use bytes::Bytes;
use futures::Stream;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::io::ReaderStream;

/// Multipart field carrying the uploads
pub const FILES_FIELD: &str = "files[]";
/// Multipart field carrying the quality tier
pub const QUALITY_FIELD: &str = "quality";

/// JSON body of every failed batch
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

impl From<&BatchError> for ErrorResponse {
    fn from(err: &BatchError) -> Self {
        Self {
            message: err.to_string(),
            error: err.cause(),
        }
    }
}

fn batch_error(err: &BatchError) -> HandlerError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err)))
}

/// POST /api/upload
pub async fn upload_images(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    run_batch(state, request_id, MediaKind::Image, multipart).await
}

/// POST /api/video/optimize
pub async fn optimize_videos(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    run_batch(state, request_id, MediaKind::Video, multipart).await
}

/// GET /api/metrics
pub async fn metrics(State(state): State<AppState>) -> Json<BTreeMap<&'static str, u64>> {
    Json(state.metrics.snapshot())
}

/// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn run_batch(
    state: AppState,
    request_id: RequestId,
    kind: MediaKind,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    // A body that is not multipart carries no files and is rejected as an empty batch
    let batch = match multipart {
        Ok(multipart) => match read_batch(multipart, kind).await {
            Ok(batch) => batch,
            Err(err) => return err.into_response(),
        },
        Err(rejection) => {
            tracing::warn!("Request is not a multipart upload: {}", rejection.body_text());
            UploadBatch::new(kind, QualityTier::default(), Vec::new())
        }
    };
    if batch.is_empty() {
        tracing::debug!("No {} files in request {}", kind, request_id.as_str());
    }

    match state.optimizer.optimize(batch, request_id.as_str()).await {
        Ok(archive) => archive_response(archive).await,
        Err(err) => batch_error(&err).into_response(),
    }
}

/// Collect every `files[]` part and the optional `quality` part
async fn read_batch(mut multipart: Multipart, kind: MediaKind) -> Result<UploadBatch, HandlerError> {
    let mut files = Vec::new();
    let mut quality = QualityTier::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart: {}", e);
        (e.status(), Json(ErrorResponse::new(e.body_text())))
    })? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            FILES_FIELD => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    (e.status(), Json(ErrorResponse::new(e.body_text())))
                })?;
                files.push(InputFile::new(filename, data));
            }
            QUALITY_FIELD => {
                let value = field.text().await.map_err(|e| {
                    (e.status(), Json(ErrorResponse::new(e.body_text())))
                })?;
                quality = QualityTier::parse(&value);
            }
            _ => tracing::debug!("Ignoring multipart field {:?}", name),
        }
    }

    Ok(UploadBatch::new(kind, quality, files))
}

/// Zip body that keeps the batch workspace alive until the body is dropped
pub struct ArchiveStream {
    inner: ReaderStream<tokio::fs::File>,
    _workspace: Workspace,
}

impl ArchiveStream {
    pub fn new(file: tokio::fs::File, workspace: Workspace) -> Self {
        Self {
            inner: ReaderStream::new(file),
            _workspace: workspace,
        }
    }
}

impl Stream for ArchiveStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

async fn archive_response(archive: PackagedArchive) -> Response {
    let (path, download_name, workspace) = archive.into_parts();

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!("Failed to open archive {}: {}", path.display(), e);
            let body = ErrorResponse {
                message: "Processing failed".to_string(),
                error: Some(e.to_string()),
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }
    };
    let length = file.metadata().await.ok().map(|m| m.len());

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download_name),
        );
    if let Some(length) = length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(ArchiveStream::new(file, workspace)))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to build response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}
