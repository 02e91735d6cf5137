use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
};
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::maybe_persist;
use crate::db::ArtifactKind;
use crate::error::BuddyError;
use crate::generators::content::{self, BulkGenerator, ContentKind, GenerationSummary};
use crate::middleware::ApiQuery;
use crate::router::BuddyState;
use crate::types::PersistOptions;
use crate::types::api::{FileMode, FileQuery};

/// Structured documents are built in memory; keep them small.
pub const STRUCTURED_LIMIT: u64 = 10 * 1024 * 1024;

/// Chunks buffered between the generator task and the response body.
const STREAM_BUFFER: usize = 2;

/// Response body stream that raises the cancel flag once dropped, which
/// happens when the client goes away mid-download.
struct CancelOnDrop<S> {
    inner: S,
    cancel: Arc<AtomicBool>,
}

impl<S: Stream + Unpin> Stream for CancelOnDrop<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl<S> Drop for CancelOnDrop<S> {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

fn download_headers(kind: ContentKind, size: u64, mode: FileMode) -> [(HeaderName, String); 3] {
    let suffix = match mode {
        FileMode::Bulk => "",
        FileMode::Structured => "-structured",
    };
    [
        (header::CONTENT_TYPE, kind.mime_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"testdata-{size}{suffix}.{}\"",
                kind.extension()
            ),
        ),
        (
            HeaderName::from_static("x-generator"),
            content::GENERATOR_NAME.to_string(),
        ),
    ]
}

/// GET /api/files/generate?size=&type=&mode=&persist=
pub async fn generate_file(
    State(state): State<BuddyState>,
    ApiQuery(query): ApiQuery<FileQuery>,
) -> Result<Response, BuddyError> {
    state.bulk.check(query.size)?;
    if query.mode == FileMode::Structured && query.size > STRUCTURED_LIMIT {
        return Err(BuddyError::SizeLimitExceeded {
            requested: query.size,
            limit: STRUCTURED_LIMIT,
        });
    }
    if state.file_limiter.check().is_err() {
        return Err(BuddyError::RateLimited);
    }

    let stored = maybe_persist(
        &state,
        ArtifactKind::File,
        &json!({
            "type": query.kind,
            "size": query.size,
            "mimeType": query.kind.mime_type(),
            "mode": match query.mode {
                FileMode::Bulk => "bulk",
                FileMode::Structured => "structured",
            },
        }),
        &PersistOptions {
            persist: query.persist,
            ttl_secs: None,
        },
    )
    .await?;

    let mut response = match query.mode {
        FileMode::Structured => {
            let body = content::generate_content_by_type(query.size as usize, query.kind)?;
            info!(kind = %query.kind, bytes = body.len(), "structured file generated");
            (download_headers(query.kind, query.size, query.mode), body).into_response()
        }
        FileMode::Bulk => stream_bulk(&state, query.kind, query.size).into_response(),
    };

    if let Some(stored) = stored
        && let Ok(v) = HeaderValue::from_str(&stored.artifact_id.to_string())
    {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-artifact-id"), v);
    }
    Ok(response)
}

type BulkTask = JoinHandle<Result<GenerationSummary, BuddyError>>;

/// Run `bulk` in the background. The returned stream is the response body;
/// dropping it raises the cancel flag and the task ends with `Cancelled`.
fn spawn_bulk(
    bulk: BulkGenerator,
    kind: ContentKind,
    size: u64,
) -> (
    impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + Unpin + 'static,
    BulkTask,
) {
    let (mut tx, rx) = mpsc::channel::<Vec<u8>>(STREAM_BUFFER);
    let cancel = Arc::new(AtomicBool::new(false));
    let body_stream = CancelOnDrop {
        inner: rx.map(Ok::<_, std::io::Error>),
        cancel: cancel.clone(),
    };

    let task = tokio::spawn(async move {
        let result = bulk
            .generate(
                size,
                kind,
                &mut tx,
                |p| {
                    debug!(
                        written = p.bytes_written,
                        total = p.total,
                        percent = p.percent,
                        "bulk generation progress"
                    )
                },
                &cancel,
            )
            .await;
        match &result {
            Ok(summary) => info!(
                kind = %summary.kind,
                bytes = summary.bytes_written,
                chunks = summary.chunks,
                "bulk file streamed"
            ),
            Err(BuddyError::Cancelled) => {
                info!(kind = %kind, size, "bulk download cancelled by client")
            }
            Err(e) => warn!(kind = %kind, size, error = %e, "bulk generation aborted"),
        }
        result
    });

    (body_stream, task)
}

fn stream_bulk(state: &BuddyState, kind: ContentKind, size: u64) -> impl IntoResponse {
    let (body_stream, _task) = spawn_bulk(state.bulk.clone(), kind, size);
    (
        [(header::CONTENT_LENGTH, size.to_string())],
        download_headers(kind, size, FileMode::Bulk),
        Body::from_stream(body_stream),
    )
}
