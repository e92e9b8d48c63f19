//! HTTP surface for the pipeline, in place of the original upload widget and
//! download link: upload a document, watch the status, export the calendar.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::cache::{self, Cache};
use crate::extract::{Extractor, RawExtraction};
use crate::session::{ProcessingStatus, Session};
use crate::upload;

/// One user-facing message for every pipeline-level failure; detail goes to
/// the log only.
const GENERIC_EXTRACTION_ERROR: &str =
    "Failed to process syllabus. Please try again with a clearer file.";

/// Bodies between the document limit and this bound still get the
/// descriptive rejection instead of a bare 413.
const BODY_LIMIT: usize = upload::MAX_DOCUMENT_BYTES + 1024 * 1024;

pub struct App {
    session: RwLock<Session>,
    extractor: Extractor,
    cache: Arc<Cache<String, RawExtraction>>,
}

impl App {
    pub fn new(extractor: Extractor, cache: Arc<Cache<String, RawExtraction>>) -> Arc<Self> {
        Arc::new(Self {
            session: RwLock::new(Session::new()),
            extractor,
            cache,
        })
    }
}

pub fn router(app: Arc<App>) -> Router {
    Router::new()
        .route("/syllabus", post(handle_upload))
        .route("/status", get(handle_status))
        .route("/calendar.ics", get(handle_export))
        .route("/events/:id", delete(handle_delete))
        .route("/reset", post(handle_reset))
        .fallback(|| async { Redirect::permanent(env!("CARGO_PKG_REPOSITORY")) })
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(app)
}

async fn handle_upload(State(app): State<Arc<App>>, headers: HeaderMap, body: Bytes) -> Response {
    let declared = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let mime_type = match upload::validate(declared, body.len()) {
        Ok(essence) => essence,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };

    if let Err(err) = app.session.write().await.begin_reading() {
        return (StatusCode::CONFLICT, err.to_string()).into_response();
    }

    // Reading stage: the document is buffered, derive its cache key.
    let key = cache::digest(&body);

    if let Err(err) = app.session.write().await.begin_extracting() {
        warn!(error = %err, "session changed under an in-flight upload");
        return (StatusCode::CONFLICT, err.to_string()).into_response();
    }

    let raw = match app.cache.get(&key).await {
        Some(raw) => raw,
        None => match app.extractor.extract_raw(&body, &mime_type).await {
            Ok(raw) => Arc::clone(&app.cache).insert(key, raw).await,
            Err(err) => {
                warn!(error = %err, "extraction failed");
                let _ = app.session.write().await.fail();
                return (StatusCode::BAD_GATEWAY, GENERIC_EXTRACTION_ERROR).into_response();
            }
        },
    };

    let result = raw.to_result();
    info!(
        course = %result.course_name,
        events = result.events.len(),
        "extraction complete"
    );

    let mut session = app.session.write().await;
    if let Err(err) = session.complete(result) {
        warn!(error = %err, "session changed under an in-flight upload");
        return (StatusCode::CONFLICT, err.to_string()).into_response();
    }

    Json(session.result()).into_response()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    status: ProcessingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_date: Option<NaiveDate>,
}

async fn handle_status(State(app): State<Arc<App>>) -> Json<StatusBody> {
    let session = app.session.read().await;
    Json(StatusBody {
        status: session.status(),
        selected_date: session.selected_date(),
    })
}

async fn handle_export(State(app): State<Arc<App>>) -> Response {
    let session = app.session.read().await;

    let Some(result) = session.result().filter(|result| !result.events.is_empty()) else {
        return (StatusCode::NOT_FOUND, "no extracted events to export").into_response();
    };

    (
        [
            (header::CONTENT_TYPE, "text/calendar".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", result.export_filename()),
            ),
        ],
        result.to_ics().to_string(),
    )
        .into_response()
}

async fn handle_delete(State(app): State<Arc<App>>, Path(id): Path<String>) -> StatusCode {
    if app.session.write().await.delete_event(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn handle_reset(State(app): State<Arc<App>>) -> StatusCode {
    app.session.write().await.reset();
    StatusCode::NO_CONTENT
}
