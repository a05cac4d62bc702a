use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use rusqlite::Connection;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use hearth::db::{get_connection, init_db};
use hearth::ingest::{ingest_file, IngestReport, RowPolicy};
use hearth::settings::load_settings;
use hearth::HearthError;

/// Shared application state. The mutex doubles as the ingestion lock: two
/// uploads in flight are serialized rather than racing to provision the same
/// new payee twice.
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    #[serde(rename = "rowsWritten")]
    rows_written: usize,
}

fn status_for(err: &HearthError) -> StatusCode {
    match err {
        HearthError::NoFileProvided
        | HearthError::MalformedInput(_)
        | HearthError::UnparsableAmount { .. }
        | HearthError::InvalidAccount(_)
        | HearthError::FormatDetectionAmbiguous
        | HearthError::UnknownFormat(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: HearthError) -> Response {
    warn!(error = %err, "upload rejected");
    (status_for(&err), err.to_string()).into_response()
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// POST /api/upload — one statement file per request, multipart field "file".
async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut file = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let original_name = field.file_name().map(|n| n.to_string());
                match field.bytes().await {
                    Ok(bytes) => {
                        file = Some((original_name, bytes));
                        break;
                    }
                    Err(e) => return error_response(HearthError::MalformedInput(e.to_string())),
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => return error_response(HearthError::MalformedInput(e.to_string())),
        }
    }
    let Some((original_name, bytes)) = file else {
        return error_response(HearthError::NoFileProvided);
    };

    let result = tokio::task::spawn_blocking(move || -> Result<IngestReport, HearthError> {
        // The uploaded statement is a scoped resource: it lives in a temp
        // file for the duration of the run and is removed when the guard
        // drops, on success and failure alike.
        let tmp = tempfile::NamedTempFile::new()?;
        std::fs::write(tmp.path(), &bytes)?;

        let conn = state
            .db
            .lock()
            .map_err(|_| HearthError::PersistenceFailed("connection lock poisoned".to_string()))?;
        ingest_file(&conn, tmp.path(), original_name.as_deref(), None, RowPolicy::Abort)
    })
    .await;

    match result {
        Ok(Ok(report)) => {
            info!(
                filename = %report.filename,
                written = report.written,
                updated = report.updated,
                skipped = report.skipped,
                duplicate = report.duplicate_file,
                "statement ingested"
            );
            Json(UploadResponse {
                message: "File uploaded successfully".to_string(),
                rows_written: report.rows_written(),
            })
            .into_response()
        }
        Ok(Err(e)) => error_response(e),
        Err(e) => error_response(HearthError::PersistenceFailed(e.to_string())),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let settings = load_settings();
    let data_dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;
    let conn = get_connection(&data_dir.join("hearth.db")).context("opening database")?;
    init_db(&conn).context("initializing schema")?;

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };
    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/upload", post(upload))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&settings.listen_addr)
        .await
        .with_context(|| format!("binding {}", settings.listen_addr))?;
    info!("listening on {}", settings.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
