//! HTTP server speaking the dashcam's API over a local card directory.
//!
//! Routes:
//!   GET /app/getfilelist?folder=&start=&end=   → windowed folder listing
//!   GET /app/getthumbnail?file=                → thumbnail sidecar (`<file>.jpg`)
//!   GET /app/setparamvalue?param=&value=       → write a parameter
//!   GET /app/getparamvalue?param=              → read a parameter
//!   GET /mnt/card/...                          → recording bodies, streamed

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use dashcam_common::protocol::{
    FileListResponse, GetParamResponse, ParamInfo, ParamQuery, ParamWrite, FILE_LIST_ENDPOINT,
    GET_PARAM_ENDPOINT, SET_PARAM_ENDPOINT, THUMBNAIL_ENDPOINT,
};
use dashcam_common::Category;

use crate::device::{DeviceState, CARD_PREFIX};

/// Build the device router.  Recording bodies are served straight from the
/// card directory, so large files stream in chunks.
pub fn router(state: DeviceState) -> Router {
    let card = ServeDir::new(state.card_dir());

    Router::new()
        .route(FILE_LIST_ENDPOINT, get(file_list))
        .route(THUMBNAIL_ENDPOINT, get(thumbnail))
        .route(SET_PARAM_ENDPOINT, get(set_param))
        .route(GET_PARAM_ENDPOINT, get(get_param))
        .nest_service(CARD_PREFIX, card)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the device API on an already bound listener until the task is
/// dropped.  Tests bind `127.0.0.1:0` and spawn this.
pub async fn serve(listener: TcpListener, state: DeviceState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        debug!("Dashcam simulator serving on {addr}");
    }
    axum::serve(listener, router(state)).await
}

/// Start the HTTP server. Blocks until shutdown.
pub async fn run(
    state: DeviceState,
    listen_addr: &str,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    info!("Dashcam simulator listening on {listen_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
            }
        })
        .await?;

    Ok(())
}

// ── route handlers ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FileListQuery {
    folder: String,
    start: i64,
    end: i64,
}

async fn file_list(
    State(state): State<DeviceState>,
    Query(q): Query<FileListQuery>,
) -> Result<Json<FileListResponse>, StatusCode> {
    if Category::from_device_code(&q.folder).is_none() {
        warn!("Unknown folder code '{}'", q.folder);
        return Ok(Json(FileListResponse {
            result: 1,
            info: vec![],
        }));
    }

    let block = tokio::task::spawn_blocking(move || state.list_window(&q.folder, q.start, q.end))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map_err(|e| {
            warn!("Cannot list folder: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(FileListResponse {
        result: 0,
        info: block.into_iter().collect(),
    }))
}

#[derive(Debug, Deserialize)]
struct ThumbnailQuery {
    file: String,
}

async fn thumbnail(
    State(state): State<DeviceState>,
    Query(q): Query<ThumbnailQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let video = state.card_path(&q.file).ok_or(StatusCode::BAD_REQUEST)?;
    let mut sidecar = video.into_os_string();
    sidecar.push(".jpg");

    let bytes = tokio::fs::read(&sidecar)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}

async fn set_param(
    State(state): State<DeviceState>,
    Query(q): Query<ParamQuery>,
) -> Json<ParamWrite> {
    let parsed = q.value.as_deref().and_then(|v| v.trim().parse::<i64>().ok());
    let Some(value) = parsed else {
        debug!("Rejecting {}={:?}", q.param, q.value);
        return Json(ParamWrite {
            result_code: 1,
            message: "set fail".into(),
        });
    };

    state.set_param(&q.param, value);
    info!("Set {}={}", q.param, value);
    Json(ParamWrite {
        result_code: 0,
        message: "set success".into(),
    })
}

async fn get_param(
    State(state): State<DeviceState>,
    Query(q): Query<ParamQuery>,
) -> Json<GetParamResponse> {
    let (result, value) = match state.get_param(&q.param) {
        Some(v) => (0, v),
        None => (1, -1),
    };
    Json(GetParamResponse {
        result,
        info: ParamInfo { value },
    })
}
