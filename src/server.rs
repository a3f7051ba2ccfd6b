use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::generator::Generator;
use crate::shell::{Mode, Shell, ShellView, UploadedImage};

pub struct AppState {
    generator: Generator,
    shell: Mutex<Shell>,
    model: String,
}

impl AppState {
    pub fn new(generator: Generator, model: impl Into<String>) -> Self {
        Self {
            generator,
            shell: Mutex::new(Shell::new()),
            model: model.into(),
        }
    }
}

#[derive(Deserialize)]
struct ModeRequest {
    mode: Mode,
}

#[derive(Deserialize)]
struct TriggerWordRequest {
    trigger_word: String,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    #[serde(flatten)]
    pub state: ShellView,
    pub model: String,
    pub processing_time_ms: u128,
}

pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/state", get(get_state))
        .route("/api/mode", post(set_mode))
        .route("/api/image", post(upload_image).delete(clear_image))
        .route("/api/trigger-word", post(set_trigger_word))
        .route("/api/generate", post(generate))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

async fn get_state(State(state): State<Arc<AppState>>) -> Json<ShellView> {
    Json(state.shell.lock().await.snapshot())
}

async fn set_mode(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ModeRequest>,
) -> Json<ShellView> {
    let mut shell = state.shell.lock().await;
    shell.set_mode(req.mode);
    Json(shell.snapshot())
}

async fn set_trigger_word(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TriggerWordRequest>,
) -> Json<ShellView> {
    let mut shell = state.shell.lock().await;
    shell.set_trigger_word(req.trigger_word);
    Json(shell.snapshot())
}

async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ShellView>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let display_name = field.file_name().unwrap_or("image").to_string();
        let declared = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        if data.is_empty() {
            return Err(AppError::BadUpload("file is empty".into()));
        }

        let image = UploadedImage {
            data: general_purpose::STANDARD.encode(&data),
            display_name,
            mime_type: detect_mime_type(declared.as_deref(), &data),
        };

        let mut shell = state.shell.lock().await;
        shell.upload_image(image);
        return Ok(Json(shell.snapshot()));
    }

    Err(AppError::BadUpload("missing `image` field".into()))
}

async fn clear_image(State(state): State<Arc<AppState>>) -> Json<ShellView> {
    let mut shell = state.shell.lock().await;
    shell.clear_image();
    Json(shell.snapshot())
}

async fn generate(State(state): State<Arc<AppState>>) -> Json<GenerateResponse> {
    let start = Instant::now();

    let submission = state.shell.lock().await.begin_submit();
    let view = match submission {
        Ok(sub) => {
            let result = state
                .generator
                .generate(
                    sub.mode,
                    &sub.image.data,
                    &sub.image.mime_type,
                    &sub.trigger_word,
                )
                .await;
            let mut shell = state.shell.lock().await;
            shell.finish_submit(sub.ticket, result);
            shell.snapshot()
        }
        Err(_) => state.shell.lock().await.snapshot(),
    };

    Json(GenerateResponse {
        state: view,
        model: state.model.clone(),
        processing_time_ms: start.elapsed().as_millis(),
    })
}

/// Prefers the browser's declared type, falls back to sniffing the bytes.
fn detect_mime_type(declared: Option<&str>, data: &[u8]) -> String {
    if let Some(mime) = declared.filter(|m| m.starts_with("image/")) {
        return mime.to_string();
    }
    image::guess_format(data)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}
