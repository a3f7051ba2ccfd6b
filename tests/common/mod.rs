#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use lora_caption_studio::{
    server::{self, AppState},
    Generator, ModelBackend, Part,
};

/// Backend that records every request and answers with a fixed reply.
pub struct MockBackend {
    reply: Result<String, String>,
    pub calls: Mutex<Vec<Vec<Part>>>,
}

impl MockBackend {
    pub fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn instruction_text(&self, call: usize) -> String {
        let calls = self.calls.lock().unwrap();
        calls[call]
            .iter()
            .find_map(|part| match part {
                Part::Text { text } => Some(text.clone()),
                _ => None,
            })
            .expect("request should carry instructions")
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    async fn generate(&self, parts: Vec<Part>) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(parts);
        self.reply.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

pub fn app_with(backend: Arc<MockBackend>) -> Router {
    let state = Arc::new(AppState::new(Generator::new(backend), "mock-model"));
    server::router(state, 10 * 1024 * 1024)
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A 1x1 PNG.
pub fn pixel_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(1, 1, image::Rgb([34, 139, 34]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
    bytes
}
