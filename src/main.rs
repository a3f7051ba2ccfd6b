use std::sync::Arc;

use anyhow::Context;
use lora_caption_studio::{
    server::{self, AppState},
    Config, GeminiClient, Generator,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let client = GeminiClient::new(&config);
    let generator = Generator::new(Arc::new(client));
    let state = Arc::new(AppState::new(generator, config.model.clone()));
    let app = server::router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("🚀 Server running on http://{}", config.bind_addr);
    tracing::info!("📸 Open in your browser to start captioning! (model: {})", config.model);

    axum::serve(listener, app).await?;
    Ok(())
}
