use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// One piece of a multimodal request, in `generateContent` wire form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 encoded bytes.
    pub data: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }
}

/// Anything that can turn a list of parts into a text completion.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, parts: Vec<Part>) -> anyhow::Result<String>;
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Client for the Gemini `generateContent` endpoint.
///
/// Build one at startup and share it; it holds a pooled `reqwest::Client`.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

#[async_trait]
impl ModelBackend for GeminiClient {
    async fn generate(&self, parts: Vec<Part>) -> anyhow::Result<String> {
        let payload = GenerateContentRequest {
            contents: vec![Content { parts }],
        };

        tracing::info!(model = %self.model, "📤 Sending request to Gemini...");

        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .context("request to Gemini failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read Gemini response body")?;
        let preview: String = body.chars().take(500).collect();
        tracing::debug!(status = %status, body = %preview, "Gemini response");

        if !status.is_success() {
            bail!("Gemini API error {}: {}", status, body);
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).context("malformed Gemini response")?;
        extract_text(parsed)
    }
}

fn extract_text(response: GenerateContentResponse) -> anyhow::Result<String> {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| anyhow!("no candidates in Gemini response"))?;

    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        bail!("no text in Gemini response");
    }
    Ok(text)
}
