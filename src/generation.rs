//! Text generation providers.
//!
//! | Config value | Provider | Endpoint |
//! |--------------|----------|----------|
//! | `"ollama"` | [`OllamaGenerator`] | `POST {url}/api/generate` with `stream: false` |
//! | `"openai"` | [`OpenAIGenerator`] | `POST /v1/chat/completions`, one user message |
//!
//! One request per prompt: no retry, no rate limiting. Failures carry the
//! HTTP status or the connection error so the advisor diagnostic can show it.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

use pantry_core::generation::Generator;

use crate::config::GenerationConfig;
use crate::embedding::{http_client, DEFAULT_OLLAMA_URL};

/// Build the generator named by `config.provider`.
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaGenerator::new(config)?)),
        "openai" => Ok(Arc::new(OpenAIGenerator::new(config)?)),
        other => bail!("Unknown generation provider: {}", other),
    }
}

async fn post_json(
    request: reqwest::RequestBuilder,
    body: &serde_json::Value,
    service: &str,
    url: &str,
) -> Result<serde_json::Value> {
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("{} connection error ({}): {}", service, url, e))?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        bail!("{} API error {}: {}", service, status, body_text);
    }

    Ok(response.json().await?)
}

// ============ Ollama ============

pub struct OllamaGenerator {
    model: String,
    url: String,
    client: reqwest::Client,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        Ok(Self {
            model: config.model.clone(),
            url: config
                .url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });
        let json = post_json(self.client.post(&url), &body, "Ollama", &url).await?;
        parse_ollama_response(&json)
    }
}

fn parse_ollama_response(json: &serde_json::Value) -> Result<String> {
    if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
        bail!("Ollama error: {}", err);
    }
    json.get("response")
        .and_then(|r| r.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid Ollama response: missing response text"))
}

// ============ OpenAI ============

pub struct OpenAIGenerator {
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAIGenerator {
    /// Fails if `OPENAI_API_KEY` is not set.
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self {
            model: config.model.clone(),
            api_key,
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = "https://api.openai.com/v1/chat/completions";
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let request = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key));
        let json = post_json(request, &body, "OpenAI", url).await?;
        parse_openai_response(&json)
    }
}

fn parse_openai_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            anyhow::anyhow!("Invalid OpenAI response: missing choices[0].message.content")
        })
}
