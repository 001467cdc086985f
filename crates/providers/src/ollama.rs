use crate::{check_status, http_client, EmbedResponse, EmbeddingProvider, ProviderError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Embeddings from a local Ollama daemon.
#[derive(Clone)]
pub struct OllamaProvider {
    client: Client,
    cfg: OllamaConfig,
}

impl OllamaProvider {
    pub fn new(cfg: OllamaConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(cfg.timeout)?,
            cfg,
        })
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingApiResponse {
    embedding: Vec<f32>,
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        let url = format!("{}/api/embeddings", self.cfg.base_url.trim_end_matches('/'));
        // The endpoint embeds one prompt per call.
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            let body = EmbeddingRequest {
                model: &self.cfg.model,
                prompt: text,
            };
            let resp = self.client.post(&url).json(&body).send().await?;
            let parsed: EmbeddingApiResponse = check_status(resp).await?.json().await?;
            if parsed.embedding.is_empty() {
                return Err(ProviderError::InvalidResponse(format!(
                    "model {} returned an empty embedding",
                    self.cfg.model
                )));
            }
            vectors.push(parsed.embedding);
        }
        Ok(EmbedResponse { vectors })
    }
}
