//! Service wiring shared by the query and create paths.

use crate::config::{AppConfig, GenerationConfig};
use crate::similarity::SimilarityError;
use crate::vectorstore::{MemoryVectorStore, QdrantStore, VectorStore};
use anyhow::Context;
use providers::copilot::{CopilotConfig, CopilotProvider};
use providers::ollama::{OllamaConfig, OllamaProvider};
use providers::openai::{OpenAiConfig, OpenAiProvider};
use providers::qdrant::{QdrantClient, QdrantConfig};
use providers::{EmbeddingProvider, LlmProvider, ProviderError, ProviderRegistry};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("generation service: {0}")]
    Generation(#[source] ProviderError),
    #[error("embedding service: {0}")]
    Embedding(#[source] ProviderError),
    #[error("embedding service returned no vector")]
    EmptyEmbedding,
    #[error("vector store: {0:#}")]
    Store(anyhow::Error),
    #[error("similarity: {0}")]
    Similarity(#[from] SimilarityError),
}

/// Long-lived collaborator handles, built once per process.
#[derive(Clone)]
pub struct Services {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub llm: Arc<dyn LlmProvider>,
    pub store: Arc<dyn VectorStore>,
    pub generation: GenerationConfig,
    pub dimension: usize,
}

pub fn build_services(config: &AppConfig) -> anyhow::Result<Services> {
    let registry = build_registry(config)?;
    let services = Services {
        embedder: registry.embedding(None)?,
        llm: registry.llm(None)?,
        store: build_vector_store(config)?,
        generation: config.generation.clone(),
        dimension: config.embeddings.dimension,
    };
    info!(
        embeddings = %config.embeddings.provider,
        generation = %config.generation.provider,
        vectors = %config.vectors.provider,
        "services ready"
    );
    Ok(services)
}

pub fn build_registry(config: &AppConfig) -> anyhow::Result<ProviderRegistry> {
    let timeout = config.http.timeout();
    let openai_key = std::env::var("OPENAI_API_KEY").ok();
    let mut reg = ProviderRegistry::new();

    match config.embeddings.provider.as_str() {
        "ollama" => {
            let provider = OllamaProvider::new(OllamaConfig {
                base_url: config.embeddings.base_url.clone(),
                model: config.embeddings.model.clone(),
                timeout,
            })?;
            reg = reg.with_embedding("ollama", Arc::new(provider));
        }
        "openai" => {
            let provider = OpenAiProvider::new(OpenAiConfig {
                api_key: openai_key.clone(),
                base_url: config.embeddings.base_url.clone(),
                embedding_model: config.embeddings.model.clone(),
                chat_model: config.generation.model.clone(),
                timeout,
            })?;
            reg = reg.with_embedding("openai", Arc::new(provider));
        }
        other => anyhow::bail!("unknown embedding provider: {other}"),
    }

    match config.generation.provider.as_str() {
        "copilot" => {
            let url = config
                .generation
                .url
                .clone()
                .context("generation.url is required for the copilot provider")?;
            let mut headers = config.generation.headers.clone();
            if let Ok(auth) = std::env::var("COPILOT_AUTHORIZATION") {
                headers.insert("authorization".to_string(), auth);
            }
            let provider = CopilotProvider::new(CopilotConfig {
                url,
                headers,
                timeout,
            })?;
            reg = reg.with_llm("copilot", Arc::new(provider));
        }
        "openai" => {
            let base_url = config
                .generation
                .base_url
                .clone()
                .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
                .context("generation.base_url is required for the openai provider")?;
            let provider = OpenAiProvider::new(OpenAiConfig {
                api_key: openai_key,
                base_url,
                embedding_model: config.embeddings.model.clone(),
                chat_model: config.generation.model.clone(),
                timeout,
            })?;
            reg = reg.with_llm("openai", Arc::new(provider));
        }
        other => anyhow::bail!("unknown generation provider: {other}"),
    }

    Ok(reg
        .set_preferred_embedding(&config.embeddings.provider)
        .set_preferred_llm(&config.generation.provider))
}

pub fn build_vector_store(config: &AppConfig) -> anyhow::Result<Arc<dyn VectorStore>> {
    match config.vectors.provider.as_str() {
        "qdrant" => {
            let client = QdrantClient::new(QdrantConfig {
                url: config.vectors.url.clone(),
                collection: config.vectors.collection.clone(),
                api_key: std::env::var("QDRANT_API_KEY").ok(),
                timeout: config.http.timeout(),
            })?;
            Ok(Arc::new(QdrantStore::new(client)))
        }
        "memory" => Ok(Arc::new(MemoryVectorStore::new())),
        other => anyhow::bail!("unknown vector store provider: {other}"),
    }
}
