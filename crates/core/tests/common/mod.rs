#![allow(dead_code)]

use providers::{
    CompletionResponse, EmbedResponse, EmbeddingProvider, LlmProvider, ProviderError,
};
use resolver_core::config::GenerationConfig;
use resolver_core::models::{DataElementRecord, StoredElement};
use resolver_core::vectorstore::{MemoryVectorStore, VectorStore};
use resolver_core::Services;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Answers description prompts from a table and category prompts with a fixed label.
#[derive(Default)]
pub struct ScriptedLlm {
    pub descriptions: HashMap<String, String>,
    pub category: String,
    /// Prompts containing this text fail.
    pub fail_on: Option<String>,
    pub category_calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..Self::default()
        }
    }

    pub fn describe(mut self, name: &str, description: &str) -> Self {
        self.descriptions
            .insert(name.to_string(), description.to_string());
        self
    }

    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError> {
        if let Some(needle) = &self.fail_on {
            if prompt.contains(needle.as_str()) {
                return Err(ProviderError::RequestFailed("connection refused".into()));
            }
        }
        if prompt.starts_with("数据元") {
            self.category_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(CompletionResponse {
                text: format!("“{}”", self.category),
            });
        }
        let text = self
            .descriptions
            .iter()
            .find(|(name, _)| prompt.contains(&format!("'{name}'")))
            .map(|(_, d)| d.clone())
            .unwrap_or_else(|| "名称：未知，定义：未知。".to_string());
        Ok(CompletionResponse { text })
    }
}

/// Embeds known texts from a table, anything else as `fallback`.
pub struct TableEmbedder {
    pub vectors: HashMap<String, Vec<f32>>,
    pub fallback: Vec<f32>,
    pub fail: bool,
}

impl TableEmbedder {
    pub fn new(fallback: Vec<f32>) -> Self {
        Self {
            vectors: HashMap::new(),
            fallback,
            fail: false,
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(vec![1.0])
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TableEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        if self.fail {
            return Err(ProviderError::Status {
                status: 503,
                body: "model loading".into(),
            });
        }
        Ok(EmbedResponse {
            vectors: texts
                .iter()
                .map(|t| self.vectors.get(t).cloned().unwrap_or_else(|| self.fallback.clone()))
                .collect(),
        })
    }
}

/// Reads succeed with nothing, writes always fail.
pub struct ReadOnlyStore;

#[async_trait::async_trait]
impl VectorStore for ReadOnlyStore {
    async fn nearest(&self, _vector: &[f32], _limit: usize) -> anyhow::Result<Vec<StoredElement>> {
        Ok(Vec::new())
    }

    async fn anchored(&self, _id: Uuid) -> anyhow::Result<Option<StoredElement>> {
        Ok(None)
    }

    async fn upsert(&self, _record: DataElementRecord) -> anyhow::Result<()> {
        anyhow::bail!("collection is read-only")
    }

    async fn reset(&self, _dimension: usize) -> anyhow::Result<()> {
        anyhow::bail!("collection is read-only")
    }
}

/// Ranks the same elements for every query; writes go nowhere.
pub struct FixedStore {
    pub ranked: Vec<StoredElement>,
}

#[async_trait::async_trait]
impl VectorStore for FixedStore {
    async fn nearest(&self, _vector: &[f32], limit: usize) -> anyhow::Result<Vec<StoredElement>> {
        Ok(self.ranked.iter().take(limit).cloned().collect())
    }

    async fn anchored(&self, _id: Uuid) -> anyhow::Result<Option<StoredElement>> {
        Ok(None)
    }

    async fn upsert(&self, _record: DataElementRecord) -> anyhow::Result<()> {
        Ok(())
    }

    async fn reset(&self, _dimension: usize) -> anyhow::Result<()> {
        Ok(())
    }
}

pub fn generation() -> GenerationConfig {
    GenerationConfig {
        categories: vec!["实验室检查".to_string(), "体格检查".to_string()],
        ..GenerationConfig::default()
    }
}

pub fn services(
    llm: ScriptedLlm,
    embedder: TableEmbedder,
    store: Arc<dyn VectorStore>,
) -> Services {
    Services {
        embedder: Arc::new(embedder),
        llm: Arc::new(llm),
        store,
        generation: generation(),
        dimension: 3,
    }
}

pub fn memory_store() -> Arc<MemoryVectorStore> {
    Arc::new(MemoryVectorStore::new())
}
