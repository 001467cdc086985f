use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub embeddings: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub vectors: VectorConfig,
    pub http: HttpConfig,
    pub server: ServerConfig,
    pub loader: LoaderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `ollama` or `openai`.
    pub provider: String,
    pub model: String,
    pub base_url: String,
    /// Vector length shared by the embedding model and the collection index.
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "gemma2".to_string(),
            base_url: "http://localhost:11434".to_string(),
            dimension: 3584,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// `copilot` or `openai`.
    pub provider: String,
    /// Copilot gateway endpoint.
    pub url: Option<String>,
    /// Base URL of an OpenAI-compatible server.
    pub base_url: Option<String>,
    pub model: String,
    pub headers: HashMap<String, String>,
    pub max_description_chars: usize,
    pub max_category_chars: usize,
    pub fallback_category: String,
    pub categories: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "copilot".to_string(),
            url: None,
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            headers: HashMap::new(),
            max_description_chars: 512,
            max_category_chars: 64,
            fallback_category: "未分类".to_string(),
            categories: default_categories(),
        }
    }
}

/// Top-level classes of the health data-element directory.
fn default_categories() -> Vec<String> {
    [
        "标识",
        "人口学及社会经济学特征",
        "健康史",
        "健康危险因素",
        "主诉与症状",
        "体格检查",
        "临床辅助检查",
        "实验室检查",
        "医学诊断",
        "医学评估",
        "计划与干预",
        "卫生费用",
        "卫生机构",
        "卫生人员",
        "药品、设备与材料",
        "卫生管理",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    /// `qdrant` or `memory`.
    pub provider: String,
    pub url: String,
    pub collection: String,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            provider: "qdrant".to_string(),
            url: "http://localhost:6333".to_string(),
            collection: "WingptBusinessDataElement".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Pause after every row to stay under the generation service's rate limit.
    pub delay_ms: u64,
    pub name_column: String,
    pub category_column: Option<String>,
    pub source_column: String,
    pub id_column: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delay_ms: 3000,
            name_column: "name".to_string(),
            category_column: Some("category".to_string()),
            source_column: "dataSource".to_string(),
            id_column: "UUID".to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(config::Environment::with_prefix("RESOLVER").separator("__"));
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(raw: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = from_toml("");
        assert_eq!(cfg.embeddings.dimension, 3584);
        assert_eq!(cfg.vectors.collection, "WingptBusinessDataElement");
        assert_eq!(cfg.loader.delay(), Duration::from_secs(3));
        assert_eq!(cfg.http.timeout(), Duration::from_secs(60));
        assert!(!cfg.generation.categories.is_empty());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = from_toml(
            r#"
            [vectors]
            provider = "memory"

            [generation]
            url = "http://copilot.local/chat"
            categories = ["实验室检查"]

            [generation.headers]
            Authorization = "Bearer t"
            "#,
        );
        assert_eq!(cfg.vectors.provider, "memory");
        assert_eq!(cfg.vectors.url, "http://localhost:6333");
        assert_eq!(cfg.generation.url.as_deref(), Some("http://copilot.local/chat"));
        assert_eq!(cfg.generation.categories, vec!["实验室检查".to_string()]);
        assert_eq!(cfg.generation.max_description_chars, 512);
        assert_eq!(cfg.generation.headers.len(), 1);
    }

    #[test]
    fn environment_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolver.toml");
        std::fs::write(
            &path,
            "[vectors]\nprovider = \"qdrant\"\ncollection = \"FromFile\"\n",
        )
        .unwrap();

        std::env::set_var("RESOLVER__VECTORS__PROVIDER", "memory");
        let loaded = load(path.to_str());
        std::env::remove_var("RESOLVER__VECTORS__PROVIDER");

        let cfg = loaded.unwrap();
        assert_eq!(cfg.vectors.provider, "memory");
        assert_eq!(cfg.vectors.collection, "FromFile");
        assert_eq!(cfg.vectors.url, "http://localhost:6333");
    }
}
