use crate::config::GenerationConfig;
use crate::describer::sanitize;
use providers::{LlmProvider, ProviderError};
use tracing::{debug, warn};

const CATEGORY_STRIP: &[char] = &['“', '”', '‘', '’', '"', '\'', ' '];

pub fn category_prompt(name: &str, categories: &[String]) -> String {
    format!(
        "数据元\"{name}\"最匹配以下哪个数据元分类：\"{}\"，直接返回分类名称，不要包含多余字符",
        categories.join("、")
    )
}

/// Accepts a sanitised label only if it has a plausible shape and, when a
/// vocabulary is configured, belongs to it.
pub fn accept_category(raw: &str, cfg: &GenerationConfig) -> String {
    let label = sanitize(raw, CATEGORY_STRIP);
    let label = label.trim_end_matches(['。', '.']);
    let len = label.chars().count();
    let known = cfg.categories.is_empty() || cfg.categories.iter().any(|c| c == label);
    if len == 0 || len > cfg.max_category_chars || !known {
        warn!(label, "category outside vocabulary, using fallback");
        return cfg.fallback_category.clone();
    }
    label.to_string()
}

pub async fn classify(
    llm: &dyn LlmProvider,
    name: &str,
    cfg: &GenerationConfig,
) -> Result<String, ProviderError> {
    let resp = llm
        .complete(&category_prompt(name, &cfg.categories))
        .await?;
    let category = accept_category(&resp.text, cfg);
    debug!(name, %category, "category assigned");
    Ok(category)
}
