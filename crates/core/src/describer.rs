//! One-sentence definitions for data elements, written by the generation service.

use crate::config::GenerationConfig;
use providers::{LlmProvider, ProviderError};
use tracing::{debug, warn};

/// Brackets, quotes and spaces the model tends to wrap its answer in.
const DESCRIPTION_STRIP: &[char] = &[
    '[', ']', '{', '}', '(', ')', ' ', '"', '\'', '“', '”', '’', '‘',
];

pub fn description_prompt(name: &str) -> String {
    format!(
        "请使用中文以格式“名称：， 定义：”给出医学相关中文数据元：'{name}'的定义，定义只要一句话，名称直接填写数据元'{name}'本身，直接返回结果，不要包含多余内容。"
    )
}

/// Removes every character of `strip` and trims surrounding whitespace.
pub fn sanitize(raw: &str, strip: &[char]) -> String {
    raw.chars()
        .filter(|c| !strip.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn fallback_description(name: &str) -> String {
    format!("名称：{name}，定义：{name}")
}

/// Sanitises a raw answer, falling back when it is empty or too long.
pub fn accept_description(raw: &str, name: &str, cfg: &GenerationConfig) -> String {
    let cleaned = sanitize(raw, DESCRIPTION_STRIP);
    let len = cleaned.chars().count();
    if len == 0 || len > cfg.max_description_chars {
        warn!(name, len, "unusable description from generator, using fallback");
        return fallback_description(name);
    }
    cleaned
}

pub async fn describe(
    llm: &dyn LlmProvider,
    name: &str,
    cfg: &GenerationConfig,
) -> Result<String, ProviderError> {
    let resp = llm.complete(&description_prompt(name)).await?;
    let description = accept_description(&resp.text, name, cfg);
    debug!(name, %description, "description synthesized");
    Ok(description)
}
