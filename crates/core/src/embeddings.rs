use crate::pipeline::PipelineError;
use providers::EmbeddingProvider;

/// Embeds a single text, failing when the service answers without a vector.
pub async fn embed_text(
    provider: &dyn EmbeddingProvider,
    text: &str,
) -> Result<Vec<f32>, PipelineError> {
    let resp = provider
        .embed(&[text.to_string()])
        .await
        .map_err(PipelineError::Embedding)?;
    match resp.vectors.into_iter().next() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(PipelineError::EmptyEmbedding),
    }
}
