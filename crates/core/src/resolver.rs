//! Query path: find existing data elements close to a candidate name.

use crate::embeddings::embed_text;
use crate::idmap::storage_id;
use crate::models::{ElementMatch, StoredElement};
use crate::pipeline::{PipelineError, Services};
use crate::{describer, similarity};
use tracing::{debug, info, warn};

/// Candidates fetched from the ranked search.
pub const TOP_K: usize = 5;

/// Ranked matches for `name`. When `external_id` names a stored element, that
/// element is returned first whatever its similarity.
///
/// Comparisons use the embedding of the synthesized description, not of the
/// raw name. Similarities are recomputed locally; the store's ranking order is
/// kept as is.
pub async fn resolve(
    services: &Services,
    name: &str,
    external_id: Option<&str>,
) -> Result<Vec<ElementMatch>, PipelineError> {
    info!(name, external_id, "resolving data element");
    let description = describer::describe(services.llm.as_ref(), name, &services.generation)
        .await
        .map_err(PipelineError::Generation)?;
    let query = embed_text(services.embedder.as_ref(), &description).await?;

    let candidates = services
        .store
        .nearest(&query, TOP_K)
        .await
        .map_err(PipelineError::Store)?;
    // Candidates that cannot be scored against the query are dropped, as the
    // in-memory store does when ranking. An unscorable anchored record is an error.
    let mut matches: Vec<ElementMatch> = candidates
        .into_iter()
        .filter_map(|c| {
            let external_id = c.external_id.clone();
            match to_match(c, &query) {
                Ok(m) => Some(m),
                Err(e) => {
                    warn!(%external_id, error = %e, "skipping unscorable candidate");
                    None
                }
            }
        })
        .collect();

    if let Some(external_id) = external_id {
        let id = storage_id(external_id);
        match services
            .store
            .anchored(id)
            .await
            .map_err(PipelineError::Store)?
        {
            Some(element) => promote(&mut matches, to_match(element, &query)?),
            None => debug!(external_id, %id, "no element stored under id"),
        }
    }

    debug!(count = matches.len(), "resolution finished");
    Ok(matches)
}

fn to_match(element: StoredElement, query: &[f32]) -> Result<ElementMatch, PipelineError> {
    let similarity = similarity::score(&element.embedding, query)?;
    Ok(ElementMatch {
        name: element.name,
        external_id: element.external_id,
        similarity,
    })
}

/// Moves `anchored` to the front, dropping an identical ranked entry.
pub fn promote(matches: &mut Vec<ElementMatch>, anchored: ElementMatch) {
    if let Some(pos) = matches.iter().position(|m| *m == anchored) {
        matches.remove(pos);
    }
    matches.insert(0, anchored);
}
