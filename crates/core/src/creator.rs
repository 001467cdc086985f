//! Create path: turn a name into a described, classified and embedded record.

use crate::embeddings::embed_text;
use crate::idmap::storage_id;
use crate::models::{CreateOutcome, CreateRequest, DataElementRecord};
use crate::pipeline::{PipelineError, Services};
use crate::{classifier, describer};
use tracing::{error, info};

/// Runs every step and reports the result. This is the only place where a
/// pipeline failure becomes a value instead of an error.
pub async fn create(services: &Services, req: &CreateRequest) -> CreateOutcome {
    match try_create(services, req).await {
        Ok(record) => {
            info!(
                external_id = %record.external_id,
                storage_id = %record.storage_id,
                category = %record.category,
                "data element created"
            );
            CreateOutcome::Created {
                category: record.category,
                description: record.description,
            }
        }
        Err(e) => {
            error!(external_id = %req.external_id, error = %e, "data element creation failed");
            CreateOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// Classifies, describes, embeds and persists. Nothing is written unless every
/// earlier step succeeded.
pub async fn try_create(
    services: &Services,
    req: &CreateRequest,
) -> Result<DataElementRecord, PipelineError> {
    let llm = services.llm.as_ref();
    let known_category = req
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let category = match known_category {
        Some(c) => c.to_string(),
        None => classifier::classify(llm, &req.name, &services.generation)
            .await
            .map_err(PipelineError::Generation)?,
    };
    let description = describer::describe(llm, &req.name, &services.generation)
        .await
        .map_err(PipelineError::Generation)?;
    let embedding = embed_text(services.embedder.as_ref(), &description).await?;

    let record = DataElementRecord {
        storage_id: storage_id(&req.external_id),
        external_id: req.external_id.clone(),
        name: req.name.clone(),
        category,
        data_source: req.data_source.clone(),
        description,
        embedding,
    };
    services
        .store
        .upsert(record.clone())
        .await
        .map_err(PipelineError::Store)?;
    Ok(record)
}
