use crate::models::{DataElementRecord, StoredElement};
use crate::similarity;
use anyhow::Context;
use parking_lot::RwLock;
use providers::qdrant::{QdrantClient, QdrantPoint};
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Top `limit` elements ranked by the store's own metric.
    async fn nearest(&self, vector: &[f32], limit: usize) -> anyhow::Result<Vec<StoredElement>>;
    /// The element stored under exactly `id`, if any.
    async fn anchored(&self, id: Uuid) -> anyhow::Result<Option<StoredElement>>;
    /// Writes a record keyed by its storage id, replacing any previous one.
    async fn upsert(&self, record: DataElementRecord) -> anyhow::Result<()>;
    /// Drops every record and recreates the index for `dimension`-long vectors.
    async fn reset(&self, dimension: usize) -> anyhow::Result<()>;
}

/// Payload layout shared with existing collections.
pub fn record_payload(record: &DataElementRecord) -> HashMap<String, Value> {
    HashMap::from([
        ("name".to_string(), json!(record.name)),
        ("category".to_string(), json!(record.category)),
        ("dataSource".to_string(), json!(record.data_source)),
        ("description".to_string(), json!(record.description)),
        ("vector".to_string(), json!(record.embedding)),
        ("uuid".to_string(), json!(record.external_id)),
    ])
}

fn element_from_payload(
    payload: Option<&Value>,
    point_vector: Option<Vec<f32>>,
) -> anyhow::Result<StoredElement> {
    let payload = payload.context("point has no payload")?;
    let text = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .with_context(|| format!("payload field {key} missing"))
    };
    let embedding = match payload.get("vector") {
        Some(v) => serde_json::from_value(v.clone()).context("payload vector malformed")?,
        None => point_vector.context("point has neither payload nor index vector")?,
    };
    Ok(StoredElement {
        name: text("name")?,
        external_id: text("uuid")?,
        embedding,
    })
}

pub struct QdrantStore {
    client: QdrantClient,
}

impl QdrantStore {
    pub fn new(client: QdrantClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl VectorStore for QdrantStore {
    async fn nearest(&self, vector: &[f32], limit: usize) -> anyhow::Result<Vec<StoredElement>> {
        let points = self.client.search(vector.to_vec(), limit as u64).await?;
        points
            .into_iter()
            .map(|p| element_from_payload(p.payload.as_ref(), p.vector))
            .collect()
    }

    async fn anchored(&self, id: Uuid) -> anyhow::Result<Option<StoredElement>> {
        let point = self
            .client
            .retrieve(vec![id.to_string()])
            .await?
            .into_iter()
            .next();
        point
            .map(|p| element_from_payload(p.payload.as_ref(), p.vector))
            .transpose()
    }

    async fn upsert(&self, record: DataElementRecord) -> anyhow::Result<()> {
        let point = QdrantPoint {
            id: record.storage_id.to_string(),
            payload: record_payload(&record),
            vector: record.embedding,
        };
        self.client.upsert(vec![point]).await?;
        Ok(())
    }

    async fn reset(&self, dimension: usize) -> anyhow::Result<()> {
        self.client.delete_collection().await?;
        self.client.create_collection(dimension).await?;
        tracing::info!(collection = self.client.collection(), dimension, "collection recreated");
        Ok(())
    }
}

/// Process-local store for development and tests.
#[derive(Default)]
pub struct MemoryVectorStore {
    records: RwLock<HashMap<Uuid, DataElementRecord>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<DataElementRecord> {
        self.records.read().get(id).cloned()
    }
}

fn stored(record: &DataElementRecord) -> StoredElement {
    StoredElement {
        name: record.name.clone(),
        external_id: record.external_id.clone(),
        embedding: record.embedding.clone(),
    }
}

#[async_trait::async_trait]
impl VectorStore for MemoryVectorStore {
    async fn nearest(&self, vector: &[f32], limit: usize) -> anyhow::Result<Vec<StoredElement>> {
        let records = self.records.read();
        let mut ranked: Vec<(f32, &DataElementRecord)> = records
            .values()
            .filter_map(|r| {
                similarity::cosine(vector, &r.embedding)
                    .ok()
                    .map(|s| (s, r))
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then_with(|| a.1.storage_id.cmp(&b.1.storage_id))
        });
        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(_, r)| stored(r))
            .collect())
    }

    async fn anchored(&self, id: Uuid) -> anyhow::Result<Option<StoredElement>> {
        Ok(self.records.read().get(&id).map(stored))
    }

    async fn upsert(&self, record: DataElementRecord) -> anyhow::Result<()> {
        self.records.write().insert(record.storage_id, record);
        Ok(())
    }

    async fn reset(&self, _dimension: usize) -> anyhow::Result<()> {
        self.records.write().clear();
        Ok(())
    }
}
