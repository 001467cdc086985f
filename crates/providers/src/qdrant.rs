use crate::{check_status, http_client, ProviderError};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct QdrantClient {
    client: Client,
    cfg: QdrantConfig,
}

impl QdrantClient {
    pub fn new(cfg: QdrantConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(cfg.timeout)?,
            cfg,
        })
    }

    pub fn collection(&self) -> &str {
        &self.cfg.collection
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!(
            "{}/collections/{}{}",
            self.cfg.url.trim_end_matches('/'),
            self.cfg.collection,
            suffix
        )
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ProviderError> {
        let builder = match &self.cfg.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        };
        let resp = builder.send().await?;
        check_status(resp).await
    }

    /// Nearest points by the collection's own distance, payloads and vectors included.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredPoint>, ProviderError> {
        #[derive(Serialize)]
        struct SearchRequest {
            vector: Vec<f32>,
            limit: u64,
            with_payload: bool,
            with_vector: bool,
        }
        let body = SearchRequest {
            vector,
            limit,
            with_payload: true,
            with_vector: true,
        };
        let resp = self
            .send(self.client.post(self.collection_url("/points/search")).json(&body))
            .await?;
        let parsed: QdrantResult<Vec<ScoredPoint>> = resp.json().await?;
        Ok(parsed.result)
    }

    /// Fetches points stored under exactly these ids. Unknown ids are absent from the result.
    pub async fn retrieve(&self, ids: Vec<String>) -> Result<Vec<RetrievedPoint>, ProviderError> {
        #[derive(Serialize)]
        struct RetrieveRequest {
            ids: Vec<String>,
            with_payload: bool,
            with_vector: bool,
        }
        let body = RetrieveRequest {
            ids,
            with_payload: true,
            with_vector: true,
        };
        let resp = self
            .send(self.client.post(self.collection_url("/points")).json(&body))
            .await?;
        let parsed: QdrantResult<Vec<RetrievedPoint>> = resp.json().await?;
        Ok(parsed.result)
    }

    /// Writes points; an existing point with the same id is replaced.
    pub async fn upsert(&self, points: Vec<QdrantPoint>) -> Result<(), ProviderError> {
        let req = QdrantUpsert { points };
        self.send(
            self.client
                .put(self.collection_url("/points?wait=true"))
                .json(&req),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_collection(&self) -> Result<(), ProviderError> {
        match self.send(self.client.delete(self.collection_url(""))).await {
            Ok(_) | Err(ProviderError::Status { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn create_collection(&self, dimension: usize) -> Result<(), ProviderError> {
        #[derive(Serialize)]
        struct VectorParams {
            size: usize,
            distance: &'static str,
        }
        #[derive(Serialize)]
        struct CreateCollection {
            vectors: VectorParams,
        }
        let body = CreateCollection {
            vectors: VectorParams {
                size: dimension,
                distance: "Cosine",
            },
        };
        self.send(self.client.put(self.collection_url("")).json(&body))
            .await?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct QdrantUpsert {
    pub points: Vec<QdrantPoint>,
}

#[derive(Debug, Serialize)]
pub struct QdrantPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct QdrantResult<T> {
    pub result: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ScoredPoint {
    pub id: serde_json::Value,
    pub score: f32,
    pub payload: Option<serde_json::Value>,
    pub vector: Option<Vec<f32>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RetrievedPoint {
    pub id: serde_json::Value,
    pub payload: Option<serde_json::Value>,
    pub vector: Option<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_parses_payload_and_vector() {
        let raw = r#"{
            "result": [
                {"id": "1b4e28ba-2fa1-4d2e-883f-0016d3cca427", "version": 3, "score": 0.92,
                 "payload": {"name": "血糖", "uuid": "X1"}, "vector": [0.1, 0.2]}
            ],
            "status": "ok",
            "time": 0.001
        }"#;
        let parsed: QdrantResult<Vec<ScoredPoint>> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.result.len(), 1);
        assert_eq!(parsed.result[0].vector.as_deref(), Some(&[0.1, 0.2][..]));
        assert_eq!(parsed.result[0].payload.as_ref().unwrap()["uuid"], "X1");
    }

    #[test]
    fn collection_urls_tolerate_trailing_slash() {
        let client = QdrantClient::new(QdrantConfig {
            url: "http://localhost:6333/".into(),
            collection: "elements".into(),
            api_key: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(
            client.collection_url("/points/search"),
            "http://localhost:6333/collections/elements/points/search"
        );
    }
}
