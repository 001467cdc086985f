use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A canonical data element as persisted in the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataElementRecord {
    pub external_id: String,
    pub storage_id: Uuid,
    pub name: String,
    pub category: String,
    pub data_source: String,
    pub description: String,
    pub embedding: Vec<f32>,
}

/// A stored element as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredElement {
    pub name: String,
    pub external_id: String,
    pub embedding: Vec<f32>,
}

/// One entry of a resolution result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementMatch {
    #[serde(rename = "dataElementName")]
    pub name: String,
    #[serde(rename = "uuid")]
    pub external_id: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    pub external_id: String,
    pub data_source: String,
    pub name: String,
    /// Known category; classification is skipped when set.
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created {
        category: String,
        description: String,
    },
    Failed {
        error: String,
    },
}

impl CreateOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CreateOutcome::Created { .. })
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            CreateOutcome::Created { category, .. } => Some(category.as_str()),
            CreateOutcome::Failed { .. } => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            CreateOutcome::Created { description, .. } => Some(description.as_str()),
            CreateOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CreateOutcome::Created { .. } => None,
            CreateOutcome::Failed { error } => Some(error.as_str()),
        }
    }
}
