//! Local draft persistence
//!
//! A draft is a snapshot of a wizard's values, keyed by entity type,
//! operation and target. Saving is gated on the entity's full schema.

mod adapter;
mod store;

pub use adapter::DraftAdapter;
pub use store::{DraftStore, DraftStoreError, JsonDraftStore, MemoryDraftStore, DRAFTS_FILE_NAME};

use crate::state::{EntityType, FieldMap, Operation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stored snapshot of a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub id: Uuid,
    pub entity_type: EntityType,
    pub operation: Operation,
    #[serde(default)]
    pub target_id: Option<String>,
    pub payload: FieldMap,
    /// Values the entity had before editing, for updates
    #[serde(default)]
    pub previous_payload: Option<FieldMap>,
    pub created_at: DateTime<Utc>,
}

impl Draft {
    pub fn new(
        entity_type: EntityType,
        operation: Operation,
        target_id: Option<String>,
        payload: FieldMap,
        previous_payload: Option<FieldMap>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_type,
            operation,
            target_id,
            payload,
            previous_payload,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> DraftKey {
        DraftKey {
            entity_type: self.entity_type,
            operation: self.operation,
            target_id: self.target_id.clone(),
        }
    }
}

/// Identity of a draft slot; one draft per key, last write wins
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DraftKey {
    pub entity_type: EntityType,
    pub operation: Operation,
    pub target_id: Option<String>,
}

impl DraftKey {
    pub fn new(entity_type: EntityType, operation: Operation, target_id: Option<&str>) -> Self {
        Self {
            entity_type,
            operation,
            target_id: target_id.map(str::to_string),
        }
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.operation)?;
        if let Some(target) = &self.target_id {
            write!(f, ":{target}")?;
        }
        Ok(())
    }
}
