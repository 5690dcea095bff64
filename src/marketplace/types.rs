//! Wire types of the marketplace backend

use crate::state::TaxonomyLevel;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Remote mutations the forms can invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    CreateService,
    UpdateService,
    CreateProfile,
    CreateTaxonomy(TaxonomyLevel),
    UpdateTaxonomy(TaxonomyLevel),
}

impl Mutation {
    /// Endpoint name under `/api/mutations/`
    pub fn name(&self) -> String {
        match self {
            Mutation::CreateService => "create-service".to_string(),
            Mutation::UpdateService => "update-service".to_string(),
            Mutation::CreateProfile => "create-profile".to_string(),
            Mutation::CreateTaxonomy(level) => format!("create-{}", level.entity_type()),
            Mutation::UpdateTaxonomy(level) => format!("update-{}", level.entity_type()),
        }
    }
}

/// Raw response of a mutation endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
