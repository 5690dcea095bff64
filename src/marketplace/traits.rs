//! Trait abstraction for the marketplace backend to enable mocking in tests

use super::types::{Mutation, MutationResponse};
use crate::state::{PendingAsset, ProfileSummary, ServiceSnapshot, TaxonomyNode, UploadedAsset};
use crate::submission::TransportPayload;
use anyhow::Result;
use async_trait::async_trait;

/// Operations the wizard needs from the backend and the asset store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Check if the backend is reachable
    async fn check_connection(&self) -> bool;

    /// Profiles the user can list services under
    async fn list_profiles(&self) -> Result<Vec<ProfileSummary>>;

    /// Every taxonomy node, all levels
    async fn list_taxonomy(&self) -> Result<Vec<TaxonomyNode>>;

    /// Fetch a service for editing
    async fn fetch_service(&self, id: &str) -> Result<ServiceSnapshot>;

    /// Upload one local file to the asset store
    async fn upload_asset(&self, asset: &PendingAsset) -> Result<UploadedAsset>;

    /// Invoke a mutation with a marshalled payload
    async fn mutate(&self, mutation: Mutation, payload: TransportPayload)
        -> Result<MutationResponse>;
}
