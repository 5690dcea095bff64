//! Marketplace backend boundary

mod client;
mod traits;
mod types;

pub use client::MarketplaceClient;
#[cfg(test)]
pub use traits::MockMarketplaceApi;
pub use traits::MarketplaceApi;
pub use types::{Mutation, MutationResponse};
