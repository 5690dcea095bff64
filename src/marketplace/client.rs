//! HTTP client for the marketplace backend
//!
//! Mutations are multipart POSTs to `/api/mutations/<name>`; reads are JSON
//! GETs. Media files go to the asset store as multipart uploads.

use super::traits::MarketplaceApi;
use super::types::{Mutation, MutationResponse};
use crate::config::WizardConfig;
use crate::state::{PendingAsset, ProfileSummary, ServiceSnapshot, TaxonomyNode, UploadedAsset};
use crate::submission::TransportPayload;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

/// Client for communicating with the marketplace backend
pub struct MarketplaceClient {
    http: Client,
    base_url: Url,
    upload_url: Url,
}

impl MarketplaceClient {
    /// Create a client from the user configuration
    pub fn new(config: &WizardConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(format!(
                "listing-wizard/{}; {}",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            ))
            .build()
            .context("build http client")?;

        let upload_base = parse_base_url(&config.upload_address())?;
        Ok(Self {
            http,
            base_url: parse_base_url(&config.api_address())?,
            upload_url: join_segments(&upload_base, &["api", "uploads"]),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        join_segments(&self.base_url, segments)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.url(segments);
        tracing::debug!("GET {url}");
        let response = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach {url}: {e}"))?;
        parse_json(response).await
    }
}

fn parse_base_url(address: &str) -> Result<Url> {
    let url = Url::parse(address.trim())
        .map_err(|e| anyhow!("Invalid backend address '{address}': {e}"))?;
    if url.cannot_be_a_base() {
        return Err(anyhow!("Backend address '{address}' cannot hold a path"));
    }
    Ok(url)
}

/// `base` with `segments` appended; each segment is percent-encoded, `/` included
fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!("Request failed with status {status}: {body}"));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| anyhow!("Failed to decode response: {e}"))
}

/// Build the multipart form of a mutation
pub fn multipart_form(payload: TransportPayload) -> Form {
    payload
        .into_parts()
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value))
}

#[async_trait]
impl MarketplaceApi for MarketplaceClient {
    async fn check_connection(&self) -> bool {
        match self.http.get(self.url(&["api", "health"])).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Backend not reachable: {e}");
                false
            }
        }
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileSummary>> {
        self.get_json(&["api", "profiles"]).await
    }

    async fn list_taxonomy(&self) -> Result<Vec<TaxonomyNode>> {
        self.get_json(&["api", "taxonomy"]).await
    }

    async fn fetch_service(&self, id: &str) -> Result<ServiceSnapshot> {
        self.get_json(&["api", "services", id]).await
    }

    async fn upload_asset(&self, asset: &PendingAsset) -> Result<UploadedAsset> {
        let bytes = tokio::fs::read(&asset.path)
            .await
            .with_context(|| format!("read {}", asset.path.display()))?;
        let part = Part::bytes(bytes).file_name(asset.file_name());
        let form = Form::new().part("file", part);

        tracing::info!("Uploading {}", asset.file_name());
        let response = self
            .http
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to upload {}: {e}", asset.file_name()))?;
        parse_json(response).await
    }

    async fn mutate(
        &self,
        mutation: Mutation,
        payload: TransportPayload,
    ) -> Result<MutationResponse> {
        let name = mutation.name();
        let url = self.url(&["api", "mutations", name.as_str()]);
        tracing::info!("Dispatching {name} with {} field(s)", payload.len());

        let response = self
            .http
            .post(url.clone())
            .multipart(multipart_form(payload))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach {url}: {e}"))?;

        // Mutation endpoints report failures in the body, also on 4xx
        let status = response.status();
        match response.json::<MutationResponse>().await {
            Ok(body) => Ok(body),
            Err(e) => Err(anyhow!(
                "Mutation {name} returned status {status} without a readable body: {e}"
            )),
        }
    }
}
