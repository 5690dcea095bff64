//! Media upload ahead of submission

use crate::error::WizardError;
use crate::marketplace::MarketplaceApi;
use crate::state::{Asset, FieldValue, FormValues};

/// Resolves the pending files of one asset field into stored assets
#[derive(Debug, Clone, Copy)]
pub struct MediaUploader {
    field: &'static str,
}

impl MediaUploader {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }

    pub fn has_pending_files(&self, values: &FormValues) -> bool {
        match values.get(self.field) {
            Some(FieldValue::Assets(assets)) => assets.iter().any(Asset::is_pending),
            _ => false,
        }
    }

    /// Upload every pending file of the field.
    ///
    /// The field is replaced only once all uploads succeeded; on the first
    /// failure the values are left exactly as they were.
    pub async fn upload_files(
        &self,
        values: &mut FormValues,
        api: &dyn MarketplaceApi,
    ) -> Result<usize, WizardError> {
        let Some(FieldValue::Assets(assets)) = values.get(self.field) else {
            return Ok(0);
        };

        let mut resolved = Vec::with_capacity(assets.len());
        let mut uploaded = 0;
        for asset in assets {
            match asset {
                Asset::Pending(pending) => {
                    let stored = api.upload_asset(pending).await.map_err(|e| {
                        tracing::warn!("Upload of {} failed: {e:#}", pending.file_name());
                        WizardError::Upload(e.to_string())
                    })?;
                    resolved.push(Asset::Uploaded(stored));
                    uploaded += 1;
                }
                Asset::Uploaded(_) => resolved.push(asset.clone()),
            }
        }

        values.set_path(self.field, FieldValue::Assets(resolved));
        tracing::info!("Uploaded {uploaded} file(s) for {}", self.field);
        Ok(uploaded)
    }
}
