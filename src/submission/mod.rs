//! Submission pipeline: upload, marshal, mutate, reconcile

mod marshal;
mod reconcile;
mod upload;

pub use marshal::{
    marshal, to_json, FieldEncoding, FieldPlan, FieldSpec, MarshalError, TransportPayload,
};
pub use reconcile::{reconcile, Reconciliation, SubmissionResult};
pub use upload::MediaUploader;

use crate::error::WizardError;
use crate::marketplace::MarketplaceApi;
use crate::wizard::Wizard;

/// Submit the wizard's values to the backend.
///
/// Enters the submitting state unless the caller already did so with
/// `Wizard::begin_submit`. Pending media is uploaded first; a failed upload
/// aborts before any mutation is sent. The pending flag is always cleared
/// on return.
pub async fn submit(
    wizard: &mut Wizard,
    api: &dyn MarketplaceApi,
) -> Result<SubmissionResult, WizardError> {
    if !wizard.is_pending() {
        wizard.begin_submit()?;
    }
    let result = run_submission(wizard, api).await;
    wizard.finish_submit();
    result
}

async fn run_submission(
    wizard: &mut Wizard,
    api: &dyn MarketplaceApi,
) -> Result<SubmissionResult, WizardError> {
    wizard.check_submit()?;
    let blueprint = wizard.blueprint();

    if let Some(field) = blueprint.asset_field() {
        let uploader = MediaUploader::new(field);
        if uploader.has_pending_files(wizard.form()) {
            uploader.upload_files(wizard.form_mut(), api).await?;
        }
    }

    let mut payload = marshal(wizard.form().values(), &blueprint.field_plan())?;
    if let Some(id) = wizard.target_id() {
        payload.push("id", id);
    }

    let mutation = blueprint.mutation();
    let response = api.mutate(mutation, payload).await.map_err(|e| {
        tracing::error!("Mutation {} failed: {e:#}", mutation.name());
        WizardError::Unexpected(e.to_string())
    })?;
    Ok(SubmissionResult::from(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::{MockMarketplaceApi, Mutation, MutationResponse};
    use crate::state::{Asset, FieldValue, UploadedAsset};
    use crate::wizard::fixtures::filled_service_wizard;
    use serde_json::json;

    fn ready_to_submit() -> Wizard {
        let mut wizard = filled_service_wizard();
        for _ in 0..5 {
            wizard.advance().unwrap();
        }
        wizard
    }

    fn stored() -> UploadedAsset {
        UploadedAsset {
            url: "https://cdn.example/front.jpg".to_string(),
            public_id: "front".to_string(),
            resource_type: "image".to_string(),
            width: Some(800),
            height: Some(600),
        }
    }

    mod success {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_submit_without_media() {
            let mut api = MockMarketplaceApi::new();
            api.expect_upload_asset().never();
            api.expect_mutate()
                .withf(|mutation, payload| {
                    *mutation == Mutation::CreateService
                        && payload.get("title") == Some("Home cleaning")
                        && payload.get("price") == Some("35")
                        && payload.get("id").is_none()
                })
                .times(1)
                .returning(|_, _| {
                    Ok(MutationResponse {
                        success: true,
                        data: Some(json!({ "id": "svc-1" })),
                        ..Default::default()
                    })
                });

            let mut wizard = ready_to_submit();
            let result = submit(&mut wizard, &api).await.unwrap();
            assert!(result.success);
            assert!(!wizard.is_pending());
        }

        #[tokio::test]
        async fn test_pending_media_is_uploaded_before_mutation() {
            let mut api = MockMarketplaceApi::new();
            api.expect_upload_asset().times(1).returning(|_| Ok(stored()));
            api.expect_mutate()
                .withf(|_, payload| {
                    payload.get("media").is_some_and(|media| {
                        media.contains("cdn.example") && !media.contains("blob:")
                    })
                })
                .times(1)
                .returning(|_, _| {
                    Ok(MutationResponse {
                        success: true,
                        ..Default::default()
                    })
                });

            let mut wizard = ready_to_submit();
            wizard.queue_asset("media", "/tmp/front.jpg");
            submit(&mut wizard, &api).await.unwrap();
            assert_eq!(
                wizard.form().get("media"),
                Some(&FieldValue::Assets(vec![Asset::Uploaded(stored())]))
            );
        }

        #[test]
        fn test_server_failure_is_a_result() {
            let mut api = MockMarketplaceApi::new();
            api.expect_mutate().returning(|_, _| {
                Ok(MutationResponse {
                    success: false,
                    error: Some("Title already used".to_string()),
                    ..Default::default()
                })
            });

            let mut wizard = ready_to_submit();
            let result = tokio_test::block_on(submit(&mut wizard, &api)).unwrap();
            assert!(!result.success);
            assert_eq!(result.error.as_deref(), Some("Title already used"));
        }
    }

    mod failures {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_upload_failure_sends_no_mutation() {
            let mut api = MockMarketplaceApi::new();
            api.expect_upload_asset()
                .returning(|_| Err(anyhow::anyhow!("asset store unavailable")));
            api.expect_mutate().never();

            let mut wizard = ready_to_submit();
            wizard.queue_asset("media", "/tmp/front.jpg");
            let values_before = wizard.form().values().clone();
            let step_before = wizard.current_step();

            let err = submit(&mut wizard, &api).await.unwrap_err();
            assert!(matches!(err, WizardError::Upload(_)));
            assert_eq!(wizard.form().values(), &values_before);
            assert_eq!(wizard.current_step(), step_before);
            assert!(!wizard.is_pending());
        }

        #[tokio::test]
        async fn test_network_error_is_unexpected() {
            let mut api = MockMarketplaceApi::new();
            api.expect_mutate()
                .returning(|_, _| Err(anyhow::anyhow!("connection reset")));

            let mut wizard = ready_to_submit();
            let err = submit(&mut wizard, &api).await.unwrap_err();
            assert!(matches!(err, WizardError::Unexpected(_)));
            assert_eq!(err.user_message(), crate::error::GENERIC_ERROR_MESSAGE);
            assert!(!wizard.is_pending());
        }

        #[tokio::test]
        async fn test_not_on_last_step_sends_nothing() {
            let mut api = MockMarketplaceApi::new();
            api.expect_mutate().never();
            let mut wizard = filled_service_wizard();
            let err = submit(&mut wizard, &api).await.unwrap_err();
            assert!(matches!(err, WizardError::NotOnLastStep));
        }

        #[tokio::test]
        async fn test_submit_completes_a_started_submission() {
            let mut api = MockMarketplaceApi::new();
            api.expect_mutate().times(1).returning(|_, _| {
                Ok(MutationResponse {
                    success: true,
                    ..Default::default()
                })
            });
            let mut wizard = ready_to_submit();
            wizard.begin_submit().unwrap();
            assert!(matches!(
                wizard.begin_submit(),
                Err(WizardError::SubmissionPending)
            ));

            let result = submit(&mut wizard, &api).await.unwrap();
            assert!(result.success);
            assert!(!wizard.is_pending());
        }
    }
}
