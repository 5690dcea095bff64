//! Mapping of mutation results back onto the wizard

use crate::draft::Draft;
use crate::error::WizardError;
use crate::marketplace::MutationResponse;
use crate::state::{Notification, Operation};
use crate::wizard::Wizard;
use serde_json::Value;

const FALLBACK_FAILURE_MESSAGE: &str = "The marketplace rejected the submission";

/// Normalized outcome of a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl From<MutationResponse> for SubmissionResult {
    fn from(response: MutationResponse) -> Self {
        let error = if response.success {
            None
        } else {
            response
                .error
                .or(response.message)
                .filter(|m| !m.trim().is_empty())
        };
        Self {
            success: response.success,
            data: response.data,
            error,
        }
    }
}

impl SubmissionResult {
    /// Identifier of the created or updated entity, when returned
    pub fn entity_id(&self) -> Option<&str> {
        self.data.as_ref()?.get("id")?.as_str()
    }
}

/// What the application should do after a submission
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub notification: Notification,
    pub navigate_home: bool,
    pub refresh_catalog: bool,
    /// Draft to record locally
    pub draft: Option<Draft>,
}

/// Apply a mutation result to the wizard.
///
/// Success makes the submitted values the new baseline. Failure leaves
/// values and dirty state untouched so the user can retry.
pub fn reconcile(
    result: &SubmissionResult,
    wizard: &mut Wizard,
    record_drafts: bool,
) -> Reconciliation {
    let blueprint = wizard.blueprint();

    if !result.success {
        let error = WizardError::Mutation(
            result
                .error
                .clone()
                .unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string()),
        );
        tracing::warn!("{} failed: {error}", blueprint.mutation().name());
        return Reconciliation {
            notification: Notification::error(error.user_message()),
            navigate_home: false,
            refresh_catalog: false,
            draft: None,
        };
    }

    let draft = (record_drafts && blueprint.records_drafts()).then(|| wizard.to_draft());
    wizard.form_mut().reset_baseline();

    let verb = match blueprint.operation() {
        Operation::Create => "created",
        Operation::Update => "updated",
    };
    let entity = blueprint.entity_type();
    let message = match result.entity_id() {
        Some(id) => format!("{} {verb} ({id})", capitalized(entity.as_str())),
        None => format!("{} {verb}", capitalized(entity.as_str())),
    };
    tracing::info!("{} succeeded", blueprint.mutation().name());

    Reconciliation {
        notification: Notification::success(message),
        navigate_home: true,
        refresh_catalog: blueprint.refreshes_catalog(),
        draft,
    }
}

fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FieldMap, FieldValue, NotificationLevel, TaxonomyLevel};
    use crate::wizard::fixtures::filled_service_wizard;
    use crate::wizard::Blueprint;
    use serde_json::json;

    fn taxonomy_edit() -> Wizard {
        let mut values = FieldMap::new();
        values.insert("label".to_string(), FieldValue::Text("Windows".to_string()));
        values.insert("slug".to_string(), FieldValue::Text("windows".to_string()));
        let mut wizard = Wizard::for_target(
            Blueprint::TaxonomyItem {
                level: TaxonomyLevel::Category,
                operation: Operation::Update,
            },
            "cat-1",
            values,
        );
        wizard.set_field("label", FieldValue::Text("Window cleaning".to_string()));
        wizard
    }

    mod results {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_error_falls_back_to_message() {
            let result = SubmissionResult::from(MutationResponse {
                success: false,
                message: Some("Slug already taken".to_string()),
                ..Default::default()
            });
            assert_eq!(result.error.as_deref(), Some("Slug already taken"));
        }

        #[test]
        fn test_success_ignores_error_fields() {
            let result = SubmissionResult::from(MutationResponse {
                success: true,
                data: Some(json!({ "id": "svc-7" })),
                message: Some("ok".to_string()),
                ..Default::default()
            });
            assert!(result.error.is_none());
            assert_eq!(result.entity_id(), Some("svc-7"));
        }
    }

    mod outcomes {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_success_resets_dirty_and_navigates() {
            let mut wizard = filled_service_wizard();
            assert!(wizard.form().is_dirty());
            let result = SubmissionResult {
                success: true,
                data: Some(json!({ "id": "svc-7" })),
                error: None,
            };
            let outcome = reconcile(&result, &mut wizard, true);
            assert!(!wizard.form().is_dirty());
            assert!(outcome.navigate_home);
            assert!(!outcome.refresh_catalog);
            assert!(outcome.draft.is_none());
            assert_eq!(outcome.notification.level, NotificationLevel::Success);
            assert_eq!(outcome.notification.message, "Service created (svc-7)");
        }

        #[test]
        fn test_failure_keeps_values() {
            let mut wizard = filled_service_wizard();
            let before = wizard.form().clone();
            let result = SubmissionResult {
                success: false,
                data: None,
                error: Some("Title already used".to_string()),
            };
            let outcome = reconcile(&result, &mut wizard, true);
            assert_eq!(wizard.form(), &before);
            assert!(!outcome.navigate_home);
            assert_eq!(outcome.notification.level, NotificationLevel::Error);
            assert_eq!(outcome.notification.message, "Title already used");
        }

        #[test]
        fn test_failure_without_message() {
            let mut wizard = filled_service_wizard();
            let result = SubmissionResult {
                success: false,
                data: None,
                error: None,
            };
            let outcome = reconcile(&result, &mut wizard, true);
            assert_eq!(outcome.notification.message, FALLBACK_FAILURE_MESSAGE);
        }

        #[test]
        fn test_taxonomy_edit_records_draft() {
            let mut wizard = taxonomy_edit();
            let result = SubmissionResult {
                success: true,
                data: None,
                error: None,
            };
            let outcome = reconcile(&result, &mut wizard, true);
            let draft = outcome.draft.unwrap();
            assert_eq!(draft.key().to_string(), "category:update:cat-1");
            assert_eq!(
                draft.payload.get("label"),
                Some(&FieldValue::Text("Window cleaning".to_string()))
            );
            assert_eq!(
                draft.previous_payload.unwrap().get("label"),
                Some(&FieldValue::Text("Windows".to_string()))
            );
            assert!(outcome.refresh_catalog);
            assert_eq!(outcome.notification.message, "Category updated");
        }

        #[test]
        fn test_draft_recording_can_be_disabled() {
            let mut wizard = taxonomy_edit();
            let result = SubmissionResult {
                success: true,
                data: None,
                error: None,
            };
            assert!(reconcile(&result, &mut wizard, false).draft.is_none());
        }
    }
}
