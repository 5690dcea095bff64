//! Wizard state machine

use super::blueprint::Blueprint;
use super::cascade::cascade_reset;
use super::schema::FieldError;
use super::step::StepKind;
use super::validator::StepValidator;
use crate::draft::{Draft, DraftKey};
use crate::error::WizardError;
use crate::state::{
    Asset, FieldBinding, FieldMap, FieldValue, FormValues, Operation, PendingAsset,
};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Position of a wizard; `current` is always within `1..=total`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    current: usize,
    completed: BTreeSet<usize>,
    total: usize,
}

impl WizardState {
    pub fn new(total: usize) -> Self {
        Self {
            current: 1,
            completed: BTreeSet::new(),
            total: total.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    pub fn is_completed(&self, step: usize) -> bool {
        self.completed.contains(&step)
    }

    pub fn is_last(&self) -> bool {
        self.current == self.total
    }
}

/// Validation errors that blocked a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRejection {
    pub step: usize,
    pub errors: Vec<FieldError>,
}

impl StepRejection {
    /// Toast-level summary of the rejection
    pub fn summary(&self) -> String {
        format!("Fix {} field(s) on step {}", self.errors.len(), self.step)
    }
}

/// A running form: blueprint, position, values and the submitting overlay
#[derive(Debug, Clone)]
pub struct Wizard {
    blueprint: Blueprint,
    target_id: Option<String>,
    state: WizardState,
    form: FormValues,
    pending: bool,
    /// Draft this wizard was resumed from
    resumed_from: Option<DraftKey>,
}

impl Wizard {
    pub fn new(blueprint: Blueprint) -> Self {
        Self {
            blueprint,
            target_id: None,
            state: WizardState::new(blueprint.total_steps()),
            form: FormValues::new(blueprint.initial_values()),
            pending: false,
            resumed_from: None,
        }
    }

    /// Edit an existing entity. Steps its values already satisfy are marked
    /// completed so they can be jumped to directly.
    pub fn for_target(
        blueprint: Blueprint,
        target_id: impl Into<String>,
        values: FieldMap,
    ) -> Self {
        let mut initial = blueprint.initial_values();
        initial.extend(values);

        let mut wizard = Self {
            blueprint,
            target_id: Some(target_id.into()),
            state: WizardState::new(blueprint.total_steps()),
            form: FormValues::new(initial),
            pending: false,
            resumed_from: None,
        };
        let validator = wizard.validator();
        for step in 1..=wizard.state.total {
            if validator.validate(step, &wizard.form).is_ok() {
                wizard.state.completed.insert(step);
            }
        }
        wizard
    }

    /// Resume a stored draft; the draft's previous payload becomes the baseline
    pub fn from_draft(draft: &Draft) -> Self {
        let blueprint = Blueprint::for_entity(draft.entity_type, draft.operation);
        let mut current = blueprint.initial_values();
        current.extend(draft.payload.clone());
        let baseline = match &draft.previous_payload {
            Some(previous) => {
                let mut baseline = blueprint.initial_values();
                baseline.extend(previous.clone());
                baseline
            }
            None => blueprint.initial_values(),
        };

        Self {
            blueprint,
            target_id: draft.target_id.clone(),
            state: WizardState::new(blueprint.total_steps()),
            form: FormValues::with_baseline(current, baseline),
            pending: false,
            resumed_from: Some(draft.key()),
        }
    }

    pub fn blueprint(&self) -> Blueprint {
        self.blueprint
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }

    pub fn resumed_draft(&self) -> Option<&DraftKey> {
        self.resumed_from.as_ref()
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn form(&self) -> &FormValues {
        &self.form
    }

    pub(crate) fn form_mut(&mut self) -> &mut FormValues {
        &mut self.form
    }

    pub fn current_step(&self) -> usize {
        self.state.current
    }

    pub fn current_kind(&self) -> Option<StepKind> {
        self.blueprint.step_kind(self.state.current, &self.form)
    }

    pub fn step_title(&self, step: usize) -> &'static str {
        self.blueprint
            .step_kind(step, &self.form)
            .map(|k| k.title())
            .unwrap_or("")
    }

    /// Inputs of the current step
    pub fn bindings(&self) -> Vec<FieldBinding> {
        self.current_kind()
            .map(|kind| kind.bindings(&self.form))
            .unwrap_or_default()
    }

    fn validator(&self) -> StepValidator {
        StepValidator::new(self.blueprint)
    }

    /// Move forward if the current step validates.
    ///
    /// A rejected advance leaves the position and values untouched and only
    /// updates field errors. Passing the last step marks it completed.
    pub fn advance(&mut self) -> Result<usize, StepRejection> {
        let step = self.state.current;
        match self.validator().apply(step, &mut self.form) {
            Ok(()) => {
                self.state.completed.insert(step);
                if step < self.state.total {
                    self.state.current = step + 1;
                }
                tracing::info!("Step {step} completed, now on step {}", self.state.current);
                Ok(self.state.current)
            }
            Err(errors) => {
                tracing::debug!("Advance from step {step} blocked by {} error(s)", errors.len());
                Err(StepRejection { step, errors })
            }
        }
    }

    /// Move back one step; completed steps stay completed
    pub fn retreat(&mut self) -> bool {
        if self.state.current > 1 {
            self.state.current -= 1;
            true
        } else {
            false
        }
    }

    /// Go to `step` if it is not ahead of unvalidated steps
    pub fn jump(&mut self, step: usize) -> bool {
        let allowed = (1..=self.state.total).contains(&step)
            && (step <= self.state.current || self.state.completed.contains(&step));
        if allowed {
            self.state.current = step;
        }
        allowed
    }

    /// Side-effect free check that submission would be accepted locally
    pub fn can_submit(&self) -> bool {
        self.state.is_last()
            && !self.pending
            && self.submit_errors().is_none()
    }

    /// Validate the whole entity before submitting.
    ///
    /// Runs the last step's validation, then every other step, then the
    /// blueprint's required-at-submit fields. The first failing step is
    /// reported and its errors are shown on the form.
    pub fn check_submit(&mut self) -> Result<(), WizardError> {
        if !self.state.is_last() {
            return Err(WizardError::NotOnLastStep);
        }
        let step = self.state.current;
        self.validator()
            .apply(step, &mut self.form)
            .map_err(|errors| StepRejection { step, errors })?;
        self.state.completed.insert(step);

        match self.submit_errors() {
            None => Ok(()),
            Some(rejection) => {
                for error in &rejection.errors {
                    self.form.set_error(&error.path, &error.message);
                }
                Err(rejection.into())
            }
        }
    }

    fn submit_errors(&self) -> Option<StepRejection> {
        let validator = self.validator();
        for step in 1..=self.state.total {
            if let Err(errors) = validator.validate(step, &self.form) {
                return Some(StepRejection { step, errors });
            }
        }

        let missing: Vec<FieldError> = self
            .blueprint
            .required_at_submit()
            .iter()
            .filter(|(field, _)| self.form.is_empty_value(field))
            .map(|(field, label)| FieldError::new(*field, format!("{label} is required")))
            .collect();
        if missing.is_empty() {
            None
        } else {
            Some(StepRejection {
                step: self.state.current,
                errors: missing,
            })
        }
    }

    /// Write a field and reset every field depending on it.
    ///
    /// Returns the fields cleared by the cascade.
    pub fn set_field(&mut self, path: &str, value: FieldValue) -> Vec<&'static str> {
        let previous = self.form.get_path(path).cloned();
        if previous.as_ref() == Some(&value) {
            return Vec::new();
        }
        if let Some(FieldValue::Choice(Some(choice))) = &previous {
            self.form.record_previous_label(path, &choice.label);
        }
        if !self.form.set_path(path, value) {
            return Vec::new();
        }

        if path.contains('.') {
            return Vec::new();
        }
        let cleared = cascade_reset(&mut self.form, self.blueprint.dependencies(), path);
        if !cleared.is_empty() {
            tracing::debug!("Changing {path} cleared {cleared:?}");
        }
        cleared
    }

    /// Modify a field in place through [`Wizard::set_field`]
    pub fn update_field(
        &mut self,
        path: &str,
        update: impl FnOnce(&mut FieldValue),
    ) -> Vec<&'static str> {
        let Some(mut value) = self.form.get_path(path).cloned() else {
            return Vec::new();
        };
        update(&mut value);
        self.set_field(path, value)
    }

    /// Append an empty add-on item, returning its index
    pub fn add_item(&mut self, field: &str) -> Option<usize> {
        self.form.push_item(field, Blueprint::new_addon())
    }

    /// Drop the last item of an `Items` field
    pub fn remove_last_item(&mut self, field: &str) -> bool {
        let Some(FieldValue::Items(mut items)) = self.form.get(field).cloned() else {
            return false;
        };
        if items.pop().is_none() {
            return false;
        }
        let index = items.len();
        self.form.set_path(field, FieldValue::Items(items));
        self.form.clear_errors([format!("{field}.{index}").as_str()]);
        true
    }

    /// Attach a local file to an asset field; it is uploaded on submit
    pub fn queue_asset(&mut self, field: &str, path: impl Into<PathBuf>) -> bool {
        let Some(FieldValue::Assets(mut assets)) = self.form.get(field).cloned() else {
            return false;
        };
        assets.push(Asset::Pending(PendingAsset::from_path(path)));
        self.set_field(field, FieldValue::Assets(assets));
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Enter the submitting state; refused while a submission runs
    pub fn begin_submit(&mut self) -> Result<(), WizardError> {
        if self.pending {
            return Err(WizardError::SubmissionPending);
        }
        self.pending = true;
        Ok(())
    }

    pub fn finish_submit(&mut self) {
        self.pending = false;
    }

    /// Snapshot of the current values as a draft
    pub fn to_draft(&self) -> Draft {
        let previous_payload = match self.blueprint.operation() {
            Operation::Update => Some(self.form.baseline().clone()),
            Operation::Create => None,
        };
        Draft::new(
            self.blueprint.entity_type(),
            self.blueprint.operation(),
            self.target_id.clone(),
            self.form.values().clone(),
            previous_payload,
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::state::{Choice, TaxonomyLevel};

    const SERVICE: Blueprint = Blueprint::ServiceListing {
        operation: Operation::Create,
    };

    pub(crate) const DESCRIPTION: &str = "Thorough cleaning of apartments and houses, \
        including kitchens, bathrooms, windows and balconies.";

    pub(crate) fn choice(id: &str) -> FieldValue {
        FieldValue::Choice(Some(Choice::new(id, &id.to_uppercase())))
    }

    /// Service wizard filled with minimal valid values for steps 1-4
    pub(crate) fn filled_service_wizard() -> Wizard {
        let mut wizard = Wizard::new(SERVICE);
        wizard.set_field("profile", choice("p-1"));
        wizard.set_field("title", FieldValue::Text("Home cleaning".to_string()));
        wizard.set_field("description", FieldValue::Text(DESCRIPTION.to_string()));
        wizard.set_field("category", choice("c-1"));
        wizard.set_field("subcategory", choice("s-1"));
        wizard.set_field("subdivision", choice("d-1"));
        wizard.set_field("price", FieldValue::Text("35".to_string()));
        wizard
    }

    mod transitions {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_new_wizard_starts_at_step_one() {
            let wizard = Wizard::new(SERVICE);
            assert_eq!(wizard.current_step(), 1);
            assert_eq!(wizard.state().total(), 6);
            assert!(wizard.state().completed().is_empty());
        }

        #[test]
        fn test_advance_without_profile_is_blocked() {
            let mut wizard = Wizard::new(SERVICE);
            let rejection = wizard.advance().unwrap_err();
            assert_eq!(rejection.step, 1);
            assert_eq!(rejection.errors.len(), 1);
            assert_eq!(rejection.errors[0].path, "profile");
            assert_eq!(wizard.current_step(), 1);
            assert_eq!(wizard.form().error_for("profile"), Some("Profile is required"));
        }

        #[test]
        fn test_blocked_advance_is_idempotent() {
            let mut wizard = Wizard::new(SERVICE);
            let before = wizard.state().clone();
            for _ in 0..5 {
                assert!(wizard.advance().is_err());
            }
            assert_eq!(wizard.state(), &before);
        }

        #[test]
        fn test_advance_through_required_steps() {
            let mut wizard = filled_service_wizard();
            for _ in 0..4 {
                wizard.advance().unwrap();
            }
            assert_eq!(wizard.current_step(), 5);
            assert_eq!(
                wizard.state().completed().iter().copied().collect::<Vec<_>>(),
                vec![1, 2, 3, 4]
            );
        }

        #[test]
        fn test_empty_addons_step_advances() {
            let mut wizard = filled_service_wizard();
            for _ in 0..4 {
                wizard.advance().unwrap();
            }
            assert_eq!(wizard.advance(), Ok(6));
        }

        #[test]
        fn test_advance_on_last_step_stays() {
            let mut wizard = Wizard::new(Blueprint::TaxonomyItem {
                level: TaxonomyLevel::Category,
                operation: Operation::Create,
            });
            wizard.set_field("label", FieldValue::Text("Cleaning".to_string()));
            wizard.set_field("slug", FieldValue::Text("cleaning".to_string()));
            assert_eq!(wizard.advance(), Ok(1));
            assert!(wizard.state().is_completed(1));
        }

        #[test]
        fn test_retreat_keeps_completed() {
            let mut wizard = filled_service_wizard();
            wizard.advance().unwrap();
            assert!(wizard.retreat());
            assert_eq!(wizard.current_step(), 1);
            assert!(wizard.state().is_completed(1));
            assert!(!wizard.retreat());
        }
    }

    mod jumps {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_jump_back_allowed() {
            let mut wizard = filled_service_wizard();
            wizard.advance().unwrap();
            wizard.advance().unwrap();
            assert!(wizard.jump(1));
            assert_eq!(wizard.current_step(), 1);
        }

        #[test]
        fn test_jump_to_completed_step_allowed() {
            let mut wizard = filled_service_wizard();
            wizard.advance().unwrap();
            wizard.advance().unwrap();
            wizard.jump(1);
            assert!(wizard.jump(2));
            assert!(!wizard.jump(3));
        }

        #[test]
        fn test_jump_ahead_of_unvalidated_refused() {
            let mut wizard = Wizard::new(SERVICE);
            let before = wizard.state().clone();
            assert!(!wizard.jump(4));
            assert!(!wizard.jump(0));
            assert!(!wizard.jump(7));
            assert_eq!(wizard.state(), &before);
        }

        #[test]
        fn test_edit_wizard_can_jump_to_valid_steps() {
            let source = filled_service_wizard();
            let mut wizard = Wizard::for_target(
                Blueprint::ServiceListing {
                    operation: Operation::Update,
                },
                "svc-1",
                source.form().values().clone(),
            );
            assert!(wizard.jump(6));
            assert_eq!(wizard.target_id(), Some("svc-1"));
            assert!(!wizard.form().is_dirty());
        }
    }

    mod fields {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_category_change_cascades() {
            let mut wizard = filled_service_wizard();
            wizard.set_field("tags", FieldValue::Tags(vec!["eco".to_string()]));
            let cleared = wizard.set_field("category", choice("c-2"));
            assert_eq!(cleared, vec!["subcategory", "tags", "subdivision"]);
            assert!(wizard.form().is_empty_value("subdivision"));
            assert_eq!(wizard.form().previous_label("category"), Some("C-1"));
        }

        #[test]
        fn test_same_value_does_not_cascade() {
            let mut wizard = filled_service_wizard();
            assert!(wizard.set_field("category", choice("c-1")).is_empty());
            assert!(!wizard.form().is_empty_value("subcategory"));
        }

        #[test]
        fn test_update_field_pushes_chars() {
            let mut wizard = Wizard::new(SERVICE);
            wizard.update_field("title", |v| v.push_char('A'));
            assert_eq!(wizard.form().text("title"), "A");
            assert!(wizard.form().is_dirty());
        }

        #[test]
        fn test_items_and_assets() {
            let mut wizard = Wizard::new(SERVICE);
            assert_eq!(wizard.add_item("addons"), Some(0));
            wizard.set_field("addons.0.title", FieldValue::Text("Ironing".to_string()));
            assert_eq!(wizard.form().text("addons.0.title"), "Ironing");
            assert!(wizard.remove_last_item("addons"));
            assert!(!wizard.remove_last_item("addons"));

            assert!(wizard.queue_asset("media", "/tmp/front.jpg"));
            assert!(!wizard.queue_asset("title", "/tmp/front.jpg"));
            match wizard.form().get("media") {
                Some(FieldValue::Assets(assets)) => assert!(assets[0].is_pending()),
                other => panic!("unexpected media value: {other:?}"),
            }
        }
    }

    mod submit {
        use super::*;
        use pretty_assertions::assert_eq;

        fn on_last_step() -> Wizard {
            let mut wizard = filled_service_wizard();
            for _ in 0..5 {
                wizard.advance().unwrap();
            }
            wizard
        }

        #[test]
        fn test_submit_only_on_last_step() {
            let mut wizard = filled_service_wizard();
            assert!(!wizard.can_submit());
            assert!(matches!(wizard.check_submit(), Err(WizardError::NotOnLastStep)));
        }

        #[test]
        fn test_submit_on_last_step() {
            let mut wizard = on_last_step();
            assert!(wizard.can_submit());
            assert!(wizard.check_submit().is_ok());
        }

        #[test]
        fn test_submit_requires_profile_still_present() {
            let mut wizard = on_last_step();
            wizard.set_field("profile", FieldValue::Choice(None));
            assert!(!wizard.can_submit());
            match wizard.check_submit() {
                Err(WizardError::StepRejected(rejection)) => {
                    assert_eq!(rejection.step, 1);
                    assert_eq!(rejection.errors[0].path, "profile");
                }
                other => panic!("unexpected result: {other:?}"),
            }
            assert_eq!(wizard.current_step(), 6);
        }

        #[test]
        fn test_pending_guard() {
            let mut wizard = on_last_step();
            wizard.begin_submit().unwrap();
            assert!(!wizard.can_submit());
            assert!(matches!(wizard.begin_submit(), Err(WizardError::SubmissionPending)));
            wizard.finish_submit();
            assert!(wizard.begin_submit().is_ok());
        }
    }

    mod drafts {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_draft_roundtrip_through_wizard() {
            let wizard = filled_service_wizard();
            let draft = wizard.to_draft();
            assert!(draft.previous_payload.is_none());
            let restored = Wizard::from_draft(&draft);
            assert_eq!(restored.blueprint(), SERVICE);
            assert_eq!(restored.form().values(), wizard.form().values());
            assert!(restored.form().is_dirty());
        }

        #[test]
        fn test_only_resumed_wizards_remember_their_draft() {
            let wizard = filled_service_wizard();
            assert_eq!(wizard.resumed_draft(), None);
            let draft = wizard.to_draft();
            let restored = Wizard::from_draft(&draft);
            assert_eq!(restored.resumed_draft(), Some(&draft.key()));
        }

        #[test]
        fn test_update_draft_keeps_previous_payload() {
            let blueprint = Blueprint::TaxonomyItem {
                level: TaxonomyLevel::Category,
                operation: Operation::Update,
            };
            let mut values = FieldMap::new();
            values.insert("label".to_string(), FieldValue::Text("Cleaning".to_string()));
            let mut wizard = Wizard::for_target(blueprint, "cat-1", values);
            wizard.set_field("label", FieldValue::Text("Home cleaning".to_string()));

            let draft = wizard.to_draft();
            assert_eq!(draft.target_id.as_deref(), Some("cat-1"));
            let previous = draft.previous_payload.as_ref().unwrap();
            assert_eq!(
                previous.get("label"),
                Some(&FieldValue::Text("Cleaning".to_string()))
            );
        }
    }
}
