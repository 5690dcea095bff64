//! Step-scoped validation

use super::blueprint::Blueprint;
use super::schema::FieldError;
use super::step::StepKind;
use crate::state::FormValues;

/// Validates one wizard step against the fields that step owns
#[derive(Debug, Clone, Copy)]
pub struct StepValidator {
    blueprint: Blueprint,
}

impl StepValidator {
    pub fn new(blueprint: Blueprint) -> Self {
        Self { blueprint }
    }

    /// Validate `step` without touching the form.
    ///
    /// Optional steps with no content are valid without consulting their
    /// schema; once anything was entered the full schema applies.
    pub fn validate(&self, step: usize, values: &FormValues) -> Result<(), Vec<FieldError>> {
        let Some(kind) = self.blueprint.step_kind(step, values) else {
            return Err(vec![FieldError::new("", format!("Unknown step {step}"))]);
        };
        validate_kind(&kind, values)
    }

    /// Validate `step` and reflect the outcome in the form's error state.
    ///
    /// Success clears the step's field errors; failure replaces them.
    /// Field values are never modified.
    pub fn apply(&self, step: usize, values: &mut FormValues) -> Result<(), Vec<FieldError>> {
        let result = self.validate(step, values);
        if let Some(kind) = self.blueprint.step_kind(step, values) {
            values.clear_errors(kind.fields());
        }
        if let Err(errors) = &result {
            for error in errors {
                values.set_error(&error.path, &error.message);
            }
        }
        result
    }
}

fn validate_kind(kind: &StepKind, values: &FormValues) -> Result<(), Vec<FieldError>> {
    if kind.is_optional()
        && kind
            .content_fields()
            .iter()
            .all(|field| values.is_empty_value(field))
    {
        return Ok(());
    }
    kind.schema().validate(values.values())
}
