//! Stepped form workflow
//!
//! Blueprints describe each form as an ordered list of [`StepKind`]s. The
//! [`Wizard`] walks them, validating one step at a time and resetting
//! dependent fields when a parent field changes.

mod blueprint;
mod cascade;
mod controller;
mod schema;
mod step;
mod validator;

pub use blueprint::{Blueprint, MAX_ADDONS, MAX_MEDIA};
pub use cascade::{cascade_reset, FieldDependency};
pub use controller::{StepRejection, Wizard, WizardState};
pub use schema::{FieldError, Rule, Schema};
pub use step::{addon_schema, StepKind};
pub use validator::StepValidator;

#[cfg(test)]
pub(crate) use controller::tests as fixtures;
