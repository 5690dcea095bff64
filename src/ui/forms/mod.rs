//! Form rendering module
//!
//! - `field_renderer`: bound field rendering and scrolling
//! - `wizard_form`: the stepped wizard page

mod field_renderer;
mod wizard_form;

pub use wizard_form::draw_wizard;
