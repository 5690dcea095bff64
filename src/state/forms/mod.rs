//! Form domain layer
//!
//! Field values, dirty tracking and the bindings that map fields to widgets.

mod binding;
mod field;
mod values;

pub use binding::{FieldBinding, WidgetKind};
pub use field::{
    Asset, Choice, FieldMap, FieldValue, PendingAsset, UploadedAsset, LOCAL_REF_PREFIX,
};
pub use values::FormValues;
