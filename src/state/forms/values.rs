//! Form values with dirty tracking and per-field errors

use super::field::{FieldMap, FieldValue};
use std::collections::{BTreeMap, BTreeSet};

/// The full set of field values for the entity being edited.
///
/// Paths address nested add-on items with dots: `addons.0.title`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    values: FieldMap,
    /// Values as last saved; `is_dirty` compares against it
    baseline: FieldMap,
    errors: BTreeMap<String, String>,
    /// Label a select field held before its last change
    previous_labels: BTreeMap<String, String>,
}

impl FormValues {
    pub fn new(initial: FieldMap) -> Self {
        Self {
            baseline: initial.clone(),
            values: initial,
            errors: BTreeMap::new(),
            previous_labels: BTreeMap::new(),
        }
    }

    /// Start from `initial` but treat `baseline` as the saved state
    pub fn with_baseline(initial: FieldMap, baseline: FieldMap) -> Self {
        Self {
            values: initial,
            baseline,
            errors: BTreeMap::new(),
            previous_labels: BTreeMap::new(),
        }
    }

    pub fn values(&self) -> &FieldMap {
        &self.values
    }

    pub fn baseline(&self) -> &FieldMap {
        &self.baseline
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Resolve a dotted path such as `addons.1.price`
    pub fn get_path(&self, path: &str) -> Option<&FieldValue> {
        let mut segments = path.split('.');
        let mut current = self.values.get(segments.next()?)?;
        while let Some(index) = segments.next() {
            let index: usize = index.parse().ok()?;
            let key = segments.next()?;
            current = match current {
                FieldValue::Items(items) => items.get(index)?.get(key)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn get_path_mut(&mut self, path: &str) -> Option<&mut FieldValue> {
        let mut segments = path.split('.');
        let mut current = self.values.get_mut(segments.next()?)?;
        while let Some(index) = segments.next() {
            let index: usize = index.parse().ok()?;
            let key = segments.next()?;
            current = match current {
                FieldValue::Items(items) => items.get_mut(index)?.get_mut(key)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Text of a field, or `""` when absent or not text
    pub fn text(&self, path: &str) -> &str {
        self.get_path(path).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn flag(&self, path: &str) -> bool {
        self.get_path(path).is_some_and(FieldValue::as_flag)
    }

    /// Whether a path holds no user content (absent counts as empty)
    pub fn is_empty_value(&self, path: &str) -> bool {
        self.get_path(path).is_none_or(FieldValue::is_empty)
    }

    /// Set a value; top-level fields are created, nested paths must exist.
    /// Returns false when the path cannot be resolved.
    pub fn set_path(&mut self, path: &str, value: FieldValue) -> bool {
        if !path.contains('.') {
            self.values.insert(path.to_string(), value);
            return true;
        }
        match self.get_path_mut(path) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Append an item to an `Items` field, returning its index
    pub fn push_item(&mut self, field: &str, item: FieldMap) -> Option<usize> {
        match self.values.get_mut(field)? {
            FieldValue::Items(items) => {
                items.push(item);
                Some(items.len() - 1)
            }
            _ => None,
        }
    }

    pub fn item_count(&self, field: &str) -> usize {
        match self.values.get(field) {
            Some(FieldValue::Items(items)) => items.len(),
            _ => 0,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.baseline
    }

    /// Top-level fields whose value differs from the baseline
    pub fn dirty_fields(&self) -> Vec<String> {
        let keys: BTreeSet<&String> = self.values.keys().chain(self.baseline.keys()).collect();
        keys.into_iter()
            .filter(|k| self.values.get(*k) != self.baseline.get(*k))
            .cloned()
            .collect()
    }

    /// Make the current values the new saved state
    pub fn reset_baseline(&mut self) {
        self.baseline = self.values.clone();
    }

    pub fn error_for(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    /// Drop errors of the given top-level fields, including their nested paths
    pub fn clear_errors<'a>(&mut self, fields: impl IntoIterator<Item = &'a str>) {
        let fields: Vec<&str> = fields.into_iter().collect();
        self.errors.retain(|path, _| {
            !fields
                .iter()
                .any(|f| path == f || path.starts_with(&format!("{f}.")))
        });
    }

    pub fn set_error(&mut self, path: &str, message: &str) {
        self.errors.insert(path.to_string(), message.to_string());
    }

    pub fn previous_label(&self, field: &str) -> Option<&str> {
        self.previous_labels.get(field).map(String::as_str)
    }

    pub fn record_previous_label(&mut self, field: &str, label: &str) {
        self.previous_labels
            .insert(field.to_string(), label.to_string());
    }

    /// Replace the whole value of a field without touching other state
    pub(crate) fn replace(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
    }
}
