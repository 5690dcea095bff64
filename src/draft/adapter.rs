//! Schema-gated access to the draft store

use super::{Draft, DraftKey, DraftStore};
use crate::error::WizardError;
use crate::wizard::Schema;

/// Saves drafts only when they satisfy the entity's full schema
pub struct DraftAdapter {
    store: Box<dyn DraftStore>,
}

impl DraftAdapter {
    pub fn new(store: Box<dyn DraftStore>) -> Self {
        Self { store }
    }

    /// Validate `draft` against `schema` and persist it.
    ///
    /// A draft failing validation is not written; any draft already stored
    /// under the same key is left as it was.
    pub fn save(&self, draft: Draft, schema: &Schema) -> Result<DraftKey, WizardError> {
        let key = draft.key();
        if let Err(errors) = schema.validate(&draft.payload) {
            tracing::warn!("Draft {key} rejected with {} invalid field(s)", errors.len());
            return Err(WizardError::DraftRejected(errors));
        }
        self.store.put(draft)?;
        tracing::info!("Draft {key} saved");
        Ok(key)
    }

    pub fn load(&self, key: &DraftKey) -> Result<Option<Draft>, WizardError> {
        Ok(self.store.get(key)?)
    }

    pub fn discard(&self, key: &DraftKey) -> Result<bool, WizardError> {
        let removed = self.store.remove(key)?;
        if removed {
            tracing::debug!("Draft {key} discarded");
        }
        Ok(removed)
    }

    pub fn list(&self) -> Result<Vec<Draft>, WizardError> {
        Ok(self.store.list()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::MemoryDraftStore;
    use crate::state::{EntityType, FieldMap, FieldValue, Operation};
    use crate::wizard::Rule;
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        Schema::new()
            .field("label", "Label", vec![Rule::Required, Rule::MinLength(3)])
            .field("slug", "Slug", vec![Rule::Required, Rule::Slug])
    }

    fn draft(label: &str, slug: &str) -> Draft {
        let mut payload = FieldMap::new();
        payload.insert("label".to_string(), FieldValue::Text(label.to_string()));
        payload.insert("slug".to_string(), FieldValue::Text(slug.to_string()));
        Draft::new(
            EntityType::Subcategory,
            Operation::Update,
            Some("sub-9".to_string()),
            payload,
            None,
        )
    }

    fn adapter() -> DraftAdapter {
        DraftAdapter::new(Box::new(MemoryDraftStore::new()))
    }

    #[test]
    fn test_valid_draft_is_saved_and_loaded() {
        let adapter = adapter();
        let saved = draft("Windows", "windows");
        let key = adapter.save(saved.clone(), &schema()).unwrap();
        assert_eq!(key.to_string(), "subcategory:update:sub-9");
        assert_eq!(adapter.load(&key).unwrap(), Some(saved));
    }

    #[test]
    fn test_rejected_draft_is_not_found() {
        let adapter = adapter();
        let invalid = draft("", "Not A Slug");
        let key = invalid.key();
        match adapter.save(invalid, &schema()) {
            Err(WizardError::DraftRejected(errors)) => {
                let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
                assert_eq!(paths, vec!["label", "slug"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(adapter.load(&key).unwrap().is_none());
    }

    #[test]
    fn test_rejected_draft_keeps_previous_one() {
        let adapter = adapter();
        let valid = draft("Windows", "windows");
        adapter.save(valid.clone(), &schema()).unwrap();
        assert!(adapter.save(draft("W", "windows"), &schema()).is_err());
        assert_eq!(adapter.load(&valid.key()).unwrap(), Some(valid));
    }

    #[test]
    fn test_last_write_wins() {
        let adapter = adapter();
        adapter.save(draft("Windows", "windows"), &schema()).unwrap();
        let second = draft("Window frames", "window-frames");
        let key = adapter.save(second.clone(), &schema()).unwrap();
        assert_eq!(adapter.load(&key).unwrap(), Some(second));
        assert_eq!(adapter.list().unwrap().len(), 1);
    }

    #[test]
    fn test_discard() {
        let adapter = adapter();
        let key = adapter.save(draft("Windows", "windows"), &schema()).unwrap();
        assert!(adapter.discard(&key).unwrap());
        assert!(adapter.load(&key).unwrap().is_none());
        assert!(!adapter.discard(&key).unwrap());
    }
}
