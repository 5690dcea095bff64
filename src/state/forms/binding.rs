//! Bindings between form values and input widgets

/// Input widget used to edit a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    TextInput { multiline: bool },
    NumberInput,
    Toggle,
    Select,
    TagInput,
    AssetInput,
}

impl WidgetKind {
    /// Whether typed characters go into the field value
    pub fn accepts_text(&self) -> bool {
        matches!(
            self,
            WidgetKind::TextInput { .. } | WidgetKind::NumberInput | WidgetKind::TagInput
        )
    }
}

/// Represents a single visible form field with its configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    /// Dotted path into the form values
    pub path: String,
    pub label: String,
    pub widget: WidgetKind,
}

impl FieldBinding {
    pub fn new(path: impl Into<String>, label: impl Into<String>, widget: WidgetKind) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            widget,
        }
    }

    pub fn text(path: &str, label: &str) -> Self {
        Self::new(path, label, WidgetKind::TextInput { multiline: false })
    }

    pub fn multiline(path: &str, label: &str) -> Self {
        Self::new(path, label, WidgetKind::TextInput { multiline: true })
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self.widget, WidgetKind::TextInput { multiline: true })
    }

    /// Top-level field this binding edits
    pub fn field(&self) -> &str {
        self.path.split('.').next().unwrap_or(&self.path)
    }
}
