//! Form field value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Prefix of temporary local asset references. Values carrying it must never
/// leave the process.
pub const LOCAL_REF_PREFIX: &str = "blob:";

/// Field name to value mapping; also the shape of one add-on item
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A selected option of a select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl Choice {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

/// An asset that only exists on the local machine so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAsset {
    pub local_ref: String,
    pub path: PathBuf,
}

impl PendingAsset {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            local_ref: format!("{LOCAL_REF_PREFIX}{}", Uuid::new_v4()),
            path: path.into(),
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.local_ref.clone())
    }
}

/// Stable descriptor of an asset stored by the asset store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub url: String,
    pub public_id: String,
    pub resource_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Media attachment bound to an asset field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Asset {
    Pending(PendingAsset),
    Uploaded(UploadedAsset),
}

impl Asset {
    pub fn is_pending(&self) -> bool {
        matches!(self, Asset::Pending(_))
    }

    pub fn display_name(&self) -> String {
        match self {
            Asset::Pending(p) => format!("{} (pending upload)", p.file_name()),
            Asset::Uploaded(u) => u.url.clone(),
        }
    }
}

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Free text; numeric fields are edited as text and coerced on validation
    Text(String),
    Flag(bool),
    Choice(Option<Choice>),
    Tags(Vec<String>),
    /// Repeated line items such as add-ons
    Items(Vec<FieldMap>),
    Assets(Vec<Asset>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    /// Whether the value carries no user content
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Flag(b) => !b,
            FieldValue::Choice(c) => c.is_none(),
            FieldValue::Tags(tags) => tags.iter().all(|t| t.trim().is_empty()),
            FieldValue::Items(items) => items.is_empty(),
            FieldValue::Assets(assets) => assets.is_empty(),
        }
    }

    /// An empty value of the same kind
    pub fn cleared(&self) -> FieldValue {
        match self {
            FieldValue::Text(_) => FieldValue::Text(String::new()),
            FieldValue::Flag(_) => FieldValue::Flag(false),
            FieldValue::Choice(_) => FieldValue::Choice(None),
            FieldValue::Tags(_) => FieldValue::Tags(Vec::new()),
            FieldValue::Items(_) => FieldValue::Items(Vec::new()),
            FieldValue::Assets(_) => FieldValue::Assets(Vec::new()),
        }
    }

    /// Get the text value (returns empty string for other kinds)
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            _ => "",
        }
    }

    pub fn as_flag(&self) -> bool {
        matches!(self, FieldValue::Flag(true))
    }

    pub fn as_choice(&self) -> Option<&Choice> {
        match self {
            FieldValue::Choice(c) => c.as_ref(),
            _ => None,
        }
    }

    /// Number of entries for collection values
    pub fn len(&self) -> usize {
        match self {
            FieldValue::Text(s) => s.chars().count(),
            FieldValue::Tags(tags) => tags.iter().filter(|t| !t.trim().is_empty()).count(),
            FieldValue::Items(items) => items.len(),
            FieldValue::Assets(assets) => assets.len(),
            FieldValue::Flag(_) | FieldValue::Choice(_) => usize::from(!self.is_empty()),
        }
    }

    /// Push a character to the field value.
    ///
    /// Tags treat `,` as the separator that starts a new tag.
    pub fn push_char(&mut self, c: char) {
        match self {
            FieldValue::Text(s) => s.push(c),
            FieldValue::Tags(tags) => {
                if c == ',' {
                    if tags.last().is_some_and(|t| !t.trim().is_empty()) {
                        tags.push(String::new());
                    }
                } else if let Some(last) = tags.last_mut() {
                    last.push(c);
                } else {
                    tags.push(c.to_string());
                }
            }
            FieldValue::Flag(_)
            | FieldValue::Choice(_)
            | FieldValue::Items(_)
            | FieldValue::Assets(_) => {}
        }
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        match self {
            FieldValue::Text(s) => {
                s.pop();
            }
            FieldValue::Tags(tags) => {
                if let Some(last) = tags.last_mut() {
                    if last.pop().is_none() || last.is_empty() {
                        tags.pop();
                    }
                }
            }
            FieldValue::Assets(assets) => {
                assets.pop();
            }
            FieldValue::Flag(_) | FieldValue::Choice(_) | FieldValue::Items(_) => {}
        }
    }

    /// Flip a flag value
    pub fn toggle(&mut self) {
        if let FieldValue::Flag(b) = self {
            *b = !*b;
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Flag(true) => "[x]".to_string(),
            FieldValue::Flag(false) => "[ ]".to_string(),
            FieldValue::Choice(Some(c)) => c.label.clone(),
            FieldValue::Choice(None) => String::new(),
            FieldValue::Tags(tags) => tags.join(", "),
            FieldValue::Items(items) => format!("{} item(s)", items.len()),
            FieldValue::Assets(assets) => assets
                .iter()
                .map(Asset::display_name)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
