//! Conversion of form values into the multipart payload of a mutation

use crate::state::{format_amount, Asset, FieldMap, FieldValue, LOCAL_REF_PREFIX};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Target encoding of a field in the transport payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEncoding {
    Text,
    Number,
    Boolean,
    Json,
}

impl FieldEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            FieldEncoding::Text => "text",
            FieldEncoding::Number => "number",
            FieldEncoding::Boolean => "boolean",
            FieldEncoding::Json => "json",
        }
    }
}

/// How a single field is written into the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub encoding: FieldEncoding,
    /// Omit the field when it holds no content
    pub skip_empty: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, encoding: FieldEncoding) -> Self {
        Self {
            name,
            encoding,
            skip_empty: false,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldEncoding::Text)
    }

    pub const fn number(name: &'static str) -> Self {
        Self::new(name, FieldEncoding::Number)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldEncoding::Boolean)
    }

    pub const fn json(name: &'static str) -> Self {
        Self::new(name, FieldEncoding::Json)
    }

    pub const fn skip_empty(mut self) -> Self {
        self.skip_empty = true;
        self
    }
}

/// Per-field encoding plan of a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPlan {
    fields: Vec<FieldSpec>,
}

impl FieldPlan {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Same plan with every field omitted when empty, for partial updates
    pub fn partial(mut self) -> Self {
        for spec in &mut self.fields {
            spec.skip_empty = true;
        }
        self
    }
}

/// Ordered `(name, value)` parts of a multipart form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportPayload {
    parts: Vec<(String, String)>,
}

impl TransportPayload {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn parts(&self) -> &[(String, String)] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn into_parts(self) -> Vec<(String, String)> {
        self.parts
    }
}

/// Errors raised while marshalling
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    #[error("field '{field}' still references a local asset that has not been uploaded")]
    UnresolvedAsset { field: String },

    #[error("field '{field}' is not numeric: {value}")]
    NotNumeric { field: String, value: String },

    #[error("field '{field}' cannot be encoded as {encoding}")]
    Unsupported {
        field: String,
        encoding: &'static str,
    },
}

/// Build the transport payload for `values` following `plan`.
///
/// Every encoded part is checked for temporary local asset references,
/// so a payload is either complete and clean or not produced.
pub fn marshal(values: &FieldMap, plan: &FieldPlan) -> Result<TransportPayload, MarshalError> {
    let mut payload = TransportPayload::default();

    for spec in plan.fields() {
        let value = values.get(spec.name);
        if is_skipped(spec, value) {
            continue;
        }
        let unresolved = || MarshalError::UnresolvedAsset {
            field: spec.name.to_string(),
        };
        if value.is_some_and(has_pending_asset) {
            return Err(unresolved());
        }
        let encoded = encode(spec, value)?;
        if encoded.has_local_ref() {
            return Err(unresolved());
        }
        payload.push(spec.name, encoded.into_string());
    }

    Ok(payload)
}

/// Skipping drops absent values; a present flag is always sent, `false` included
fn is_skipped(spec: &FieldSpec, value: Option<&FieldValue>) -> bool {
    if !spec.skip_empty {
        return false;
    }
    match (spec.encoding, value) {
        (_, None) => true,
        (FieldEncoding::Boolean, Some(_)) => false,
        (_, Some(value)) => value.is_empty(),
    }
}

fn has_pending_asset(value: &FieldValue) -> bool {
    match value {
        FieldValue::Assets(assets) => assets.iter().any(Asset::is_pending),
        FieldValue::Items(items) => items
            .iter()
            .flat_map(|item| item.values())
            .any(has_pending_asset),
        _ => false,
    }
}

/// A field after encoding, before it becomes a payload part
enum Encoded {
    Text(String),
    Json(Value),
}

impl Encoded {
    fn has_local_ref(&self) -> bool {
        match self {
            // Tags are comma joined
            Encoded::Text(s) => s.split(',').any(is_local_ref),
            Encoded::Json(json) => json_has_local_ref(json),
        }
    }

    fn into_string(self) -> String {
        match self {
            Encoded::Text(s) => s,
            Encoded::Json(json) => json.to_string(),
        }
    }
}

fn json_has_local_ref(json: &Value) -> bool {
    match json {
        Value::String(s) => is_local_ref(s),
        Value::Array(items) => items.iter().any(json_has_local_ref),
        Value::Object(object) => object
            .iter()
            .any(|(key, value)| is_local_ref(key) || json_has_local_ref(value)),
        _ => false,
    }
}

fn is_local_ref(s: &str) -> bool {
    s.trim_start().starts_with(LOCAL_REF_PREFIX)
}

fn encode(spec: &FieldSpec, value: Option<&FieldValue>) -> Result<Encoded, MarshalError> {
    let unsupported = || MarshalError::Unsupported {
        field: spec.name.to_string(),
        encoding: spec.encoding.label(),
    };

    let text = match spec.encoding {
        FieldEncoding::Text => match value {
            None => String::new(),
            Some(FieldValue::Text(s)) => s.trim().to_string(),
            Some(FieldValue::Flag(b)) => b.to_string(),
            Some(FieldValue::Choice(c)) => c.as_ref().map(|c| c.id.clone()).unwrap_or_default(),
            Some(FieldValue::Tags(tags)) => non_empty_tags(tags).join(","),
            Some(FieldValue::Items(_)) | Some(FieldValue::Assets(_)) => return Err(unsupported()),
        },
        FieldEncoding::Number => {
            let text = match value {
                None => "",
                Some(FieldValue::Text(s)) => s.trim(),
                Some(_) => return Err(unsupported()),
            };
            if text.is_empty() {
                String::new()
            } else {
                match text.parse::<f64>() {
                    Ok(n) if n.is_finite() => format_amount(n),
                    _ => {
                        return Err(MarshalError::NotNumeric {
                            field: spec.name.to_string(),
                            value: text.to_string(),
                        })
                    }
                }
            }
        }
        FieldEncoding::Boolean => match value {
            None => "false".to_string(),
            Some(FieldValue::Flag(b)) => b.to_string(),
            Some(_) => return Err(unsupported()),
        },
        FieldEncoding::Json => {
            return Ok(Encoded::Json(value.map(to_json).unwrap_or(Value::Null)));
        }
    };
    Ok(Encoded::Text(text))
}

fn non_empty_tags(tags: &[String]) -> Vec<&str> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect()
}

/// JSON projection of a field value
pub fn to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::String(s.trim().to_string()),
        FieldValue::Flag(b) => Value::Bool(*b),
        FieldValue::Choice(Some(c)) => json!({ "id": c.id, "label": c.label }),
        FieldValue::Choice(None) => Value::Null,
        FieldValue::Tags(tags) => Value::Array(
            non_empty_tags(tags)
                .into_iter()
                .map(|t| Value::String(t.to_string()))
                .collect(),
        ),
        FieldValue::Items(items) => Value::Array(
            items
                .iter()
                .map(|item| {
                    let object: Map<String, Value> = item
                        .iter()
                        .map(|(k, v)| (k.clone(), to_json(v)))
                        .collect();
                    Value::Object(object)
                })
                .collect(),
        ),
        FieldValue::Assets(assets) => Value::Array(
            assets
                .iter()
                .filter_map(|asset| match asset {
                    Asset::Uploaded(uploaded) => Some(json!({
                        "url": uploaded.url,
                        "public_id": uploaded.public_id,
                        "resource_type": uploaded.resource_type,
                        "width": uploaded.width,
                        "height": uploaded.height,
                    })),
                    Asset::Pending(_) => None,
                })
                .collect(),
        ),
    }
}
