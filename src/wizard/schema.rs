//! Declarative validation rules over form fields

use crate::state::{FieldMap, FieldValue};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").ok());

static SLUG_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").ok());

fn pattern_matches(pattern: &Lazy<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

/// Absolute http(s) URL with a host
fn is_web_url(text: &str) -> bool {
    Url::parse(text).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
    })
}

/// A validation failure attributed to a field path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A single constraint on a field value
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must carry content
    Required,
    /// Minimum character count for text
    MinLength(usize),
    /// Maximum character count for text, or entry count for tags
    MaxLength(usize),
    /// Text must parse as a number greater than zero
    Positive,
    /// Maximum number of entries of a collection
    MaxItems(usize),
    /// Text must look like an email address
    Email,
    /// Text must be an http(s) URL
    Url,
    /// Lowercase letters, digits and dashes only
    Slug,
    /// Every item of an `Items` field must satisfy the nested schema
    Each(Schema),
}

/// Rules for one field
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: &'static str,
    pub label: &'static str,
    pub rules: Vec<Rule>,
}

/// A set of field rules; immutable once built
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldRule>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: &'static str, label: &'static str, rules: Vec<Rule>) -> Self {
        self.fields.push(FieldRule {
            field,
            label,
            rules,
        });
        self
    }

    /// Combine two schemas; rules of `other` for an already present field are appended
    pub fn merge(mut self, other: Schema) -> Self {
        for rule in other.fields {
            match self.fields.iter_mut().find(|f| f.field == rule.field) {
                Some(existing) => existing.rules.extend(rule.rules),
                None => self.fields.push(rule),
            }
        }
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.field)
    }

    /// Validate `values`, reporting every failing field.
    ///
    /// Per field only the first failing rule is reported; nested item errors
    /// are reported under `field.index.item_field`.
    pub fn validate(&self, values: &FieldMap) -> Result<(), Vec<FieldError>> {
        let errors = self.collect_errors("", values);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn collect_errors(&self, prefix: &str, values: &FieldMap) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for rule in &self.fields {
            let path = format!("{prefix}{}", rule.field);
            check_field(&path, rule, values.get(rule.field), &mut errors);
        }
        errors
    }
}

fn check_field(
    path: &str,
    rule: &FieldRule,
    value: Option<&FieldValue>,
    out: &mut Vec<FieldError>,
) {
    let empty = value.is_none_or(FieldValue::is_empty);
    if empty {
        if rule.rules.iter().any(|r| matches!(r, Rule::Required)) {
            out.push(FieldError::new(path, format!("{} is required", rule.label)));
        }
        return;
    }
    let Some(value) = value else {
        return;
    };

    for r in &rule.rules {
        if let Rule::Each(schema) = r {
            if let FieldValue::Items(items) = value {
                for (index, item) in items.iter().enumerate() {
                    out.extend(schema.collect_errors(&format!("{path}.{index}."), item));
                }
            }
            continue;
        }
        if let Some(message) = check_rule(r, rule.label, value) {
            out.push(FieldError::new(path, message));
            return;
        }
    }
}

fn check_rule(rule: &Rule, label: &str, value: &FieldValue) -> Option<String> {
    match rule {
        Rule::Required | Rule::Each(_) => None,
        Rule::MinLength(min) => match value {
            FieldValue::Text(s) if s.trim().chars().count() < *min => {
                Some(format!("{label} must be at least {min} characters"))
            }
            _ => None,
        },
        Rule::MaxLength(max) => match value {
            FieldValue::Text(s) if s.trim().chars().count() > *max => {
                Some(format!("{label} must be at most {max} characters"))
            }
            FieldValue::Tags(_) if value.len() > *max => {
                Some(format!("{label} accepts at most {max} entries"))
            }
            _ => None,
        },
        Rule::Positive => match value.as_text().trim().parse::<f64>() {
            Ok(n) if n.is_finite() && n > 0.0 => None,
            Ok(_) => Some(format!("{label} must be greater than 0")),
            Err(_) => Some(format!("{label} must be a number")),
        },
        Rule::MaxItems(max) => {
            if value.len() > *max {
                Some(format!("{label} accepts at most {max} entries"))
            } else {
                None
            }
        }
        Rule::Email => (!pattern_matches(&EMAIL_PATTERN, value.as_text().trim()))
            .then(|| format!("{label} must be a valid email address")),
        Rule::Url => (!is_web_url(value.as_text().trim()))
            .then(|| format!("{label} must be an http:// or https:// address")),
        Rule::Slug => (!pattern_matches(&SLUG_PATTERN, value.as_text().trim())).then(|| {
            format!("{label} may only contain lowercase letters, digits and single dashes")
        }),
    }
}
