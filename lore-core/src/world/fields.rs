//! Key-addressed field access shared by every entity kind.
//!
//! Entity structs derive [`Fields`] (see `lore-macros`), which gives
//! generic code a uniform way to read a field for sorting and filtering,
//! write a single field from editor or AI-assist text, and list the schema
//! an editor should render.

use super::record::RecordMeta;
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

/// Errors from setting a field by key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Unknown field: {0}")]
    Unknown(String),

    #[error("Field '{key}' expects a whole number, got '{value}'")]
    NotANumber { key: String, value: String },
}

/// How a field is stored and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free-form text, compared case-insensitively.
    Text,
    /// Whole number, compared numerically.
    Number,
}

/// Schema entry for one editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Key used in routes, sort parameters and prompts (`type`, `magicSystem`, ...).
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    pub kind: FieldKind,
    /// Whether the editor offers AI field-assist for this field.
    pub assist: bool,
}

/// A borrowed field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(i64),
    Empty,
}

impl<'a> FieldValue<'a> {
    /// The value rendered as text; empty values render as `""`.
    pub fn as_text(&self) -> Cow<'a, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Empty => Cow::Borrowed(""),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
            FieldValue::Empty => true,
        }
    }
}

/// Rust types that can back an entity field.
pub trait FieldType: Sized {
    const KIND: FieldKind;

    fn as_value(&self) -> FieldValue<'_>;

    /// Parse editor text into the field type.
    fn parse(key: &str, text: &str) -> Result<Self, FieldError>;
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::Text;

    fn as_value(&self) -> FieldValue<'_> {
        if self.is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::Text(self)
        }
    }

    fn parse(_key: &str, text: &str) -> Result<Self, FieldError> {
        Ok(text.to_string())
    }
}

impl FieldType for Option<String> {
    const KIND: FieldKind = FieldKind::Text;

    fn as_value(&self) -> FieldValue<'_> {
        match self.as_deref() {
            Some(s) if !s.is_empty() => FieldValue::Text(s),
            _ => FieldValue::Empty,
        }
    }

    fn parse(_key: &str, text: &str) -> Result<Self, FieldError> {
        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text.to_string()))
        }
    }
}

impl FieldType for Option<i64> {
    const KIND: FieldKind = FieldKind::Number;

    fn as_value(&self) -> FieldValue<'_> {
        match self {
            Some(n) => FieldValue::Number(*n),
            None => FieldValue::Empty,
        }
    }

    fn parse(key: &str, text: &str) -> Result<Self, FieldError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        // Accept "12,000" and "12 000" as typed in the editor.
        let digits: String = trimmed
            .chars()
            .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
            .collect();
        digits
            .parse::<i64>()
            .map(Some)
            .map_err(|_| FieldError::NotANumber {
                key: key.to_string(),
                value: text.to_string(),
            })
    }
}

/// Uniform, key-addressed access to an entity's fields.
///
/// Implemented with `#[derive(Fields)]`. Object safe, so mixed collections
/// can be handled as `&dyn Fields`.
pub trait Fields {
    /// The field table for this entity kind.
    fn field_specs() -> &'static [FieldSpec]
    where
        Self: Sized;

    /// Same table, reachable through a trait object.
    fn specs(&self) -> &'static [FieldSpec];

    /// Read a field by key. `None` if the key is not part of the schema.
    fn field(&self, key: &str) -> Option<FieldValue<'_>>;

    /// Write a field from text.
    fn set_field(&mut self, key: &str, value: &str) -> Result<(), FieldError>;

    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn name(&self) -> &str {
        match self.field("name") {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    fn description(&self) -> &str {
        match self.field("description") {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    /// The `type` classification used by list filters.
    fn kind_tag(&self) -> &str {
        match self.field("type") {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    /// Look up the schema entry for a key.
    fn spec(&self, key: &str) -> Option<&'static FieldSpec> {
        self.specs().iter().find(|s| s.key == key)
    }
}
