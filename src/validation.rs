//! Form validation and sanitization
//!
//! Submitted forms are collected into [`FormFields`], sanitized into a typed
//! form struct deriving [`Validate`], and checked there. A failed rule never
//! raises: it becomes a [`Violation`] in the [`ValidationReport`], and the
//! request pipeline decides what to render.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::{map::Entry, IndexMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// A submitted form value: a single field occurrence, or a repeated one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    /// First submitted value
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(value) => Some(value),
            FieldValue::List(values) => values.first().map(String::as_str),
        }
    }
}

/// Coerce a possibly-scalar field into a list.
///
/// A single checked checkbox submits a scalar and several submit a list:
/// absent becomes `[]`, a scalar becomes `[scalar]`, a list is kept as is.
pub fn coerce_list(value: Option<FieldValue>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(FieldValue::Scalar(value)) => vec![value],
        Some(FieldValue::List(values)) => values,
    }
}

/// Submitted form fields, in submission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: IndexMap<String, FieldValue>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded `key=value` pairs; a repeated key becomes a list
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut form = Self::new();
        for (key, value) in pairs {
            form.push(key, value);
        }
        form
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.fields.entry(key.into()) {
            Entry::Occupied(mut entry) => {
                let merged = match entry.get_mut() {
                    FieldValue::Scalar(first) => vec![std::mem::take(first), value],
                    FieldValue::List(values) => {
                        values.push(value);
                        return;
                    }
                };
                entry.insert(FieldValue::List(merged));
            }
            Entry::Vacant(entry) => {
                entry.insert(FieldValue::Scalar(value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Raw text of a field, `None` when it was not submitted
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::first)
    }

    /// Trimmed text of a field, empty when it was not submitted
    pub fn text(&self, key: &str) -> String {
        trim(self.raw(key).unwrap_or_default())
    }

    /// Multi-value field after [`coerce_list`]
    pub fn list(&self, key: &str) -> Vec<String> {
        coerce_list(self.get(key).cloned())
    }
}

/// Trim surrounding whitespace
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Calendar-date layouts, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%G-W%V-%u"];

/// Local date-time layouts; the time part is dropped
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Coerce an ISO-8601 value into a date. Empty or unparsable input gives `None`.
///
/// Reduced precision (`2024`, `2024-05`) maps to the first day of the
/// period. Ordinal (`2024-122`) and week (`2024-W18-3`) dates are accepted.
pub fn to_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| reduced_precision(value))
}

fn reduced_precision(value: &str) -> Option<NaiveDate> {
    match value.len() {
        4 => NaiveDate::parse_from_str(&format!("{}-01-01", value), "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").ok(),
        8 => NaiveDate::parse_from_str(value, "%Y-%j").ok(),
        _ => None,
    }
}

/// ASCII letters and digits only; empty fails
pub fn alphanumeric(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("alphanumeric"))
    }
}

/// ISO-8601 date as accepted by [`to_date`]; skipped when empty
pub fn iso8601_date(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || to_date(value).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("iso8601_date"))
    }
}

/// Record id; skipped when empty
pub fn reference(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || Uuid::parse_str(value).is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("reference"))
    }
}

/// Every entry of a multi-value field is a record id
pub fn references(values: &[String]) -> Result<(), ValidationError> {
    values.iter().try_for_each(|value| reference(value))
}

/// A single failed rule on a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

/// Ordered list of violations produced by one validation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// Flatten validator errors, field by field in `fields` order and rule by
    /// rule in declaration order. A rule without a message reports its code.
    pub fn from_errors(result: Result<(), ValidationErrors>, fields: &[&'static str]) -> Self {
        let Err(errors) = result else {
            return Self::default();
        };
        let by_field = errors.field_errors();
        let violations = fields
            .iter()
            .filter_map(|field| by_field.get(field).map(|errors| (*field, *errors)))
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| Violation {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| error.code.to_string()),
                })
            })
            .collect();
        Self { violations }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.message.as_str()).collect()
    }
}

/// A typed form built from submitted fields and checked with `validator`
pub trait FormInput: Validate + Sized {
    /// Field names in the order violations are reported
    const FIELDS: &'static [&'static str];

    /// Sanitize submitted fields into the form
    fn from_fields(fields: &FormFields) -> Self;

    fn report(&self) -> ValidationReport {
        ValidationReport::from_errors(self.validate(), Self::FIELDS)
    }
}
