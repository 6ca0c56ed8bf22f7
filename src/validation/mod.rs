//! Argument validation.
//!
//! Adapters collect every problem with their input before reporting, so a caller gets
//! the full list of `(property_path, reason)` pairs in one round trip.

pub mod rules;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::OnceLock;

/// One rejected input property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyError {
    pub property_path: String,
    pub reason: String,
}

impl PropertyError {
    pub fn new(property_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            property_path: property_path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.property_path.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.property_path, self.reason)
        }
    }
}

/// One argument key an adapter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgField {
    pub name: &'static str,
    pub required: bool,
}

impl ArgField {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

/// Ordered, aggregate validation failure. Never empty once returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputErrors {
    errors: Vec<PropertyError>,
}

impl InputErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(property_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            errors: vec![PropertyError::new(property_path, reason)],
        }
    }

    pub fn push(&mut self, error: PropertyError) {
        self.errors.push(error);
    }

    /// Records the error of a failed check.
    pub fn check(&mut self, result: Result<(), PropertyError>) {
        if let Err(error) = result {
            self.errors.push(error);
        }
    }

    /// Records the error of a failed check and hands back the checked value otherwise.
    pub fn collect<T>(&mut self, result: Result<T, PropertyError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.errors.push(error);
                None
            }
        }
    }

    /// `Ok(value)` when nothing was recorded.
    ///
    /// A `None` value always comes from [`collect`](Self::collect), which recorded an
    /// error for it.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, InputErrors> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(self),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[PropertyError] {
        &self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<PropertyError> {
        self.errors
    }

    /// First error reported for `property_path`.
    pub fn find(&self, property_path: &str) -> Option<&PropertyError> {
        self.errors.iter().find(|e| e.property_path == property_path)
    }

    /// Checks the keys of an argument object against `fields`: one error per missing
    /// required field, in field order, then one per unknown key. A `null` required value
    /// counts as missing.
    pub fn from_shape(args: &Map<String, Value>, fields: &[ArgField]) -> Self {
        let mut errors = Self::new();
        for field in fields.iter().filter(|f| f.required) {
            if args.get(field.name).map_or(true, Value::is_null) {
                errors.push(PropertyError::new(field.name, "Missing required property"));
            }
        }
        for key in args.keys() {
            if !fields.iter().any(|f| f.name == key) {
                errors.push(PropertyError::new(key.as_str(), "Unknown property"));
            }
        }
        errors
    }

    /// Maps an argument decoding failure onto the property it names.
    pub fn from_decode_error(error: &serde_json::Error) -> Self {
        static FIELD_REGEX: OnceLock<Regex> = OnceLock::new();
        let field_re = FIELD_REGEX.get_or_init(|| {
            Regex::new(r"(missing|unknown) field `([^`]+)`").expect("Invalid field regex")
        });

        let message = error.to_string();
        match field_re.captures(&message) {
            Some(caps) if &caps[1] == "missing" => {
                Self::single(&caps[2], "Missing required property")
            }
            Some(caps) => Self::single(&caps[2], "Unknown property"),
            None => Self::single("", format!("Invalid arguments: {}", message)),
        }
    }
}

impl fmt::Display for InputErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid arguments")?;
        for error in &self.errors {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for InputErrors {}

impl From<PropertyError> for InputErrors {
    fn from(error: PropertyError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for InputErrors {
    type Item = PropertyError;
    type IntoIter = std::vec::IntoIter<PropertyError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
