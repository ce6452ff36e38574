//! Field validation run before a request reaches the store.

use crate::types::Fields;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-field validation messages; empty means the fields are valid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Caller-supplied validation
pub trait Validator: Send + Sync {
    fn validate(&self, fields: &Fields) -> ValidationErrors;
}

impl<F> Validator for F
where
    F: Fn(&Fields) -> ValidationErrors + Send + Sync,
{
    fn validate(&self, fields: &Fields) -> ValidationErrors {
        self(fields)
    }
}

/// Requires each listed field to be a non-empty string
#[derive(Debug, Clone, Default)]
pub struct RequiredFields {
    /// (field key, human label)
    fields: Vec<(String, String)>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.fields.push((key.into(), label.into()));
        self
    }

    /// firstName and lastName, as the user editing table requires
    pub fn person_names() -> Self {
        Self::new()
            .require("firstName", "First Name")
            .require("lastName", "Last Name")
    }
}

impl Validator for RequiredFields {
    fn validate(&self, fields: &Fields) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for (key, label) in &self.fields {
            let present = fields
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| !s.is_empty())
                .unwrap_or(false);
            if !present {
                errors.insert(key.clone(), format!("{} is Required", label));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_required_fields_accepts_complete_input() {
        let errors = RequiredFields::person_names()
            .validate(&fields(json!({"firstName": "Ada", "lastName": "Lovelace"})));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_required_fields_reports_each_missing_field() {
        let errors = RequiredFields::person_names().validate(&fields(json!({"firstName": ""})));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("firstName"), Some("First Name is Required"));
        assert_eq!(errors.get("lastName"), Some("Last Name is Required"));
    }

    #[test]
    fn test_non_string_value_is_not_accepted() {
        let errors = RequiredFields::new()
            .require("city", "City")
            .validate(&fields(json!({"city": 12})));
        assert_eq!(errors.get("city"), Some("City is Required"));
    }

    #[test]
    fn test_closure_validator() {
        let validator = |f: &Fields| {
            let mut errors = ValidationErrors::new();
            if !f.contains_key("state") {
                errors.insert("state", "State is Required");
            }
            errors
        };
        assert!(!validator.validate(&Fields::new()).is_empty());
    }
}
