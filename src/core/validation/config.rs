//! Per-table validation configuration
//!
//! A configuration holds, for one operation, the filters and validators of
//! every field. Filters run first, then validators see the filtered value.

use crate::core::error::FieldValidationError;
use serde_json::Value;

type Validator = Box<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;
type Filter = Box<dyn Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync>;

/// Filters and validators of one table for one operation
pub struct RecordValidationConfig {
    /// Singular name of the table being validated
    pub record_type: String,
    validators: Vec<(String, Validator)>,
    filters: Vec<(String, Filter)>,
}

impl RecordValidationConfig {
    pub fn new(record_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            validators: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Attach a validator to a field
    pub fn add_validator<F>(&mut self, field: &str, validator: F)
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators
            .push((field.to_string(), Box::new(validator)));
    }

    /// Attach a filter to a field
    pub fn add_filter<F>(&mut self, field: &str, filter: F)
    where
        F: Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.filters.push((field.to_string(), Box::new(filter)));
    }

    /// Builder-style variant of [`add_validator`](Self::add_validator)
    pub fn validate<F>(mut self, field: &str, validator: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.add_validator(field, validator);
        self
    }

    /// Builder-style variant of [`add_filter`](Self::add_filter)
    pub fn filter<F>(mut self, field: &str, filter: F) -> Self
    where
        F: Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.add_filter(field, filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty() && self.filters.is_empty()
    }

    /// Filter the payload in place, then run every validator
    ///
    /// Filters only touch fields present in the payload. Validators see
    /// `null` for absent fields. Every failure is collected.
    pub fn validate_and_filter(
        &self,
        mut payload: Value,
    ) -> Result<Value, Vec<FieldValidationError>> {
        let mut errors = Vec::new();

        if let Some(object) = payload.as_object_mut() {
            for (field, filter) in &self.filters {
                let Some(value) = object.remove(field) else {
                    continue;
                };
                match filter(field, value) {
                    Ok(filtered) => {
                        object.insert(field.clone(), filtered);
                    }
                    Err(e) => errors.push(FieldValidationError::new(field.clone(), e.to_string())),
                }
            }
        }

        for (field, validator) in &self.validators {
            let value = payload.get(field).unwrap_or(&Value::Null);
            if let Err(message) = validator(field, value) {
                errors.push(FieldValidationError::new(field.clone(), message));
            }
        }

        if errors.is_empty() {
            Ok(payload)
        } else {
            Err(errors)
        }
    }
}

impl std::fmt::Debug for RecordValidationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordValidationConfig")
            .field("record_type", &self.record_type)
            .field(
                "validators",
                &self.validators.iter().map(|(f, _)| f).collect::<Vec<_>>(),
            )
            .field(
                "filters",
                &self.filters.iter().map(|(f, _)| f).collect::<Vec<_>>(),
            )
            .finish()
    }
}
