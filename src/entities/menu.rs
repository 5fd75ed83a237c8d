//! Menus

use crate::core::entity::Validate;
use crate::core::error::FieldValidationError;
use crate::core::field::DATE_FORMAT;
use crate::core::validation::{RecordValidationConfig, filters, validators};
use chrono::NaiveDate;

crate::impl_record!(
    /// A menu valid over a period; an open-ended menu has no `valid_to`
    Menu, "menus", "menu",
    {
        name: String,
        #[serde(default)]
        description: Option<String>,
        valid_from: NaiveDate,
        #[serde(default)]
        valid_to: Option<NaiveDate>,
    },
    date_field: "valid_from",
);

impl Validate for Menu {
    fn validation_config(_operation: &str) -> RecordValidationConfig {
        RecordValidationConfig::new("menu")
            .filter("name", filters::trim())
            .filter("description", filters::empty_as_null())
            .validate("name", validators::required())
            .validate("name", validators::string_length(2, 100))
            .validate("description", validators::string_length(0, 500))
            .validate("valid_from", validators::required())
            .validate("valid_from", validators::date_format(DATE_FORMAT))
            .validate("valid_to", validators::date_format(DATE_FORMAT))
    }

    fn check(&self) -> Vec<FieldValidationError> {
        match self.valid_to {
            Some(valid_to) if valid_to < self.valid_from => vec![FieldValidationError::new(
                "valid_to",
                format!("must not be before valid_from ({})", self.valid_from),
            )],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::validate_payload;
    use serde_json::json;

    #[test]
    fn test_open_ended_menu() {
        let menu: Menu =
            validate_payload("create", json!({"name": "Summer", "valid_from": "2024-06-01"}))
                .unwrap();
        assert_eq!(menu.valid_to, None);
    }

    #[test]
    fn test_period_must_not_be_inverted() {
        let err = validate_payload::<Menu>(
            "update",
            json!({"name": "Summer", "valid_from": "2024-06-01", "valid_to": "2024-05-31"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("valid_to"));

        let same_day: Menu = validate_payload(
            "update",
            json!({"name": "Summer", "valid_from": "2024-06-01", "valid_to": "2024-06-01"}),
        )
        .unwrap();
        assert!(same_day.check().is_empty());
    }
}
