//! Job positions

use crate::core::entity::Validate;
use crate::core::validation::{RecordValidationConfig, filters, validators};

crate::impl_record!(
    /// A job title with its base salary
    Position, "positions", "position",
    {
        title: String,
        base_salary: f64,
        #[serde(default)]
        description: Option<String>,
    },
    unique: [[title]],
);

impl Validate for Position {
    fn validation_config(_operation: &str) -> RecordValidationConfig {
        RecordValidationConfig::new("position")
            .filter("title", filters::trim())
            .filter("description", filters::empty_as_null())
            .filter("base_salary", filters::round_decimals(2))
            .validate("title", validators::required())
            .validate("title", validators::string_length(2, 100))
            .validate("base_salary", validators::required())
            .validate("base_salary", validators::positive())
            .validate("description", validators::string_length(0, 500))
    }
}
