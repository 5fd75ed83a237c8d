//! Supply categories (what suppliers deliver and locations stock)

use crate::core::entity::Validate;
use crate::core::validation::{RecordValidationConfig, filters, validators};

/// Units a supply category can be measured in
pub const UNITS: &[&str] = &["kg", "l", "pcs", "pack"];

crate::impl_record!(
    SupplyCategory, "supply_categories", "supply_category",
    {
        name: String,
        unit: String,
    },
    unique: [[name]],
);

impl Validate for SupplyCategory {
    fn validation_config(_operation: &str) -> RecordValidationConfig {
        RecordValidationConfig::new("supply_category")
            .filter("name", filters::trim())
            .filter("unit", filters::trim())
            .filter("unit", filters::lowercase())
            .validate("name", validators::required())
            .validate("name", validators::string_length(2, 100))
            .validate("unit", validators::required())
            .validate("unit", validators::in_list(UNITS))
    }
}
