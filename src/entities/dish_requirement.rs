//! Supplies a dish needs per serving

use crate::core::entity::Validate;
use crate::core::validation::{RecordValidationConfig, filters, validators};

crate::impl_record!(
    DishRequirement, "dish_requirements", "dish_requirement",
    {
        dish_id: i64,
        category_id: i64,
        quantity: f64,
    },
    foreign_keys: [
        dish_id -> "dishes", Cascade;
        category_id -> "supply_categories", Cascade;
    ],
    unique: [[dish_id, category_id]],
);

impl Validate for DishRequirement {
    fn validation_config(_operation: &str) -> RecordValidationConfig {
        RecordValidationConfig::new("dish_requirement")
            .filter("quantity", filters::round_decimals(3))
            .validate("dish_id", validators::required())
            .validate("dish_id", validators::positive())
            .validate("category_id", validators::required())
            .validate("category_id", validators::positive())
            .validate("quantity", validators::required())
            .validate("quantity", validators::positive())
    }
}
