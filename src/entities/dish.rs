//! Dishes

use crate::core::entity::Validate;
use crate::core::validation::{RecordValidationConfig, filters, validators};

crate::impl_record!(
    /// A dish that menus can list
    Dish, "dishes", "dish",
    {
        name: String,
        #[serde(default)]
        description: Option<String>,
        price: f64,
        weight_grams: i64,
        vegetarian: bool,
    },
    unique: [[name]],
);

impl Validate for Dish {
    fn validation_config(_operation: &str) -> RecordValidationConfig {
        RecordValidationConfig::new("dish")
            .filter("name", filters::trim())
            .filter("description", filters::empty_as_null())
            .filter("price", filters::round_decimals(2))
            .validate("name", validators::required())
            .validate("name", validators::string_length(2, 100))
            .validate("description", validators::string_length(0, 500))
            .validate("price", validators::required())
            .validate("price", validators::positive())
            .validate("price", validators::max_value(10_000.0))
            .validate("weight_grams", validators::required())
            .validate("weight_grams", validators::positive())
            .validate("vegetarian", validators::required())
    }
}
