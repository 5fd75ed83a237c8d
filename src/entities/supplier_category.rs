//! Supply categories offered by suppliers

use crate::core::entity::Validate;
use crate::core::validation::{RecordValidationConfig, filters, validators};

crate::impl_record!(
    /// A supplier's price for one unit of a supply category
    SupplierCategory, "supplier_categories", "supplier_category",
    {
        supplier_id: i64,
        category_id: i64,
        unit_price: f64,
    },
    foreign_keys: [
        supplier_id -> "suppliers", Cascade;
        category_id -> "supply_categories", Cascade;
    ],
    unique: [[supplier_id, category_id]],
);

impl Validate for SupplierCategory {
    fn validation_config(_operation: &str) -> RecordValidationConfig {
        RecordValidationConfig::new("supplier_category")
            .filter("unit_price", filters::round_decimals(2))
            .validate("supplier_id", validators::required())
            .validate("supplier_id", validators::positive())
            .validate("category_id", validators::required())
            .validate("category_id", validators::positive())
            .validate("unit_price", validators::required())
            .validate("unit_price", validators::positive())
    }
}
