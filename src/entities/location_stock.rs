//! Supplies in stock at each location

use crate::core::entity::Validate;
use crate::core::field::DATE_FORMAT;
use crate::core::validation::{RecordValidationConfig, filters, validators};
use chrono::NaiveDate;

crate::impl_record!(
    /// Quantity of one supply category held at a location, in the category's unit
    LocationStock, "location_stocks", "location_stock",
    {
        location_id: i64,
        category_id: i64,
        quantity: f64,
        restocked_on: NaiveDate,
    },
    date_field: "restocked_on",
    foreign_keys: [
        location_id -> "locations", Cascade;
        category_id -> "supply_categories", Cascade;
    ],
    unique: [[location_id, category_id]],
);

impl Validate for LocationStock {
    fn validation_config(_operation: &str) -> RecordValidationConfig {
        RecordValidationConfig::new("location_stock")
            .filter("quantity", filters::round_decimals(3))
            .validate("location_id", validators::required())
            .validate("location_id", validators::positive())
            .validate("category_id", validators::required())
            .validate("category_id", validators::positive())
            .validate("quantity", validators::required())
            .validate("quantity", validators::non_negative())
            .validate("restocked_on", validators::required())
            .validate("restocked_on", validators::date_format(DATE_FORMAT))
            .validate("restocked_on", validators::not_in_future())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::validate_payload;
    use serde_json::json;

    #[test]
    fn test_empty_stock_is_allowed() {
        let stock: LocationStock = validate_payload(
            "create",
            json!({"location_id": 1, "category_id": 2, "quantity": 0, "restocked_on": "2024-01-05"}),
        )
        .unwrap();
        assert_eq!(stock.quantity, 0.0);
    }

    #[test]
    fn test_negative_stock_rejected() {
        let err = validate_payload::<LocationStock>(
            "create",
            json!({"location_id": 1, "category_id": 2, "quantity": -1, "restocked_on": "2024-01-05"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("quantity"));
    }
}
