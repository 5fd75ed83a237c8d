//! Menus served at locations

use crate::core::entity::Validate;
use crate::core::field::DATE_FORMAT;
use crate::core::validation::{RecordValidationConfig, validators};
use chrono::NaiveDate;

crate::impl_record!(
    /// A menu served at a location since a given day
    LocationMenu, "location_menus", "location_menu",
    {
        location_id: i64,
        menu_id: i64,
        active_since: NaiveDate,
    },
    date_field: "active_since",
    foreign_keys: [
        location_id -> "locations", Cascade;
        menu_id -> "menus", Cascade;
    ],
    unique: [[location_id, menu_id]],
);

impl Validate for LocationMenu {
    fn validation_config(_operation: &str) -> RecordValidationConfig {
        RecordValidationConfig::new("location_menu")
            .validate("location_id", validators::required())
            .validate("location_id", validators::positive())
            .validate("menu_id", validators::required())
            .validate("menu_id", validators::positive())
            .validate("active_since", validators::required())
            .validate("active_since", validators::date_format(DATE_FORMAT))
    }
}
