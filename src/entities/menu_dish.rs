//! Dishes listed on menus

use crate::core::entity::Validate;
use crate::core::validation::{RecordValidationConfig, validators};

crate::impl_record!(
    MenuDish, "menu_dishes", "menu_dish",
    {
        menu_id: i64,
        dish_id: i64,
    },
    foreign_keys: [
        menu_id -> "menus", Cascade;
        dish_id -> "dishes", Cascade;
    ],
    unique: [[menu_id, dish_id]],
);

impl Validate for MenuDish {
    fn validation_config(_operation: &str) -> RecordValidationConfig {
        RecordValidationConfig::new("menu_dish")
            .validate("menu_id", validators::required())
            .validate("menu_id", validators::positive())
            .validate("dish_id", validators::required())
            .validate("dish_id", validators::positive())
    }
}
