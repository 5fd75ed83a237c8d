//! Tables of the restaurant chain
//!
//! Data tables hold the chain's own records; link tables connect them
//! (menu contents, stock levels, supplier catalogues, dish ingredients).

pub mod macros;
pub mod seed;

pub mod dish;
pub mod dish_requirement;
pub mod employee;
pub mod location;
pub mod location_menu;
pub mod location_stock;
pub mod menu;
pub mod menu_dish;
pub mod position;
pub mod supplier;
pub mod supplier_category;
pub mod supply_category;

pub use dish::Dish;
pub use dish_requirement::DishRequirement;
pub use employee::Employee;
pub use location::Location;
pub use location_menu::LocationMenu;
pub use location_stock::LocationStock;
pub use menu::Menu;
pub use menu_dish::MenuDish;
pub use position::Position;
pub use seed::SeedData;
pub use supplier::Supplier;
pub use supplier_category::SupplierCategory;
pub use supply_category::SupplyCategory;

use crate::config::RelationsConfig;
use crate::core::entity::Record;
use crate::core::module::Module;
use crate::core::schema::TableSchema;
use crate::server::entity_registry::TableRegistry;
use anyhow::Result;

/// Module serving every table of the chain
#[derive(Debug, Clone, Copy, Default)]
pub struct RestaurantModule;

impl Module for RestaurantModule {
    fn name(&self) -> &str {
        "restaurant"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn tables(&self) -> Vec<TableSchema> {
        vec![
            Location::schema(),
            Position::schema(),
            Employee::schema(),
            Menu::schema(),
            Dish::schema(),
            Supplier::schema(),
            SupplyCategory::schema(),
            MenuDish::schema(),
            LocationMenu::schema(),
            SupplierCategory::schema(),
            LocationStock::schema(),
            DishRequirement::schema(),
        ]
    }

    fn relations_config(&self) -> Result<RelationsConfig> {
        Ok(RelationsConfig::default_config()?)
    }

    fn register_tables(&self, registry: &mut TableRegistry) {
        registry.register_record::<Location>();
        registry.register_record::<Position>();
        registry.register_record::<Employee>();
        registry.register_record::<Menu>();
        registry.register_record::<Dish>();
        registry.register_record::<Supplier>();
        registry.register_record::<SupplyCategory>();
        registry.register_record::<MenuDish>();
        registry.register_record::<LocationMenu>();
        registry.register_record::<SupplierCategory>();
        registry.register_record::<LocationStock>();
        registry.register_record::<DishRequirement>();
    }
}
