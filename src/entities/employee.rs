//! Employees and their placement

use crate::core::entity::Validate;
use crate::core::field::{DATE_FORMAT, FieldFormat};
use crate::core::validation::{RecordValidationConfig, filters, validators};
use chrono::NaiveDate;

crate::impl_record!(
    /// A person working at one location in one position
    ///
    /// Positions and locations cannot be deleted while employees reference them.
    Employee, "employees", "employee",
    {
        first_name: String,
        last_name: String,
        email: String,
        #[serde(default)]
        phone: Option<String>,
        position_id: i64,
        location_id: i64,
        hired_on: NaiveDate,
        salary: f64,
    },
    date_field: "hired_on",
    foreign_keys: [
        position_id -> "positions", Restrict;
        location_id -> "locations", Restrict;
    ],
    unique: [[email]],
);

impl Validate for Employee {
    fn validation_config(_operation: &str) -> RecordValidationConfig {
        RecordValidationConfig::new("employee")
            .filter("first_name", filters::trim())
            .filter("last_name", filters::trim())
            .filter("email", filters::trim())
            .filter("email", filters::lowercase())
            .filter("phone", filters::empty_as_null())
            .filter("salary", filters::round_decimals(2))
            .validate("first_name", validators::required())
            .validate("first_name", validators::string_length(1, 50))
            .validate("last_name", validators::required())
            .validate("last_name", validators::string_length(1, 50))
            .validate("email", validators::required())
            .validate("email", validators::format(FieldFormat::Email))
            .validate("phone", validators::format(FieldFormat::Phone))
            .validate("position_id", validators::required())
            .validate("position_id", validators::positive())
            .validate("location_id", validators::required())
            .validate("location_id", validators::positive())
            .validate("hired_on", validators::required())
            .validate("hired_on", validators::date_format(DATE_FORMAT))
            .validate("hired_on", validators::not_in_future())
            .validate("salary", validators::required())
            .validate("salary", validators::positive())
    }
}
