//! Restaurant locations

use crate::core::entity::Validate;
use crate::core::field::{DATE_FORMAT, FieldFormat};
use crate::core::validation::{RecordValidationConfig, filters, validators};
use chrono::NaiveDate;

crate::impl_record!(
    /// A restaurant of the chain
    Location, "locations", "location",
    {
        name: String,
        address: String,
        city: String,
        #[serde(default)]
        phone: Option<String>,
        opened_on: NaiveDate,
        seats: i64,
    },
    date_field: "opened_on",
);

impl Validate for Location {
    fn validation_config(_operation: &str) -> RecordValidationConfig {
        RecordValidationConfig::new("location")
            .filter("name", filters::trim())
            .filter("address", filters::trim())
            .filter("city", filters::trim())
            .filter("phone", filters::empty_as_null())
            .filter("phone", filters::trim())
            .validate("name", validators::required())
            .validate("name", validators::string_length(2, 100))
            .validate("address", validators::required())
            .validate("address", validators::string_length(5, 200))
            .validate("city", validators::required())
            .validate("city", validators::string_length(2, 100))
            .validate("phone", validators::format(FieldFormat::Phone))
            .validate("opened_on", validators::required())
            .validate("opened_on", validators::date_format(DATE_FORMAT))
            .validate("opened_on", validators::not_in_future())
            .validate("seats", validators::required())
            .validate("seats", validators::positive())
            .validate("seats", validators::max_value(2000.0))
    }
}
