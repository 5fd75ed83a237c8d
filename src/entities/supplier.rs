//! Suppliers

use crate::core::entity::Validate;
use crate::core::field::{DATE_FORMAT, FieldFormat};
use crate::core::validation::{RecordValidationConfig, filters, validators};
use chrono::NaiveDate;

crate::impl_record!(
    Supplier, "suppliers", "supplier",
    {
        name: String,
        contact_email: String,
        #[serde(default)]
        phone: Option<String>,
        city: String,
        contract_since: NaiveDate,
    },
    date_field: "contract_since",
);

impl Validate for Supplier {
    fn validation_config(_operation: &str) -> RecordValidationConfig {
        RecordValidationConfig::new("supplier")
            .filter("name", filters::trim())
            .filter("contact_email", filters::trim())
            .filter("contact_email", filters::lowercase())
            .filter("phone", filters::empty_as_null())
            .filter("city", filters::trim())
            .validate("name", validators::required())
            .validate("name", validators::string_length(2, 150))
            .validate("contact_email", validators::required())
            .validate("contact_email", validators::format(FieldFormat::Email))
            .validate("phone", validators::format(FieldFormat::Phone))
            .validate("city", validators::required())
            .validate("city", validators::string_length(2, 100))
            .validate("contract_since", validators::required())
            .validate("contract_since", validators::date_format(DATE_FORMAT))
            .validate("contract_since", validators::not_in_future())
    }
}
