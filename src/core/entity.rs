//! Record trait defining the core abstraction for every table row

use crate::core::error::FieldValidationError;
use crate::core::schema::{ForeignKey, TableSchema};
use crate::core::validation::RecordValidationConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Base trait for all rows served by the API.
///
/// Every row has an integer `id` assigned by the store. Ids of a table are
/// always `1..=n`; deleting a row moves the last row into its slot.
///
/// Implementations are generated by [`impl_record!`](crate::impl_record);
/// validation is added by hand through [`Validate`].
pub trait Record:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Validate + Send + Sync + 'static
{
    /// Table name, also the route segment (e.g. "employees")
    fn table_name() -> &'static str;

    /// Singular name (e.g. "employee")
    fn singular_name() -> &'static str;

    /// Every column except `id`
    fn fields() -> &'static [&'static str];

    /// Column used by `from`/`to` range queries
    fn date_field() -> Option<&'static str> {
        None
    }

    fn foreign_keys() -> &'static [ForeignKey] {
        &[]
    }

    fn unique_keys() -> &'static [&'static [&'static str]] {
        &[]
    }

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// Static schema of the table
    fn schema() -> TableSchema {
        TableSchema {
            name: Self::table_name(),
            singular: Self::singular_name(),
            fields: Self::fields(),
            date_field: Self::date_field(),
            foreign_keys: Self::foreign_keys(),
            unique_keys: Self::unique_keys(),
        }
    }
}

/// Field-level validation of incoming payloads
pub trait Validate {
    /// Declarative filters and validators applied to the raw JSON payload
    fn validation_config(operation: &str) -> RecordValidationConfig;

    /// Checks spanning several fields, run once the payload is typed
    fn check(&self) -> Vec<FieldValidationError> {
        Vec::new()
    }
}
