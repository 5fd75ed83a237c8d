//! Validation and filtering of request payloads
//!
//! Each table declares, per operation, filters that normalise the raw JSON
//! payload and validators that check it. The [`Validated`] extractor runs
//! them before handlers see the typed row.

pub mod config;
pub mod extractor;
pub mod filters;
pub mod validators;

pub use config::RecordValidationConfig;
pub use extractor::{Validated, validate_payload};
