//! Field value types and format checks

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// Date format used on the wire for every date column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A polymorphic field value read out of a JSON row
///
/// Strings that parse as `YYYY-MM-DD` become [`FieldValue::Date`], so date
/// columns compare chronologically and can be matched against range bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    String(String),
    Null,
}

impl FieldValue {
    /// Build a field value from a JSON scalar
    ///
    /// Arrays and objects have no ordering and map to `Null`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => match NaiveDate::parse_from_str(s, DATE_FORMAT) {
                Ok(date) => FieldValue::Date(date),
                Err(_) => FieldValue::String(s.clone()),
            },
            Value::Array(_) | Value::Object(_) => FieldValue::Null,
        }
    }

    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Compare two values of compatible kinds
    ///
    /// Integers and floats compare numerically with each other. Booleans only
    /// compare for equality. Mismatched kinds return `None`.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Some(Ordering::Equal),
            (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) if a == b => Some(Ordering::Equal),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }

    /// Equality between values of compatible kinds, `None` when kinds differ
    pub fn equals(&self, other: &FieldValue) -> Option<bool> {
        match (self, other) {
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a == b),
            _ => self
                .compare(other)
                .map(|ordering| ordering == Ordering::Equal),
        }
    }

    /// Total ordering used for sorting rows
    ///
    /// Nulls sort first, then booleans, numbers, dates and strings.
    pub fn sort_cmp(&self, other: &FieldValue) -> Ordering {
        if let Some(ordering) = self.compare(other) {
            return ordering;
        }
        match (self, other) {
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Boolean(_) => 1,
            FieldValue::Integer(_) | FieldValue::Float(_) => 2,
            FieldValue::Date(_) => 3,
            FieldValue::String(_) => 4,
        }
    }

    /// Case-insensitive substring match, strings only
    pub fn contains(&self, needle: &FieldValue) -> bool {
        match (self, needle) {
            (FieldValue::String(haystack), FieldValue::String(needle)) => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => false,
        }
    }
}

/// Field format validators
#[derive(Debug, Clone)]
pub enum FieldFormat {
    Email,
    Phone,
    Custom(Regex),
}

impl FieldFormat {
    /// Validate a string against this format
    pub fn matches(&self, value: &str) -> bool {
        match self {
            FieldFormat::Email => Self::is_valid_email(value),
            FieldFormat::Phone => Self::is_valid_phone(value),
            FieldFormat::Custom(regex) => regex.is_match(value),
        }
    }

    /// Short human-readable name used in validation messages
    pub fn describe(&self) -> &str {
        match self {
            FieldFormat::Email => "an email address",
            FieldFormat::Phone => "a phone number",
            FieldFormat::Custom(regex) => regex.as_str(),
        }
    }

    fn is_valid_email(email: &str) -> bool {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
                .expect("email pattern is valid")
        });
        regex.is_match(email)
    }

    fn is_valid_phone(phone: &str) -> bool {
        static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PHONE_REGEX.get_or_init(|| {
            // E.164: at least 8 digits, max 15
            Regex::new(r"^\+?[1-9]\d{7,14}$").expect("phone pattern is valid")
        });
        regex.is_match(phone)
    }
}
