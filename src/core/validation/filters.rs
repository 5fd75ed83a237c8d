//! Reusable field filters
//!
//! These filters normalise field values before validation runs

use anyhow::Result;
use serde_json::{Value, json};

/// Apply `f` to string values, passing everything else through
fn map_str(
    f: fn(&str) -> String,
) -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    move |_: &str, value: Value| match value {
        Value::String(s) => Ok(Value::String(f(&s))),
        other => Ok(other),
    }
}

/// Strip leading and trailing whitespace
pub fn trim() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    map_str(|s| s.trim().to_string())
}

pub fn lowercase() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    map_str(str::to_lowercase)
}

/// Blank strings become null (for optional text columns)
pub fn empty_as_null() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| match value.as_str() {
        Some(s) if s.trim().is_empty() => Ok(Value::Null),
        _ => Ok(value),
    }
}

/// Round fractional numbers to `decimals` places; integers are left alone
pub fn round_decimals(
    decimals: u32,
) -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    let factor = 10_f64.powi(decimals as i32);
    move |_: &str, value: Value| match value.as_f64() {
        Some(num) if value.is_f64() => Ok(json!((num * factor).round() / factor)),
        _ => Ok(value),
    }
}
