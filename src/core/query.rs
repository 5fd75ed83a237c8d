//! Query parameters, list queries and pagination
//!
//! Every list endpoint accepts the same query string:
//!
//! ```text
//! GET /dishes?page=2&limit=10
//! GET /dishes?filter={"vegetarian": true, "price<=": 12.5, "name~": "soup"}
//! GET /employees?sort=last_name,salary:desc&from=2023-01-01&to=2023-12-31
//! ```
//!
//! Parameters are compiled against the table schema into a [`RecordQuery`],
//! which is applied in a fixed order: filter, date range, sort, paginate.

use crate::core::error::QueryError;
use crate::core::field::{DATE_FORMAT, FieldValue};
use crate::core::schema::TableSchema;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Raw query parameters of a list request
///
/// Every parameter is kept as text so that malformed values are reported as
/// `INVALID_QUERY` instead of a generic extractor rejection.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct QueryParams {
    /// Page number (starts at 1)
    pub page: Option<String>,

    /// Number of rows per page
    pub limit: Option<String>,

    /// Filters as a JSON object
    ///
    /// # Format
    /// - Equality: `{"field": value}`
    /// - Comparison: `{"field>": v, "field>=": v, "field<": v, "field<=": v, "field!=": v}`
    /// - Case-insensitive substring: `{"field~": "text"}`
    pub filter: Option<String>,

    /// Comma-separated sort keys, `field` or `field:asc` or `field:desc`
    pub sort: Option<String>,

    /// Inclusive lower bound on the table's date column (`YYYY-MM-DD`)
    pub from: Option<String>,

    /// Inclusive upper bound on the table's date column (`YYYY-MM-DD`)
    pub to: Option<String>,
}

/// Page size defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

/// Comparison operator of a filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
}

impl FilterOp {
    /// Split a filter key into field name and operator
    ///
    /// Two-character suffixes are tried before one-character ones.
    fn parse_key(key: &str) -> (&str, FilterOp) {
        const SUFFIXES: [(&str, FilterOp); 6] = [
            ("!=", FilterOp::Ne),
            (">=", FilterOp::Ge),
            ("<=", FilterOp::Le),
            (">", FilterOp::Gt),
            ("<", FilterOp::Lt),
            ("~", FilterOp::Contains),
        ];

        for (suffix, op) in SUFFIXES {
            if let Some(field) = key.strip_suffix(suffix) {
                return (field.trim(), op);
            }
        }
        (key.trim(), FilterOp::Eq)
    }
}

/// One `field op value` condition
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub field: String,
    pub op: FilterOp,
    pub value: FieldValue,
}

impl FilterClause {
    /// Whether a row satisfies the clause
    ///
    /// Operands of a different kind than the row value never match.
    pub fn matches(&self, row: &Value) -> bool {
        let raw = row.get(&self.field).unwrap_or(&Value::Null);

        if self.op == FilterOp::Contains {
            return match raw {
                Value::String(s) => FieldValue::String(s.clone()).contains(&self.value),
                _ => false,
            };
        }

        let actual = FieldValue::from_json(raw);
        match self.op {
            FilterOp::Eq => actual.equals(&self.value) == Some(true),
            FilterOp::Ne => actual.equals(&self.value) == Some(false),
            FilterOp::Gt => ordered(&actual, &self.value) == Some(Ordering::Greater),
            FilterOp::Ge => matches!(
                ordered(&actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt => ordered(&actual, &self.value) == Some(Ordering::Less),
            FilterOp::Le => matches!(
                ordered(&actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Contains => false,
        }
    }
}

/// Ordering for range operators; booleans and nulls have none
fn ordered(a: &FieldValue, b: &FieldValue) -> Option<Ordering> {
    match (a, b) {
        (FieldValue::Boolean(_) | FieldValue::Null, _)
        | (_, FieldValue::Boolean(_) | FieldValue::Null) => None,
        _ => a.compare(b),
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// Inclusive date bounds on a date column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub field: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Rows without a parsable date fall outside every range
    pub fn contains(&self, row: &Value) -> bool {
        let Some(date) = row
            .get(&self.field)
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
        else {
            return false;
        };
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// A list query compiled against a table schema
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    pub filters: Vec<FilterClause>,
    pub range: Option<DateRange>,
    pub sort: Vec<SortKey>,
    pub page: usize,
    pub limit: usize,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            range: None,
            sort: Vec::new(),
            page: 1,
            limit: PaginationConfig::default().default_limit,
        }
    }
}

impl QueryParams {
    /// Validate the parameters against a table and build the query
    pub fn compile(
        &self,
        table: &TableSchema,
        pagination: &PaginationConfig,
    ) -> Result<RecordQuery, QueryError> {
        let page = match &self.page {
            Some(raw) => parse_number("page", raw)?.max(1) as usize,
            None => 1,
        };

        let max_limit = pagination.max_limit.max(1);
        let limit = match &self.limit {
            Some(raw) => parse_number("limit", raw)?.clamp(1, max_limit as i64) as usize,
            None => pagination.default_limit.clamp(1, max_limit),
        };

        Ok(RecordQuery {
            filters: self.compile_filter(table)?,
            range: self.compile_range(table)?,
            sort: self.compile_sort(table)?,
            page,
            limit,
        })
    }

    fn compile_filter(&self, table: &TableSchema) -> Result<Vec<FilterClause>, QueryError> {
        let Some(raw) = self.filter.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(Vec::new());
        };

        let parsed: Value = serde_json::from_str(raw).map_err(|e| QueryError::InvalidFilter {
            message: e.to_string(),
        })?;
        let Value::Object(object) = parsed else {
            return Err(QueryError::InvalidFilter {
                message: "filter must be a JSON object".to_string(),
            });
        };

        let mut clauses = Vec::with_capacity(object.len());
        for (key, value) in object {
            let (field, op) = FilterOp::parse_key(&key);
            if !table.has_field(field) {
                return Err(QueryError::UnknownField {
                    table: table.name.to_string(),
                    field: field.to_string(),
                });
            }
            if value.is_array() || value.is_object() {
                return Err(QueryError::InvalidFilter {
                    message: format!("value for '{}' must be a scalar", key),
                });
            }
            let value = match op {
                FilterOp::Contains => match value {
                    Value::String(s) => FieldValue::String(s),
                    _ => {
                        return Err(QueryError::InvalidFilter {
                            message: format!("'{}' expects a string", key),
                        });
                    }
                },
                _ => FieldValue::from_json(&value),
            };
            clauses.push(FilterClause {
                field: field.to_string(),
                op,
                value,
            });
        }
        Ok(clauses)
    }

    fn compile_sort(&self, table: &TableSchema) -> Result<Vec<SortKey>, QueryError> {
        let Some(raw) = self.sort.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(Vec::new());
        };

        raw.split(',')
            .map(|part| {
                let part = part.trim();
                let (field, direction) = match part.split_once(':') {
                    Some((field, direction)) => (field.trim(), Some(direction.trim())),
                    None => (part, None),
                };
                if field.is_empty() {
                    return Err(QueryError::InvalidSort {
                        value: part.to_string(),
                    });
                }
                let descending = match direction.map(str::to_ascii_lowercase).as_deref() {
                    None | Some("asc") => false,
                    Some("desc") => true,
                    Some(_) => {
                        return Err(QueryError::InvalidSort {
                            value: part.to_string(),
                        });
                    }
                };
                if !table.has_field(field) {
                    return Err(QueryError::UnknownField {
                        table: table.name.to_string(),
                        field: field.to_string(),
                    });
                }
                Ok(SortKey {
                    field: field.to_string(),
                    descending,
                })
            })
            .collect()
    }

    fn compile_range(&self, table: &TableSchema) -> Result<Option<DateRange>, QueryError> {
        let from = self.from.as_deref().map(parse_date).transpose()?;
        let to = self.to.as_deref().map(parse_date).transpose()?;
        if from.is_none() && to.is_none() {
            return Ok(None);
        }

        let Some(field) = table.date_field else {
            return Err(QueryError::NoDateColumn {
                table: table.name.to_string(),
            });
        };

        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(QueryError::InvalidRange {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }

        Ok(Some(DateRange {
            field: field.to_string(),
            from,
            to,
        }))
    }
}

fn parse_number(name: &str, raw: &str) -> Result<i64, QueryError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| QueryError::InvalidParameter {
            name: name.to_string(),
            value: raw.to_string(),
        })
}

fn parse_date(raw: &str) -> Result<NaiveDate, QueryError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| QueryError::InvalidDate {
        value: raw.to_string(),
    })
}

impl RecordQuery {
    /// Filter, range, sort and paginate rows
    ///
    /// Returns the rows of the requested page and the number of rows that
    /// matched before pagination.
    pub fn apply(&self, rows: Vec<Value>) -> (Vec<Value>, usize) {
        let mut matched: Vec<Value> = rows
            .into_iter()
            .filter(|row| self.filters.iter().all(|clause| clause.matches(row)))
            .filter(|row| self.range.as_ref().is_none_or(|range| range.contains(row)))
            .collect();

        matched.sort_by(|a, b| self.compare_rows(a, b));

        let total = matched.len();
        let start = (self.page - 1).saturating_mul(self.limit);
        let page = matched.into_iter().skip(start).take(self.limit).collect();
        (page, total)
    }

    fn compare_rows(&self, a: &Value, b: &Value) -> Ordering {
        for key in &self.sort {
            let left = FieldValue::from_json(a.get(&key.field).unwrap_or(&Value::Null));
            let right = FieldValue::from_json(b.get(&key.field).unwrap_or(&Value::Null));
            let ordering = left.sort_cmp(&right);
            let ordering = if key.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        row_id(a).cmp(&row_id(b))
    }
}

fn row_id(row: &Value) -> i64 {
    row.get("id").and_then(Value::as_i64).unwrap_or_default()
}

/// Paginated response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: usize, limit: usize, total: usize) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(page, limit, total),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of rows per page
    pub limit: usize,

    /// Rows matching the query before pagination
    pub total: usize,

    pub total_pages: usize,

    pub has_next: bool,

    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let total_pages = total.div_ceil(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}
