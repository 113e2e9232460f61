//! Record, filter and pagination types
//!
//! These mirror the shapes the Data API speaks on the wire: records carry a
//! `recordId` plus a `fieldData` object, find requests carry a list of filter
//! clauses, and list/find replies are normalized into [`PaginatedResult`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single field value as returned by the Data API.
///
/// Number fields arrive as JSON numbers, everything else (dates, text and
/// empty fields) arrives as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Empty,
}

impl FieldValue {
    /// True for absent values and empty strings
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Number(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value; numeric text such as `"12.50"` is parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().replace(',', "").parse().ok(),
            FieldValue::Empty => None,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// Untyped field data: field name to value, unknown fields pass through.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A record as returned by a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T = FieldMap> {
    pub record_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_id: Option<String>,

    pub field_data: T,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portal_data: Option<serde_json::Value>,
}

/// One page of records plus the counts needed to paginate.
///
/// `total_count` is the size of the unfiltered table, `found_count` the size
/// of the current filter's match set, `data` the current page slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T = FieldMap> {
    pub data: Vec<Record<T>>,
    pub total_count: u64,
    pub found_count: u64,
}

impl<T> PaginatedResult<T> {
    /// The result for "no records", whatever the cause
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total_count: 0,
            found_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of pages needed to show every found record at `limit` per page
    pub fn page_count(&self, limit: u32) -> u64 {
        if limit == 0 {
            return 0;
        }
        self.found_count.div_ceil(u64::from(limit))
    }
}

impl<T> Default for PaginatedResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// A set of field criteria that must all hold (AND).
///
/// A find request carries a list of clauses which are OR-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterClause(BTreeMap<String, String>);

impl FilterClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.insert(field, pattern);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, pattern: impl Into<String>) {
        self.0.insert(field.into(), pattern.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Copy every criterion of `other` into this clause, overwriting on conflict.
    pub fn merge(&mut self, other: &FilterClause) {
        for (field, pattern) in &other.0 {
            self.0.insert(field.clone(), pattern.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterClause {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascend,
    Descend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub field_name: String,
    pub sort_order: SortOrder,
}

impl SortSpec {
    pub fn new(field_name: impl Into<String>, sort_order: SortOrder) -> Self {
        Self {
            field_name: field_name.into(),
            sort_order,
        }
    }
}
