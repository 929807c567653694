//! Record store abstraction
//!
//! The hosted store is record-oriented: every table holds records made of an
//! id and a free-form field map. The gateway only needs get, list, create and
//! patch, so that is the whole trait.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::AppResult;

/// Field map of one record
pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
}

/// Options for listing a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter_by_formula: Option<String>,
    pub max_records: Option<usize>,
    /// Restrict the returned fields; empty means all
    pub fields: Vec<String>,
}

impl ListQuery {
    pub fn filter(formula: impl Into<String>) -> Self {
        Self {
            filter_by_formula: Some(formula.into()),
            ..Default::default()
        }
    }

    pub fn limit(max_records: usize) -> Self {
        Self {
            max_records: Some(max_records),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_record(&self, table: &str, id: &str) -> AppResult<Record>;

    /// All matching records, following pagination
    async fn list_records(&self, table: &str, query: &ListQuery) -> AppResult<Vec<Record>>;

    async fn create_record(&self, table: &str, fields: Fields) -> AppResult<Record>;

    /// Patch: fields not present are left untouched
    async fn update_record(&self, table: &str, id: &str, fields: Fields) -> AppResult<Record>;
}

// ============================================================================
// Field Value Helpers
// ============================================================================

fn is_special_value(value: &Value) -> bool {
    match value {
        Value::Object(obj) => obj.contains_key("specialValue") || obj.contains_key("error"),
        _ => false,
    }
}

/// Replace error cells (`{"specialValue": "NaN"}`, `{"error": "#ERROR!"}`) with null
pub fn sanitize(fields: &mut Fields) {
    for value in fields.values_mut() {
        sanitize_value(value);
    }
}

fn sanitize_value(value: &mut Value) {
    if is_special_value(value) {
        *value = Value::Null;
        return;
    }
    if let Value::Array(items) = value {
        for item in items.iter_mut() {
            sanitize_value(item);
        }
    }
}

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    let s = n.to_string();
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
}

fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => number_to_decimal(n),
        Value::String(s) if !s.trim().is_empty() => Some(shared::parse_amount(s)),
        Value::Array(items) => items.first().and_then(value_to_decimal),
        _ => None,
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_to_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}

/// Text of a field; lookup arrays are joined, missing fields are empty
pub fn text(fields: &Fields, name: &str) -> String {
    opt_text(fields, name).unwrap_or_default()
}

/// Non-empty text of a field
pub fn opt_text(fields: &Fields, name: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(value_to_text)
        .filter(|s| !s.trim().is_empty())
}

/// Numeric field, zero when missing or not a number
pub fn number(fields: &Fields, name: &str) -> Decimal {
    opt_number(fields, name).unwrap_or(Decimal::ZERO)
}

pub fn opt_number(fields: &Fields, name: &str) -> Option<Decimal> {
    fields.get(name).and_then(value_to_decimal)
}

/// Non-negative whole number field
pub fn count(fields: &Fields, name: &str) -> Option<u32> {
    opt_number(fields, name).and_then(|d| d.trunc().to_u32())
}

pub fn flag(fields: &Fields, name: &str) -> bool {
    match fields.get(name) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.as_str(), "true" | "1" | "כן"),
        Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
        _ => false,
    }
}

/// Linked record ids of a link field
pub fn links(fields: &Fields, name: &str) -> Vec<String> {
    match fields.get(name) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// URL of the first attachment, preferring the large thumbnail
pub fn attachment_url(fields: &Fields, name: &str) -> Option<String> {
    let first = fields.get(name)?.as_array()?.first()?;
    first
        .pointer("/thumbnails/large/url")
        .or_else(|| first.get("url"))
        .and_then(Value::as_str)
        .map(String::from)
}

/// Decimal as a JSON number for writing
pub fn decimal_value(value: Decimal) -> Value {
    value
        .to_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_sanitize_special_values() {
        let mut f = fields(json!({
            "price": { "specialValue": "NaN" },
            "total": { "error": "#ERROR!" },
            "lookup": [1, { "specialValue": "Infinity" }],
            "name": "ok"
        }));
        sanitize(&mut f);
        assert_eq!(f["price"], Value::Null);
        assert_eq!(f["total"], Value::Null);
        assert_eq!(f["lookup"], json!([1, null]));
        assert_eq!(f["name"], json!("ok"));
    }

    #[test]
    fn test_number_parsing() {
        let f = fields(json!({
            "int": 42,
            "float": 12.5,
            "text": "7.25",
            "lookup": [0.36],
            "junk": "abc",
            "empty": ""
        }));
        assert_eq!(number(&f, "int"), Decimal::new(42, 0));
        assert_eq!(number(&f, "float"), Decimal::new(125, 1));
        assert_eq!(number(&f, "text"), Decimal::new(725, 2));
        assert_eq!(number(&f, "lookup"), Decimal::new(36, 2));
        assert_eq!(number(&f, "junk"), Decimal::ZERO);
        assert_eq!(opt_number(&f, "empty"), None);
        assert_eq!(opt_number(&f, "missing"), None);
    }

    #[test]
    fn test_text_links_and_attachments() {
        let f = fields(json!({
            "name": "Dana",
            "lookup": ["a", "b"],
            "blank": "  ",
            "links": ["recAAAAAAAAAAAAAA", "recBBBBBBBBBBBBBB"],
            "image": [{ "url": "https://full", "thumbnails": { "large": { "url": "https://large" } } }],
            "plain": [{ "url": "https://plain" }],
            "active": true
        }));
        assert_eq!(text(&f, "name"), "Dana");
        assert_eq!(text(&f, "lookup"), "a, b");
        assert_eq!(opt_text(&f, "blank"), None);
        assert_eq!(links(&f, "links").len(), 2);
        assert_eq!(attachment_url(&f, "image").as_deref(), Some("https://large"));
        assert_eq!(attachment_url(&f, "plain").as_deref(), Some("https://plain"));
        assert!(flag(&f, "active"));
        assert!(!flag(&f, "missing"));
    }

    #[test]
    fn test_decimal_value() {
        assert_eq!(decimal_value(Decimal::new(125, 1)), json!(12.5));
    }
}
