//! Response shapes shared by every endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wraps single-entity responses.
///
#[derive(Debug, Deserialize)]
pub struct Wrapper<T> {
    pub data: T,
}

/// Pagination metadata reported by the server.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "totalPages", default)]
    pub total_pages: Option<u32>,
}

/// One page of a list endpoint.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Return the server-reported page count, or derive it from the total
    /// and the given page size when the server left it out.
    ///
    pub fn total_pages(&self, page_size: u32) -> u32 {
        if let Some(pages) = self.meta.total_pages {
            return pages;
        }
        let size = u64::from(if self.meta.limit > 0 {
            self.meta.limit
        } else {
            page_size.max(1)
        });
        let pages = (self.meta.total + size - 1) / size;
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// Answer of create, update and delete endpoints.
///
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Opaque, server-owned entity. Only the id and display fields are read.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    /// Return the record id from `id` or `_id`.
    ///
    pub fn id(&self) -> Option<String> {
        self.0
            .get("id")
            .or_else(|| self.0.get("_id"))
            .and_then(display_value)
    }

    /// Return the display text of a field. Dotted paths descend into nested
    /// objects (`company.name`). Missing fields render as an empty string.
    ///
    pub fn field(&self, path: &str) -> String {
        let mut segments = path.split('.');
        let first = match segments.next() {
            Some(segment) => segment,
            None => return String::new(),
        };
        let mut current = match self.0.get(first) {
            Some(value) => value,
            None => return String::new(),
        };
        for segment in segments {
            current = match current.get(segment) {
                Some(value) => value,
                None => return String::new(),
            };
        }
        display_value(current).unwrap_or_default()
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Record(map),
            _ => Record::default(),
        }
    }
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "yes" } else { "no" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(display_value)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("title"))
            .and_then(display_value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_deserializes_without_total_pages() {
        let page: Page<Record> = serde_json::from_value(json!({
            "data": [{ "id": 1 }, { "id": 2 }],
            "meta": { "page": 1, "limit": 10, "total": 25 }
        }))
        .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.meta.total_pages, None);
        assert_eq!(page.total_pages(10), 3);
    }

    #[test]
    fn test_page_prefers_server_total_pages() {
        let page: Page<Record> = serde_json::from_value(json!({
            "data": [],
            "meta": { "page": 1, "limit": 10, "total": 25, "totalPages": 7 }
        }))
        .unwrap();
        assert_eq!(page.total_pages(10), 7);
    }

    #[test]
    fn test_page_total_pages_empty() {
        let page: Page<Record> = serde_json::from_value(json!({ "data": [] })).unwrap();
        assert_eq!(page.total_pages(10), 0);
    }

    #[test]
    fn test_record_id() {
        let record = Record::from(json!({ "id": 42, "title": "Rust" }));
        assert_eq!(record.id().as_deref(), Some("42"));

        let record = Record::from(json!({ "_id": "abc" }));
        assert_eq!(record.id().as_deref(), Some("abc"));

        let record = Record::from(json!({ "title": "No id" }));
        assert_eq!(record.id(), None);
    }

    #[test]
    fn test_record_field_paths() {
        let record = Record::from(json!({
            "name": "Ada",
            "active": true,
            "company": { "name": "Acme", "address": { "city": "Riga" } },
            "roles": ["admin", "editor"],
            "price": 12.5,
            "deleted_at": null
        }));
        assert_eq!(record.field("name"), "Ada");
        assert_eq!(record.field("active"), "yes");
        assert_eq!(record.field("company"), "Acme");
        assert_eq!(record.field("company.address.city"), "Riga");
        assert_eq!(record.field("roles"), "admin, editor");
        assert_eq!(record.field("price"), "12.5");
        assert_eq!(record.field("deleted_at"), "");
        assert_eq!(record.field("missing.path"), "");
    }

    #[test]
    fn test_mutation_response_defaults() {
        let response: MutationResponse = serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(response.success);
        assert_eq!(response.data, None);
        assert_eq!(response.message, None);
    }
}
