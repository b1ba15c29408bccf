//! Query parameters for list endpoints.
//!
//! Each list endpoint has a typed parameter struct. Only its fields are ever
//! sent: unknown keys in a loose key/value map are dropped on
//! deserialization. `None` fields are left out of the query string, while
//! `Some(false)` is sent as `false`. Keys are emitted in sorted order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::common::string_like;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<&'static str, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key` when `value` is set.
    pub fn set<V: ToString>(&mut self, key: &'static str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.0.insert(key, value.to_string());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.0
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    /// `a=1&b=2`, form-encoded.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

/// Types that can render themselves as list-endpoint parameters.
pub trait ToQuery {
    fn to_query(&self) -> QueryParams;
}

/// Plain pagination, used by the filtered/featured variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }
}

impl ToQuery for PageQuery {
    fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.set("page", self.page).set("limit", self.limit);
        q
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default, deserialize_with = "string_like")]
    pub status: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "string_like")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "string_like")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "string_like")]
    pub tech: Option<String>,
}

impl ToQuery for ProjectQuery {
    fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.set("page", self.page)
            .set("limit", self.limit)
            .set("status", self.status.as_deref())
            .set("featured", self.featured)
            .set("search", self.search.as_deref())
            .set("sortBy", self.sort_by.as_deref())
            .set("sortOrder", self.sort_order.map(|o| o.as_str()))
            .set("year", self.year)
            .set("tech", self.tech.as_deref());
        q
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default, deserialize_with = "string_like")]
    pub status: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "string_like")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "string_like")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default, deserialize_with = "string_like")]
    pub company: Option<String>,
}

impl ToQuery for TestimonialQuery {
    fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.set("page", self.page)
            .set("limit", self.limit)
            .set("status", self.status.as_deref())
            .set("featured", self.featured)
            .set("search", self.search.as_deref())
            .set("sortBy", self.sort_by.as_deref())
            .set("sortOrder", self.sort_order.map(|o| o.as_str()))
            .set("rating", self.rating)
            .set("company", self.company.as_deref());
        q
    }
}

/// Percent-encode a caller-supplied path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_explicit_false_is_sent_and_keys_are_sorted() {
        let query = ProjectQuery {
            featured: Some(false),
            page: Some(2),
            ..ProjectQuery::default()
        };
        assert_eq!(query.to_query().to_query_string(), "featured=false&page=2");
    }

    #[test]
    fn test_unset_keys_are_omitted() {
        let query = ProjectQuery {
            featured: None,
            ..ProjectQuery::default()
        };
        let params = query.to_query();
        assert!(params.is_empty());
        assert_eq!(params.get("featured"), None);
        assert_eq!(params.to_query_string(), "");
    }

    #[test]
    fn test_loose_map_drops_unknown_keys() {
        let query: ProjectQuery = serde_json::from_value(json!({
            "page": 1,
            "featured": true,
            "tech": 2024,
            "sortOrder": "desc",
            "color": "blue",
            "__proto__": {}
        }))
        .expect("query");

        let params = query.to_query();
        assert_eq!(params.get("tech"), Some("2024"));
        assert_eq!(params.get("color"), None);
        assert_eq!(
            params.to_query_string(),
            "featured=true&page=1&sortOrder=desc&tech=2024"
        );
    }

    #[test]
    fn test_testimonial_filters_are_encoded() {
        let query = TestimonialQuery {
            company: Some("Acme & Co".to_string()),
            rating: Some(5),
            status: Some("pending".to_string()),
            ..TestimonialQuery::default()
        };
        assert_eq!(
            query.to_query().to_query_string(),
            "company=Acme+%26+Co&rating=5&status=pending"
        );
    }

    #[test]
    fn test_page_query_pairs() {
        let pairs = PageQuery::new(3, 6).to_query().into_pairs();
        assert_eq!(
            pairs,
            vec![
                ("limit".to_string(), "6".to_string()),
                ("page".to_string(), "3".to_string())
            ]
        );
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("Node.js"), "Node.js");
        assert_eq!(segment("C#/.NET"), "C%23%2F.NET");
        assert_eq!(segment("Next js"), "Next%20js");
    }
}
