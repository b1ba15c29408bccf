//! Shared model pieces and lenient field parsers.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Record identifier. The backend hands out numeric ids in some places and
/// document ids (strings) in others.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub pages: Option<u32>,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        match (self.page, self.pages) {
            (Some(page), Some(pages)) => page < pages,
            _ => false,
        }
    }
}

/// Payload of endpoints that only confirm an action (e.g. delete).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub message: Option<String>,
}

/// Accept a string, number or bool where a string is expected.
pub(crate) fn string_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a string, got {}",
                other
            )))
        }
    })
}

/// Accept either a list of strings or one comma-separated string, as typed
/// into a form field ("React, Rust, Tailwind").
pub(crate) fn string_or_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Text(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::List(items) => items,
        Raw::Text(text) => text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_record_id_accepts_numbers_and_strings() {
        let n: RecordId = serde_json::from_value(json!(42)).expect("number id");
        let s: RecordId = serde_json::from_value(json!("64f1c2")).expect("string id");
        assert_eq!(n, RecordId::Number(42));
        assert_eq!(s.to_string(), "64f1c2");
        assert_eq!(serde_json::to_value(&n).expect("serialize"), json!(42));
    }

    #[test]
    fn test_pagination_has_next() {
        let p: Pagination = serde_json::from_value(json!({"page": 1, "pages": 3, "total": 25}))
            .expect("pagination");
        assert!(p.has_next());
        assert!(!Pagination::default().has_next());
    }
}
