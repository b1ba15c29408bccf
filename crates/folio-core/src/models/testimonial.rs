use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::string_like;
use super::Pagination;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    /// Document key
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// The testimonial text
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Testimonial {
    /// Backend id, preferring the document key.
    pub fn record_id(&self) -> Option<&str> {
        self.object_id.as_deref().or(self.id.as_deref())
    }

    /// Star rendering used by list views, e.g. `★★★★☆`.
    pub fn stars(&self) -> String {
        let rating = self.rating.unwrap_or(0).min(5) as usize;
        format!("{}{}", "★".repeat(rating), "☆".repeat(5 - rating))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialInput {
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestimonialList {
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestimonialPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testimonial: Option<Testimonial>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_testimonial_list() {
        let list: TestimonialList = serde_json::from_value(json!({
            "testimonials": [{
                "_id": "t1",
                "name": "Grace",
                "company": "Navy",
                "message": "Great work",
                "rating": 4,
                "approved": true
            }]
        }))
        .expect("testimonial list");

        let t = &list.testimonials[0];
        assert_eq!(t.record_id(), Some("t1"));
        assert_eq!(t.message, "Great work");
        assert!(t.approved);
        assert!(!t.featured);
        assert_eq!(t.stars(), "★★★★☆");
        assert!(list.pagination.is_none());
    }

    #[test]
    fn test_stars_clamps_out_of_range_ratings() {
        let t = Testimonial {
            rating: Some(9),
            ..Testimonial::default()
        };
        assert_eq!(t.stars(), "★★★★★");
        assert_eq!(Testimonial::default().stars(), "☆☆☆☆☆");
    }

    #[test]
    fn test_record_with_both_id_keys() {
        let list: TestimonialList = serde_json::from_value(json!({
            "testimonials": [
                {"_id": "t1", "id": "t1", "name": "Grace", "message": "Great work"},
                {"id": "t2", "name": "Alan"}
            ]
        }))
        .expect("testimonial list");

        assert_eq!(list.testimonials[0].record_id(), Some("t1"));
        assert_eq!(list.testimonials[1].record_id(), Some("t2"));
        assert!(list.testimonials[0].extra.is_empty());
    }

    #[test]
    fn test_input_keeps_message_and_avatar() {
        let input: TestimonialInput = serde_json::from_value(json!({
            "name": "Grace",
            "company": 3,
            "message": "Great work",
            "avatarUrl": "https://cdn.example.com/g.png"
        }))
        .expect("input");

        assert_eq!(input.company.as_deref(), Some("3"));
        assert_eq!(
            serde_json::to_value(&input).expect("serialize"),
            json!({
                "name": "Grace",
                "company": "3",
                "message": "Great work",
                "avatarUrl": "https://cdn.example.com/g.png"
            })
        );
    }
}
