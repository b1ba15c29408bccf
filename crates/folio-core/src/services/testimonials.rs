use serde_json::Value;

use super::query::{segment, PageQuery, TestimonialQuery, ToQuery};
use crate::api::{ApiClient, ServiceResult};
use crate::models::{MessagePayload, TestimonialInput, TestimonialList, TestimonialPayload};

const TESTIMONIALS_PATH: &str = "/testimonials";

/// Testimonials endpoints. Featured/rating/company lookups are public; the
/// full list, statistics and all writes need a signed-in admin.
#[derive(Clone)]
pub struct TestimonialsService {
    client: ApiClient,
}

impl TestimonialsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &TestimonialQuery) -> ServiceResult<TestimonialList> {
        self.client
            .get(TESTIMONIALS_PATH, query.to_query().into_pairs())
            .await
    }

    pub async fn get(&self, id: &str) -> ServiceResult<TestimonialPayload> {
        self.client.get(&item_path(id), Vec::new()).await
    }

    pub async fn create(&self, input: &TestimonialInput) -> ServiceResult<TestimonialPayload> {
        self.client.post(TESTIMONIALS_PATH, input).await
    }

    pub async fn update(&self, id: &str, input: &TestimonialInput) -> ServiceResult<TestimonialPayload> {
        self.client.put(&item_path(id), input).await
    }

    pub async fn approve(&self, id: &str) -> ServiceResult<TestimonialPayload> {
        self.client
            .patch(&format!("{}/approve", item_path(id)))
            .await
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<MessagePayload> {
        self.client.delete(&item_path(id)).await
    }

    pub async fn featured(&self, page: &PageQuery) -> ServiceResult<TestimonialList> {
        let path = format!("{}/featured", TESTIMONIALS_PATH);
        self.client.get(&path, page.to_query().into_pairs()).await
    }

    pub async fn by_rating(&self, rating: u8, page: &PageQuery) -> ServiceResult<TestimonialList> {
        let path = format!("{}/rating/{}", TESTIMONIALS_PATH, rating);
        self.client.get(&path, page.to_query().into_pairs()).await
    }

    pub async fn companies(&self) -> ServiceResult<Value> {
        self.client
            .get(&format!("{}/companies", TESTIMONIALS_PATH), Vec::new())
            .await
    }

    pub async fn statistics(&self) -> ServiceResult<Value> {
        self.client
            .get(&format!("{}/statistics", TESTIMONIALS_PATH), Vec::new())
            .await
    }
}

fn item_path(id: &str) -> String {
    format!("{}/{}", TESTIMONIALS_PATH, segment(id))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::Method;
    use crate::auth::{AuthState, MemorySessionStore, SessionContext};
    use crate::testing::{user, ScriptedTransport};

    fn service(store: MemorySessionStore) -> (TestimonialsService, Arc<ScriptedTransport>, SessionContext) {
        let session = SessionContext::new(Arc::new(store), "/admin/login");
        session.initialize();
        let transport = Arc::new(ScriptedTransport::new());
        let client = ApiClient::with_transport(transport.clone(), session.clone());
        (TestimonialsService::new(client), transport, session)
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let (testimonials, transport, _) =
            service(MemorySessionStore::with_session("abc", user(1, "a@b.com")));
        transport.respond(
            200,
            json!({"testimonials": [{"name": "Grace", "message": "Great", "rating": 5}]}),
        );

        let query = TestimonialQuery {
            status: Some("pending".to_string()),
            featured: Some(true),
            ..TestimonialQuery::default()
        };
        let list = testimonials.list(&query).await.expect("listed");

        assert_eq!(list.testimonials[0].name, "Grace");
        assert_eq!(list.testimonials[0].message, "Great");
        let sent = transport.last_request();
        assert_eq!(sent.path, "/testimonials");
        assert_eq!(sent.bearer.as_deref(), Some("abc"));
        assert_eq!(
            sent.query,
            vec![
                ("featured".to_string(), "true".to_string()),
                ("status".to_string(), "pending".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_public_lookups() {
        let (testimonials, transport, _) = service(MemorySessionStore::new());
        transport.respond(200, json!({"testimonials": []}));
        transport.respond(200, json!({"testimonials": []}));
        transport.respond(200, json!({"companies": ["Acme", "Navy"]}));

        testimonials
            .featured(&PageQuery { page: None, limit: Some(3) })
            .await
            .expect("featured");
        testimonials
            .by_rating(5, &PageQuery::default())
            .await
            .expect("by rating");
        let companies = testimonials.companies().await.expect("companies");

        let sent = transport.requests();
        assert_eq!(sent[0].path, "/testimonials/featured");
        assert_eq!(sent[0].query, vec![("limit".to_string(), "3".to_string())]);
        assert_eq!(sent[1].path, "/testimonials/rating/5");
        assert_eq!(sent[2].path, "/testimonials/companies");
        assert_eq!(companies["companies"][1], json!("Navy"));
    }

    #[tokio::test]
    async fn test_create_sends_message_and_avatar() {
        let (testimonials, transport, _) =
            service(MemorySessionStore::with_session("abc", user(1, "a@b.com")));
        transport.respond(201, json!({"testimonial": {"_id": "t9", "name": "Grace"}}));

        let input: TestimonialInput = serde_json::from_value(json!({
            "name": "Grace",
            "message": "Great work",
            "avatarUrl": "https://cdn.example.com/g.png",
            "rating": 5
        }))
        .expect("input");
        let created = testimonials.create(&input).await.expect("create");

        assert_eq!(
            created.testimonial.and_then(|t| t.record_id().map(str::to_string)),
            Some("t9".to_string())
        );
        let sent = transport.last_request();
        assert_eq!(sent.method, Method::Post);
        assert_eq!(
            sent.body,
            Some(json!({
                "name": "Grace",
                "message": "Great work",
                "avatarUrl": "https://cdn.example.com/g.png",
                "rating": 5
            }))
        );
    }

    #[tokio::test]
    async fn test_approve_and_delete() {
        let (testimonials, transport, _) =
            service(MemorySessionStore::with_session("abc", user(1, "a@b.com")));
        transport.respond(
            200,
            json!({"testimonial": {"_id": "t1", "name": "Grace", "approved": true}}),
        );
        transport.respond(200, json!({"message": "Testimonial deleted"}));

        let approved = testimonials.approve("t1").await.expect("approve");
        let deleted = testimonials.delete("t1").await.expect("delete");

        assert!(approved.testimonial.expect("testimonial").approved);
        assert_eq!(deleted.message.as_deref(), Some("Testimonial deleted"));

        let sent = transport.requests();
        assert_eq!(sent[0].method, Method::Patch);
        assert_eq!(sent[0].path, "/testimonials/t1/approve");
        assert_eq!(sent[1].method, Method::Delete);
    }

    #[tokio::test]
    async fn test_unauthorized_statistics_ends_session() {
        let (testimonials, transport, session) =
            service(MemorySessionStore::with_session("stale", user(1, "a@b.com")));
        let redirects = Arc::new(AtomicUsize::new(0));
        let counter = redirects.clone();
        session.on_invalidated(move |event| {
            assert_eq!(event.redirect_to, "/admin/login");
            counter.fetch_add(1, Ordering::SeqCst);
        });
        transport.respond(401, json!({"message": "Not authorized"}));

        let err = testimonials.statistics().await.expect_err("unauthorized");

        assert_eq!(err.message, "Not authorized");
        assert_eq!(session.state(), AuthState::Anonymous);
        assert_eq!(redirects.load(Ordering::SeqCst), 1);
    }
}
