use serde_json::Value;

use super::query::{segment, PageQuery, ProjectQuery, ToQuery};
use crate::api::{ApiClient, ServiceResult};
use crate::models::{MessagePayload, ProjectInput, ProjectList, ProjectPayload};

const PROJECTS_PATH: &str = "/projects";

/// Projects endpoints. Reads are public; writes need a signed-in admin.
#[derive(Clone)]
pub struct ProjectsService {
    client: ApiClient,
}

impl ProjectsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ProjectQuery) -> ServiceResult<ProjectList> {
        self.client
            .get(PROJECTS_PATH, query.to_query().into_pairs())
            .await
    }

    pub async fn get(&self, id: &str) -> ServiceResult<ProjectPayload> {
        self.client.get(&item_path(id), Vec::new()).await
    }

    pub async fn create(&self, input: &ProjectInput) -> ServiceResult<ProjectPayload> {
        self.client.post(PROJECTS_PATH, input).await
    }

    pub async fn update(&self, id: &str, input: &ProjectInput) -> ServiceResult<ProjectPayload> {
        self.client.put(&item_path(id), input).await
    }

    pub async fn toggle_featured(&self, id: &str) -> ServiceResult<ProjectPayload> {
        self.client
            .patch(&format!("{}/toggle-featured", item_path(id)))
            .await
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<MessagePayload> {
        self.client.delete(&item_path(id)).await
    }

    pub async fn by_technology(&self, technology: &str, page: &PageQuery) -> ServiceResult<ProjectList> {
        let path = format!("{}/technology/{}", PROJECTS_PATH, segment(technology));
        self.client.get(&path, page.to_query().into_pairs()).await
    }

    pub async fn by_year(&self, year: i32, page: &PageQuery) -> ServiceResult<ProjectList> {
        let path = format!("{}/year/{}", PROJECTS_PATH, year);
        self.client.get(&path, page.to_query().into_pairs()).await
    }

    pub async fn statistics(&self) -> ServiceResult<Value> {
        self.client
            .get(&format!("{}/statistics", PROJECTS_PATH), Vec::new())
            .await
    }
}

fn item_path(id: &str) -> String {
    format!("{}/{}", PROJECTS_PATH, segment(id))
}
