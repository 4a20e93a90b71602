mod client;
mod error;
mod models;
mod resource;

pub use client::Client;
pub use error::ApiError;
pub use models::{MutationResponse, Page, PageMeta, Record, Wrapper};
pub use resource::*;

use crate::query::{ListParams, ListSource, Mutation, MutationOp, Tag};
use crate::session::Session;
use async_trait::async_trait;
use log::*;
use reqwest::Method;
use std::sync::Arc;

/// Responsible for asynchronous interaction with the platform API including
/// transformation of response data into explicitly-defined types.
///
pub struct Api {
    client: Client,
}

impl Api {
    /// Returns a new instance for the given base URL and session.
    ///
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Api, ApiError> {
        debug!("Initializing API client for {}...", base_url);
        Ok(Api {
            client: Client::new(base_url, session)?,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        self.client.session()
    }

    /// Returns the profile of the signed-in operator.
    ///
    pub async fn me(&self) -> Result<Record, ApiError> {
        debug!("Requesting signed-in operator profile...");
        let wrapper: Wrapper<Record> = self.client.get("auth/me", &[]).await?;
        Ok(wrapper.data)
    }

    /// Returns one page of the resource list.
    ///
    pub async fn list(&self, resource: Resource, params: &ListParams) -> Result<Page<Record>, ApiError> {
        debug!(
            "Requesting {} page {} (limit {}, search {:?})...",
            resource.endpoint(),
            params.page,
            params.limit,
            params.search_term
        );
        let page: Page<Record> = self
            .client
            .get(resource.endpoint(), &params.query_pairs())
            .await?;
        debug!(
            "Retrieved {} of {} {}",
            page.data.len(),
            page.meta.total,
            resource.endpoint()
        );
        Ok(page)
    }

    /// Returns a single record.
    ///
    pub async fn get(&self, resource: Resource, id: &str) -> Result<Record, ApiError> {
        let path = format!("{}/{}", resource.endpoint(), id);
        let wrapper: Wrapper<Record> = self.client.get(&path, &[]).await?;
        Ok(wrapper.data)
    }

    /// Send a mutation to its endpoint. A `success: false` answer is
    /// returned as [`ApiError::Rejected`].
    ///
    pub async fn run(&self, mutation: &Mutation) -> Result<MutationResponse, ApiError> {
        let endpoint = mutation.resource.endpoint();
        let (method, path, body) = match &mutation.op {
            MutationOp::Create { payload } => (Method::POST, endpoint.to_owned(), Some(payload.clone())),
            MutationOp::Update { id, payload } => (
                Method::PATCH,
                format!("{}/{}", endpoint, id),
                Some(payload.clone()),
            ),
            MutationOp::Delete { id } => (Method::DELETE, format!("{}/{}", endpoint, id), None),
        };
        info!("{} {}...", mutation.describe(), path);
        let response: MutationResponse = self.client.send(method, &path, body).await?;
        if !response.success {
            let message = response
                .message
                .clone()
                .unwrap_or_else(|| format!("{} was not accepted", mutation.describe()));
            warn!("{}", message);
            return Err(ApiError::Rejected(message));
        }
        Ok(response)
    }
}

/// Feeds a list controller from one resource endpoint.
///
pub struct ResourceSource {
    api: Arc<Api>,
    resource: Resource,
}

impl ResourceSource {
    pub fn new(api: Arc<Api>, resource: Resource) -> Self {
        ResourceSource { api, resource }
    }
}

#[async_trait]
impl ListSource<Record> for ResourceSource {
    fn endpoint(&self) -> &str {
        self.resource.endpoint()
    }

    fn tags(&self) -> Vec<Tag> {
        vec![self.resource.tag()]
    }

    async fn fetch(&self, params: &ListParams) -> Result<Page<Record>, ApiError> {
        self.api.list(self.resource, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Filters;
    use fake::{Fake, Faker};
    use httpmock::MockServer;
    use serde_json::json;

    fn api_for(server: &MockServer, token: &str) -> Api {
        let session = Arc::new(Session::in_memory(Some(token.to_owned())));
        Api::new(&server.base_url(), session).unwrap()
    }

    #[tokio::test]
    async fn me_success() -> anyhow::Result<()> {
        let token: String = Faker.fake();
        let name: String = Faker.fake();

        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/auth/me")
                    .header("Authorization", &format!("Bearer {}", &token));
                then.status(200)
                    .json_body(json!({ "data": { "id": "u1", "name": name } }));
            })
            .await;

        let me = api_for(&server, &token).me().await?;
        mock.assert_async().await;
        assert_eq!(me.field("name"), name);
        Ok(())
    }

    #[tokio::test]
    async fn me_unauthorized_expires_session() {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET").path("/auth/me");
                then.status(401);
            })
            .await;

        let api = api_for(&server, "stale");
        assert!(matches!(api.me().await, Err(ApiError::Unauthorized)));
        mock.assert_async().await;
        assert_eq!(api.session().token(), None);
        assert!(!api.session().is_authenticated());
    }

    #[tokio::test]
    async fn list_sends_typed_params() -> anyhow::Result<()> {
        let token: String = Faker.fake();
        let title: String = Faker.fake();

        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/employees")
                    .header("Authorization", &format!("Bearer {}", &token))
                    .query_param("page", "2")
                    .query_param("limit", "10")
                    .query_param("searchTerm", "ada")
                    .query_param("companyId", "c7");
                then.status(200).json_body(json!({
                    "data": [{ "id": "e1", "name": title }],
                    "meta": { "page": 2, "limit": 10, "total": 11, "totalPages": 2 }
                }));
            })
            .await;

        let params = ListParams::new(2, 10).with_search("ada").with_filters(Filters {
            company_id: Some("c7".to_string()),
            ..Filters::default()
        });
        let page = api_for(&server, &token)
            .list(Resource::Employees, &params)
            .await?;
        mock.assert_async().await;
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.meta.total, 11);
        assert_eq!(page.total_pages(10), 2);
        Ok(())
    }

    #[tokio::test]
    async fn list_server_error() {
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("GET").path("/courses");
                then.status(500).json_body(json!({ "message": "database down" }));
            })
            .await;

        let result = api_for(&server, "t")
            .list(Resource::Courses, &ListParams::default())
            .await;
        match result {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "database down");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn run_create_update_delete() -> anyhow::Result<()> {
        let server = MockServer::start();
        let create = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/courses")
                    .json_body(json!({ "title": "Rust 101" }));
                then.status(201).json_body(json!({ "success": true, "data": { "id": "c1" } }));
            })
            .await;
        let update = server
            .mock_async(|when, then| {
                when.method("PATCH")
                    .path("/courses/c1")
                    .json_body(json!({ "title": "Rust 102" }));
                then.status(200).json_body(json!({ "success": true }));
            })
            .await;
        let delete = server
            .mock_async(|when, then| {
                when.method("DELETE").path("/courses/c1");
                then.status(200).json_body(json!({ "success": true }));
            })
            .await;

        let api = api_for(&server, "t");
        let created = api
            .run(&Mutation::create(Resource::Courses, json!({ "title": "Rust 101" })))
            .await?;
        assert_eq!(created.data, Some(json!({ "id": "c1" })));
        api.run(&Mutation::update(Resource::Courses, "c1", json!({ "title": "Rust 102" })))
            .await?;
        api.run(&Mutation::delete(Resource::Courses, "c1")).await?;

        create.assert_async().await;
        update.assert_async().await;
        delete.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn run_rejected_mutation() {
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("DELETE").path("/companies/c1");
                then.status(200)
                    .json_body(json!({ "success": false, "message": "Company has employees" }));
            })
            .await;

        let result = api_for(&server, "t")
            .run(&Mutation::delete(Resource::Companies, "c1"))
            .await;
        match result {
            Err(ApiError::Rejected(message)) => assert_eq!(message, "Company has employees"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
