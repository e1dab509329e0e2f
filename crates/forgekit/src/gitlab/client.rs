//! GitLab API client creation and management.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::GitLabError;
use super::types::GitLabProject;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::platform::{Page, Result, parse_link_header};
use crate::resolver::ProjectListing;

/// Page size for list requests (GitLab maximum).
pub const PAGE_SIZE: u32 = 100;

/// GitLab API client.
///
/// GitLab only accepts personal access tokens, sent in the `PRIVATE-TOKEN`
/// header.
#[derive(Clone)]
pub struct GitLabClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    token: Option<String>,
}

impl GitLabClient {
    /// Create a new GitLab client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. "https://gitlab.example.com/api/v4"
    /// * `timeout` - Per-request timeout for the reqwest transport
    pub fn new(base_url: &str, timeout: StdDuration) -> std::result::Result<Self, GitLabError> {
        let transport =
            ReqwestTransport::with_timeout(timeout).map_err(|e| GitLabError::Config(e.to_string()))?;
        Ok(Self::new_with_transport(base_url, Arc::new(transport)))
    }

    pub fn new_with_transport(base_url: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `token` with every following request.
    pub fn authenticate(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn headers(&self) -> HttpHeaders {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), "forgekit".to_string()),
        ];
        if let Some(token) = &self.token {
            headers.push(("PRIVATE-TOKEN".to_string(), token.clone()));
        }
        headers
    }

    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> std::result::Result<HttpResponse, GitLabError> {
        let url = self.url(path);
        debug!("GitLab {} {}", method.as_str(), url);

        let mut headers = self.headers();
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        self.transport
            .send(HttpRequest {
                method,
                url,
                headers,
                body: body.unwrap_or_default(),
            })
            .await
            .map_err(|e| GitLabError::Http(e.to_string()))
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> std::result::Result<HttpResponse, GitLabError> {
        let response = self.execute(method, path, body).await?;
        if !response.is_success() {
            return Err(GitLabError::from_status(
                response.status,
                path,
                &response.body,
            ));
        }
        Ok(response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, GitLabError> {
        let response = self.send(HttpMethod::Get, path, None).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Fetch one page; the continuation comes from the `Link` header.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> std::result::Result<Page<T>, GitLabError> {
        let response = self.send(HttpMethod::Get, path, None).await?;
        let next = response
            .header("link")
            .map(parse_link_header)
            .and_then(|links| links.next);
        let items: Vec<T> = serde_json::from_slice(&response.body)?;
        Ok(Page { items, next })
    }

    /// Fetch every page of a listing.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> std::result::Result<Vec<T>, GitLabError> {
        let mut all = Vec::new();
        let mut page = self.get_page::<T>(path).await?;
        loop {
            all.extend(page.items);
            match page.next {
                Some(next) => page = self.get_page(&next).await?,
                None => return Ok(all),
            }
        }
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> std::result::Result<T, GitLabError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let bytes = serde_json::to_vec(body)?;
        let response = self.send(HttpMethod::Post, path, Some(bytes)).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> std::result::Result<T, GitLabError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let bytes = serde_json::to_vec(body)?;
        let response = self.send(HttpMethod::Put, path, Some(bytes)).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// GET `path` and report whether the token was accepted.
    pub async fn probe(&self, path: &str) -> std::result::Result<bool, GitLabError> {
        let response = self.execute(HttpMethod::Get, path, None).await?;
        match response.status {
            s if (200..300).contains(&s) => Ok(true),
            401 | 403 => Ok(false),
            s => Err(GitLabError::from_status(s, path, &response.body)),
        }
    }
}

/// Projects the authenticated user is a member of.
#[async_trait]
impl ProjectListing for GitLabClient {
    type Project = GitLabProject;

    async fn first_page(&self) -> Result<Page<GitLabProject>> {
        let path = format!("/projects?membership=true&per_page={}", PAGE_SIZE);
        Ok(self.get_page(&path).await?)
    }

    async fn next_page(&self, next: &str) -> Result<Page<GitLabProject>> {
        Ok(self.get_page(next).await?)
    }

    fn path_with_namespace(project: &GitLabProject) -> &str {
        &project.path_with_namespace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepositoryRef;
    use crate::http::MockTransport;
    use crate::platform::AdapterError;
    use crate::resolver::find_project;
    use serde_json::json;

    const API: &str = "https://gitlab.example.com/api/v4";

    fn project(id: u64, path: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": path.rsplit('/').next().unwrap(),
            "path_with_namespace": path,
            "web_url": format!("https://gitlab.example.com/{path}")
        })
    }

    fn page(status: u16, next: Option<&str>, body: serde_json::Value) -> HttpResponse {
        let headers = next
            .map(|url| vec![("Link".to_string(), format!("<{url}>; rel=\"next\""))])
            .unwrap_or_default();
        HttpResponse {
            status,
            headers,
            body: body.to_string().into_bytes(),
        }
    }

    #[tokio::test]
    async fn test_private_token_header() {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Get, format!("{API}/user"), 200, json!({}));
        let mut client = GitLabClient::new_with_transport(API, Arc::new(transport.clone()));
        client.authenticate("glpat-123");
        let _: serde_json::Value = client.get("/user").await.unwrap();
        let request = &transport.requests()[0];
        assert_eq!(request.header("private-token"), Some("glpat-123"));
        assert_eq!(request.header("authorization"), None);
    }

    #[tokio::test]
    async fn test_project_listing_follows_next_link() {
        let transport = MockTransport::new();
        let second = format!("{API}/projects?membership=true&page=2&per_page=100");
        transport.push_response(
            HttpMethod::Get,
            format!("{API}/projects?membership=true&per_page=100"),
            page(200, Some(&second), json!([project(1, "acme/gadgets")])),
        );
        transport.push_response(
            HttpMethod::Get,
            second.clone(),
            page(200, None, json!([project(2, "acme/widgets")])),
        );

        let client = GitLabClient::new_with_transport(API, Arc::new(transport.clone()));
        let found = find_project(&client, &RepositoryRef::new("acme", "widgets"))
            .await
            .unwrap();
        assert_eq!(found.id, 2);
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(transport.requests()[1].url, second);
    }

    #[tokio::test]
    async fn test_project_listing_error_ends_paging() {
        let transport = MockTransport::new();
        let second = format!("{API}/projects?membership=true&page=2&per_page=100");
        transport.push_response(
            HttpMethod::Get,
            format!("{API}/projects?membership=true&per_page=100"),
            page(200, Some(&second), json!([project(1, "acme/gadgets")])),
        );
        transport.push_response(
            HttpMethod::Get,
            second,
            page(500, None, json!({ "message": "500 Internal Server Error" })),
        );

        let client = GitLabClient::new_with_transport(API, Arc::new(transport.clone()));
        let err = find_project(&client, &RepositoryRef::new("acme", "widgets"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_probe_rejected_token() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{API}/projects?owned=true&per_page=1"),
            401,
            json!({ "message": "401 Unauthorized" }),
        );
        let client = GitLabClient::new_with_transport(API, Arc::new(transport.clone()));
        assert!(!client.probe("/projects?owned=true&per_page=1").await.unwrap());
    }
}
