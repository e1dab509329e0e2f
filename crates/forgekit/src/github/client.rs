//! GitHub REST client over the transport seam.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::GitHubError;
use crate::auth::{AuthScheme, Credentials, basic_authorization};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::platform::{Page, parse_link_header};

/// Page size for list requests (GitHub maximum).
pub const PAGE_SIZE: u32 = 100;

/// GitHub API client.
///
/// Holds the `Authorization` header built by [`GitHubClient::authenticate`];
/// requests before that are sent anonymously.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    authorization: Option<String>,
}

impl GitHubClient {
    /// Create a client backed by reqwest.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = GitHubClient::new("https://api.github.com", Duration::from_secs(30))?;
    /// ```
    pub fn new(base_url: &str, timeout: StdDuration) -> Result<Self, GitHubError> {
        let transport =
            ReqwestTransport::with_timeout(timeout).map_err(|e| GitHubError::Config(e.to_string()))?;
        Ok(Self::new_with_transport(base_url, Arc::new(transport)))
    }

    pub fn new_with_transport(base_url: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Apply credentials to every following request.
    ///
    /// Tokens are sent as `Authorization: token ...`, passwords as HTTP Basic
    /// with the configured username.
    pub fn authenticate(&mut self, credentials: &Credentials) -> Result<(), GitHubError> {
        let header = match credentials.scheme {
            AuthScheme::HttpToken => format!("token {}", credentials.secret),
            AuthScheme::HttpPassword => {
                let username = credentials.username.as_deref().ok_or_else(|| {
                    GitHubError::Config("password authentication requires a username".to_string())
                })?;
                basic_authorization(username, &credentials.secret)
            }
        };
        self.authorization = Some(header);
        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        self.authorization.is_some()
    }

    /// Absolute URLs (continuation links, upload URLs) are used verbatim.
    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn headers(&self) -> HttpHeaders {
        let mut headers = vec![
            (
                "Accept".to_string(),
                "application/vnd.github+json".to_string(),
            ),
            ("User-Agent".to_string(), "forgekit".to_string()),
        ];
        if let Some(auth) = &self.authorization {
            headers.push(("Authorization".to_string(), auth.clone()));
        }
        headers
    }

    /// Send a request and return the raw response, whatever its status.
    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<(&str, Vec<u8>)>,
    ) -> Result<HttpResponse, GitHubError> {
        let url = self.url(path);
        debug!("GitHub {} {}", method.as_str(), url);

        let mut headers = self.headers();
        let body = match body {
            Some((content_type, bytes)) => {
                headers.push(("Content-Type".to_string(), content_type.to_string()));
                bytes
            }
            None => Vec::new(),
        };

        self.transport
            .send(HttpRequest {
                method,
                url,
                headers,
                body,
            })
            .await
            .map_err(|e| GitHubError::Http(e.to_string()))
    }

    /// Send a request and fail on any non-2xx status.
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<(&str, Vec<u8>)>,
    ) -> Result<HttpResponse, GitHubError> {
        let response = self.execute(method, path, body).await?;
        if !response.is_success() {
            return Err(GitHubError::from_status(
                response.status,
                path,
                &response.body,
            ));
        }
        Ok(response)
    }

    async fn send_json<B, T>(&self, method: HttpMethod, path: &str, body: &B) -> Result<T, GitHubError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let bytes = serde_json::to_vec(body)?;
        let response = self
            .send(method, path, Some(("application/json", bytes)))
            .await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitHubError> {
        let response = self.send(HttpMethod::Get, path, None).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Fetch one page; the continuation comes from the `Link` header.
    pub async fn get_page<T: DeserializeOwned>(&self, path: &str) -> Result<Page<T>, GitHubError> {
        let response = self.send(HttpMethod::Get, path, None).await?;
        let next = response
            .header("link")
            .map(parse_link_header)
            .and_then(|links| links.next);
        let items: Vec<T> = serde_json::from_slice(&response.body)?;
        Ok(Page { items, next })
    }

    /// Fetch every page of a listing.
    pub async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, GitHubError> {
        let mut all = Vec::new();
        let mut page = self.get_page::<T>(path).await?;
        loop {
            all.extend(page.items);
            match page.next {
                Some(next) => {
                    debug!("Following GitHub continuation {}", next);
                    page = self.get_page(&next).await?;
                }
                None => return Ok(all),
            }
        }
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, GitHubError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Post, path, body).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, GitHubError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Patch, path, body).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, GitHubError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Put, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), GitHubError> {
        self.send(HttpMethod::Delete, path, None).await?;
        Ok(())
    }

    /// POST raw bytes (release assets).
    pub async fn upload<T: DeserializeOwned>(
        &self,
        url: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<T, GitHubError> {
        let response = self
            .send(HttpMethod::Post, url, Some((content_type, content)))
            .await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// GET `path` and report whether the credentials were accepted.
    ///
    /// 401 and 403 mean rejected; any other failure is an error.
    pub async fn probe(&self, path: &str) -> Result<bool, GitHubError> {
        let response = self.execute(HttpMethod::Get, path, None).await?;
        match response.status {
            s if (200..300).contains(&s) => Ok(true),
            401 | 403 => Ok(false),
            s => Err(GitHubError::from_status(s, path, &response.body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockTransport;
    use serde_json::json;

    fn client(transport: &MockTransport) -> GitHubClient {
        GitHubClient::new_with_transport("https://api.github.com/", Arc::new(transport.clone()))
    }

    #[tokio::test]
    async fn test_token_authorization_header() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            "https://api.github.com/user",
            200,
            json!({ "login": "octocat" }),
        );
        let mut client = client(&transport);
        client
            .authenticate(&Credentials {
                scheme: AuthScheme::HttpToken,
                username: None,
                secret: "abc".to_string(),
            })
            .unwrap();

        let user: serde_json::Value = client.get("/user").await.unwrap();
        assert_eq!(user["login"], "octocat");

        let requests = transport.requests();
        assert_eq!(requests[0].header("authorization"), Some("token abc"));
        assert_eq!(requests[0].header("user-agent"), Some("forgekit"));
    }

    #[test]
    fn test_password_requires_username() {
        let transport = MockTransport::new();
        let mut client = client(&transport);
        let err = client
            .authenticate(&Credentials {
                scheme: AuthScheme::HttpPassword,
                username: None,
                secret: "pw".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, GitHubError::Config(_)));
        assert!(!client.has_credentials());
    }

    #[tokio::test]
    async fn test_get_all_follows_link_header() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            "https://api.github.com/repos/a/b/labels?per_page=100",
            HttpResponse {
                status: 200,
                headers: vec![(
                    "Link".to_string(),
                    r#"<https://api.github.com/repositories/1/labels?per_page=100&page=2>; rel="next", <https://api.github.com/repositories/1/labels?per_page=100&page=2>; rel="last""#.to_string(),
                )],
                body: br#"[{"name":"bug"}]"#.to_vec(),
            },
        );
        transport.push_json(
            HttpMethod::Get,
            "https://api.github.com/repositories/1/labels?per_page=100&page=2",
            200,
            json!([{ "name": "docs" }]),
        );

        let labels: Vec<serde_json::Value> = client(&transport)
            .get_all("/repos/a/b/labels?per_page=100")
            .await
            .unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1]["name"], "docs");
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_error_status_is_classified() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            "https://api.github.com/repos/a/b/issues/404",
            404,
            json!({ "message": "Not Found" }),
        );
        let err = client(&transport)
            .get::<serde_json::Value>("/repos/a/b/issues/404")
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_probe() {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Get, "https://api.github.com/user", 200, json!({}));
        transport.push_json(
            HttpMethod::Get,
            "https://api.github.com/user",
            401,
            json!({ "message": "Bad credentials" }),
        );
        transport.push_json(
            HttpMethod::Get,
            "https://api.github.com/user",
            502,
            json!({ "message": "Bad gateway" }),
        );
        let client = client(&transport);
        assert!(client.probe("/user").await.unwrap());
        assert!(!client.probe("/user").await.unwrap());
        assert!(matches!(
            client.probe("/user").await.unwrap_err(),
            GitHubError::Api { status: 502, .. }
        ));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Post,
            "https://api.github.com/repos/a/b/issues",
            201,
            json!({ "ok": true }),
        );
        let _: serde_json::Value = client(&transport)
            .post("/repos/a/b/issues", &json!({ "title": "Hi" }))
            .await
            .unwrap();
        let request = &transport.requests_with(HttpMethod::Post)[0];
        assert_eq!(request.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["title"], "Hi");
    }
}
