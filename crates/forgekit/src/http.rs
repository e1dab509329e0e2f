//! Transport boundary for every provider request.
//!
//! Provider clients never talk to the network directly; they build an
//! [`HttpRequest`] and hand it to an [`HttpTransport`]. Tests swap in the
//! in-memory [`MockTransport`], which answers from canned responses and
//! records every request it saw.

use async_trait::async_trait;
use thiserror::Error;

/// Methods the provider APIs are called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header name/value pairs in send order. Lookups ignore case.
pub type HttpHeaders = Vec<(String, String)>;

/// First value of header `name`, compared case-insensitively.
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find_map(|(k, v)| k.eq_ignore_ascii_case(name).then_some(v.as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HttpHeaders,
    /// Empty for requests without a body.
    pub body: Vec<u8>,
}

impl HttpRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures below the HTTP layer. Non-2xx statuses are not errors here;
/// provider clients classify them.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("no mock response registered for {method} {url}")]
    NoMockResponse { method: String, url: String },
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

pub mod reqwest_transport {
    use std::time::Duration as StdDuration;

    use super::{HttpError, HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
    use async_trait::async_trait;

    fn transport_error(e: reqwest::Error) -> HttpError {
        HttpError::Transport(e.to_string())
    }

    /// Network transport backed by a shared `reqwest::Client`.
    #[derive(Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(client: reqwest::Client) -> Self {
            Self { client }
        }

        /// A client whose requests fail after `timeout`.
        pub fn with_timeout(timeout: StdDuration) -> Result<Self, HttpError> {
            reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map(Self::new)
                .map_err(transport_error)
        }
    }

    impl From<HttpMethod> for reqwest::Method {
        fn from(method: HttpMethod) -> Self {
            match method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Put => reqwest::Method::PUT,
                HttpMethod::Patch => reqwest::Method::PATCH,
                HttpMethod::Delete => reqwest::Method::DELETE,
            }
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;

            let mut builder = self.client.request(method.into(), &url);
            for (name, value) in &headers {
                builder = builder.header(name, value);
            }
            if !body.is_empty() {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(transport_error)?;
            let status = response.status().as_u16();
            // Non-UTF-8 header values are dropped.
            let headers: HttpHeaders = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response.bytes().await.map_err(transport_error)?.to_vec();

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

#[cfg(test)]
pub use mock::MockTransport;


#[cfg(test)]
mod tests {
    use super::reqwest_transport::ReqwestTransport;
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: vec![("PRIVATE-TOKEN".to_string(), "glpat".to_string())],
            body: Vec::new(),
        }
    }

    #[test]
    fn test_header_lookup_ignores_case_and_takes_first() {
        let headers: HttpHeaders = vec![
            ("Link".to_string(), "<a>; rel=\"next\"".to_string()),
            ("link".to_string(), "<b>; rel=\"next\"".to_string()),
        ];
        assert_eq!(header_get(&headers, "LINK"), Some("<a>; rel=\"next\""));
        assert_eq!(header_get(&headers, "etag"), None);
        assert_eq!(get("https://x").header("private-token"), Some("glpat"));
    }

    #[test]
    fn test_method_display() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_success_range() {
        let mut response = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: Vec::new(),
        };
        assert!(response.is_success());
        response.status = 304;
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_mock_serves_responses_in_order() {
        let transport = MockTransport::new();
        let url = "https://gitlab.com/api/v4/projects";
        transport.push_json(HttpMethod::Get, url, 200, json!([1]));
        transport.push_json(HttpMethod::Get, url, 500, json!({}));

        let first = transport.send(get(url)).await.unwrap();
        let second = transport.send(get(url)).await.unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(first.header("content-type"), Some("application/json"));
        assert_eq!(second.status, 500);
        assert_eq!(transport.requests(), vec![get(url), get(url)]);
    }

    #[tokio::test]
    async fn test_mock_without_route_errors_and_records() {
        let transport = MockTransport::new();
        let mut request = get("https://api.github.com/missing");
        request.method = HttpMethod::Patch;

        let err = transport.send(request).await.unwrap_err();
        match err {
            HttpError::NoMockResponse { method, url } => {
                assert_eq!(method, "PATCH");
                assert_eq!(url, "https://api.github.com/missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.requests_with(HttpMethod::Patch).len(), 1);
        assert!(transport.requests_with(HttpMethod::Get).is_empty());
    }

    #[test]
    fn test_reqwest_transport_builds_with_timeout() {
        assert!(ReqwestTransport::with_timeout(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn test_reqwest_transport_rejects_invalid_url() {
        let transport = ReqwestTransport::new(reqwest::Client::new());
        let err = transport.send(get("not a url")).await.unwrap_err();
        assert!(matches!(err, HttpError::Transport(_)));
    }
}
