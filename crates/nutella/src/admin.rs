//! Admin API client
//!
//! Issues authenticated GET requests for the users and domains resources,
//! with reads served through the hourly on-disk cache. Authentication is
//! fixed at construction: either a bearer-style credential sent on the
//! Basic scheme, or a cookie map; the credential wins when both are given.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::cache::HourlyCache;
use crate::classify::Route;
use crate::config::ApiConfig;
use crate::error::{NutellaError, Result};

/// How a client authenticates against the admin API
#[derive(Debug, Clone)]
pub enum AuthScheme {
    /// `Authorization: Basic {token}`
    Basic(String),
    /// `Cookie` header assembled from the map, values percent-encoded
    Cookies(BTreeMap<String, String>),
    /// No auth header at all
    Anonymous,
}

impl AuthScheme {
    /// Build the scheme from an optional credential and an optional cookie
    /// map. The credential takes precedence when both are supplied.
    pub fn from_parts(token: Option<String>, cookies: Option<BTreeMap<String, String>>) -> Self {
        match (token, cookies) {
            (Some(token), _) if !token.is_empty() => AuthScheme::Basic(token),
            (_, Some(cookies)) if !cookies.is_empty() => AuthScheme::Cookies(cookies),
            _ => AuthScheme::Anonymous,
        }
    }

    /// Header name/value pair for this scheme, if any
    fn header(&self) -> Option<(&'static str, String)> {
        match self {
            AuthScheme::Basic(token) => Some(("authorization", format!("Basic {token}"))),
            AuthScheme::Cookies(cookies) => {
                let header = cookies
                    .iter()
                    .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
                    .collect::<Vec<_>>()
                    .join("; ");
                Some(("cookie", header))
            }
            AuthScheme::Anonymous => None,
        }
    }
}

/// HTTP client for the admin API, cache-backed on the read path
#[derive(Debug)]
pub struct AdminClient {
    http: Client,
    host: String,
    auth: AuthScheme,
    cache: HourlyCache,
}

impl AdminClient {
    pub fn new(config: &ApiConfig, cache: HourlyCache, auth: AuthScheme) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NutellaError::Network(e.to_string()))?;

        Ok(Self {
            http,
            host: config.host.trim_end_matches('/').to_string(),
            auth,
            cache,
        })
    }

    /// Fetch the resource for a route, serving from the hourly cache when
    /// fresh and falling back to stale cache on fetch failure.
    pub async fn fetch(&self, route: Route) -> Result<Value> {
        self.cache
            .fetch_through(&self.host, route.resource(), || self.fetch_direct(route))
            .await
    }

    async fn fetch_direct(&self, route: Route) -> Result<Value> {
        let url = format!("{}/{}", self.host, route.resource());
        debug!("GET {url}");

        let mut request = self.http.get(&url);
        if let Some((name, value)) = self.auth.header() {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NutellaError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NutellaError::Network(format!(
                "API returned {status}: {body}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| NutellaError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_client(api_url: String, cache_dir: &TempDir, auth: AuthScheme) -> AdminClient {
        let config = ApiConfig {
            host: api_url,
            timeout_secs: 5,
        };
        AdminClient::new(&config, HourlyCache::new(cache_dir.path()), auth).unwrap()
    }

    #[test]
    fn test_auth_scheme_credential_wins_over_cookies() {
        let mut cookies = BTreeMap::new();
        cookies.insert("session".to_string(), "abc".to_string());

        let scheme = AuthScheme::from_parts(Some("dGVzdA==".to_string()), Some(cookies));
        let (name, value) = scheme.header().unwrap();
        assert_eq!(name, "authorization");
        assert_eq!(value, "Basic dGVzdA==");
    }

    #[test]
    fn test_auth_scheme_cookie_header_is_encoded_and_ordered() {
        let mut cookies = BTreeMap::new();
        cookies.insert("theme".to_string(), "dark mode".to_string());
        cookies.insert("session".to_string(), "a=b;c".to_string());

        let scheme = AuthScheme::from_parts(None, Some(cookies));
        let (name, value) = scheme.header().unwrap();
        assert_eq!(name, "cookie");
        assert_eq!(value, "session=a%3Db%3Bc; theme=dark%20mode");
    }

    #[test]
    fn test_auth_scheme_anonymous_without_inputs() {
        assert!(AuthScheme::from_parts(None, None).header().is_none());
        assert!(
            AuthScheme::from_parts(Some(String::new()), None)
                .header()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_fetch_users_sends_basic_auth() {
        let mock_server = MockServer::start().await;
        let cache_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/users"))
            .and(header("authorization", "Basic dGVzdA=="))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"users": [{"id": 1}]})),
            )
            .mount(&mock_server)
            .await;

        let client = create_client(
            mock_server.uri(),
            &cache_dir,
            AuthScheme::Basic("dGVzdA==".to_string()),
        );

        let body = client.fetch(Route::Users).await.unwrap();
        assert_eq!(body["users"][0]["id"], json!(1));
    }

    #[tokio::test]
    async fn test_fetch_domains_hits_domains_path() {
        let mock_server = MockServer::start().await;
        let cache_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/domains"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"domain": "example.com"}])),
            )
            .mount(&mock_server)
            .await;

        let client = create_client(mock_server.uri(), &cache_dir, AuthScheme::Anonymous);

        let body = client.fetch(Route::Domains).await.unwrap();
        assert_eq!(body[0]["domain"], json!("example.com"));
    }

    #[tokio::test]
    async fn test_http_error_with_empty_cache_propagates() {
        let mock_server = MockServer::start().await;
        let cache_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = create_client(mock_server.uri(), &cache_dir, AuthScheme::Anonymous);

        let err = client.fetch(Route::Users).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("500"), "unexpected error: {msg}");
    }

    #[tokio::test]
    async fn test_second_fetch_within_hour_served_from_cache() {
        let mock_server = MockServer::start().await;
        let cache_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_client(mock_server.uri(), &cache_dir, AuthScheme::Anonymous);

        let first = client.fetch(Route::Users).await.unwrap();
        let second = client.fetch(Route::Users).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_stale_cache() {
        let mock_server = MockServer::start().await;
        let cache_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        // Seed a stale entry from a past hour bucket
        let key = crate::cache::sanitize_host(&mock_server.uri());
        let stale_name = crate::cache::file_name(&key, "users", "20200101T00Z");
        std::fs::write(
            cache_dir.path().join(stale_name),
            r#"{"users": [{"id": "stale"}]}"#,
        )
        .unwrap();

        let client = create_client(mock_server.uri(), &cache_dir, AuthScheme::Anonymous);

        let body = client.fetch(Route::Users).await.unwrap();
        assert_eq!(body["users"][0]["id"], json!("stale"));
    }
}
