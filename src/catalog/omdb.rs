use async_trait::async_trait;
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::types::{DetailResponse, SearchResponse};
use super::{Catalog, CatalogConfig, CatalogDetail, CatalogError, CatalogSummary};
use crate::util::validate_base_url;

/// Catalog bodies are a few KiB; anything near this is not a catalog answer.
const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// HTTP client for the OMDb API.
///
/// Every request carries the static `apikey` parameter. No retries: a failed
/// attempt surfaces immediately.
pub struct OmdbClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for OmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OmdbClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OmdbClient {
    /// Builds a client after validating the base URL.
    ///
    /// # Errors
    ///
    /// `CatalogError::InsecureBaseUrl` for a non-HTTPS, non-loopback base URL,
    /// `CatalogError::Transport` if the HTTP client cannot be constructed.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let base_url = validate_base_url(&config.base_url).map_err(|e| {
            tracing::error!(base_url = %config.base_url, error = %e, "Rejecting catalog base URL");
            CatalogError::InsecureBaseUrl(e)
        })?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn request_url(&self, param: &str, value: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("apikey", self.api_key.expose_secret())
            .append_pair(param, value);
        url
    }

    /// GETs the URL and returns the body text.
    ///
    /// The URL carries the key, so it is stripped from every transport error.
    async fn get_text(&self, url: Url) -> Result<String, CatalogError> {
        let response = self.http.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Catalog returned non-success status");
            return Err(CatalogError::HttpStatus(status.as_u16()));
        }

        read_limited_text(response, MAX_BODY_SIZE).await
    }
}

#[async_trait]
impl Catalog for OmdbClient {
    async fn search(&self, query: &str) -> Result<Vec<CatalogSummary>, CatalogError> {
        tracing::debug!(query = %query, "Searching catalog");
        let body = self.get_text(self.request_url("s", query)).await?;

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::Decode(e.to_string()))?;

        match parsed.response.as_deref() {
            Some("True") => {
                let rows: Vec<CatalogSummary> =
                    parsed.search.into_iter().map(CatalogSummary::from).collect();
                tracing::debug!(query = %query, count = rows.len(), "Catalog search returned");
                Ok(rows)
            }
            Some("False") => {
                let reason = parsed.error.unwrap_or_else(|| "no results".to_string());
                tracing::debug!(query = %query, reason = %reason, "Catalog reported no match");
                Err(CatalogError::NotFound(reason))
            }
            other => Err(CatalogError::Decode(format!(
                "unexpected Response field: {:?}",
                other
            ))),
        }
    }

    async fn fetch_detail(&self, id: &str) -> Result<CatalogDetail, CatalogError> {
        tracing::debug!(id = %id, "Fetching catalog detail");
        let body = self.get_text(self.request_url("i", id)).await?;

        let parsed: DetailResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::Decode(e.to_string()))?;

        match parsed.response.as_deref() {
            Some("True") => Ok(parsed.into_detail(id)),
            Some("False") => {
                let reason = parsed.error.unwrap_or_else(|| "unknown id".to_string());
                tracing::debug!(id = %id, reason = %reason, "Catalog has no detail for id");
                Err(CatalogError::NotFound(reason))
            }
            other => Err(CatalogError::Decode(format!(
                "unexpected Response field: {:?}",
                other
            ))),
        }
    }
}

fn transport(e: reqwest::Error) -> CatalogError {
    CatalogError::Transport(e.without_url())
}

/// Reads a response body, refusing anything over `limit` bytes.
async fn read_limited_text(
    response: reqwest::Response,
    limit: usize,
) -> Result<String, CatalogError> {
    let too_large = || CatalogError::Decode(format!("response exceeds {} bytes", limit));

    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(too_large());
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(transport)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| CatalogError::Decode("invalid UTF-8 in body".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OmdbClient {
        OmdbClient::new(&CatalogConfig {
            base_url: server.uri(),
            api_key: SecretString::from("test-key"),
            timeout: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_key_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("s", "inception"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Search":[{"Title":"Inception","Year":"2010","imdbID":"tt1375666","Type":"movie","Poster":"N/A"}],"totalResults":"1","Response":"True"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let rows = client_for(&server).search("inception").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "tt1375666");
        assert_eq!(rows[0].poster, None);
    }

    #[tokio::test]
    async fn test_search_query_is_url_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("s", "the matrix & co"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"Search":[],"Response":"True"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let rows = client_for(&server).search("the matrix & co").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_search_response_false_is_domain_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Response":"False","Error":"Movie not found!"}"#,
            ))
            .mount(&server)
            .await;

        let err = client_for(&server).search("zzzzzz").await.unwrap_err();
        assert!(err.is_domain());
        assert_eq!(err.user_message(), "Movie not found");
    }

    #[tokio::test]
    async fn test_search_http_500_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).search("inception").await.unwrap_err();
        assert!(matches!(err, CatalogError::HttpStatus(500)));
        assert_eq!(err.user_message(), "Something went wrong with fetching movies");
    }

    #[tokio::test]
    async fn test_search_malformed_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).search("inception").await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
        assert!(!err.is_domain());
    }

    #[tokio::test]
    async fn test_search_oversized_body_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(MAX_BODY_SIZE + 1)))
            .mount(&server)
            .await;

        let err = client_for(&server).search("inception").await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        drop(server);

        let err = client.search("inception").await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_api_key() {
        let server = MockServer::start().await;
        let client = OmdbClient::new(&CatalogConfig {
            base_url: server.uri(),
            api_key: SecretString::from("super-secret-key"),
            timeout: None,
        })
        .unwrap();
        drop(server);

        let err = client.search("inception").await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
        let shown = format!("{} / {:?}", err, err);
        assert!(!shown.contains("super-secret-key"), "key leaked: {}", shown);
        assert!(!shown.contains("apikey="), "query leaked: {}", shown);

        let err = client.fetch_detail("tt1375666").await.unwrap_err();
        assert!(!format!("{} / {:?}", err, err).contains("super-secret-key"));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"Search":[],"Response":"True"}"#)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = OmdbClient::new(&CatalogConfig {
            base_url: server.uri(),
            api_key: SecretString::from("test-key"),
            timeout: Some(Duration::from_millis(100)),
        })
        .unwrap();

        let err = client.search("inception").await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }

    #[tokio::test]
    async fn test_fetch_detail_uses_i_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("i", "tt1375666"))
            .and(query_param("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Title":"Inception","Year":"2010","Runtime":"148 min","imdbRating":"8.8","Plot":"Dreams.","Released":"16 Jul 2010","Actors":"Leonardo DiCaprio","Director":"Christopher Nolan","Genre":"Sci-Fi","Poster":"https://img/p.jpg","imdbID":"tt1375666","Response":"True"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let detail = client_for(&server).fetch_detail("tt1375666").await.unwrap();
        assert_eq!(detail.id, "tt1375666");
        assert_eq!(detail.title, "Inception");
        assert_eq!(detail.runtime, "148 min");
        assert_eq!(detail.imdb_rating, "8.8");
    }

    #[tokio::test]
    async fn test_fetch_detail_response_false_is_domain_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#,
            ))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_detail("tt0").await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(ref reason) if reason == "Incorrect IMDb ID."));
    }

    #[test]
    fn test_plain_http_base_rejected() {
        let err = OmdbClient::new(&CatalogConfig {
            base_url: "http://www.omdbapi.com/".into(),
            api_key: SecretString::from("k"),
            timeout: None,
        })
        .unwrap_err();
        assert!(matches!(err, CatalogError::InsecureBaseUrl(_)));
    }

    #[test]
    fn test_request_url_keeps_base_path() {
        let client = OmdbClient::new(&CatalogConfig {
            base_url: "https://www.omdbapi.com/".into(),
            api_key: SecretString::from("k"),
            timeout: None,
        })
        .unwrap();
        let url = client.request_url("s", "heat");
        assert_eq!(url.as_str(), "https://www.omdbapi.com/?apikey=k&s=heat");
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = OmdbClient::new(&CatalogConfig {
            base_url: "https://www.omdbapi.com/".into(),
            api_key: SecretString::from("super-secret"),
            timeout: None,
        })
        .unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
