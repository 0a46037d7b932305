use futures::StreamExt;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;

use super::item::Item;
use super::parser::{parse_catalog, ParseResult};

const MAX_CATALOG_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while retrieving the catalog.
///
/// None of these are fatal: the catalog view keeps whatever it had loaded
/// before and offers a retry.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Body was not a JSON array of items
    #[error("Parse error: {0}")]
    Parse(String),
    /// Server returned 429 Too Many Requests after max retries
    #[error("Rate limited after {0} retries")]
    RateLimited(u32),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Redirect policy: at most 3 hops, no loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// HTTP client for the remote catalog endpoint.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    max_retries: u32,
}

impl CatalogClient {
    /// Build a client for `endpoint` with the given per-request timeout.
    ///
    /// `max_retries = 0` disables retries entirely.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .user_agent(concat!("shelf/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
            max_retries,
        })
    }

    /// Fetch the full catalog with one GET.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] - Connection or TLS errors
    /// - [`FetchError::Timeout`] - Request exceeded the configured timeout
    /// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
    /// - [`FetchError::RateLimited`] - 429 response after max retries
    /// - [`FetchError::ResponseTooLarge`] - Response exceeded 10MB
    /// - [`FetchError::Parse`] - Body is not a JSON array
    ///
    /// Malformed individual entries are skipped, not reported as errors.
    pub async fn fetch_catalog(&self) -> Result<Vec<Item>, FetchError> {
        let bytes = self.fetch_bytes().await?;

        let ParseResult { items, skipped } =
            parse_catalog(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

        if skipped > 0 {
            tracing::warn!(
                endpoint = %self.endpoint,
                skipped = skipped,
                "Malformed catalog entries skipped"
            );
        }
        tracing::debug!(endpoint = %self.endpoint, items = items.len(), "Catalog fetched");

        Ok(items)
    }

    async fn fetch_bytes(&self) -> Result<Vec<u8>, FetchError> {
        let mut retry_count = 0;

        loop {
            let response =
                tokio::time::timeout(self.timeout, self.client.get(&self.endpoint).send())
                    .await
                    .map_err(|_| FetchError::Timeout)?
                    .map_err(FetchError::Network)?;

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if retry_count >= self.max_retries {
                    return Err(FetchError::RateLimited(retry_count));
                }
                self.backoff(retry_count, "Rate limited, backing off").await;
                retry_count += 1;
                continue;
            }

            if status.is_server_error() {
                if retry_count >= self.max_retries {
                    return Err(FetchError::HttpStatus(status.as_u16()));
                }
                self.backoff(retry_count, "Server error, retrying after delay")
                    .await;
                retry_count += 1;
                continue;
            }

            // 4xx errors fail immediately
            if !status.is_success() {
                return Err(FetchError::HttpStatus(status.as_u16()));
            }

            match read_limited_bytes(response, MAX_CATALOG_SIZE).await {
                Ok(bytes) => return Ok(bytes),
                Err(FetchError::IncompleteResponse { expected, received })
                    if retry_count < self.max_retries =>
                {
                    tracing::debug!(
                        expected = expected,
                        received = received,
                        "Retrying incomplete download"
                    );
                    self.backoff(retry_count, "Incomplete response, retrying")
                        .await;
                    retry_count += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn backoff(&self, retry_count: u32, reason: &str) {
        let delay_secs = 2u64.pow(retry_count); // 1s, 2s, 4s, ...
        tracing::warn!(
            endpoint = %self.endpoint,
            retry = retry_count,
            delay_secs = delay_secs,
            "{}",
            reason
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    if let Some(len) = expected_length {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CATALOG: &str = r#"[
        {"id":"1","name":"Robot","price":10,"category":"A","isFeatured":true},
        {"id":"2","name":"Train","price":20,"category":"B"}
    ]"#;

    fn client_for(server: &MockServer, max_retries: u32) -> CatalogClient {
        CatalogClient::new(
            format!("{}/items", server.uri()),
            Duration::from_secs(5),
            max_retries,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(CATALOG)
                    .insert_header("Content-Type", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let items = client_for(&mock_server, 0).fetch_catalog().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Robot");
        assert_eq!(items[1].category, "B");
    }

    #[tokio::test]
    async fn test_fetch_404_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        match client_for(&mock_server, 0).fetch_catalog().await {
            Err(FetchError::HttpStatus(404)) => {}
            other => panic!("Expected HttpStatus(404), got {:?}", other.map(|i| i.len())),
        }
    }

    #[tokio::test]
    async fn test_500_without_retries_fails_once() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        match client_for(&mock_server, 0).fetch_catalog().await {
            Err(FetchError::HttpStatus(500)) => {}
            other => panic!("Expected HttpStatus(500), got {:?}", other.map(|i| i.len())),
        }
    }

    #[tokio::test]
    async fn test_503_retry_then_success() {
        use wiremock::matchers::any;

        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
            .mount(&mock_server)
            .await;

        let items = client_for(&mock_server, 2).fetch_catalog().await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_body_parse_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        match client_for(&mock_server, 0).fetch_catalog().await {
            Err(FetchError::Parse(_)) => {}
            other => panic!("Expected Parse error, got {:?}", other.map(|i| i.len())),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(CATALOG)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = CatalogClient::new(
            format!("{}/items", mock_server.uri()),
            Duration::from_millis(50),
            0,
        )
        .unwrap();
        assert!(matches!(
            client.fetch_catalog().await,
            Err(FetchError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let client = CatalogClient::new("http://127.0.0.1:1/items", Duration::from_secs(5), 0).unwrap();
        assert!(matches!(
            client.fetch_catalog().await,
            Err(FetchError::Network(_))
        ));
    }
}
