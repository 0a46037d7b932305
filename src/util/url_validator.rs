use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
}

/// Validates a catalog endpoint.
///
/// Only `http`/`https` URLs with a host are accepted. Loopback and private
/// hosts are allowed, since a catalog may be served from a local mock.
///
/// # Examples
///
/// ```
/// use shelf::util::validate_endpoint;
///
/// let url = validate_endpoint("https://example.com/Toy").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(validate_endpoint("http://127.0.0.1:8080/items").is_ok());
/// assert!(validate_endpoint("file:///etc/passwd").is_err());
/// ```
pub fn validate_endpoint(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlValidationError::MissingHost),
    }
}
