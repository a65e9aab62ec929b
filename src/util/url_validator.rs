use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors produced when a URL fails validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL points at a private or internal address.
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
    /// The URL points at the local machine.
    #[error("Localhost not allowed")]
    Localhost,
    /// A catalog base URL that is plain http and not loopback.
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    Insecure,
}

/// Validates a catalog base URL.
///
/// The API key travels in the query string, so anything other than HTTPS is
/// refused unless the host is loopback (local mock servers).
///
/// ```
/// use popcorn::util::validate_base_url;
///
/// assert!(validate_base_url("https://www.omdbapi.com/").is_ok());
/// assert!(validate_base_url("http://127.0.0.1:8080").is_ok());
/// assert!(validate_base_url("http://www.omdbapi.com/").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "https" => Ok(url),
        "http" if is_loopback_host(&url) => {
            tracing::warn!(base_url = %url, "Using non-HTTPS catalog base URL (localhost only)");
            Ok(url)
        }
        "http" => Err(UrlValidationError::Insecure),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// Validates a poster URL before it is handed to the system opener.
///
/// Poster links come from the catalog, so they are held to the same rules as
/// any untrusted link: http(s) only, never loopback or private ranges.
///
/// ```
/// use popcorn::util::validate_poster_url;
///
/// assert!(validate_poster_url("https://m.media-amazon.com/images/M/abc.jpg").is_ok());
/// assert!(validate_poster_url("file:///etc/passwd").is_err());
/// assert!(validate_poster_url("http://192.168.1.1/poster.jpg").is_err());
/// ```
pub fn validate_poster_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if is_loopback_host(&url) {
        return Err(UrlValidationError::Localhost);
    }

    if let Some(ip) = host_ip(&url) {
        if is_private_ip(&ip) {
            return Err(UrlValidationError::PrivateIp(ip.to_string()));
        }
    }

    Ok(url)
}

fn host_ip(url: &Url) -> Option<IpAddr> {
    let host = url.host_str()?;
    // IPv6 hosts come bracketed
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    bare.parse().ok()
}

fn is_loopback_host(url: &Url) -> bool {
    if url.host_str() == Some("localhost") {
        return true;
    }
    host_ip(url).is_some_and(|ip| ip.is_loopback())
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            if v6.is_loopback() || v6.is_unspecified() {
                return true;
            }
            let first = v6.segments()[0];
            // fc00::/7 unique local, fe80::/10 link local
            (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}
