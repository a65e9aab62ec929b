//! Remote movie catalog.
//!
//! [`Catalog`] is the seam the application talks to; [`OmdbClient`] is the
//! HTTP implementation. Failures are split into two user-visible kinds: the
//! catalog answering "no such movie" ([`CatalogError::NotFound`]) and
//! everything else going wrong on the way there.

mod omdb;
mod types;

pub use omdb::OmdbClient;
pub use types::{CatalogDetail, CatalogSummary};

use async_trait::async_trait;
use secrecy::SecretString;
use std::time::Duration;
use thiserror::Error;

use crate::util::UrlValidationError;

/// Message shown when the catalog reports no match.
pub const MSG_NOT_FOUND: &str = "Movie not found";
/// Message shown for every transport-level failure.
pub const MSG_TRANSPORT: &str = "Something went wrong with fetching movies";

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Connection, TLS, timeout or body-read failure.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// Body was not the JSON shape we expect (or was too large).
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The catalog answered `Response: "False"`.
    #[error("Catalog reported: {0}")]
    NotFound(String),

    #[error("Insecure catalog base URL: {0}")]
    InsecureBaseUrl(#[source] UrlValidationError),
}

impl CatalogError {
    /// True for well-formed responses in which the catalog itself reported a
    /// logical failure.
    pub fn is_domain(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }

    /// The inline message shown in place of the result list.
    pub fn user_message(&self) -> &'static str {
        if self.is_domain() {
            MSG_NOT_FOUND
        } else {
            MSG_TRANSPORT
        }
    }
}

/// Settings for building a catalog client.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: SecretString,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Movie lookups.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Free-text title search.
    async fn search(&self, query: &str) -> Result<Vec<CatalogSummary>, CatalogError>;

    /// Full record for one identifier.
    async fn fetch_detail(&self, id: &str) -> Result<CatalogDetail, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_domain() {
        let err = CatalogError::NotFound("Movie not found!".into());
        assert!(err.is_domain());
        assert_eq!(err.user_message(), "Movie not found");
    }

    #[test]
    fn test_transport_kinds_share_message() {
        for err in [
            CatalogError::HttpStatus(500),
            CatalogError::Decode("expected value".into()),
        ] {
            assert!(!err.is_domain());
            assert_eq!(err.user_message(), "Something went wrong with fetching movies");
        }
    }
}
