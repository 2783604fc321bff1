//! Request URL construction for TMDB endpoints.

use std::fmt;

use anyhow::{Context, Result};
use url::Url;

/// Default base URL for TMDB API v3.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Query parameter carrying the static API key.
pub const API_KEY_PARAM: &str = "api_key";

/// Builds endpoint URLs from a base URL and a static API key.
///
/// The key is always the first query parameter. Caller parameters are
/// appended in order; a caller-supplied `api_key` is dropped so it can
/// never replace the configured key.
#[derive(Clone)]
pub struct EndpointBuilder {
    /// Base URL every endpoint path is joined onto.
    base_url: Url,
    /// Static API key.
    api_key: String,
}

impl EndpointBuilder {
    /// Creates a builder for the given base URL and key.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the URL for `endpoint` with the key and `params` in the query string.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` cannot be joined onto the base URL.
    pub fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url> {
        let path = endpoint.trim_start_matches('/');
        let mut url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair(API_KEY_PARAM, &self.api_key);
            for (key, value) in params.iter().filter(|(key, _)| *key != API_KEY_PARAM) {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

impl fmt::Debug for EndpointBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBuilder")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}
