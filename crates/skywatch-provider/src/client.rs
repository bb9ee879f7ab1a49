//! The `reqwest`-backed provider client.

use std::time::Duration;

use futures::FutureExt;
use reqwest::Url;
use serde_json::Value;
use skywatch_tracker::{AircraftLookup, LookupError, LookupFuture, LookupResult};
use skywatch_types::{AircraftState, SearchType};
use tracing::debug;

/// Connection settings for the provider.
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key sent as `x-rapidapi-key`.
    pub api_key: String,
    /// Provider host, sent as `x-rapidapi-host` and used in the URL.
    pub api_host: String,
    /// URL scheme (`https` in production).
    pub scheme: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl core::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("api_host", &self.api_host)
            .field("scheme", &self.scheme)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Errors constructing an [`AdsbClient`].
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The scheme and host do not form a usable base URL.
    #[error("invalid provider base URL {url}: {reason}")]
    InvalidBaseUrl {
        /// The URL that was attempted.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Aircraft lookup client for the ADS-B provider.
pub struct AdsbClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    api_host: String,
}

impl AdsbClient {
    /// Create a client from connection settings.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let raw = format!("{}://{}", config.scheme, config.api_host);
        let base_url = Url::parse(&raw).map_err(|e| ProviderError::InvalidBaseUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::InvalidBaseUrl {
                url: raw,
                reason: String::from("URL cannot be a base"),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            api_host: config.api_host.clone(),
        })
    }

    /// Build the request URL for a search.
    ///
    /// The value is percent-encoded as a single path segment.
    pub fn endpoint(&self, search_type: SearchType, value: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v2", search_type.path_segment(), value, ""]);
        }
        url
    }

    async fn fetch(&self, search_type: SearchType, value: &str) -> LookupResult {
        let url = self.endpoint(search_type, value);
        debug!(%url, "querying aircraft provider");

        let response = self
            .client
            .get(url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        let found = extract_first_aircraft(json)?;
        debug!(
            search_type = search_type.path_segment(),
            value,
            found = found.is_some(),
            "provider answered"
        );
        Ok(found)
    }
}

impl AircraftLookup for AdsbClient {
    fn lookup<'a>(&'a self, search_type: SearchType, value: &'a str) -> LookupFuture<'a> {
        self.fetch(search_type, value).boxed()
    }
}

/// Pull the first aircraft out of a provider response body.
///
/// An absent, null, or empty `ac` array means "no aircraft". Anything
/// else that is not an array of objects is a decode error.
pub fn extract_first_aircraft(json: Value) -> LookupResult {
    let Value::Object(mut body) = json else {
        return Err(LookupError::Decode(String::from(
            "expected a JSON object at the top level",
        )));
    };

    match body.remove("ac") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(list)) => match list.into_iter().next() {
            None => Ok(None),
            Some(first) => AircraftState::from_value(first)
                .map(Some)
                .ok_or_else(|| LookupError::Decode(String::from("ac[0] is not an object"))),
        },
        Some(other) => Err(LookupError::Decode(format!(
            "unexpected `ac` field type: {other}"
        ))),
    }
}
