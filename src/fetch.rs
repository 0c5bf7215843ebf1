//! HTTP fetching for the three polled endpoints.
//!
//! Every request is a plain GET with its own timeout. A response is only
//! accepted with a success status and a body that decodes as JSON into the
//! endpoint's shape; fields missing from an otherwise valid body read as 0.
//!
//! ## Response shapes
//!
//! | Endpoint      | Field path                                   |
//! |---------------|----------------------------------------------|
//! | global height | `data.best_block_height` (nested) or `height` (flat) |
//! | local height  | `height`                                     |
//! | price         | `monero.usd`                                 |

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::FetchError;
use crate::settings::GlobalHeightFormat;

/// Shared HTTP client for endpoint requests.
///
/// Holds one connection pool that sequential refresh cycles reuse.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher sending the given `User-Agent`.
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// Fetch the reference height.
    ///
    /// The content type is checked before the body is read, so an HTML page
    /// served with `200 OK` (captive portal, CDN error page) is rejected
    /// without being parsed.
    pub async fn global_height(
        &self,
        url: &str,
        timeout: Duration,
        format: GlobalHeightFormat,
    ) -> Result<u64, FetchError> {
        let response = self.get(url, timeout).await?;
        require_json_content(&response)?;

        match format {
            GlobalHeightFormat::Nested => {
                let stats: NestedHeight = decode(response).await?;
                Ok(stats.data.best_block_height)
            }
            GlobalHeightFormat::Flat => {
                let height: FlatHeight = decode(response).await?;
                Ok(height.height)
            }
        }
    }

    /// Fetch the local node's height.
    pub async fn local_height(&self, url: &str, timeout: Duration) -> Result<u64, FetchError> {
        let response = self.get(url, timeout).await?;
        let height: FlatHeight = decode(response).await?;
        Ok(height.height)
    }

    /// Fetch the USD price quote.
    pub async fn price(&self, url: &str, timeout: Duration) -> Result<f64, FetchError> {
        let response = self.get(url, timeout).await?;
        let quote: PriceQuote = decode(response).await?;
        if quote.monero.usd < 0.0 || !quote.monero.usd.is_finite() {
            return Err(FetchError::Parse(format!(
                "price must be a non-negative number, got {}",
                quote.monero.usd
            )));
        }
        Ok(quote.monero.usd)
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<Response, FetchError> {
        debug!(url, ?timeout, "fetching");

        let response = self.client.get(url).timeout(timeout).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        Ok(response)
    }
}

fn require_json_content(response: &Response) -> Result<(), FetchError> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if is_json_content_type(content_type) {
        Ok(())
    } else if content_type.is_empty() {
        Err(FetchError::ContentType("<missing>".to_string()))
    } else {
        Err(FetchError::ContentType(content_type.to_string()))
    }
}

/// `application/json` or any `+json` structured syntax suffix.
fn is_json_content_type(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NestedHeight {
    data: HeightStats,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HeightStats {
    #[serde(alias = "bestBlockHeight")]
    best_block_height: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlatHeight {
    height: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PriceQuote {
    monero: AssetPrice,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AssetPrice {
    usd: f64,
}
