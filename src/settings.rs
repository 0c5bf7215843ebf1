//! Monitor configuration.
//!
//! Settings are layered from built-in defaults, an optional settings file,
//! `SYNCWATCH_*` environment variables and finally explicit overrides (the
//! CLI flags), in increasing precedence.
//!
//! ```toml
//! name = "Monero Node"
//! global_height_url = "https://api.blockchair.com/monero/stats"
//! global_height_format = "nested"
//! local_height_url = "http://localhost:18089/get_height"
//! price_url = "https://api.coingecko.com/api/v3/simple/price?ids=monero&vs_currencies=usd"
//! refresh_interval = 60
//! external_timeout = "10s"
//! local_timeout = "5s"
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};

use crate::data::duration::parse_duration;
use crate::error::ValidationError;
use crate::fetch::Fetcher;

pub const DEFAULT_NAME: &str = "Monero Node";
pub const DEFAULT_GLOBAL_HEIGHT_URL: &str = "https://api.blockchair.com/monero/stats";
pub const DEFAULT_LOCAL_HEIGHT_URL: &str = "http://localhost:18089/get_height";
pub const DEFAULT_PRICE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=monero&vs_currencies=usd";
pub const DEFAULT_REFRESH_INTERVAL: u64 = 60;
pub const DEFAULT_EXTERNAL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LOCAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable prefix (`SYNCWATCH_REFRESH_INTERVAL=30`).
pub const ENV_PREFIX: &str = "SYNCWATCH";

/// One of the three polled endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GlobalHeight,
    LocalHeight,
    Price,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::GlobalHeight, Endpoint::LocalHeight, Endpoint::Price];

    /// Returns the settings key holding this endpoint's URL.
    pub fn setting(&self) -> &'static str {
        match self {
            Endpoint::GlobalHeight => "global_height_url",
            Endpoint::LocalHeight => "local_height_url",
            Endpoint::Price => "price_url",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endpoint::GlobalHeight => "global height",
            Endpoint::LocalHeight => "local height",
            Endpoint::Price => "price",
        })
    }
}

/// Response shape of the global height source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalHeightFormat {
    /// `{"data": {"best_block_height": N}}` (blockchair style).
    #[default]
    Nested,
    /// `{"height": N}` (monerod style).
    Flat,
}

/// Configuration for a monitor instance.
///
/// Immutable once a [`Coordinator`](crate::Coordinator) has been built from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Display name of the monitored node.
    pub name: String,
    pub global_height_url: String,
    pub global_height_format: GlobalHeightFormat,
    pub local_height_url: String,
    pub price_url: String,
    /// Seconds between refresh cycles.
    pub refresh_interval: u64,
    /// Sent as `User-Agent` on every request.
    pub user_agent: String,
    /// Timeout for the internet-facing endpoints (global height, price).
    #[serde(deserialize_with = "duration_str", serialize_with = "duration_secs")]
    pub external_timeout: Duration,
    /// Timeout for the local node endpoint.
    #[serde(deserialize_with = "duration_str", serialize_with = "duration_secs")]
    pub local_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            global_height_url: DEFAULT_GLOBAL_HEIGHT_URL.to_string(),
            global_height_format: GlobalHeightFormat::default(),
            local_height_url: DEFAULT_LOCAL_HEIGHT_URL.to_string(),
            price_url: DEFAULT_PRICE_URL.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            user_agent: default_user_agent(),
            external_timeout: DEFAULT_EXTERNAL_TIMEOUT,
            local_timeout: DEFAULT_LOCAL_TIMEOUT,
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file, the environment and
    /// the given overrides.
    pub fn load<I>(path: Option<&Path>, overrides: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'static str, String)>,
    {
        let mut builder = Config::builder()
            .set_default("name", DEFAULT_NAME)?
            .set_default("global_height_url", DEFAULT_GLOBAL_HEIGHT_URL)?
            .set_default("global_height_format", "nested")?
            .set_default("local_height_url", DEFAULT_LOCAL_HEIGHT_URL)?
            .set_default("price_url", DEFAULT_PRICE_URL)?
            .set_default("refresh_interval", DEFAULT_REFRESH_INTERVAL)?
            .set_default("user_agent", default_user_agent())?
            .set_default("external_timeout", "10s")?
            .set_default("local_timeout", "5s")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        for (key, value) in overrides {
            builder = builder.set_override(key, value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Returns the URL configured for an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::GlobalHeight => &self.global_height_url,
            Endpoint::LocalHeight => &self.local_height_url,
            Endpoint::Price => &self.price_url,
        }
    }

    /// Returns the request timeout for an endpoint.
    ///
    /// The local node is expected to answer faster than internet services.
    pub fn timeout(&self, endpoint: Endpoint) -> Duration {
        match endpoint {
            Endpoint::LocalHeight => self.local_timeout,
            Endpoint::GlobalHeight | Endpoint::Price => self.external_timeout,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    /// Check the settings without touching the network.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for endpoint in Endpoint::ALL {
            let raw = self.url(endpoint);
            let url = Url::parse(raw).map_err(|e| ValidationError::InvalidSetting {
                field: endpoint.setting(),
                reason: format!("'{}' is not a valid URL ({})", raw, e),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ValidationError::InvalidSetting {
                    field: endpoint.setting(),
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                });
            }
        }

        if self.refresh_interval == 0 {
            return Err(ValidationError::InvalidSetting {
                field: "refresh_interval",
                reason: "must be at least 1 second".to_string(),
            });
        }

        for (field, timeout) in [
            ("external_timeout", self.external_timeout),
            ("local_timeout", self.local_timeout),
        ] {
            if timeout.is_zero() {
                return Err(ValidationError::InvalidSetting {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Validate the settings and perform one trial fetch against each
    /// endpoint. Nothing should be scheduled unless this succeeds.
    pub async fn verify_endpoints(&self) -> Result<(), ValidationError> {
        self.validate()?;

        let fetcher = Fetcher::new(&self.user_agent).map_err(|source| {
            ValidationError::InvalidSetting {
                field: "user_agent",
                reason: source.to_string(),
            }
        })?;

        fetcher
            .global_height(
                self.url(Endpoint::GlobalHeight),
                self.external_timeout,
                self.global_height_format,
            )
            .await
            .map_err(|source| ValidationError::Unreachable {
                endpoint: Endpoint::GlobalHeight,
                source,
            })?;
        fetcher
            .local_height(self.url(Endpoint::LocalHeight), self.local_timeout)
            .await
            .map_err(|source| ValidationError::Unreachable {
                endpoint: Endpoint::LocalHeight,
                source,
            })?;
        fetcher
            .price(self.url(Endpoint::Price), self.external_timeout)
            .await
            .map_err(|source| ValidationError::Unreachable {
                endpoint: Endpoint::Price,
                source,
            })?;

        Ok(())
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn duration_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

fn duration_secs<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format!("{}s", duration.as_secs_f64()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    use crate::testing::{Route, TestServer};

    fn no_overrides() -> Vec<(&'static str, String)> {
        Vec::new()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load(None, no_overrides()).unwrap();
        assert_eq!(settings.name, "Monero Node");
        assert_eq!(settings.global_height_url, DEFAULT_GLOBAL_HEIGHT_URL);
        assert_eq!(settings.local_height_url, DEFAULT_LOCAL_HEIGHT_URL);
        assert_eq!(settings.price_url, DEFAULT_PRICE_URL);
        assert_eq!(settings.refresh_interval, 60);
        assert_eq!(settings.global_height_format, GlobalHeightFormat::Nested);
        assert_eq!(settings.external_timeout, Duration::from_secs(10));
        assert_eq!(settings.local_timeout, Duration::from_secs(5));
        assert!(settings.user_agent.starts_with("syncwatch/"));
    }

    #[test]
    fn test_file_then_overrides() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            name = "Living room node"
            local_height_url = "http://10.0.0.5:18081/get_height"
            global_height_format = "flat"
            refresh_interval = 30
            local_timeout = "750ms"
            "#
        )
        .unwrap();

        let settings = Settings::load(
            Some(file.path()),
            vec![("refresh_interval", "15".to_string())],
        )
        .unwrap();

        assert_eq!(settings.name, "Living room node");
        assert_eq!(settings.local_height_url, "http://10.0.0.5:18081/get_height");
        assert_eq!(settings.global_height_format, GlobalHeightFormat::Flat);
        assert_eq!(settings.refresh_interval, 15);
        assert_eq!(settings.local_timeout, Duration::from_millis(750));
        assert_eq!(settings.price_url, DEFAULT_PRICE_URL);
    }

    #[test]
    fn test_bad_duration_is_rejected() {
        let result = Settings::load(None, vec![("external_timeout", "forever".to_string())]);
        assert!(result.is_err());
    }

    #[test]
    fn test_timeouts_per_endpoint() {
        let settings = Settings::default();
        assert_eq!(settings.timeout(Endpoint::GlobalHeight), Duration::from_secs(10));
        assert_eq!(settings.timeout(Endpoint::Price), Duration::from_secs(10));
        assert_eq!(settings.timeout(Endpoint::LocalHeight), Duration::from_secs(5));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let settings = Settings {
            refresh_interval: 0,
            ..Settings::default()
        };
        match settings.validate() {
            Err(ValidationError::InvalidSetting { field, .. }) => {
                assert_eq!(field, "refresh_interval")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let settings = Settings {
            price_url: "not a url".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::InvalidSetting { field: "price_url", .. })
        ));

        let settings = Settings {
            local_height_url: "ftp://localhost/get_height".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::InvalidSetting { field: "local_height_url", .. })
        ));
    }

    #[tokio::test]
    async fn test_verify_endpoints_accepts_live_endpoints() {
        let server = TestServer::start().await;
        server.set("/stats", Route::json(r#"{"data": {"best_block_height": 3100000}}"#));
        server.set("/get_height", Route::json(r#"{"height": 3099990, "status": "OK"}"#));
        server.set("/price", Route::json(r#"{"monero": {"usd": 161.2}}"#));

        let settings = server.settings("/stats", "/get_height", "/price");
        assert!(settings.verify_endpoints().await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_endpoints_rejects_html_global_source() {
        let server = TestServer::start().await;
        server.set(
            "/stats",
            Route::new(200, "text/html", "<html>Sign in to the hotel wifi</html>"),
        );
        server.set("/get_height", Route::json(r#"{"height": 1}"#));
        server.set("/price", Route::json(r#"{"monero": {"usd": 1.0}}"#));

        let settings = server.settings("/stats", "/get_height", "/price");
        match settings.verify_endpoints().await {
            Err(ValidationError::Unreachable { endpoint, source }) => {
                assert_eq!(endpoint, Endpoint::GlobalHeight);
                assert!(matches!(source, crate::FetchError::ContentType(_)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_verify_endpoints_rejects_failing_price_source() {
        let server = TestServer::start().await;
        server.set("/stats", Route::json(r#"{"data": {"best_block_height": 10}}"#));
        server.set("/get_height", Route::json(r#"{"height": 10}"#));
        server.set("/price", Route::new(429, "application/json", "{}"));

        let settings = server.settings("/stats", "/get_height", "/price");
        match settings.verify_endpoints().await {
            Err(ValidationError::Unreachable { endpoint, source }) => {
                assert_eq!(endpoint, Endpoint::Price);
                assert!(matches!(source, crate::FetchError::Status(429)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
