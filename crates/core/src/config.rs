//! Configuration structures for the event panel pipeline.

use crate::error::{Error, Result};
use crate::types::Venue;
use crate::window::EventWindow;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Largest page the remote source serves.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Environment variable overriding the v2 endpoint.
pub const V2_ENDPOINT_ENV: &str = "DEX_PANEL_V2_ENDPOINT";
/// Environment variable overriding the v3 endpoint.
pub const V3_ENDPOINT_ENV: &str = "DEX_PANEL_V3_ENDPOINT";

/// Main configuration for the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Named events the panel is built around.
    pub events: Vec<EventConfig>,
    /// Pre/post window width.
    pub window: WindowConfig,
    /// Remote endpoints.
    pub venues: VenuesConfig,
    /// Pagination and rate limiting.
    pub fetch: FetchConfig,
    /// Derived-field formulas.
    pub derivation: DerivationConfig,
    /// Output locations.
    pub output: OutputConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing sections take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Apply endpoint overrides from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(V2_ENDPOINT_ENV) {
            self.venues.v2.endpoint = url;
        }
        if let Ok(url) = std::env::var(V3_ENDPOINT_ENV) {
            self.venues.v3.endpoint = url;
        }
        self
    }

    /// Check the configuration for values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.window.hours <= 0 {
            return Err(Error::config("window.hours must be positive"));
        }
        if self.fetch.page_size == 0 || self.fetch.page_size > MAX_PAGE_SIZE {
            return Err(Error::config(format!(
                "fetch.page_size must be in 1..={MAX_PAGE_SIZE}, got {}",
                self.fetch.page_size
            )));
        }
        for venue in Venue::ALL {
            if self.venues.endpoint(venue).trim().is_empty() {
                return Err(Error::config(format!("{venue} endpoint is empty")));
            }
        }

        let mut names = HashSet::new();
        for event in &self.events {
            if event.name.trim().is_empty() {
                return Err(Error::config("event name is empty"));
            }
            if !names.insert(event.name.as_str()) {
                return Err(Error::config(format!("duplicate event `{}`", event.name)));
            }
        }
        Ok(())
    }

    /// Resolve every configured event into its window, in configured order.
    pub fn event_windows(&self) -> Result<Vec<EventWindow>> {
        self.events
            .iter()
            .map(|e| EventWindow::resolve(&e.name, &e.time, self.window.hours))
            .collect()
    }
}

/// A named event and its center time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Event name (used in file names and panel rows).
    pub name: String,
    /// Center time, e.g. "2022-05-09 00:00:00" (UTC).
    pub time: String,
}

impl EventConfig {
    pub fn new(name: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: time.into(),
        }
    }
}

/// Event window width.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Hours before and after the event center.
    pub hours: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { hours: 24 }
    }
}

/// Remote endpoints, one per venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VenuesConfig {
    pub v2: VenueEndpoint,
    pub v3: VenueEndpoint,
}

impl VenuesConfig {
    /// Endpoint URL for a venue.
    pub fn endpoint(&self, venue: Venue) -> &str {
        match venue {
            Venue::V2 => &self.v2.endpoint,
            Venue::V3 => &self.v3.endpoint,
        }
    }
}

impl Default for VenuesConfig {
    fn default() -> Self {
        Self {
            v2: VenueEndpoint {
                endpoint: "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v2".to_string(),
            },
            v3: VenueEndpoint {
                endpoint: "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v3".to_string(),
            },
        }
    }
}

/// A GraphQL endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueEndpoint {
    pub endpoint: String,
}

/// Pagination and rate limiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Records requested per page.
    pub page_size: usize,
    /// Pause between page requests (ms).
    pub page_delay_ms: u64,
    /// Pause between fetch jobs (ms).
    pub job_delay_ms: u64,
    /// HTTP request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            page_delay_ms: 0,
            job_delay_ms: 5_000,
            timeout_secs: 60,
        }
    }
}

/// How a mint/burn's combined USD amount is split across its two legs.
///
/// One strategy applies to every mint and burn of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsdSplit {
    /// `price_i = amountUSD / |txn_amount_i| / 2`.
    EvenSplit,
    /// Convert the other leg through its pool-quoted price:
    /// `price0 = amountUSD / (|txn_amount0| + |txn_amount1| / token1Price)`.
    #[default]
    CrossLeg,
}

impl std::str::FromStr for UsdSplit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "even_split" | "even" => Ok(UsdSplit::EvenSplit),
            "cross_leg" | "cross" => Ok(UsdSplit::CrossLeg),
            other => Err(Error::config(format!("unknown usd split `{other}`"))),
        }
    }
}

/// Derived-field formulas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationConfig {
    pub usd_split: UsdSplit,
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the per-batch CSV files (`<data_dir>/<venue>/<event>_<entity>.csv`).
    pub data_dir: PathBuf,
    /// Combined panel CSV.
    pub panel_path: PathBuf,
    /// Optional DuckDB database receiving the panel table.
    pub duckdb_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            panel_path: PathBuf::from("data/panel.csv"),
            duckdb_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.hours, 24);
        assert_eq!(config.fetch.page_size, 1000);
        assert_eq!(config.derivation.usd_split, UsdSplit::CrossLeg);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "events": [{{"name": "merge", "time": "2022-09-15 06:42:42"}}],
                "window": {{"hours": 6}},
                "derivation": {{"usd_split": "even_split"}}
            }}"#
        )
        .unwrap();

        let config = Config::from_json_file(file.path()).unwrap();
        assert_eq!(config.events.len(), 1);
        assert_eq!(config.window.hours, 6);
        assert_eq!(config.derivation.usd_split, UsdSplit::EvenSplit);
        assert_eq!(config.fetch.page_size, 1000);
        assert!(config.venues.v3.endpoint.ends_with("uniswap-v3"));

        let windows = config.event_windows().unwrap();
        assert_eq!(windows[0].end - windows[0].start, 12 * 3600);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.fetch.page_size = 5000;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.events = vec![
            EventConfig::new("a", "2022-01-01"),
            EventConfig::new("a", "2022-02-01"),
        ];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.venues.v2.endpoint = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_event_time_is_parse_error() {
        let mut config = Config::default();
        config.events = vec![EventConfig::new("a", "not a date")];
        assert!(matches!(config.event_windows(), Err(Error::Parse(_))));
    }
}
