//! Core data types for the event panel pipeline.

use crate::error::{Error, Result};
use chrono::DateTime;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Timestamp in seconds since Unix epoch (UTC).
pub type TimestampSecs = i64;

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
///
/// Out-of-range values fall back to the raw integer.
pub fn format_timestamp(ts: TimestampSecs) -> String {
    match DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

/// Read a timestamp from a JSON number or a decimal string.
pub fn value_as_timestamp(value: &Value) -> Option<TimestampSecs> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Protocol version of the venue a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    /// Constant-product pairs.
    V2,
    /// Concentrated-liquidity pools.
    V3,
}

impl Venue {
    /// Both venues, in panel order.
    pub const ALL: [Venue; 2] = [Venue::V2, Venue::V3];

    pub fn as_str(self) -> &'static str {
        match self {
            Venue::V2 => "v2",
            Venue::V3 => "v3",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Venue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "v2" => Ok(Venue::V2),
            "v3" => Ok(Venue::V3),
            other => Err(Error::config(format!("unknown venue `{other}`"))),
        }
    }
}

/// Kind of on-chain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Swap,
    Mint,
    Burn,
}

impl Method {
    /// All methods, in panel order (swaps, burns, mints).
    pub const ALL: [Method; 3] = [Method::Swap, Method::Burn, Method::Mint];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Swap => "swap",
            Method::Mint => "mint",
            Method::Burn => "burn",
        }
    }

    /// Plural entity name used by the subgraph and by batch file names.
    pub fn entity(self) -> &'static str {
        match self {
            Method::Swap => "swaps",
            Method::Mint => "mints",
            Method::Burn => "burns",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "swap" | "swaps" => Ok(Method::Swap),
            "mint" | "mints" => Ok(Method::Mint),
            "burn" | "burns" => Ok(Method::Burn),
            other => Err(Error::config(format!("unknown method `{other}`"))),
        }
    }
}

/// A record as decoded from the remote source: scalars plus nested objects.
pub type RawRecord = Map<String, Value>;

/// One decoded page of records, ascending by timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPage {
    pub records: Vec<RawRecord>,
}

impl RawPage {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Timestamp of the last record, if any.
    pub fn last_timestamp(&self) -> Result<Option<TimestampSecs>> {
        self.records.last().map(record_timestamp).transpose()
    }
}

/// Top-level `timestamp` of a raw record.
///
/// A missing or non-integer timestamp means the response is malformed.
pub fn record_timestamp(record: &RawRecord) -> Result<TimestampSecs> {
    record
        .get("timestamp")
        .and_then(value_as_timestamp)
        .ok_or_else(|| Error::transport("record without an integer `timestamp`"))
}

/// Top-level `id` of a raw record.
pub fn record_id(record: &RawRecord) -> Result<&str> {
    record
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::transport("record without a string `id`"))
}

/// A record whose nested objects were hoisted into prefixed scalar fields.
///
/// Keys are kept sorted so tabular output has a stable column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatRecord(BTreeMap<String, Value>);

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value under that key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// A field that must be present and non-null.
    pub fn require(&self, key: &str) -> Result<&Value> {
        match self.0.get(key) {
            None | Some(Value::Null) => Err(Error::schema(format!("missing field `{key}`"))),
            Some(v) => Ok(v),
        }
    }

    /// A required field rendered as text.
    pub fn text(&self, key: &str) -> Result<String> {
        match self.require(key)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(Error::schema(format!("field `{key}` is not a scalar"))),
        }
    }

    /// A required numeric field, given either as a number or a decimal string.
    pub fn number(&self, key: &str) -> Result<f64> {
        let value = self.require(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| Error::schema(format!("field `{key}` is not numeric: {value}")))
    }

    /// A numeric field that must exist but may be null or blank.
    ///
    /// Null and blank values read as NaN and surface later as a
    /// [`DataQuality::NonFinite`] row instead of failing the batch.
    pub fn amount(&self, key: &str) -> Result<f64> {
        match self.0.get(key) {
            None => Err(Error::schema(format!("missing field `{key}`"))),
            Some(Value::Null) => Ok(f64::NAN),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(f64::NAN),
            Some(_) => self.number(key),
        }
    }

    /// A text field that must exist but may be null.
    pub fn label(&self, key: &str) -> Result<String> {
        match self.0.get(key) {
            None => Err(Error::schema(format!("missing field `{key}`"))),
            Some(Value::Null) => Ok(String::new()),
            Some(_) => self.text(key),
        }
    }

    /// The record's `timestamp` field.
    pub fn timestamp(&self) -> Result<TimestampSecs> {
        value_as_timestamp(self.require("timestamp")?)
            .ok_or_else(|| Error::schema("field `timestamp` is not an integer"))
    }
}

impl FromIterator<(String, Value)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Data-quality classification of a normalized row.
///
/// Carried as data rather than raised, so single-sided liquidity events and
/// similar edge cases stay in the panel for downstream filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    Ok,
    /// A delta or the derived liquidity is NaN or infinite.
    NonFinite,
    /// Derived liquidity is finite but negative.
    NegativeLiquidity,
}

/// The unified panel row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub dex: Venue,
    pub method: Method,
    pub event_name: String,
    /// Event center time, as configured.
    pub event_time: String,
    pub id: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: TimestampSecs,
    pub pair_id: String,
    pub token0_id: String,
    pub token0_name: String,
    pub token0_symbol: String,
    pub token1_id: String,
    pub token1_name: String,
    pub token1_symbol: String,
    /// Investor-perspective token0 delta (positive = received).
    pub txn_amount0: f64,
    /// Investor-perspective token1 delta (positive = received).
    pub txn_amount1: f64,
    #[serde(rename = "amountUSD")]
    pub amount_usd: f64,
    pub pool_amount0: f64,
    pub pool_amount1: f64,
    /// Pool reserves valued at the implied prices, in USD.
    pub pool_liquidity: f64,
}

impl NormalizedRecord {
    /// Column names of the panel, in output order.
    pub const COLUMNS: [&'static str; 19] = [
        "dex",
        "method",
        "event_name",
        "event_time",
        "id",
        "timestamp",
        "pair_id",
        "token0_id",
        "token0_name",
        "token0_symbol",
        "token1_id",
        "token1_name",
        "token1_symbol",
        "txn_amount0",
        "txn_amount1",
        "amountUSD",
        "pool_amount0",
        "pool_amount1",
        "pool_liquidity",
    ];

    /// Classify the derived values of this row.
    pub fn quality(&self) -> DataQuality {
        let finite = self.txn_amount0.is_finite()
            && self.txn_amount1.is_finite()
            && self.pool_liquidity.is_finite();

        if !finite {
            DataQuality::NonFinite
        } else if self.pool_liquidity < 0.0 {
            DataQuality::NegativeLiquidity
        } else {
            DataQuality::Ok
        }
    }
}

fn serialize_timestamp<S: Serializer>(ts: &TimestampSecs, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(*ts))
}
