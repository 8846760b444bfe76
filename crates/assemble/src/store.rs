//! Batch storage between fetch and panel runs.
//!
//! Each (event, method, venue) batch lives in
//! `<data_dir>/<venue>/<event>_<entity>.csv`. Columns are the sorted union of
//! the batch's flat field names; null cells are written empty and read back
//! as null.

use panel_core::{Error, FlatRecord, Method, Result, Venue};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies flattened batches to the assembler.
pub trait BatchSource {
    fn load(&self, event: &str, method: Method, venue: Venue) -> Result<Vec<FlatRecord>>;
}

/// Batches kept as CSV files under a data directory.
#[derive(Debug, Clone)]
pub struct CsvBatchStore {
    data_dir: PathBuf,
}

impl CsvBatchStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File path of one batch.
    pub fn path(&self, event: &str, method: Method, venue: Venue) -> PathBuf {
        self.data_dir
            .join(venue.as_str())
            .join(format!("{}_{}.csv", event, method.entity()))
    }

    /// Write a batch, replacing any previous file. Returns the path written.
    pub fn save(&self, event: &str, method: Method, venue: Venue, records: &[FlatRecord]) -> Result<PathBuf> {
        let path = self.path(event, method, venue);
        write_flat_csv(&path, records)?;
        debug!(path = %path.display(), records = records.len(), "batch saved");
        Ok(path)
    }
}

impl BatchSource for CsvBatchStore {
    fn load(&self, event: &str, method: Method, venue: Venue) -> Result<Vec<FlatRecord>> {
        let path = self.path(event, method, venue);
        if !path.exists() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("batch file {} not found, run fetch first", path.display()),
            )));
        }
        read_flat_csv(&path)
    }
}

/// Batches held in memory, keyed by (event, method, venue).
///
/// A batch never inserted loads as empty.
#[derive(Debug, Clone, Default)]
pub struct MemoryBatches {
    batches: HashMap<(String, Method, Venue), Vec<FlatRecord>>,
}

impl MemoryBatches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: impl Into<String>, method: Method, venue: Venue, records: Vec<FlatRecord>) {
        self.batches.insert((event.into(), method, venue), records);
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

impl BatchSource for MemoryBatches {
    fn load(&self, event: &str, method: Method, venue: Venue) -> Result<Vec<FlatRecord>> {
        Ok(self
            .batches
            .get(&(event.to_string(), method, venue))
            .cloned()
            .unwrap_or_default())
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Write flat records to a CSV file, creating parent directories.
///
/// An empty batch produces an empty file.
pub fn write_flat_csv(path: &Path, records: &[FlatRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if records.is_empty() {
        File::create(path)?;
        return Ok(());
    }

    let columns: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|c| cell(record.get(c))))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a CSV written by [`write_flat_csv`].
///
/// Every non-empty cell comes back as a string; numeric accessors on
/// [`FlatRecord`] parse them on demand.
pub fn read_flat_csv(path: &Path) -> Result<Vec<FlatRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record = headers
            .iter()
            .zip(row.iter())
            .map(|(column, value)| {
                let value = if value.is_empty() {
                    Value::Null
                } else {
                    Value::String(value.to_string())
                };
                (column.to_string(), value)
            })
            .collect();
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(pairs: &[(&str, Value)]) -> FlatRecord {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_batch_path_layout() {
        let store = CsvBatchStore::new("data");
        assert_eq!(
            store.path("terra", Method::Burn, Venue::V3),
            Path::new("data").join("v3").join("terra_burns.csv")
        );
    }

    #[test]
    fn test_csv_roundtrip_keeps_values_readable() {
        let dir = TempDir::new().unwrap();
        let store = CsvBatchStore::new(dir.path());
        let records = vec![
            record(&[
                ("id", json!("0x1-0")),
                ("timestamp", json!("1652054400")),
                ("amountUSD", json!(1000.5)),
                ("pair_token0_name", json!(null)),
            ]),
            record(&[("id", json!("0x2-0")), ("timestamp", json!(1652054401)), ("extra", json!(true))]),
        ];

        let path = store.save("terra", Method::Swap, Venue::V2, &records).unwrap();
        assert!(path.ends_with("v2/terra_swaps.csv"));

        let loaded = store.load("terra", Method::Swap, Venue::V2).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].number("amountUSD").unwrap(), 1000.5);
        assert_eq!(loaded[0].timestamp().unwrap(), 1652054400);
        assert_eq!(loaded[0].label("pair_token0_name").unwrap(), "");
        assert_eq!(loaded[1].timestamp().unwrap(), 1652054401);
        assert_eq!(loaded[1].text("extra").unwrap(), "true");
        // union of columns: absent fields read back as null
        assert_eq!(loaded[1].get("amountUSD"), Some(&Value::Null));
    }

    #[test]
    fn test_empty_batch_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = CsvBatchStore::new(dir.path());
        store.save("quiet", Method::Mint, Venue::V3, &[]).unwrap();
        assert!(store.load("quiet", Method::Mint, Venue::V3).unwrap().is_empty());
    }

    #[test]
    fn test_missing_batch_is_error() {
        let dir = TempDir::new().unwrap();
        let store = CsvBatchStore::new(dir.path());
        assert!(matches!(store.load("nope", Method::Swap, Venue::V2), Err(Error::Io(_))));
    }

    #[test]
    fn test_memory_batches() {
        let mut batches = MemoryBatches::new();
        batches.insert("e", Method::Swap, Venue::V3, vec![record(&[("id", json!("a"))])]);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches.load("e", Method::Swap, Venue::V3).unwrap().len(), 1);
        assert!(batches.load("e", Method::Swap, Venue::V2).unwrap().is_empty());
    }
}
