//! End to end without network: synthetic pages through fetch, batch CSVs,
//! normalization and the panel file.

use panel_assemble::{write_panel_csv, CsvBatchStore, PanelAssembler};
use panel_core::{DataQuality, EventWindow, Method, RawPage, Result, TimestampSecs, UsdSplit, Venue};
use panel_ingestion::{plan_jobs, FetchJob, PageSource};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Serves v2 or v3 records shaped like the subgraph, two per page.
struct VenueSource {
    method: Method,
    venue: Venue,
    timestamps: Vec<TimestampSecs>,
}

impl VenueSource {
    fn raw(&self, ts: TimestampSecs, n: usize) -> Value {
        let tx = json!({"id": format!("0x{ts:x}")});
        match (self.venue, self.method) {
            (Venue::V2, Method::Swap) => json!({
                "id": format!("0x{ts:x}-{n}"),
                "timestamp": ts.to_string(),
                "amount0In": "0", "amount0Out": "100",
                "amount1In": "50", "amount1Out": "0",
                "amountUSD": "1000",
                "pair": {
                    "id": "0xpair", "reserve0": "10000", "reserve1": "5000",
                    "token0Price": "0.5", "token1Price": "2",
                    "token0": {"id": "0xt0", "name": "Zero", "symbol": "T0"},
                    "token1": {"id": "0xt1", "name": "One", "symbol": "T1"}
                },
                "transaction": tx
            }),
            (Venue::V2, _) => json!({
                "id": format!("0x{ts:x}-{n}"),
                "timestamp": ts.to_string(),
                "amount0": "2", "amount1": "4000", "amountUSD": "8000",
                "pair": {
                    "id": "0xpair", "reserve0": "10", "reserve1": "20000",
                    "token0Price": "2000", "token1Price": "0.0005",
                    "token0": {"id": "0xt0", "name": "Zero", "symbol": "T0"},
                    "token1": {"id": "0xt1", "name": "One", "symbol": "T1"}
                },
                "transaction": tx
            }),
            (Venue::V3, _) => json!({
                "id": format!("0x{ts:x}-{n}"),
                "timestamp": ts.to_string(),
                "amount0": if self.method == Method::Swap { "-1" } else { "0" },
                "amount1": "3000", "amountUSD": "3000",
                "pool": {
                    "id": "0xpool",
                    "totalValueLockedToken0": "100", "totalValueLockedToken1": "300000",
                    "token0Price": "3000", "token1Price": "0.000333"
                },
                "token0": {"id": "0xweth", "name": "Wrapped Ether", "symbol": "WETH"},
                "token1": {"id": "0xusdc", "name": "USD Coin", "symbol": "USDC"},
                "transaction": tx
            }),
        }
    }
}

impl PageSource for VenueSource {
    fn fetch_page(&self, cursor: TimestampSecs) -> Result<RawPage> {
        let records = self
            .timestamps
            .iter()
            .enumerate()
            .filter(|(_, ts)| **ts > cursor)
            .take(2)
            .map(|(n, ts)| match self.raw(*ts, n) {
                Value::Object(map) => map,
                _ => unreachable!(),
            })
            .collect();
        Ok(RawPage::new(records))
    }
}

#[test]
fn test_fetch_store_assemble_write() {
    let dir = TempDir::new().unwrap();
    let store = CsvBatchStore::new(dir.path().join("data"));
    let windows = vec![EventWindow::resolve("terra", "2022-05-09 00:00:00", 1).unwrap()];
    let center = windows[0].center;
    let timestamps = vec![center - 7200, center - 3600, center - 60, center, center + 60, center + 3600];

    for job in plan_jobs(&windows, &Method::ALL, &Venue::ALL) {
        let source = VenueSource {
            method: job.method,
            venue: job.venue,
            timestamps: timestamps.clone(),
        };
        let flat = job.run(&source).unwrap();
        // [center - 3600, center + 3600)
        assert_eq!(flat.len(), 4);
        store
            .save(&job.window.event_name, job.method, job.venue, &flat)
            .unwrap();
    }

    let panel = PanelAssembler::new(UsdSplit::CrossLeg)
        .assemble(&windows, &store)
        .unwrap();
    assert_eq!(panel.len(), 24);
    assert_eq!(panel.count(Method::Burn, Venue::V3), 4);

    let first = &panel.rows()[0];
    assert_eq!((first.dex, first.method), (Venue::V2, Method::Swap));
    assert_eq!(first.txn_amount0, 100.0);
    assert_eq!(first.txn_amount1, -50.0);
    assert_eq!(first.pool_liquidity, 200000.0);
    assert_eq!(first.timestamp, center - 3600);

    // single-sided v3 mints and burns stay finite under the cross-leg split
    let non_finite = panel
        .rows()
        .iter()
        .filter(|r| r.quality() == DataQuality::NonFinite)
        .count();
    assert_eq!(non_finite, 0);
    assert!(panel
        .rows()
        .iter()
        .all(|r| r.timestamp >= windows[0].start && r.timestamp < windows[0].end));

    let panel_path = dir.path().join("panel.csv");
    write_panel_csv(&panel_path, panel.rows()).unwrap();
    let mut reader = csv::Reader::from_path(&panel_path).unwrap();
    assert_eq!(reader.records().count(), 24);
}

#[test]
fn test_single_job_against_empty_source() {
    let window = EventWindow::resolve("quiet", "2022-06-01", 24).unwrap();
    let source = VenueSource {
        method: Method::Mint,
        venue: Venue::V3,
        timestamps: vec![],
    };
    let flat = FetchJob::new(window, Method::Mint, Venue::V3).run(&source).unwrap();
    assert!(flat.is_empty());
}
