//! DuckDB export of the panel.
//!
//! The `panel` table is dropped and recreated on every export.

use duckdb::{params, Connection};
use panel_core::{format_timestamp, Error, NormalizedRecord, Result};
use std::path::Path;
use tracing::info;

const CREATE_PANEL: &str = "
    DROP TABLE IF EXISTS panel;
    CREATE TABLE panel (
        dex VARCHAR NOT NULL,
        method VARCHAR NOT NULL,
        event_name VARCHAR NOT NULL,
        event_time VARCHAR NOT NULL,
        id VARCHAR NOT NULL,
        \"timestamp\" TIMESTAMP NOT NULL,
        pair_id VARCHAR NOT NULL,
        token0_id VARCHAR NOT NULL,
        token0_name VARCHAR NOT NULL,
        token0_symbol VARCHAR NOT NULL,
        token1_id VARCHAR NOT NULL,
        token1_name VARCHAR NOT NULL,
        token1_symbol VARCHAR NOT NULL,
        txn_amount0 DOUBLE,
        txn_amount1 DOUBLE,
        \"amountUSD\" DOUBLE,
        pool_amount0 DOUBLE,
        pool_amount1 DOUBLE,
        pool_liquidity DOUBLE
    );
";

const INSERT_ROW: &str = "
    INSERT INTO panel VALUES (
        ?, ?, ?, ?, ?, CAST(? AS TIMESTAMP), ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
    )
";

fn db(e: duckdb::Error) -> Error {
    Error::database(e.to_string())
}

/// Replace the `panel` table in the database at `path` with `rows`.
///
/// Returns the number of rows inserted.
pub fn export_duckdb(path: &Path, rows: &[NormalizedRecord]) -> Result<usize> {
    let mut conn = Connection::open(path).map_err(db)?;
    let tx = conn.transaction().map_err(db)?;
    tx.execute_batch(CREATE_PANEL).map_err(db)?;

    {
        let mut stmt = tx.prepare(INSERT_ROW).map_err(db)?;
        for row in rows {
            stmt.execute(params![
                row.dex.as_str(),
                row.method.as_str(),
                row.event_name,
                row.event_time,
                row.id,
                format_timestamp(row.timestamp),
                row.pair_id,
                row.token0_id,
                row.token0_name,
                row.token0_symbol,
                row.token1_id,
                row.token1_name,
                row.token1_symbol,
                row.txn_amount0,
                row.txn_amount1,
                row.amount_usd,
                row.pool_amount0,
                row.pool_amount1,
                row.pool_liquidity,
            ])
            .map_err(db)?;
        }
    }
    tx.commit().map_err(db)?;

    info!(path = %path.display(), rows = rows.len(), "panel exported to duckdb");
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use panel_core::{Method, Venue};
    use tempfile::TempDir;

    fn row(id: &str, method: Method, liquidity: f64) -> NormalizedRecord {
        NormalizedRecord {
            dex: Venue::V2,
            method,
            event_name: "ftx".into(),
            event_time: "2022-11-08 00:00:00".into(),
            id: id.into(),
            timestamp: 1667865600,
            pair_id: "0xpair".into(),
            token0_id: "0xa".into(),
            token0_name: "A".into(),
            token0_symbol: "A".into(),
            token1_id: "0xb".into(),
            token1_name: "B".into(),
            token1_symbol: "B".into(),
            txn_amount0: 1.0,
            txn_amount1: -1.0,
            amount_usd: 10.0,
            pool_amount0: 100.0,
            pool_amount1: 100.0,
            pool_liquidity: liquidity,
        }
    }

    #[test]
    fn test_export_replaces_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("panel.duckdb");

        let first = vec![row("a", Method::Swap, 100.0), row("b", Method::Mint, 250.0)];
        assert_eq!(export_duckdb(&path, &first).unwrap(), 2);
        assert_eq!(export_duckdb(&path, &first[..1]).unwrap(), 1);

        let conn = Connection::open(&path).unwrap();
        let (count, total): (i64, f64) = conn
            .query_row("SELECT COUNT(*), SUM(pool_liquidity) FROM panel", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(count, 1);
        assert_relative_eq!(total, 100.0);

        let hour: i64 = conn
            .query_row("SELECT hour(\"timestamp\") FROM panel", [], |r| r.get(0))
            .unwrap();
        assert_eq!(hour, 0);
    }
}
