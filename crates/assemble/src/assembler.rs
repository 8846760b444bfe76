//! Panel assembler: normalizes every batch and concatenates the rows.
//!
//! Row order is events (as configured), then methods (swaps, burns, mints),
//! then venues (v2, v3), then the batch's own order.

use crate::store::BatchSource;
use panel_core::{DataQuality, EventWindow, Method, NormalizedRecord, Result, UsdSplit, Venue};
use panel_normalize::{normalize_all, Normalizer};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Counts of rows per data-quality class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualitySummary {
    pub ok: usize,
    pub non_finite: usize,
    pub negative_liquidity: usize,
}

impl QualitySummary {
    pub fn record(&mut self, quality: DataQuality) {
        match quality {
            DataQuality::Ok => self.ok += 1,
            DataQuality::NonFinite => self.non_finite += 1,
            DataQuality::NegativeLiquidity => self.negative_liquidity += 1,
        }
    }

    pub fn flagged(&self) -> usize {
        self.non_finite + self.negative_liquidity
    }
}

/// The assembled event panel.
#[derive(Debug, Clone, Default)]
pub struct Panel {
    rows: Vec<NormalizedRecord>,
    counts: BTreeMap<(Method, Venue), usize>,
    quality: QualitySummary,
}

impl Panel {
    fn extend(&mut self, method: Method, venue: Venue, rows: Vec<NormalizedRecord>) -> QualitySummary {
        let mut batch = QualitySummary::default();
        for row in &rows {
            batch.record(row.quality());
        }
        *self.counts.entry((method, venue)).or_default() += rows.len();
        self.quality.ok += batch.ok;
        self.quality.non_finite += batch.non_finite;
        self.quality.negative_liquidity += batch.negative_liquidity;
        self.rows.extend(rows);
        batch
    }

    pub fn rows(&self) -> &[NormalizedRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<NormalizedRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of one (method, venue) kind across all events.
    pub fn count(&self, method: Method, venue: Venue) -> usize {
        self.counts.get(&(method, venue)).copied().unwrap_or(0)
    }

    pub fn quality(&self) -> QualitySummary {
        self.quality
    }
}

/// Builds the panel with one USD split strategy for every mint and burn.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelAssembler {
    usd_split: UsdSplit,
}

impl PanelAssembler {
    pub fn new(usd_split: UsdSplit) -> Self {
        Self { usd_split }
    }

    pub fn usd_split(&self) -> UsdSplit {
        self.usd_split
    }

    /// Normalize and concatenate every (event, method, venue) batch.
    ///
    /// A schema error in any batch aborts assembly.
    pub fn assemble<B: BatchSource + ?Sized>(&self, windows: &[EventWindow], batches: &B) -> Result<Panel> {
        let mut panel = Panel::default();

        for window in windows {
            for method in Method::ALL {
                for venue in Venue::ALL {
                    let records = batches.load(&window.event_name, method, venue)?;
                    let normalizer = Normalizer::new(method, venue, self.usd_split);
                    let rows = normalize_all(&normalizer, &records, window)?;
                    let batch = panel.extend(method, venue, rows);

                    if batch.flagged() > 0 {
                        warn!(
                            event = %window.event_name,
                            method = %method,
                            venue = %venue,
                            non_finite = batch.non_finite,
                            negative_liquidity = batch.negative_liquidity,
                            "rows with unusable pool liquidity"
                        );
                    }
                }
            }
        }

        let quality = panel.quality();
        info!(
            events = windows.len(),
            rows = panel.len(),
            usd_split = ?self.usd_split,
            flagged = quality.flagged(),
            "panel assembled"
        );
        Ok(panel)
    }
}
