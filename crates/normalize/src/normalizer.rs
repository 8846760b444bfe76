//! The six venue normalizers.
//!
//! One [`Variant`] per (method, venue). Projection and renaming are shared
//! through [`VenueLayout`]; the delta and price formulas stay explicit per
//! variant.

use crate::layout::{layout, VenueLayout};
use crate::pricing::{liquidity_prices, pool_liquidity, swap_prices, LegPrices};
use panel_core::{EventWindow, FlatRecord, Method, NormalizedRecord, Result, UsdSplit, Venue};

/// Maps a flattened venue record onto the unified panel row.
pub trait VenueNormalizer {
    fn normalize(&self, record: &FlatRecord, event: &EventWindow) -> Result<NormalizedRecord>;
}

/// Which transform applies to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    SwapV2,
    SwapV3,
    MintV2,
    MintV3,
    BurnV2,
    BurnV3,
}

impl Variant {
    pub fn of(method: Method, venue: Venue) -> Self {
        match (method, venue) {
            (Method::Swap, Venue::V2) => Variant::SwapV2,
            (Method::Swap, Venue::V3) => Variant::SwapV3,
            (Method::Mint, Venue::V2) => Variant::MintV2,
            (Method::Mint, Venue::V3) => Variant::MintV3,
            (Method::Burn, Venue::V2) => Variant::BurnV2,
            (Method::Burn, Venue::V3) => Variant::BurnV3,
        }
    }

    pub fn method(self) -> Method {
        match self {
            Variant::SwapV2 | Variant::SwapV3 => Method::Swap,
            Variant::MintV2 | Variant::MintV3 => Method::Mint,
            Variant::BurnV2 | Variant::BurnV3 => Method::Burn,
        }
    }

    pub fn venue(self) -> Venue {
        match self {
            Variant::SwapV2 | Variant::MintV2 | Variant::BurnV2 => Venue::V2,
            Variant::SwapV3 | Variant::MintV3 | Variant::BurnV3 => Venue::V3,
        }
    }

    /// Investor-perspective token deltas (positive = received).
    fn deltas(self, record: &FlatRecord) -> Result<(f64, f64)> {
        Ok(match self {
            Variant::SwapV2 => (
                record.amount("amount0Out")? - record.amount("amount0In")?,
                record.amount("amount1Out")? - record.amount("amount1In")?,
            ),
            // v3 amounts are pool-perspective
            Variant::SwapV3 => (-record.amount("amount0")?, -record.amount("amount1")?),
            Variant::MintV2 | Variant::MintV3 => (record.amount("amount0")?, record.amount("amount1")?),
            Variant::BurnV2 | Variant::BurnV3 => (-record.amount("amount0")?, -record.amount("amount1")?),
        })
    }
}

/// A variant bound to the run's USD split strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    pub variant: Variant,
    pub usd_split: UsdSplit,
}

impl Normalizer {
    pub fn new(method: Method, venue: Venue, usd_split: UsdSplit) -> Self {
        Self {
            variant: Variant::of(method, venue),
            usd_split,
        }
    }

    fn layout(&self) -> &'static VenueLayout {
        layout(self.variant.venue())
    }

    fn prices(&self, record: &FlatRecord, amount_usd: f64, txn0: f64, txn1: f64) -> Result<LegPrices> {
        if self.variant.method() == Method::Swap {
            return Ok(swap_prices(amount_usd, txn0, txn1));
        }

        let (token0_price, token1_price) = match self.usd_split {
            UsdSplit::EvenSplit => (f64::NAN, f64::NAN),
            UsdSplit::CrossLeg => {
                let layout = self.layout();
                (record.amount(layout.token0_price)?, record.amount(layout.token1_price)?)
            }
        };
        Ok(liquidity_prices(self.usd_split, amount_usd, txn0, txn1, token0_price, token1_price))
    }
}

impl VenueNormalizer for Normalizer {
    fn normalize(&self, record: &FlatRecord, event: &EventWindow) -> Result<NormalizedRecord> {
        let layout = self.layout();

        let (txn_amount0, txn_amount1) = self.variant.deltas(record)?;
        let amount_usd = record.amount("amountUSD")?;
        let pool_amount0 = record.amount(layout.reserve0)?;
        let pool_amount1 = record.amount(layout.reserve1)?;
        let prices = self.prices(record, amount_usd, txn_amount0, txn_amount1)?;

        Ok(NormalizedRecord {
            dex: self.variant.venue(),
            method: self.variant.method(),
            event_name: event.event_name.clone(),
            event_time: event.event_time.clone(),
            id: record.text("id")?,
            timestamp: record.timestamp()?,
            pair_id: record.text(layout.pair_id)?,
            token0_id: record.text(layout.token0_id)?,
            token0_name: record.label(layout.token0_name)?,
            token0_symbol: record.label(layout.token0_symbol)?,
            token1_id: record.text(layout.token1_id)?,
            token1_name: record.label(layout.token1_name)?,
            token1_symbol: record.label(layout.token1_symbol)?,
            txn_amount0,
            txn_amount1,
            amount_usd,
            pool_amount0,
            pool_amount1,
            pool_liquidity: pool_liquidity(pool_amount0, pool_amount1, prices),
        })
    }
}

/// Normalize a whole batch, stopping at the first schema error.
pub fn normalize_all<N: VenueNormalizer + ?Sized>(
    normalizer: &N,
    records: &[FlatRecord],
    event: &EventWindow,
) -> Result<Vec<NormalizedRecord>> {
    records.iter().map(|r| normalizer.normalize(r, event)).collect()
}
