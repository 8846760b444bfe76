//! Implied dollar prices and pool liquidity.
//!
//! None of these guard against zero legs: a zero `txn_amount` yields an
//! infinite or NaN price, which is carried into the panel as data.

use panel_core::UsdSplit;

/// Implied dollar price of each token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegPrices {
    pub token0: f64,
    pub token1: f64,
}

/// Swap: both legs are worth `amountUSD`, each priced independently.
#[inline]
pub fn swap_prices(amount_usd: f64, txn_amount0: f64, txn_amount1: f64) -> LegPrices {
    LegPrices {
        token0: amount_usd / txn_amount0.abs(),
        token1: amount_usd / txn_amount1.abs(),
    }
}

/// Mint/burn: `amountUSD` is the sum of both legs, split per `strategy`.
///
/// `token0_price` and `token1_price` are the pool-quoted prices; only
/// [`UsdSplit::CrossLeg`] reads them.
#[inline]
pub fn liquidity_prices(
    strategy: UsdSplit,
    amount_usd: f64,
    txn_amount0: f64,
    txn_amount1: f64,
    token0_price: f64,
    token1_price: f64,
) -> LegPrices {
    let leg0 = txn_amount0.abs();
    let leg1 = txn_amount1.abs();

    match strategy {
        UsdSplit::EvenSplit => LegPrices {
            token0: amount_usd / leg0 / 2.0,
            token1: amount_usd / leg1 / 2.0,
        },
        UsdSplit::CrossLeg => LegPrices {
            token0: amount_usd / (leg0 + leg1 / token1_price),
            token1: amount_usd / (leg1 + leg0 / token0_price),
        },
    }
}

/// Reserves valued at the implied prices.
#[inline]
pub fn pool_liquidity(reserve0: f64, reserve1: f64, prices: LegPrices) -> f64 {
    reserve0 * prices.token0 + reserve1 * prices.token1
}
