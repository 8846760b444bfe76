//! Flattened field names per venue.
//!
//! v2 nests tokens under the pair (`pair_token0_id`), v3 selects them at the
//! top level (`token0_id`) next to the pool (`pool_id`).

use panel_core::Venue;

/// Where a venue keeps the fields the unified schema needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VenueLayout {
    /// Pool / pair identifier, renamed to `pair_id`.
    pub pair_id: &'static str,
    pub token0_id: &'static str,
    pub token0_name: &'static str,
    pub token0_symbol: &'static str,
    pub token1_id: &'static str,
    pub token1_name: &'static str,
    pub token1_symbol: &'static str,
    /// Token0 reserve, renamed to `pool_amount0`.
    pub reserve0: &'static str,
    /// Token1 reserve, renamed to `pool_amount1`.
    pub reserve1: &'static str,
    /// Pool-quoted price of token0, in token1.
    pub token0_price: &'static str,
    /// Pool-quoted price of token1, in token0.
    pub token1_price: &'static str,
}

pub const V2_LAYOUT: VenueLayout = VenueLayout {
    pair_id: "pair_id",
    token0_id: "pair_token0_id",
    token0_name: "pair_token0_name",
    token0_symbol: "pair_token0_symbol",
    token1_id: "pair_token1_id",
    token1_name: "pair_token1_name",
    token1_symbol: "pair_token1_symbol",
    reserve0: "pair_reserve0",
    reserve1: "pair_reserve1",
    token0_price: "pair_token0Price",
    token1_price: "pair_token1Price",
};

pub const V3_LAYOUT: VenueLayout = VenueLayout {
    pair_id: "pool_id",
    token0_id: "token0_id",
    token0_name: "token0_name",
    token0_symbol: "token0_symbol",
    token1_id: "token1_id",
    token1_name: "token1_name",
    token1_symbol: "token1_symbol",
    reserve0: "pool_totalValueLockedToken0",
    reserve1: "pool_totalValueLockedToken1",
    token0_price: "pool_token0Price",
    token1_price: "pool_token1Price",
};

/// Layout for a venue.
pub fn layout(venue: Venue) -> &'static VenueLayout {
    match venue {
        Venue::V2 => &V2_LAYOUT,
        Venue::V3 => &V3_LAYOUT,
    }
}
