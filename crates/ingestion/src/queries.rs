//! GraphQL query text, one query per (method, venue).
//!
//! Every query takes `$start_timestamp_gt` (the cursor) and `$first` (page
//! size) and orders ascending by timestamp. The nested selections here
//! determine the flattening order in [`nested_fields`].

use panel_core::{Method, Venue};

const SWAPS_V2: &str = r#"
query ($start_timestamp_gt: BigInt!, $first: Int!) {
  swaps(
    first: $first
    orderBy: timestamp
    orderDirection: asc
    where: { timestamp_gt: $start_timestamp_gt }
  ) {
    id
    timestamp
    pair {
      id
      reserve0
      reserve1
      reserveUSD
      token0Price
      token1Price
      token0 { id name symbol decimals }
      token1 { id name symbol decimals }
    }
    transaction { id blockNumber }
    sender
    to
    amount0In
    amount0Out
    amount1In
    amount1Out
    amountUSD
    logIndex
  }
}
"#;

const MINTS_V2: &str = r#"
query ($start_timestamp_gt: BigInt!, $first: Int!) {
  mints(
    first: $first
    orderBy: timestamp
    orderDirection: asc
    where: { timestamp_gt: $start_timestamp_gt }
  ) {
    id
    timestamp
    pair {
      id
      reserve0
      reserve1
      reserveUSD
      token0Price
      token1Price
      token0 { id name symbol decimals }
      token1 { id name symbol decimals }
    }
    transaction { id blockNumber }
    sender
    to
    liquidity
    amount0
    amount1
    amountUSD
    logIndex
  }
}
"#;

const BURNS_V2: &str = r#"
query ($start_timestamp_gt: BigInt!, $first: Int!) {
  burns(
    first: $first
    orderBy: timestamp
    orderDirection: asc
    where: { timestamp_gt: $start_timestamp_gt }
  ) {
    id
    timestamp
    pair {
      id
      reserve0
      reserve1
      reserveUSD
      token0Price
      token1Price
      token0 { id name symbol decimals }
      token1 { id name symbol decimals }
    }
    transaction { id blockNumber }
    sender
    to
    liquidity
    amount0
    amount1
    amountUSD
    logIndex
  }
}
"#;

const SWAPS_V3: &str = r#"
query ($start_timestamp_gt: BigInt!, $first: Int!) {
  swaps(
    first: $first
    orderBy: timestamp
    orderDirection: asc
    where: { timestamp_gt: $start_timestamp_gt }
  ) {
    id
    timestamp
    pool {
      id
      feeTier
      liquidity
      totalValueLockedToken0
      totalValueLockedToken1
      totalValueLockedUSD
      token0Price
      token1Price
    }
    token0 { id name symbol decimals }
    token1 { id name symbol decimals }
    transaction { id blockNumber }
    sender
    recipient
    origin
    amount0
    amount1
    amountUSD
    sqrtPriceX96
    tick
    logIndex
  }
}
"#;

const MINTS_V3: &str = r#"
query ($start_timestamp_gt: BigInt!, $first: Int!) {
  mints(
    first: $first
    orderBy: timestamp
    orderDirection: asc
    where: { timestamp_gt: $start_timestamp_gt }
  ) {
    id
    timestamp
    pool {
      id
      feeTier
      liquidity
      totalValueLockedToken0
      totalValueLockedToken1
      totalValueLockedUSD
      token0Price
      token1Price
    }
    token0 { id name symbol decimals }
    token1 { id name symbol decimals }
    transaction { id blockNumber }
    owner
    sender
    origin
    amount
    amount0
    amount1
    amountUSD
    tickLower
    tickUpper
    logIndex
  }
}
"#;

const BURNS_V3: &str = r#"
query ($start_timestamp_gt: BigInt!, $first: Int!) {
  burns(
    first: $first
    orderBy: timestamp
    orderDirection: asc
    where: { timestamp_gt: $start_timestamp_gt }
  ) {
    id
    timestamp
    pool {
      id
      feeTier
      liquidity
      totalValueLockedToken0
      totalValueLockedToken1
      totalValueLockedUSD
      token0Price
      token1Price
    }
    token0 { id name symbol decimals }
    token1 { id name symbol decimals }
    transaction { id blockNumber }
    owner
    origin
    amount
    amount0
    amount1
    amountUSD
    tickLower
    tickUpper
    logIndex
  }
}
"#;

/// Query text for a (method, venue) pair.
pub fn query_for(method: Method, venue: Venue) -> &'static str {
    match (method, venue) {
        (Method::Swap, Venue::V2) => SWAPS_V2,
        (Method::Mint, Venue::V2) => MINTS_V2,
        (Method::Burn, Venue::V2) => BURNS_V2,
        (Method::Swap, Venue::V3) => SWAPS_V3,
        (Method::Mint, Venue::V3) => MINTS_V3,
        (Method::Burn, Venue::V3) => BURNS_V3,
    }
}

/// Nested objects selected by the venue's queries, in flattening order.
pub fn nested_fields(venue: Venue) -> &'static [&'static str] {
    match venue {
        Venue::V2 => &["pair", "pair_token0", "pair_token1", "transaction"],
        Venue::V3 => &["pool", "token0", "token1", "transaction"],
    }
}
