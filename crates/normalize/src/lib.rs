//! Venue normalization for the DEX event panel.
//!
//! Maps flattened v2/v3 swap, mint and burn records onto one row schema with
//! investor-perspective signs, implied token prices and pool liquidity in USD.

pub mod layout;
pub mod pricing;
pub mod normalizer;

pub use layout::{layout, VenueLayout};
pub use pricing::{liquidity_prices, pool_liquidity, swap_prices, LegPrices};
pub use normalizer::{normalize_all, Normalizer, Variant, VenueNormalizer};
