//! Data ingestion for the DEX event panel.
//!
//! This crate handles:
//! - Cursor-based pagination over a page-limited, time-ordered source
//! - Flattening nested sub-records into prefixed fields
//! - The blocking subgraph transport and its query text
//! - Fetch jobs per (event, method, venue)

pub mod paginator;
pub mod flattener;
pub mod queries;
pub mod subgraph;
pub mod job;

pub use paginator::{fetch_window, PageSource, Paginator};
pub use flattener::{flatten, flatten_record};
pub use queries::{nested_fields, query_for};
pub use subgraph::SubgraphClient;
pub use job::{plan_jobs, FetchJob};
