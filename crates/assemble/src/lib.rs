//! Panel assembly and persistence for the DEX event panel.
//!
//! This crate handles:
//! - Batch CSV files, one per (event, method, venue)
//! - Normalizing and concatenating batches into the panel
//! - Writing the panel as CSV and, optionally, to DuckDB

pub mod store;
pub mod assembler;
pub mod writer;
pub mod duck;

pub use store::{read_flat_csv, write_flat_csv, BatchSource, CsvBatchStore, MemoryBatches};
pub use assembler::{Panel, PanelAssembler, QualitySummary};
pub use writer::write_panel_csv;
pub use duck::export_duckdb;
