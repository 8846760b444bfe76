//! Core types and configuration for the DEX event panel.
//!
//! This crate provides shared types used across all other crates:
//! - Raw, flattened and normalized record types
//! - Event windows
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;
pub mod window;

pub use config::{Config, UsdSplit};
pub use error::{Error, Result};
pub use types::*;
pub use window::EventWindow;
