//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive a search run
//! and helpers to load configuration from disk.

mod legacy;
mod load;
mod schema;

pub use load::{default_cache_dir, default_config_path, resolve_config_path};
pub use schema::*;
