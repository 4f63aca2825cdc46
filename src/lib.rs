//! Game library aggregation: collections described by metadata text files,
//! enriched with data from an online catalog.

pub mod config;
pub mod error;
pub mod kvtext;
pub mod model;
pub mod providers;
pub mod search;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
