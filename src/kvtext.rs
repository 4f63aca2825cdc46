//! Line-oriented `key: value` text format.
//!
//! Used for collection metadata files and for the legacy `settings.txt`.
//! Parsing is lazy and per-line recoverable: a malformed line produces a
//! [`ParseError`] and the stream carries on with the next line.

mod parser;

pub use parser::*;

#[cfg(test)]
mod tests;
