//! Configuration types
//!
//! Board-agnostic configuration structures and the `machine.toml` parser.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
