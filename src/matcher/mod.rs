//! Pattern matching for Ethereum addresses.
//!
//! A pattern constrains the start of the address (marker included), the end
//! of the address, or both.

mod pattern;

pub use pattern::{MatchResult, Pattern, MAX_DIGITS};
