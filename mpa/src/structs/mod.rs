//! Data structures representing format components.
//!
//! Currently only the fixed 4-byte frame header; side information and main
//! data belong to the decoder.

pub mod header;
