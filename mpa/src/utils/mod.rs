//! Utility functions and supporting infrastructure.
//!
//! Provides bit-level reading and the error types shared by the header
//! decoder and the frame locator.

pub mod bitstream_io;
pub mod errors;
