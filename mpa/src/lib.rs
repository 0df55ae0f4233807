#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! Frame synchronization and header parsing for MPEG-1/2/2.5 audio
//! elementary streams (Layers I, II and III).
//!
//! ### Bitstream Organization
//!
//! A stream is a sequence of frames. Each frame starts with a 4-byte header
//! beginning with an 11-bit sync pattern, followed by optional CRC, side
//! information and main data. Anything between frames (tags, junk) is
//! skipped during synchronization.
//!
//! ### False Sync
//!
//! Eleven set bits occur often in compressed data. A window is only accepted
//! when every header field is valid and the layer matches the one requested,
//! otherwise the scan moves on by a single byte.
//!
//! ## Quick Start
//!
//! 1. Wrap a reader in a [`process::source::Source`] adapter
//! 2. Locate frames with [`process::locate::Locator`]
//! 3. Read each frame's bytes back for the decoder
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use mpa::process::{locate::Locator, source::Seekable};
//!
//! let data = std::fs::read("stream.mp3")?;
//! let mut locator = Locator::new(Seekable::new(Cursor::new(data)));
//! let mut buffer = Vec::new();
//!
//! while let Ok(frame) = locator.locate_next() {
//!     let read = locator.read_payload(&frame, &mut buffer, 0)?;
//!     println!("{}: {read} bytes", frame.header);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Frame location and input sources.
///
/// 1. **Sources** ([`process::source`]): Sequential and random access input.
/// 2. **Location** ([`process::locate`]): Sync search and frame read-back.
pub mod process;

/// Data structures representing format components.
///
/// - **Headers** ([`structs::header`]): Frame header fields and lookup tables
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Bitstream I/O** ([`utils::bitstream_io`]): Bit-level reading
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;
