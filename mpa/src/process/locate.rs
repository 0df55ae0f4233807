use log::{debug, trace, warn};

use crate::process::source::Source;
use crate::structs::header::{HEADER_LEN, Header, Layer};
use crate::utils::errors::{HeaderError, LocateError};

/// Locates frames in a byte source.
///
/// Each call to [`Locator::locate_next`] reads a 4-byte window at the current
/// source position and slides it one byte at a time until the window decodes
/// to a [`Header`] of the required layer. Rejected windows never surface as
/// errors; scanning ends with a [`Frame`] or [`LocateError::EndOfInput`].
///
/// # Example
///
/// ```rust,no_run
/// use std::fs::File;
/// use std::io::BufReader;
/// use mpa::process::locate::Locator;
/// use mpa::process::source::Seekable;
///
/// let file = BufReader::new(File::open("stream.mp3")?);
/// let mut locator = Locator::new(Seekable::new(file));
/// let mut data = Vec::new();
///
/// while let Ok(frame) = locator.locate_next() {
///     locator.read_payload(&frame, &mut data, 0)?;
///     println!("{} @ {}", frame.header, frame.offset);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Locator<S: Source> {
    source: S,
    layer: Option<Layer>,
    advance: bool,
    resync_limit: Option<u64>,
    frames_located: usize,
    bytes_skipped: u64,
    fused: bool,
}

/// Sliding window state for a single scan.
#[derive(Debug)]
struct ScanCursor {
    window: [u8; HEADER_LEN],
    offset: u64,
    skipped: u64,
}

impl ScanCursor {
    fn slide(&mut self, byte: u8) {
        self.window.rotate_left(1);
        self.window[HEADER_LEN - 1] = byte;
        self.offset += 1;
        self.skipped += 1;
    }
}

impl<S: Source> Locator<S> {
    /// Creates a locator that accepts Layer III frames and, on seekable
    /// sources, moves past each frame it returns.
    pub fn new(source: S) -> Self {
        Self {
            source,
            layer: Some(Layer::Layer3),
            advance: true,
            resync_limit: None,
            frames_located: 0,
            bytes_skipped: 0,
            fused: false,
        }
    }

    /// Restricts accepted frames to `layer`. `None` accepts every layer.
    pub fn set_layer(&mut self, layer: Option<Layer>) {
        self.layer = layer;
    }

    /// Whether [`Locator::locate_next`] repositions a seekable source to the
    /// end of the returned frame.
    ///
    /// Ignored for sources that cannot seek; the caller then consumes the
    /// frame bytes itself.
    pub fn set_advance(&mut self, advance: bool) {
        self.advance = advance;
    }

    /// Gives up scanning after `limit` one-byte slides in a single call.
    pub fn set_resync_limit(&mut self, limit: Option<u64>) {
        self.resync_limit = limit;
    }

    pub fn layer(&self) -> Option<Layer> {
        self.layer
    }

    pub fn frames_located(&self) -> usize {
        self.frames_located
    }

    /// Bytes skipped while searching for sync, over the locator's lifetime.
    pub fn bytes_skipped(&self) -> u64 {
        self.bytes_skipped
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Finds the next frame at or after the current source position.
    pub fn locate_next(&mut self) -> Result<Frame, LocateError> {
        let (header, cursor) = self.scan()?;
        let frame = self.lock(header, &cursor);

        if self.advance && self.source.can_seek() {
            self.source.set_position(frame.end())?;
        }

        Ok(frame)
    }

    /// Finds the next frame and reads it sequentially into `buffer`.
    ///
    /// The header bytes come from the scan window and the remaining
    /// `length - 4` bytes straight from the source, so this works on sources
    /// that cannot seek. `buffer` is grown to the frame length if needed and
    /// never shrunk, so only `buffer[..frame.length()]` holds the frame.
    pub fn next_frame_into(&mut self, buffer: &mut Vec<u8>) -> Result<Frame, LocateError> {
        let (header, cursor) = self.scan()?;
        let frame = self.lock(header, &cursor);

        let expected = frame.length();
        if buffer.len() < expected {
            buffer.resize(expected, 0);
        }
        buffer[..HEADER_LEN].copy_from_slice(&cursor.window);

        let read = HEADER_LEN + self.source.read_full(&mut buffer[HEADER_LEN..expected])?;
        if read < expected {
            warn!("Frame at offset {} is truncated: {read} of {expected} bytes", frame.offset);
            return Err(LocateError::TruncatedPayload { expected, read });
        }

        Ok(frame)
    }

    /// Reads the bytes of `frame` into `buffer` starting at `offset`.
    ///
    /// The source position is saved and restored, so this can be called at
    /// any time and any number of times. `buffer` is grown to at least
    /// `offset + frame.length()`; bytes before `offset` are kept. An `offset`
    /// that overflows that end fails with [`LocateError::OffsetOutOfRange`].
    pub fn read_payload(
        &mut self,
        frame: &Frame,
        buffer: &mut Vec<u8>,
        offset: usize,
    ) -> Result<usize, LocateError> {
        if !self.source.can_seek() {
            return Err(LocateError::NotSeekable);
        }

        let expected = frame.length();
        let end = offset
            .checked_add(expected)
            .ok_or(LocateError::OffsetOutOfRange {
                offset,
                length: expected,
            })?;
        if buffer.len() < end {
            buffer.resize(end, 0);
        }

        let current = self.source.position()?;
        self.source.set_position(frame.offset)?;
        let read = self.source.read_full(&mut buffer[offset..end]);
        self.source.set_position(current)?;
        let read = read?;

        if read < expected {
            warn!("Frame at offset {} is truncated: {read} of {expected} bytes", frame.offset);
            return Err(LocateError::TruncatedPayload { expected, read });
        }

        Ok(read)
    }

    fn scan(&mut self) -> Result<(Header, ScanCursor), LocateError> {
        let offset = self.source.position()?;
        let mut window = [0u8; HEADER_LEN];
        if self.source.read_full(&mut window)? < HEADER_LEN {
            return Err(LocateError::EndOfInput);
        }

        let mut cursor = ScanCursor {
            window,
            offset,
            skipped: 0,
        };
        let mut next = [0u8; 1];

        loop {
            match self.accept(&cursor.window) {
                Ok(header) => return Ok((header, cursor)),
                Err(reason) => trace!("No frame at offset {}: {reason}", cursor.offset),
            }

            if let Some(limit) = self.resync_limit {
                if cursor.skipped >= limit {
                    return Err(LocateError::ResyncLimitExceeded(limit));
                }
            }

            if self.source.read_full(&mut next)? == 0 {
                return Err(LocateError::EndOfInput);
            }

            cursor.slide(next[0]);
            self.bytes_skipped += 1;
        }
    }

    fn accept(&self, window: &[u8; HEADER_LEN]) -> Result<Header, HeaderError> {
        let header = Header::decode(window)?;

        match self.layer {
            Some(expected) if expected != header.layer => Err(HeaderError::LayerMismatch {
                expected,
                found: header.layer,
            }),
            _ => Ok(header),
        }
    }

    fn lock(&mut self, header: Header, cursor: &ScanCursor) -> Frame {
        self.frames_located += 1;

        if cursor.skipped > 0 {
            debug!(
                "Frame sync at offset {} after skipping {} bytes",
                cursor.offset, cursor.skipped
            );
        }

        Frame {
            header,
            offset: cursor.offset,
            payload_offset: cursor.offset + HEADER_LEN as u64,
        }
    }
}

impl<S: Source> Iterator for Locator<S> {
    type Item = Result<Frame, LocateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }

        match self.locate_next() {
            Ok(frame) => Some(Ok(frame)),
            Err(LocateError::EndOfInput) => {
                self.fused = true;
                None
            }
            Err(e) => {
                self.fused = true;
                Some(Err(e))
            }
        }
    }
}

/// A located frame.
///
/// Plain value; the bytes stay in the source and are fetched with
/// [`Locator::read_payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub header: Header,
    /// Offset of the first header byte.
    pub offset: u64,
    /// Offset of the first byte after the header.
    pub payload_offset: u64,
}

impl Frame {
    /// Total length in bytes, header included.
    pub fn length(&self) -> usize {
        self.header.frame_length
    }

    /// Offset one past the last byte of the frame.
    pub fn end(&self) -> u64 {
        self.payload_offset + self.length() as u64 - HEADER_LEN as u64
    }
}
