use crate::structs::header::Layer;

#[derive(thiserror::Error, Debug)]
pub enum HeaderError {
    #[error("Header window must be 4 bytes. Got {0}")]
    WindowTooShort(usize),

    #[error("Invalid frame sync, Read {0:#05X}")]
    BadSync(u16),

    #[error("Reserved MPEG version")]
    ReservedVersion,

    #[error("Reserved layer")]
    ReservedLayer,

    #[error("Reserved bitrate index 0xF")]
    ReservedBitRate,

    #[error("Free format bitrate is not supported")]
    FreeFormat,

    #[error("Reserved sampling frequency index 0x3")]
    ReservedSampleRate,

    #[error("Sampling frequency must be non-zero")]
    ZeroSampleRate,

    #[error("Expected {expected}, found {found}")]
    LayerMismatch { expected: Layer, found: Layer },

    #[error("Frame length exceeds {max} bytes. Calculated {length}")]
    FrameTooLong { length: usize, max: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum LocateError {
    #[error("End of input reached before a frame header was found")]
    EndOfInput,

    #[error("Truncated frame payload: expected {expected} bytes, read {read}")]
    TruncatedPayload { expected: usize, read: usize },

    #[error("Source does not support random access positioning")]
    NotSeekable,

    #[error("Buffer offset {offset} cannot hold a {length} byte frame")]
    OffsetOutOfRange { offset: usize, length: usize },

    #[error("No frame header found within {0} bytes")]
    ResyncLimitExceeded(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LocateError {
    /// `true` for the terminal end-of-input condition.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, LocateError::EndOfInput)
    }
}
