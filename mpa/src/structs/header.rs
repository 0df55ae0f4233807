//! MPEG audio frame header.
//!
//! ## Layout
//!
//! ```text
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//! ```
//!
//! | Field | Bits | Meaning                                  |
//! |-------|------|------------------------------------------|
//! | A     | 11   | Frame sync, all ones                     |
//! | B     | 2    | Version (00 = 2.5, 01 reserved, 10 = 2, 11 = 1) |
//! | C     | 2    | Layer (00 reserved, 01 = III, 10 = II, 11 = I) |
//! | D     | 1    | Protection bit, 0 means a CRC follows    |
//! | E     | 4    | Bitrate index                            |
//! | F     | 2    | Sampling frequency index                 |
//! | G     | 1    | Padding                                  |
//! | H     | 1    | Private                                  |
//! | I     | 2    | Channel mode                             |
//! | J     | 2    | Mode extension                           |
//! | K     | 1    | Copyright                                |
//! | L     | 1    | Original                                 |
//! | M     | 2    | Emphasis                                 |
//!
//! ## Frame Length
//!
//! `samples / 8 * bitrate / sampling_frequency + padding` slots, where a
//! Layer I slot is 4 bytes and a Layer II/III slot is 1 byte. Frames longer
//! than [`MAX_FRAME_LENGTH`] are rejected.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use log::trace;

use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::errors::HeaderError;

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 4;

/// Upper bound on a valid frame length in bytes.
pub const MAX_FRAME_LENGTH: usize = 0x4000;

/// 11-bit frame sync pattern.
pub const FRAME_SYNC: u16 = 0x7FF;

/// Bitrates in kbps, indexed by version group (V1, V2/V2.5), layer and bitrate index.
///
/// Index 0 is free format and index 15 is reserved; neither is a usable entry.
const BIT_RATES: [[[u32; 15]; 3]; 2] = [
    [
        [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448],
        [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384],
        [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320],
    ],
    [
        [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256],
        [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
        [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
    ],
];

/// Sampling frequencies in Hz for V1, V2 and V2.5.
const SAMPLE_RATES: [[u32; 3]; 3] = [
    [44100, 48000, 32000],
    [22050, 24000, 16000],
    [11025, 12000, 8000],
];

/// Samples per frame, indexed by version group and layer.
const SAMPLES_PER_FRAME: [[u32; 3]; 2] = [[384, 1152, 1152], [384, 1152, 576]];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    V1,
    V2,
    V2_5,
}

impl Version {
    pub fn from_bits(bits: u8) -> Result<Self, HeaderError> {
        match bits & 3 {
            0b00 => Ok(Self::V2_5),
            0b10 => Ok(Self::V2),
            0b11 => Ok(Self::V1),
            _ => Err(HeaderError::ReservedVersion),
        }
    }

    /// Row in the bitrate and samples-per-frame tables. V2 and V2.5 share one.
    fn group(self) -> usize {
        match self {
            Self::V1 => 0,
            Self::V2 | Self::V2_5 => 1,
        }
    }

    fn sample_rate_row(self) -> usize {
        match self {
            Self::V1 => 0,
            Self::V2 => 1,
            Self::V2_5 => 2,
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::V1 => "MPEG-1",
            Self::V2 => "MPEG-2",
            Self::V2_5 => "MPEG-2.5",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Layer1,
    Layer2,
    Layer3,
}

impl Layer {
    pub fn from_bits(bits: u8) -> Result<Self, HeaderError> {
        match bits & 3 {
            0b01 => Ok(Self::Layer3),
            0b10 => Ok(Self::Layer2),
            0b11 => Ok(Self::Layer1),
            _ => Err(HeaderError::ReservedLayer),
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Layer1 => 0,
            Self::Layer2 => 1,
            Self::Layer3 => 2,
        }
    }

    /// Width of one slot in bytes.
    pub fn slot_size(self) -> usize {
        match self {
            Self::Layer1 => 4,
            Self::Layer2 | Self::Layer3 => 1,
        }
    }
}

impl Display for Layer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Layer1 => "Layer I",
            Self::Layer2 => "Layer II",
            Self::Layer3 => "Layer III",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

impl From<u8> for ChannelMode {
    fn from(value: u8) -> Self {
        match value & 3 {
            0 => Self::Stereo,
            1 => Self::JointStereo,
            2 => Self::DualChannel,
            _ => Self::Mono,
        }
    }
}

impl Display for ChannelMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Stereo => "Stereo",
            Self::JointStereo => "Joint stereo",
            Self::DualChannel => "Dual channel",
            Self::Mono => "Mono",
        })
    }
}

/// Header fields exactly as they appear in the bitstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawHeader {
    pub sync: u16,
    pub version: u8,
    pub layer: u8,
    pub protection_bit: bool,
    pub bit_rate_index: u8,
    pub sample_rate_index: u8,
    pub padding: bool,
    pub private: bool,
    pub channel_mode: u8,
    pub channel_extension: u8,
    pub copyright: bool,
    pub original: bool,
    pub emphasis: u8,
}

impl RawHeader {
    pub fn read(reader: &mut BsIoSliceReader) -> std::io::Result<Self> {
        Ok(Self {
            sync: reader.get_n(11)?,
            version: reader.get_n(2)?,
            layer: reader.get_n(2)?,
            protection_bit: reader.get()?,
            bit_rate_index: reader.get_n(4)?,
            sample_rate_index: reader.get_n(2)?,
            padding: reader.get()?,
            private: reader.get()?,
            channel_mode: reader.get_n(2)?,
            channel_extension: reader.get_n(2)?,
            copyright: reader.get()?,
            original: reader.get()?,
            emphasis: reader.get_n(2)?,
        })
    }
}

/// A validated frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: Version,
    pub layer: Layer,
    /// Bits per second.
    pub bit_rate: u32,
    /// Hz.
    pub sample_rate: u32,
    pub sample_count: u32,
    pub padding: bool,
    pub private: bool,
    pub crc_protected: bool,
    pub channel_mode: ChannelMode,
    pub channel_extension: u8,
    pub copyright: bool,
    pub original: bool,
    pub emphasis: u8,
    /// Total frame length in bytes, header included.
    pub frame_length: usize,
}

impl Header {
    /// Decodes a 4-byte candidate header.
    ///
    /// Fails with the first rule the window breaks, in bitstream order:
    /// sync, version, layer, bitrate, sampling frequency, then length.
    pub fn decode(window: &[u8; HEADER_LEN]) -> Result<Self, HeaderError> {
        // Sync spans the byte boundary: 0xFF then the top 3 bits of byte 1.
        if window[0] != 0xFF || window[1] & 0xE0 != 0xE0 {
            return Err(HeaderError::BadSync(
                (u16::from_be_bytes([window[0], window[1]]) >> 5) & FRAME_SYNC,
            ));
        }

        let reader = &mut BsIoSliceReader::from_slice(window);
        let raw = RawHeader::read(reader)?;

        Self::from_raw(&raw)
    }

    /// Same as [`Header::decode`] for a slice, which must hold at least 4 bytes.
    pub fn from_slice(buffer: &[u8]) -> Result<Self, HeaderError> {
        let window: &[u8; HEADER_LEN] = buffer
            .get(..HEADER_LEN)
            .and_then(|w| w.try_into().ok())
            .ok_or(HeaderError::WindowTooShort(buffer.len()))?;

        Self::decode(window)
    }

    pub fn from_raw(raw: &RawHeader) -> Result<Self, HeaderError> {
        if raw.sync != FRAME_SYNC {
            return Err(HeaderError::BadSync(raw.sync));
        }

        let version = Version::from_bits(raw.version)?;
        let layer = Layer::from_bits(raw.layer)?;

        if raw.bit_rate_index >= 0xF {
            return Err(HeaderError::ReservedBitRate);
        }
        let bit_rate =
            BIT_RATES[version.group()][layer.index()][raw.bit_rate_index as usize] * 1000;
        if bit_rate == 0 {
            return Err(HeaderError::FreeFormat);
        }

        if raw.sample_rate_index >= 3 {
            return Err(HeaderError::ReservedSampleRate);
        }
        let sample_rate = SAMPLE_RATES[version.sample_rate_row()][raw.sample_rate_index as usize];

        let sample_count = SAMPLES_PER_FRAME[version.group()][layer.index()];

        let frame_length = frame_length(sample_count, bit_rate, sample_rate, raw.padding, layer)?;

        let header = Self {
            version,
            layer,
            bit_rate,
            sample_rate,
            sample_count,
            padding: raw.padding,
            private: raw.private,
            crc_protected: !raw.protection_bit,
            channel_mode: raw.channel_mode.into(),
            channel_extension: raw.channel_extension,
            copyright: raw.copyright,
            original: raw.original,
            emphasis: raw.emphasis,
            frame_length,
        };

        trace!("Frame header: {header}");

        Ok(header)
    }

    pub fn channels(&self) -> u8 {
        match self.channel_mode {
            ChannelMode::Mono => 1,
            _ => 2,
        }
    }

    /// Playback time covered by this frame.
    pub fn duration(&self) -> Duration {
        let nanos = (self.sample_count as u64 * 1_000_000_000)
            .checked_div(self.sample_rate as u64)
            .unwrap_or(0);
        Duration::from_nanos(nanos)
    }

    pub fn payload_length(&self) -> usize {
        self.frame_length.saturating_sub(HEADER_LEN)
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}, {} kbps, {} Hz, {}{}{}, {} bytes",
            self.version,
            self.layer,
            self.bit_rate / 1000,
            self.sample_rate,
            self.channel_mode,
            if self.padding { ", padded" } else { "" },
            if self.crc_protected { ", CRC" } else { "" },
            self.frame_length
        )
    }
}

/// Computes the frame length in bytes, header included.
///
/// Integer division throughout. The result is checked against
/// [`MAX_FRAME_LENGTH`]; a zero `sample_rate` is rejected.
pub fn frame_length(
    sample_count: u32,
    bit_rate: u32,
    sample_rate: u32,
    padding: bool,
    layer: Layer,
) -> Result<usize, HeaderError> {
    if sample_rate == 0 {
        return Err(HeaderError::ZeroSampleRate);
    }

    let slots = (sample_count / 8) as u64 * bit_rate as u64 / sample_rate as u64 + padding as u64;
    let length = (slots * layer.slot_size() as u64) as usize;

    if length > MAX_FRAME_LENGTH {
        return Err(HeaderError::FrameTooLong {
            length,
            max: MAX_FRAME_LENGTH,
        });
    }

    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(
        version: u8,
        layer: u8,
        bit_rate: u8,
        sample_rate: u8,
        padding: bool,
    ) -> [u8; 4] {
        [
            0xFF,
            0xE0 | (version << 3) | (layer << 1) | 1,
            (bit_rate << 4) | (sample_rate << 2) | ((padding as u8) << 1),
            0xC4,
        ]
    }

    #[test]
    fn decode_layer3_128k() -> anyhow::Result<()> {
        let header = Header::decode(&[0xFF, 0xFB, 0x90, 0x64])?;

        assert_eq!(header.version, Version::V1);
        assert_eq!(header.layer, Layer::Layer3);
        assert_eq!(header.bit_rate, 128_000);
        assert_eq!(header.sample_rate, 44100);
        assert_eq!(header.sample_count, 1152);
        assert!(!header.crc_protected);
        assert!(!header.padding);
        assert_eq!(header.channel_mode, ChannelMode::JointStereo);
        assert_eq!(header.channel_extension, 2);
        assert!(!header.copyright);
        assert!(header.original);
        assert_eq!(header.emphasis, 0);
        assert_eq!(header.frame_length, 417);
        assert_eq!(header.channels(), 2);

        let padded = Header::decode(&[0xFF, 0xFB, 0x92, 0x64])?;
        assert_eq!(padded.frame_length, 418);

        Ok(())
    }

    #[test]
    fn decode_all_fields_of_last_byte() -> anyhow::Result<()> {
        let header = Header::decode(&[0xFF, 0xFA, 0x15, 0xFF])?;

        assert!(header.crc_protected);
        assert!(header.private);
        assert_eq!(header.channel_mode, ChannelMode::Mono);
        assert_eq!(header.channel_extension, 3);
        assert!(header.copyright);
        assert!(header.original);
        assert_eq!(header.emphasis, 3);
        assert_eq!(header.channels(), 1);

        Ok(())
    }

    #[test]
    fn layer1_uses_four_byte_slots() -> anyhow::Result<()> {
        // V1 Layer I, 32 kbps, 44.1 kHz: 48 * 32000 / 44100 = 34 slots
        let header = Header::decode(&header_bytes(0b11, 0b11, 1, 0, false))?;
        assert_eq!(header.layer, Layer::Layer1);
        assert_eq!(header.sample_count, 384);
        assert_eq!(header.frame_length, 136);

        let padded = Header::decode(&header_bytes(0b11, 0b11, 1, 0, true))?;
        assert_eq!(padded.frame_length, 140);

        Ok(())
    }

    #[test]
    fn mpeg2_and_25_tables() -> anyhow::Result<()> {
        let v2 = Header::decode(&header_bytes(0b10, 0b01, 8, 1, false))?;
        assert_eq!(v2.version, Version::V2);
        assert_eq!(v2.bit_rate, 64_000);
        assert_eq!(v2.sample_rate, 24000);
        assert_eq!(v2.sample_count, 576);
        assert_eq!(v2.frame_length, 72 * 64_000 / 24000);

        let v25 = Header::decode(&header_bytes(0b00, 0b01, 1, 2, true))?;
        assert_eq!(v25.version, Version::V2_5);
        assert_eq!(v25.bit_rate, 8_000);
        assert_eq!(v25.sample_rate, 8000);
        assert_eq!(v25.frame_length, 73);

        let v2_layer2 = Header::decode(&header_bytes(0b10, 0b10, 14, 0, false))?;
        assert_eq!(v2_layer2.bit_rate, 160_000);
        assert_eq!(v2_layer2.sample_count, 1152);

        Ok(())
    }

    #[test]
    fn rejects_missing_sync() {
        for window in [
            [0x00, 0x00, 0x00, 0x00],
            [0xFE, 0xFB, 0x90, 0x64],
            [0xFF, 0xDB, 0x90, 0x64],
            [0xFF, 0x1F, 0x90, 0x64],
            [0x7F, 0xFF, 0xFF, 0xFF],
        ] {
            assert!(
                matches!(Header::decode(&window), Err(HeaderError::BadSync(_))),
                "{window:02X?}"
            );
        }
    }

    #[test]
    fn no_sync_never_decodes() {
        for b0 in 0..=0xFFu8 {
            for b1 in 0..=0xFFu8 {
                let synced = b0 == 0xFF && b1 & 0xE0 == 0xE0;
                if !synced {
                    assert!(Header::decode(&[b0, b1, 0x90, 0x64]).is_err());
                }
            }
        }
    }

    #[test]
    fn rejects_reserved_values() {
        assert!(matches!(
            Header::decode(&header_bytes(0b01, 0b01, 9, 0, false)),
            Err(HeaderError::ReservedVersion)
        ));
        assert!(matches!(
            Header::decode(&header_bytes(0b11, 0b00, 9, 0, false)),
            Err(HeaderError::ReservedLayer)
        ));
        assert!(matches!(
            Header::decode(&header_bytes(0b11, 0b01, 0xF, 0, false)),
            Err(HeaderError::ReservedBitRate)
        ));
        assert!(matches!(
            Header::decode(&header_bytes(0b11, 0b01, 0, 0, false)),
            Err(HeaderError::FreeFormat)
        ));
        assert!(matches!(
            Header::decode(&header_bytes(0b11, 0b01, 9, 3, false)),
            Err(HeaderError::ReservedSampleRate)
        ));
    }

    #[test]
    fn every_valid_combination_decodes() -> anyhow::Result<()> {
        for version in [0b00, 0b10, 0b11] {
            for layer in [0b01, 0b10, 0b11] {
                for bit_rate in 1..15 {
                    for sample_rate in 0..3 {
                        for padding in [false, true] {
                            let header = Header::decode(&header_bytes(
                                version,
                                layer,
                                bit_rate,
                                sample_rate,
                                padding,
                            ))?;

                            let slot = header.layer.slot_size();
                            let slots = header.frame_length / slot;
                            assert_eq!(header.frame_length % slot, 0);

                            let unpadded = slots - padding as usize;
                            let exact = (header.sample_count / 8) as u64 * header.bit_rate as u64;
                            let lower = unpadded as u64 * header.sample_rate as u64;
                            assert!(lower <= exact);
                            assert!(exact < lower + header.sample_rate as u64);
                            assert!(header.frame_length <= MAX_FRAME_LENGTH);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    #[test]
    fn frame_length_boundary() {
        // 144 * 1_024_000 / 9000 = 16384
        assert_eq!(
            frame_length(1152, 1_024_000, 9000, false, Layer::Layer3).ok(),
            Some(MAX_FRAME_LENGTH)
        );
        assert!(matches!(
            frame_length(1152, 1_024_000, 9000, true, Layer::Layer3),
            Err(HeaderError::FrameTooLong { length: 16385, .. })
        ));
        assert!(matches!(
            frame_length(384, 1_100_000, 12000, false, Layer::Layer1),
            Err(HeaderError::FrameTooLong { .. })
        ));
    }

    #[test]
    fn frame_length_rejects_zero_sample_rate() {
        assert!(matches!(
            frame_length(1152, 128_000, 0, false, Layer::Layer3),
            Err(HeaderError::ZeroSampleRate)
        ));
        assert_eq!(frame_length(1152, 0, 44100, true, Layer::Layer3).ok(), Some(1));
    }

    #[test]
    fn short_slice_is_invalid_argument() {
        assert!(matches!(
            Header::from_slice(&[0xFF, 0xFB, 0x90]),
            Err(HeaderError::WindowTooShort(3))
        ));
        assert!(Header::from_slice(&[0xFF, 0xFB, 0x90, 0x64, 0x00]).is_ok());
    }

    #[test]
    fn raw_fields() -> std::io::Result<()> {
        let raw = RawHeader::read(&mut BsIoSliceReader::from_slice(&[0xFF, 0xF3, 0x5B, 0x9D]))?;

        assert_eq!(
            raw,
            RawHeader {
                sync: 0x7FF,
                version: 0b10,
                layer: 0b01,
                protection_bit: true,
                bit_rate_index: 5,
                sample_rate_index: 2,
                padding: true,
                private: true,
                channel_mode: 2,
                channel_extension: 1,
                copyright: true,
                original: true,
                emphasis: 1,
            }
        );

        Ok(())
    }

    #[test]
    fn display_header() -> anyhow::Result<()> {
        let header = Header::decode(&[0xFF, 0xFB, 0x92, 0x64])?;
        assert_eq!(
            format!("{header}"),
            "MPEG-1 Layer III, 128 kbps, 44100 Hz, Joint stereo, padded, 418 bytes"
        );
        assert_eq!(header.duration(), Duration::from_nanos(26_122_448));

        let unset = Header {
            sample_rate: 0,
            ..header
        };
        assert_eq!(unset.duration(), Duration::ZERO);
        Ok(())
    }
}
