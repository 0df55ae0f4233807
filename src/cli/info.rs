use std::time::Duration;

use anyhow::Result;
use indicatif::MultiProgress;
use serde::Serialize;

use super::command::{Cli, InfoArgs, ReportFormat};
use super::{ScanStats, for_each_frame};
use crate::duration::time_str;
use crate::input::InputReader;
use mpa::process::locate::Frame;
use mpa::structs::header::Header;

pub fn cmd_info(args: &InfoArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Analyzing MPEG audio stream: {}", args.input.display());
    let input = InputReader::new(&args.input)?;

    let mut context = AnalysisContext::default();
    let stats = for_each_frame(input, cli, multi, |frame, _| {
        context.process_frame(frame);
        Ok(())
    })?;

    let Some(report) = context.into_report(&stats) else {
        println!("No frame header found in the input.");
        println!("This doesn't appear to be a valid MPEG audio stream.");
        return Ok(());
    };

    match args.format {
        ReportFormat::Plain => display_report(&report),
        ReportFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&report)?),
    }

    Ok(())
}

#[derive(Default)]
struct AnalysisContext {
    first: Option<Frame>,
    frame_count: usize,
    frame_bytes: u64,
    duration: Duration,
    bit_rate_changes: bool,
}

impl AnalysisContext {
    fn process_frame(&mut self, frame: &Frame) {
        match &self.first {
            None => self.first = Some(*frame),
            Some(first) => {
                if first.header.bit_rate != frame.header.bit_rate {
                    self.bit_rate_changes = true;
                }
            }
        }

        self.frame_count += 1;
        self.frame_bytes += frame.length() as u64;
        self.duration += frame.header.duration();
    }

    fn into_report(self, stats: &ScanStats) -> Option<StreamReport> {
        let first = self.first?;

        Some(StreamReport {
            stream: StreamInfo::from_header(&first.header),
            summary: Summary {
                first_frame_offset: first.offset,
                frames: self.frame_count,
                frame_bytes: self.frame_bytes,
                skipped_bytes: stats.bytes_skipped,
                input_bytes: stats.input_len,
                duration: time_str(self.duration),
                duration_secs: self.duration.as_secs_f64(),
                constant_bit_rate: !self.bit_rate_changes,
                truncated_tail: stats.truncated,
            },
        })
    }
}

#[derive(Serialize)]
struct StreamReport {
    stream: StreamInfo,
    summary: Summary,
}

#[derive(Serialize)]
struct StreamInfo {
    version: String,
    layer: String,
    sample_rate: u32,
    bit_rate: u32,
    channel_mode: String,
    channels: u8,
    samples_per_frame: u32,
    crc_protected: bool,
    copyright: bool,
    original: bool,
    emphasis: u8,
}

impl StreamInfo {
    fn from_header(header: &Header) -> Self {
        Self {
            version: header.version.to_string(),
            layer: header.layer.to_string(),
            sample_rate: header.sample_rate,
            bit_rate: header.bit_rate,
            channel_mode: header.channel_mode.to_string(),
            channels: header.channels(),
            samples_per_frame: header.sample_count,
            crc_protected: header.crc_protected,
            copyright: header.copyright,
            original: header.original,
            emphasis: header.emphasis,
        }
    }
}

#[derive(Serialize)]
struct Summary {
    first_frame_offset: u64,
    frames: usize,
    frame_bytes: u64,
    skipped_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_bytes: Option<u64>,
    duration: String,
    duration_secs: f64,
    constant_bit_rate: bool,
    truncated_tail: bool,
}

fn emphasis_str(emphasis: u8) -> &'static str {
    match emphasis {
        0 => "None",
        1 => "50/15 ms",
        2 => "Reserved",
        _ => "CCITT J.17",
    }
}

fn display_report(report: &StreamReport) {
    let info = &report.stream;
    let summary = &report.summary;

    println!();
    println!("MPEG Audio Stream Information");
    println!("=============================");
    println!();

    println!("Stream Information");
    println!("  Format                    {} {}", info.version, info.layer);
    println!("  Sampling rate             {} Hz", info.sample_rate);
    println!("  Bit rate (first frame)    {} kbps", info.bit_rate / 1000);
    println!("  Channel mode              {}", info.channel_mode);
    println!("  Number of channels        {}", info.channels);
    println!("  Samples per frame         {}", info.samples_per_frame);
    println!("  CRC protected             {}", info.crc_protected);
    println!("  Copyright                 {}", info.copyright);
    println!("  Original                  {}", info.original);
    println!("  Emphasis                  {}", emphasis_str(info.emphasis));
    println!();

    println!("Analysis Summary");
    println!("  First frame offset        {}", summary.first_frame_offset);
    println!("  Frames processed          {}", summary.frames);
    println!("  Frame data                {} bytes", summary.frame_bytes);
    println!("  Skipped                   {} bytes", summary.skipped_bytes);
    if let Some(input_bytes) = summary.input_bytes {
        let size_mb = input_bytes as f64 / 1_000_000.0;
        println!("  Size                      {size_mb:.2} MB ({input_bytes} bytes)");
    }
    println!("  Duration                  {}", summary.duration);
    println!(
        "  Bit rate                  {}",
        if summary.constant_bit_rate {
            "Constant"
        } else {
            "Variable"
        }
    );
    if summary.truncated_tail {
        println!("  Last frame                Truncated");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(window: [u8; 4], offset: u64) -> Frame {
        let header = Header::decode(&window).unwrap();
        Frame {
            header,
            offset,
            payload_offset: offset + 4,
        }
    }

    #[test]
    fn summarizes_frames() {
        let mut context = AnalysisContext::default();
        context.process_frame(&frame([0xFF, 0xFB, 0x90, 0x64], 10));
        context.process_frame(&frame([0xFF, 0xFB, 0x92, 0x64], 427));

        let stats = ScanStats {
            frames: 2,
            bytes_skipped: 10,
            input_len: Some(845),
            truncated: false,
        };
        let report = context.into_report(&stats).unwrap();

        assert_eq!(report.stream.sample_rate, 44100);
        assert_eq!(report.stream.layer, "Layer III");
        assert_eq!(report.summary.first_frame_offset, 10);
        assert_eq!(report.summary.frames, 2);
        assert_eq!(report.summary.frame_bytes, 835);
        assert!(report.summary.constant_bit_rate);
        assert_eq!(report.summary.duration, "00:00:00.052");
    }

    #[test]
    fn detects_bit_rate_change() {
        let mut context = AnalysisContext::default();
        context.process_frame(&frame([0xFF, 0xFB, 0x90, 0x64], 0));
        context.process_frame(&frame([0xFF, 0xFB, 0xA0, 0x64], 417));

        let report = context.into_report(&ScanStats::default()).unwrap();
        assert!(!report.summary.constant_bit_rate);
    }

    #[test]
    fn empty_stream_has_no_report() {
        assert!(
            AnalysisContext::default()
                .into_report(&ScanStats::default())
                .is_none()
        );
    }
}
