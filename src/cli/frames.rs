use anyhow::Result;
use indicatif::MultiProgress;

use super::command::{Cli, FramesArgs};
use super::for_each_frame;
use crate::input::InputReader;
use mpa::process::locate::Frame;

pub fn cmd_frames(args: &FramesArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Listing frames of {}", args.input.display());
    let input = InputReader::new(&args.input)?;

    println!("{:>8}  {:>12}  {:>6}  {:>8}  {:>6}  PAD", "FRAME", "OFFSET", "LENGTH", "KBPS", "HZ");

    let mut index = 0usize;
    let stats = for_each_frame(input, cli, multi, |frame, _| {
        println!("{}", frame_line(index, frame));
        index += 1;
        Ok(())
    })?;

    log::info!(
        "{} frames, {} bytes skipped",
        stats.frames,
        stats.bytes_skipped
    );

    Ok(())
}

fn frame_line(index: usize, frame: &Frame) -> String {
    let header = &frame.header;
    format!(
        "{index:>8}  {:>12}  {:>6}  {:>8}  {:>6}  {}",
        frame.offset,
        frame.length(),
        header.bit_rate / 1000,
        header.sample_rate,
        if header.padding { "yes" } else { "no" }
    )
}

#[test]
fn format_frame_line() -> anyhow::Result<()> {
    use mpa::structs::header::Header;

    let frame = Frame {
        header: Header::decode(&[0xFF, 0xFB, 0x92, 0x64])?,
        offset: 1234,
        payload_offset: 1238,
    };

    assert_eq!(
        frame_line(7, &frame),
        "       7          1234     418       128   44100  yes"
    );

    Ok(())
}
