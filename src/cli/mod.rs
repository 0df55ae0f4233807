pub mod command;
pub mod extract;
pub mod frames;
pub mod info;

use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use mpa::process::locate::Frame;
use mpa::utils::errors::LocateError;

use command::Cli;
use crate::input::InputReader;

/// Totals gathered while walking a stream.
#[derive(Debug, Default)]
pub struct ScanStats {
    pub frames: usize,
    pub bytes_skipped: u64,
    pub input_len: Option<u64>,
    pub truncated: bool,
}

/// Locates every frame in `input_reader` and hands it to `visit` together with its bytes.
///
/// Seekable inputs read each frame back with a position-preserving read;
/// pipes read frames sequentially as they are found.
pub fn for_each_frame<F>(
    input_reader: InputReader,
    cli: &Cli,
    multi: Option<&MultiProgress>,
    mut visit: F,
) -> Result<ScanStats>
where
    F: FnMut(&Frame, &[u8]) -> Result<()>,
{
    let is_pipe = input_reader.is_pipe();
    let mut stats = ScanStats {
        input_len: input_reader.size(),
        ..Default::default()
    };
    let mut locator = input_reader.into_locator(cli);

    let pb = match multi {
        Some(multi) => {
            let pb = multi.add(ProgressBar::new_spinner());
            pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb.set_message("Scanning frames...");
            Some(pb)
        }
        None => None,
    };

    let mut buffer = Vec::new();

    loop {
        let result = if is_pipe {
            locator.next_frame_into(&mut buffer)
        } else {
            locator
                .locate_next()
                .and_then(|frame| locator.read_payload(&frame, &mut buffer, 0).map(|_| frame))
        };

        let frame = match result {
            Ok(frame) => frame,
            Err(LocateError::EndOfInput) => break,
            Err(e @ LocateError::TruncatedPayload { .. }) => {
                if cli.strict {
                    return Err(e.into());
                }
                log::warn!("Dropping last frame: {e}");
                stats.truncated = true;
                break;
            }
            Err(e) => return Err(e.into()),
        };

        visit(&frame, &buffer[..frame.length()])?;
        stats.frames += 1;

        if stats.frames.is_multiple_of(100) {
            if let Some(ref pb) = pb {
                pb.set_message(format!("Scanning frames...        {}", stats.frames));
                pb.tick();
            }
        }
    }

    if let Some(ref pb) = pb {
        pb.finish_and_clear();
    }

    stats.bytes_skipped = locator.bytes_skipped();
    if stats.bytes_skipped > 0 {
        log::info!("Skipped {} bytes outside of frames", stats.bytes_skipped);
    }

    Ok(stats)
}
