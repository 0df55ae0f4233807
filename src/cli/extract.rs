use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::MultiProgress;

use super::command::{Cli, ExtractArgs};
use super::for_each_frame;
use crate::input::InputReader;

fn create_path_with_extension(base_path: &Path, expected_ext: &str) -> PathBuf {
    match base_path.extension() {
        Some(existing_ext) if existing_ext == expected_ext => base_path.to_path_buf(),
        Some(_) => {
            let mut name = base_path.as_os_str().to_os_string();
            name.push(".");
            name.push(expected_ext);
            PathBuf::from(name)
        }
        None => base_path.with_extension(expected_ext),
    }
}

pub fn cmd_extract(args: &ExtractArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let output_path = create_path_with_extension(&args.output_path, cli.layer.extension());

    log::info!(
        "Extracting frames: {} -> {} (strict mode: {})",
        args.input.display(),
        output_path.display(),
        cli.strict
    );

    // Output is only created once the input is open.
    let input = InputReader::new(&args.input)?;
    let mut writer = BufWriter::new(File::create(&output_path)?);
    let mut written = 0u64;

    let stats = for_each_frame(input, cli, multi, |_, bytes| {
        writer.write_all(bytes)?;
        written += bytes.len() as u64;
        Ok(())
    })?;

    writer.flush()?;

    log::info!(
        "Wrote {} frames ({written} bytes), dropped {} bytes",
        stats.frames,
        stats.bytes_skipped
    );

    Ok(())
}
