use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use anyhow::Result;
use mpa::process::locate::Locator;
use mpa::process::source::{Seekable, Sequential, Source};

use crate::cli::command::Cli;

/// Unified input that handles both file and pipe input with buffered reading
pub struct InputReader {
    source: Box<dyn Source>,
    is_pipe: bool,
    len: Option<u64>,
}

impl InputReader {
    /// Create a new InputReader from a path
    /// Use "-" for stdin pipe input, which can only be read sequentially
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let is_pipe = input_path.as_ref().to_string_lossy() == "-";

        if is_pipe {
            return Ok(Self {
                source: Box::new(Sequential::new(io::stdin().lock())),
                is_pipe,
                len: None,
            });
        }

        let file = File::open(input_path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            source: Box::new(Seekable::new(BufReader::new(file))),
            is_pipe,
            len: Some(len),
        })
    }

    /// Check if this is pipe input
    pub fn is_pipe(&self) -> bool {
        self.is_pipe
    }

    /// Input size in bytes, unknown for pipes
    pub fn size(&self) -> Option<u64> {
        self.len
    }

    /// Build a frame locator configured from the global command line options
    pub fn into_locator(self, cli: &Cli) -> Locator<Box<dyn Source>> {
        let mut locator = Locator::new(self.source);
        locator.set_layer(cli.layer.to_layer());
        locator.set_resync_limit(cli.resync_limit);
        locator
    }
}
