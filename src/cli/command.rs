use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};
use mpa::structs::header::Layer;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nmpa ",
    env!("MPA_VERSION"),
    "\nbuilt ",
    env!("BUILD_TIMESTAMP"),
);

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION,
    about        = "Tools for inspecting and splitting MPEG audio elementary streams",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat a truncated trailing frame as a fatal error.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Only accept frames of this layer.
    #[arg(long, global = true, value_enum, default_value_t = LayerArg::L3)]
    pub layer: LayerArg,

    /// Give up after skipping this many bytes without finding a frame.
    #[arg(long, global = true, value_name = "BYTES")]
    pub resync_limit: Option<u64>,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print stream information
    Info(InfoArgs),

    /// List every located frame
    Frames(FramesArgs),

    /// Write the located frames back to back, dropping tags and junk between them.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input MPEG audio stream (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Plain)]
    pub format: ReportFormat,
}

#[derive(Debug, Args)]
pub struct FramesArgs {
    /// Input MPEG audio stream (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Input MPEG audio stream (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file. The extension is set from the selected layer.
    #[arg(long, value_name = "PATH")]
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum LayerArg {
    /// Layer I.
    #[value(name = "1")]
    L1,
    /// Layer II.
    #[value(name = "2")]
    L2,
    /// Layer III (default).
    #[value(name = "3")]
    L3,
    /// Any layer.
    Any,
}

impl LayerArg {
    pub fn to_layer(self) -> Option<Layer> {
        match self {
            LayerArg::L1 => Some(Layer::Layer1),
            LayerArg::L2 => Some(Layer::Layer2),
            LayerArg::L3 => Some(Layer::Layer3),
            LayerArg::Any => None,
        }
    }

    /// File extension for extracted streams.
    pub fn extension(self) -> &'static str {
        match self {
            LayerArg::L1 => "mp1",
            LayerArg::L2 => "mp2",
            LayerArg::L3 | LayerArg::Any => "mp3",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ReportFormat {
    /// Aligned human-readable text.
    Plain,
    /// YAML document.
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_global_options() {
        let cli = Cli::parse_from([
            "mpad",
            "--layer",
            "2",
            "--resync-limit",
            "4096",
            "info",
            "stream.mp2",
            "--format",
            "yaml",
        ]);

        assert_eq!(cli.layer, LayerArg::L2);
        assert_eq!(cli.layer.to_layer(), Some(Layer::Layer2));
        assert_eq!(cli.resync_limit, Some(4096));
        assert!(!cli.strict);

        let Commands::Info(args) = cli.command else {
            panic!("expected info command");
        };
        assert_eq!(args.format, ReportFormat::Yaml);
    }

    #[test]
    fn defaults_to_layer3() {
        let cli = Cli::parse_from(["mpad", "frames", "-"]);
        assert_eq!(cli.layer.to_layer(), Some(Layer::Layer3));
        assert_eq!(cli.resync_limit, None);
    }
}
