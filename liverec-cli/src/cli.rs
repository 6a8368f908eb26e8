use std::path::PathBuf;

use clap::Parser;

/// Record a live stream into bounded-duration MP4 fragments.
///
/// Fragments are written by the media engine into the `media` subdirectory of
/// the output directory, named `live_<offset>.mp4` where the offset is the
/// fragment's nominal start in timescale units. One fragment index is printed
/// to standard output per fragment produced; status goes to standard error.
#[derive(Debug, Parser)]
#[command(name = "liverec", version, about)]
pub struct Args {
    /// Directory to record into
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Duration of each fragment, in seconds
    #[arg(long, default_value_t = 10)]
    pub fragment_duration: u32,

    /// Offset units per second used in fragment names
    #[arg(long, default_value_t = 1000)]
    pub timescale: u32,

    /// End the stream after this many fragments (default: run until interrupted)
    #[arg(long)]
    pub fragments: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
