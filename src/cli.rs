use clap::Parser;
use std::path::PathBuf;

use crate::config::{OutputMode, SourceKind};

#[derive(Parser, Debug)]
#[command(name = "specline", about = "Real-time text power spectrum of a mono 16-bit audio stream")]
pub struct Cli {
    /// Input audio file, or "-" for raw s16le PCM on stdin
    pub input: Option<PathBuf>,

    /// Config file (defaults to ./specline.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sample source; inferred from INPUT when omitted
    #[arg(short, long, value_enum)]
    pub source: Option<SourceKind>,

    /// Real samples per FFT block (power of two)
    #[arg(short = 'n', long, default_value_t = 1024)]
    pub fft_size: usize,

    /// Raw sample rate in Hz (ignored for files, which carry their own)
    #[arg(short = 'r', long, default_value_t = 44100)]
    pub sample_rate: u32,

    /// Raw samples averaged into each analysis sample
    #[arg(long, default_value_t = 1)]
    pub chunk_size: usize,

    /// Plot width in columns
    #[arg(long, default_value_t = 64)]
    pub width: usize,

    /// Plot height in rows
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Bottom of the displayed decibel range
    #[arg(long, default_value_t = -60.0, allow_hyphen_values = true)]
    pub db_low: f32,

    /// Top of the displayed decibel range
    #[arg(long, default_value_t = 40.0, allow_hyphen_values = true)]
    pub db_high: f32,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputMode::Spectrum)]
    pub mode: OutputMode,

    /// Stop after this many blocks
    #[arg(short, long)]
    pub blocks: Option<u64>,

    /// Tone source frequency in Hz
    #[arg(long, default_value_t = 1000.0)]
    pub tone_hz: f32,

    /// Per-read timeout in milliseconds (waits forever when unset)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Print FFT timing after each plot
    #[arg(long)]
    pub diagnostics: bool,
}
