use clap::ValueEnum;
use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, SpectrumError};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Real samples per FFT block, a power of two.
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    /// Raw input rate in Hz. File sources override this with the file's rate.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Raw samples averaged into each analysis sample.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Per-read timeout; absent waits forever.
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_db_low")]
    pub db_low: f32,
    #[serde(default = "default_db_high")]
    pub db_high: f32,
    #[serde(default = "default_glyph")]
    pub glyph: char,
    #[serde(default = "default_true")]
    pub legend: bool,
    #[serde(default)]
    pub mode: OutputMode,
    /// Trace-mode plot bounds, printed as `-limit limit`.
    #[serde(default = "default_trace_limit")]
    pub trace_limit: u32,
    /// Append the FFT timing line after every plot.
    #[serde(default)]
    pub diagnostics: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    #[serde(default = "default_tone_hz")]
    pub tone_hz: f32,
    #[serde(default = "default_tone_amplitude")]
    pub tone_amplitude: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Character-grid power spectrum per block
    #[default]
    Spectrum,
    /// Serial-plotter line per analysis sample
    Trace,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Synthetic sine wave
    #[default]
    Tone,
    /// Decoded audio file
    File,
    /// Raw s16le mono PCM on stdin
    Stdin,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            sample_rate: default_sample_rate(),
            chunk_size: default_chunk_size(),
            read_timeout_ms: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            db_low: default_db_low(),
            db_high: default_db_high(),
            glyph: default_glyph(),
            legend: true,
            mode: OutputMode::default(),
            trace_limit: default_trace_limit(),
            diagnostics: false,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            tone_hz: default_tone_hz(),
            tone_amplitude: default_tone_amplitude(),
        }
    }
}

fn default_fft_size() -> usize { 1024 }
fn default_sample_rate() -> u32 { 44100 }
fn default_chunk_size() -> usize { 1 }
fn default_width() -> usize { 64 }
fn default_height() -> usize { 16 }
fn default_db_low() -> f32 { -60.0 }
fn default_db_high() -> f32 { 40.0 }
fn default_glyph() -> char { '*' }
fn default_true() -> bool { true }
fn default_trace_limit() -> u32 { 3000 }
fn default_tone_hz() -> f32 { 1000.0 }
fn default_tone_amplitude() -> f32 { 8000.0 }

impl AnalysisConfig {
    /// Rate of the samples entering the FFT: one per averaged chunk.
    pub fn effective_sample_rate(&self) -> f32 {
        self.sample_rate as f32 / self.chunk_size.max(1) as f32
    }

    /// Centre frequency of bin `k`.
    pub fn bin_frequency(&self, k: usize) -> f32 {
        k as f32 * self.effective_sample_rate() / self.fft_size as f32
    }
}

impl Config {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let a = &self.analysis;
        let d = &self.display;
        if a.fft_size < 2 || !a.fft_size.is_power_of_two() {
            return Err(invalid(format!("fft_size must be a power of two >= 2, got {}", a.fft_size)));
        }
        if a.chunk_size == 0 {
            return Err(invalid("chunk_size must be at least 1".into()));
        }
        if a.sample_rate == 0 {
            return Err(invalid("sample_rate must be positive".into()));
        }
        if d.width == 0 || d.height == 0 {
            return Err(invalid(format!("plot size must be non-zero, got {}x{}", d.width, d.height)));
        }
        if !d.db_low.is_finite() || !d.db_high.is_finite() || d.db_high <= d.db_low {
            return Err(invalid(format!(
                "decibel range must satisfy low < high, got {}..{}",
                d.db_low, d.db_high
            )));
        }
        if d.trace_limit == 0 {
            return Err(invalid("trace_limit must be at least 1".into()));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> SpectrumError {
    SpectrumError::InvalidConfig(reason)
}

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.analysis.fft_size, 1024);
        assert_eq!(cfg.display.mode, OutputMode::Spectrum);
        assert_eq!(cfg.source.kind, SourceKind::Tone);
    }

    #[test]
    fn parses_partial_toml() {
        let cfg: Config = toml::from_str(
            r##"
            [analysis]
            fft_size = 256
            chunk_size = 4
            read_timeout_ms = 250

            [display]
            mode = "trace"
            glyph = "#"

            [source]
            kind = "stdin"
            "##,
        )
        .unwrap();
        assert_eq!(cfg.analysis.fft_size, 256);
        assert_eq!(cfg.analysis.sample_rate, 44100);
        assert_eq!(cfg.analysis.read_timeout_ms, Some(250));
        assert_eq!(cfg.display.mode, OutputMode::Trace);
        assert_eq!(cfg.display.glyph, '#');
        assert_eq!(cfg.display.height, 16);
        assert_eq!(cfg.source.kind, SourceKind::Stdin);
    }

    #[test]
    fn rejects_bad_fft_sizes() {
        for n in [0, 1, 3, 1000] {
            let mut cfg = Config::default();
            cfg.analysis.fft_size = n;
            assert!(matches!(cfg.validate(), Err(SpectrumError::InvalidConfig(_))), "n={}", n);
        }
        let mut cfg = Config::default();
        cfg.analysis.fft_size = 2;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_bad_display_and_rates() {
        let mut cfg = Config::default();
        cfg.display.db_high = cfg.display.db_low;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.display.width = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.analysis.chunk_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn trace_limit_must_be_positive() {
        let mut cfg = Config::default();
        cfg.display.trace_limit = 0;
        assert!(matches!(cfg.validate(), Err(SpectrumError::InvalidConfig(_))));

        let parsed: std::result::Result<Config, _> = toml::from_str("[display]\ntrace_limit = -2147483648\n");
        assert!(parsed.is_err());

        let cfg: Config = toml::from_str("[display]\ntrace_limit = 4294967295\n").unwrap();
        assert_eq!(cfg.display.trace_limit, u32::MAX);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn effective_rate_divides_by_chunk() {
        let mut a = AnalysisConfig::default();
        a.sample_rate = 44100;
        a.chunk_size = 64;
        a.fft_size = 512;
        assert!((a.effective_sample_rate() - 689.0625).abs() < 1e-3);
        assert!((a.bin_frequency(2) - 2.0 * 689.0625 / 512.0).abs() < 1e-4);
    }
}
