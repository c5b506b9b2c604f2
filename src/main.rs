mod audio;
mod cli;
mod config;
mod display;
mod dsp;
mod error;
mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use audio::{FileSource, SampleSource, StreamSource, ToneSource};
use cli::Cli;
use config::{Config, SourceKind};
use pipeline::Pipeline;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect specline.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = PathBuf::from("specline.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("specline").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("specline").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });

    let mut cfg = match config_path {
        Some(ref path) => match config::load_config(path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            Err(err) if cli.config.is_some() => {
                return Err(err).with_context(|| format!("Failed to load config from {}", path.display()));
            }
            Err(err) => {
                log::warn!("Failed to load config from {}: {}", path.display(), err);
                Config::default()
            }
        },
        None => Config::default(),
    };

    // Merge: CLI values win when they differ from their defaults
    if cli.fft_size != 1024 { cfg.analysis.fft_size = cli.fft_size; }
    if cli.sample_rate != 44100 { cfg.analysis.sample_rate = cli.sample_rate; }
    if cli.chunk_size != 1 { cfg.analysis.chunk_size = cli.chunk_size; }
    if cli.timeout_ms.is_some() { cfg.analysis.read_timeout_ms = cli.timeout_ms; }
    if cli.width != 64 { cfg.display.width = cli.width; }
    if cli.height != 16 { cfg.display.height = cli.height; }
    if cli.db_low != -60.0 { cfg.display.db_low = cli.db_low; }
    if cli.db_high != 40.0 { cfg.display.db_high = cli.db_high; }
    if cli.mode != config::OutputMode::Spectrum { cfg.display.mode = cli.mode; }
    if cli.diagnostics { cfg.display.diagnostics = true; }
    if cli.tone_hz != 1000.0 { cfg.source.tone_hz = cli.tone_hz; }

    let kind = cli.source.unwrap_or(match cli.input.as_deref() {
        Some(p) if p == Path::new("-") => SourceKind::Stdin,
        Some(_) => SourceKind::File,
        None => cfg.source.kind,
    });

    cfg.validate().context("Invalid configuration")?;

    let mut source: Box<dyn SampleSource> = match kind {
        SourceKind::Tone => Box::new(ToneSource::new(
            cfg.analysis.sample_rate,
            cfg.source.tone_hz,
            cfg.source.tone_amplitude,
        )),
        SourceKind::File => {
            let input = cli.input.as_ref().context("Input audio file is required")?;
            if !input.exists() {
                anyhow::bail!("Input file not found: {}", input.display());
            }
            log::info!("Input: {}", input.display());
            Box::new(FileSource::open(input)?)
        }
        SourceKind::Stdin => {
            log::info!("Reading s16le mono PCM from stdin at {} Hz", cfg.analysis.sample_rate);
            Box::new(
                StreamSource::new(std::io::stdin(), cfg.analysis.sample_rate)
                    .context("Failed to start stdin reader")?,
            )
        }
    };
    cfg.analysis.sample_rate = source.sample_rate();

    log::info!("specline - text spectrum analyzer");
    log::info!(
        "Plot: {}x{} over {}..{} dB, mode {:?}",
        cfg.display.width, cfg.display.height, cfg.display.db_low, cfg.display.db_high, cfg.display.mode
    );

    let stdout = std::io::stdout().lock();
    let mut pipeline = Pipeline::new(&cfg, stdout).context("Analysis pipeline failed to initialize")?;

    pipeline.run(&mut source, cli.blocks)?;
    log::info!("Done: {} blocks analyzed", pipeline.cycles());
    Ok(())
}
