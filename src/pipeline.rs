//! The acquisition → window → FFT → power → display loop.
//!
//! One `step` reads one raw chunk, averages it into a single analysis sample
//! and accumulates it. Every `fft_size` accumulated samples the block is
//! transformed and rendered before the next read starts; the same storage is
//! reused for every stage, so cycles are strictly serialised.

use std::io::Write;
use std::time::{Duration, Instant};

use crate::audio::{chunk_mean, SampleSource};
use crate::config::{AnalysisConfig, Config, OutputMode};
use crate::display::{trace_line, SpectrumPlot};
use crate::dsp::buffer::{Accumulator, TimeDomain};
use crate::dsp::fft::FftEngine;
use crate::dsp::power::peak;
use crate::dsp::window::Window;
use crate::error::{ReadError, Result};

/// Full-scale divisor for signed 16-bit samples.
const FULL_SCALE: f32 = 32768.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BlockReport {
    /// 1-based count of completed blocks.
    pub cycle: u64,
    pub peak_bin: usize,
    pub peak_hz: f32,
    pub peak_db: f32,
    pub fft_time: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The read failed; nothing was accumulated.
    Skipped(ReadError),
    Accumulated,
    Block(BlockReport),
    /// The source has no more samples.
    Exhausted,
}

pub struct Pipeline<W: Write> {
    analysis: AnalysisConfig,
    mode: OutputMode,
    legend: bool,
    diagnostics: bool,
    trace_limit: u32,
    timeout: Option<Duration>,
    accumulator: Accumulator,
    engine: FftEngine,
    plot: SpectrumPlot,
    chunk: Vec<i16>,
    cycles: u64,
    sink: W,
}

impl<W: Write> Pipeline<W> {
    /// Validate the configuration and set up every table before the first
    /// sample is read. No block is ever processed if this fails.
    pub fn new(config: &Config, sink: W) -> Result<Self> {
        config.validate()?;
        let analysis = config.analysis.clone();
        let display = &config.display;

        let engine = FftEngine::new(analysis.fft_size)?;
        let accumulator = Accumulator::new(Window::hann(analysis.fft_size));
        let plot = SpectrumPlot::new(
            display.width,
            display.height,
            display.db_low,
            display.db_high,
            display.glyph,
        );

        log::info!(
            "Pipeline: {}-point FFT, {} raw samples per analysis sample, {:.1} Hz effective rate, {:.2} Hz per bin",
            analysis.fft_size,
            analysis.chunk_size,
            analysis.effective_sample_rate(),
            analysis.bin_frequency(1)
        );

        Ok(Self {
            chunk: vec![0; analysis.chunk_size],
            timeout: analysis.read_timeout_ms.map(Duration::from_millis),
            analysis,
            mode: display.mode,
            legend: display.legend,
            diagnostics: display.diagnostics,
            trace_limit: display.trace_limit,
            accumulator,
            engine,
            plot,
            cycles: 0,
            sink,
        })
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Next accumulator write index.
    #[allow(dead_code)]
    pub fn position(&self) -> usize {
        self.accumulator.position()
    }

    #[allow(dead_code)]
    pub fn buffer(&self) -> &[f32] {
        self.accumulator.samples()
    }

    #[allow(dead_code)]
    pub fn into_sink(self) -> W {
        self.sink
    }

    /// One loop iteration: read a chunk, accumulate, and process the block
    /// if it just filled up.
    pub fn step<S: SampleSource + ?Sized>(&mut self, source: &mut S) -> Result<Step> {
        let read = match source.read_samples(&mut self.chunk, self.timeout) {
            Ok(n) => n,
            Err(ReadError::EndOfStream) => return Ok(Step::Exhausted),
            Err(e) => {
                log::warn!("Skipping read: {}", e);
                return Ok(Step::Skipped(e));
            }
        };

        let Some(mean) = chunk_mean(&self.chunk[..read]) else {
            log::warn!("Skipping read: source returned no samples");
            return Ok(Step::Skipped(ReadError::Failed("empty read".into())));
        };

        if self.mode == OutputMode::Trace {
            writeln!(self.sink, "{}", trace_line(self.trace_limit, mean))?;
        }

        let flags = self.output_flags();
        let Some(block) = self.accumulator.push(mean / FULL_SCALE) else {
            return Ok(Step::Accumulated);
        };

        self.cycles += 1;
        let report = process_block(
            block,
            &self.engine,
            &self.analysis,
            &self.plot,
            self.cycles,
            flags,
            &mut self.sink,
        )?;
        Ok(Step::Block(report))
    }

    /// Loop until the source is exhausted or `max_blocks` blocks completed.
    /// Returns the number of blocks processed by this call.
    pub fn run<S: SampleSource + ?Sized>(&mut self, source: &mut S, max_blocks: Option<u64>) -> Result<u64> {
        let start = self.cycles;
        loop {
            if max_blocks.is_some_and(|max| self.cycles - start >= max) {
                break;
            }
            match self.step(source)? {
                Step::Exhausted => {
                    log::info!("Source exhausted after {} blocks", self.cycles);
                    break;
                }
                Step::Block(report) => log::debug!(
                    "Block {}: peak bin {} ({:.1} Hz) at {:.1} dB, FFT {} us",
                    report.cycle,
                    report.peak_bin,
                    report.peak_hz,
                    report.peak_db,
                    report.fft_time.as_micros()
                ),
                Step::Skipped(reason) => log::trace!("Iteration skipped: {}", reason),
                Step::Accumulated => {}
            }
        }
        self.sink.flush()?;
        Ok(self.cycles - start)
    }

    fn output_flags(&self) -> OutputFlags {
        OutputFlags {
            plot: self.mode == OutputMode::Spectrum,
            legend: self.legend,
            diagnostics: self.diagnostics,
        }
    }
}

#[derive(Clone, Copy)]
struct OutputFlags {
    plot: bool,
    legend: bool,
    diagnostics: bool,
}

fn process_block<W: Write>(
    block: TimeDomain<'_>,
    engine: &FftEngine,
    analysis: &AnalysisConfig,
    plot: &SpectrumPlot,
    cycle: u64,
    flags: OutputFlags,
    sink: &mut W,
) -> Result<BlockReport> {
    let started = Instant::now();
    let power = block.transform(engine).into_power();
    let fft_time = started.elapsed();

    let (peak_bin, peak_db) = peak(power.as_slice()).unwrap_or((0, f32::NEG_INFINITY));
    let peak_hz = analysis.bin_frequency(peak_bin);

    if flags.plot {
        sink.write_all(plot.render(power.as_slice()).as_bytes())?;
        if flags.legend {
            let nyquist = analysis.effective_sample_rate() / 2.0;
            writeln!(sink, "{}", plot.legend(nyquist, peak_hz, peak_db))?;
        }
        if flags.diagnostics {
            writeln!(sink, "fft: {} us", fft_time.as_micros())?;
        }
        sink.flush()?;
    }

    Ok(BlockReport {
        cycle,
        peak_bin,
        peak_hz,
        peak_db,
        fft_time,
    })
}
