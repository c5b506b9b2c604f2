use std::time::Duration;

use crate::error::ReadError;

use super::source::SampleSource;

/// Endless synthetic sine wave, useful without any capture hardware.
pub struct ToneSource {
    sample_rate: u32,
    frequency: f32,
    amplitude: f32,
    phase: f64,
}

impl ToneSource {
    /// `amplitude` is in raw sample units and saturates at the i16 range.
    pub fn new(sample_rate: u32, frequency: f32, amplitude: f32) -> Self {
        log::info!(
            "Tone source: {:.1} Hz, amplitude {:.0}, {} Hz sample rate",
            frequency, amplitude, sample_rate
        );
        Self {
            sample_rate,
            frequency,
            amplitude,
            phase: 0.0,
        }
    }
}

impl SampleSource for ToneSource {
    fn read_samples(&mut self, buf: &mut [i16], _timeout: Option<Duration>) -> Result<usize, ReadError> {
        let step = std::f64::consts::TAU * self.frequency as f64 / self.sample_rate as f64;
        for s in buf.iter_mut() {
            let v = self.amplitude as f64 * self.phase.sin();
            *s = v.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
            self.phase = (self.phase + step) % std::f64::consts::TAU;
        }
        Ok(buf.len())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
