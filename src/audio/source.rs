use std::time::Duration;

use crate::error::ReadError;

/// Supplies raw signed 16-bit mono samples.
pub trait SampleSource: Send {
    /// Block until up to `buf.len()` samples are available, or until
    /// `timeout` elapses (`None` waits forever). Returns the number of
    /// samples written to the front of `buf`; bytes read = 2 × that count.
    fn read_samples(&mut self, buf: &mut [i16], timeout: Option<Duration>) -> Result<usize, ReadError>;

    /// Raw sample rate in Hz.
    fn sample_rate(&self) -> u32;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn read_samples(&mut self, buf: &mut [i16], timeout: Option<Duration>) -> Result<usize, ReadError> {
        (**self).read_samples(buf, timeout)
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }
}

/// Average a chunk of raw samples into one value, in raw sample units.
pub fn chunk_mean(samples: &[i16]) -> Option<f32> {
    if samples.is_empty() {
        return None;
    }
    let sum: i64 = samples.iter().map(|&s| s as i64).sum();
    Some(sum as f32 / samples.len() as f32)
}
