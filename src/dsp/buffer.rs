//! The analysis buffer and the stage-typed views over it.
//!
//! One block of storage serves three roles in turn: windowed time-domain
//! samples, interleaved complex bins, then decibel power values. Each role
//! gets its own view type and each transition consumes the previous view, so
//! the buffer can only be read the way the current stage left it. Every view
//! holds the accumulator's mutable borrow, which keeps new samples out until
//! the block has been fully consumed.

use super::fft::FftEngine;
use super::power::power_db_in_place;
use super::window::Window;

/// Collects windowed samples into a fixed-length block.
pub struct Accumulator {
    buffer: Box<[f32]>,
    window: Window,
    position: usize,
}

impl Accumulator {
    pub fn new(window: Window) -> Self {
        let buffer = vec![0.0; window.len()].into_boxed_slice();
        Self {
            buffer,
            window,
            position: 0,
        }
    }

    /// Next write index, in `0..len()`.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Raw buffer contents, whatever stage last wrote them.
    pub fn samples(&self) -> &[f32] {
        &self.buffer
    }

    /// Window and store one sample. Returns the completed block when this
    /// write filled the last slot; the position has already wrapped to 0.
    pub fn push(&mut self, sample: f32) -> Option<TimeDomain<'_>> {
        let i = self.position;
        self.buffer[i] = sample * self.window.coefficient(i);
        self.position += 1;

        if self.position < self.buffer.len() {
            return None;
        }
        self.position = 0;
        Some(TimeDomain {
            data: &mut self.buffer[..],
        })
    }
}

/// A full block of windowed real samples.
pub struct TimeDomain<'a> {
    data: &'a mut [f32],
}

impl<'a> TimeDomain<'a> {
    #[allow(dead_code)]
    pub fn samples(&self) -> &[f32] {
        self.data
    }

    pub fn transform(self, engine: &FftEngine) -> Spectrum<'a> {
        engine.real_forward(self.data);
        Spectrum { data: self.data }
    }
}

/// N/2 complex bins, bin k at slots (2k, 2k + 1).
pub struct Spectrum<'a> {
    data: &'a mut [f32],
}

impl<'a> Spectrum<'a> {
    #[allow(dead_code)]
    pub fn bins(&self) -> usize {
        self.data.len() / 2
    }

    #[allow(dead_code)]
    pub fn bin(&self, k: usize) -> (f32, f32) {
        (self.data[2 * k], self.data[2 * k + 1])
    }

    pub fn into_power(self) -> PowerSpectrum<'a> {
        let bins = power_db_in_place(self.data);
        let data: &'a [f32] = self.data;
        PowerSpectrum { data: &data[..bins] }
    }
}

/// N/2 decibel values; the upper half of the storage is stale.
pub struct PowerSpectrum<'a> {
    data: &'a [f32],
}

impl PowerSpectrum<'_> {
    pub fn as_slice(&self) -> &[f32] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windowing_is_fused_into_writes() {
        let mut acc = Accumulator::new(Window::hann(8));
        for _ in 0..4 {
            assert!(acc.push(2.0).is_none());
        }
        let expected: Vec<f32> = Window::hann(8).as_slice()[..4].iter().map(|w| w * 2.0).collect();
        assert_eq!(&acc.samples()[..4], expected.as_slice());
        assert_eq!(acc.position(), 4);
    }

    #[test]
    fn wraps_exactly_every_block() {
        let n = 16;
        let mut acc = Accumulator::new(Window::hann(n));
        let mut ready = Vec::new();
        for i in 0..(5 * n + 3) {
            if acc.push(1.0).is_some() {
                ready.push(i);
            }
            assert!(acc.position() < n);
        }
        assert_eq!(ready, vec![n - 1, 2 * n - 1, 3 * n - 1, 4 * n - 1, 5 * n - 1]);
        assert_eq!(acc.position(), 3);
    }

    #[test]
    fn stages_share_the_same_storage() {
        let n = 8;
        let engine = FftEngine::new(n).unwrap();
        let mut acc = Accumulator::new(Window::hann(n));
        let mut block = None;
        for _ in 0..n {
            block = acc.push(1.0).map(|b| b.samples().to_vec());
        }
        let windowed = block.unwrap();
        let sum: f32 = windowed.iter().sum();

        for _ in 0..n - 1 {
            assert!(acc.push(1.0).is_none());
        }
        let time = acc.push(1.0).unwrap();
        let spectrum = time.transform(&engine);
        assert_eq!(spectrum.bins(), n / 2);
        let (dc_re, dc_im) = spectrum.bin(0);
        assert!((dc_re - sum).abs() < 1e-5);
        assert_eq!(dc_im, 0.0);

        let power = spectrum.into_power();
        assert_eq!(power.as_slice().len(), n / 2);
        assert!(power.as_slice()[0] > power.as_slice()[3]);
    }
}
