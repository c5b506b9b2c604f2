//! In-place radix-2 FFT over a real analysis buffer.
//!
//! A real block of N samples is treated as N/2 complex points (even slots are
//! real parts, odd slots imaginary parts). The half-length complex transform
//! runs decimation-in-frequency, which leaves its output in bit-reversed
//! order; a separate permutation pass restores natural order, and a final
//! unpack pass turns the packed result into the first N/2 bins of the real
//! N-point spectrum.

use std::f64::consts::PI;

use crate::error::{Result, SpectrumError};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Twiddle {
    re: f32,
    im: f32,
}

impl Twiddle {
    /// exp(-2πi · k / n)
    fn forward(k: usize, n: usize) -> Self {
        let angle = -2.0 * PI * k as f64 / n as f64;
        Self {
            re: angle.cos() as f32,
            im: angle.sin() as f32,
        }
    }
}

pub struct FftEngine {
    /// Real samples per block (N).
    size: usize,
    /// log2 of the complex point count N/2.
    bits: u32,
    /// exp(-2πi k / (N/2)) for k in 0..N/4, used by the butterflies.
    butterfly: Vec<Twiddle>,
    /// exp(-2πi k / N) for k in 0..N/2, used by the real unpack.
    unpack: Vec<Twiddle>,
}

impl FftEngine {
    pub fn new(size: usize) -> Result<Self> {
        if size < 2 || !size.is_power_of_two() {
            return Err(SpectrumError::Init(format!(
                "FFT size must be a power of two >= 2, got {}",
                size
            )));
        }

        let points = size / 2;
        let butterfly = (0..points / 2).map(|k| Twiddle::forward(k, points)).collect();
        let unpack = (0..points).map(|k| Twiddle::forward(k, size)).collect();

        log::debug!("FFT engine ready: {} real points, {} complex", size, points);

        Ok(Self {
            size,
            bits: points.trailing_zeros(),
            butterfly,
            unpack,
        })
    }

    /// Full real transform of a block of `size()` samples, in place.
    ///
    /// Afterwards bin k sits at `buffer[2k]` (re) and `buffer[2k + 1]` (im).
    /// Bin 0 is DC with a zero imaginary part; the Nyquist value is dropped.
    pub fn real_forward(&self, buffer: &mut [f32]) {
        assert_eq!(buffer.len(), self.size, "buffer length must equal FFT size");
        self.complex_forward(buffer);
        self.unpack_real(buffer);
    }

    /// Forward complex transform of N/2 interleaved points, natural order out.
    pub fn complex_forward(&self, buffer: &mut [f32]) {
        assert_eq!(buffer.len(), self.size, "buffer length must equal FFT size");
        self.butterflies(buffer);
        self.bit_reverse(buffer);
    }

    /// Inverse complex transform scaled by 1/(N/2), so that
    /// `complex_inverse(complex_forward(x)) == x`.
    #[allow(dead_code)]
    pub fn complex_inverse(&self, buffer: &mut [f32]) {
        // ifft(x) = conj(fft(conj(x))) / M
        conjugate(buffer);
        self.complex_forward(buffer);
        conjugate(buffer);
        let scale = 1.0 / (self.size / 2) as f32;
        for v in buffer.iter_mut() {
            *v *= scale;
        }
    }

    /// Radix-2 decimation-in-frequency butterflies. Output is bit-reversed.
    fn butterflies(&self, data: &mut [f32]) {
        let points = self.size / 2;
        let mut span = points;
        while span >= 2 {
            let half = span / 2;
            let stride = points / span;
            for start in (0..points).step_by(span) {
                for j in 0..half {
                    let a = 2 * (start + j);
                    let b = 2 * (start + j + half);
                    let (ar, ai) = (data[a], data[a + 1]);
                    let (br, bi) = (data[b], data[b + 1]);

                    data[a] = ar + br;
                    data[a + 1] = ai + bi;

                    let dr = ar - br;
                    let di = ai - bi;
                    let w = self.butterfly[j * stride];
                    data[b] = dr * w.re - di * w.im;
                    data[b + 1] = dr * w.im + di * w.re;
                }
            }
            span = half;
        }
    }

    fn bit_reverse(&self, data: &mut [f32]) {
        let points = self.size / 2;
        if points < 2 {
            return;
        }
        let shift = usize::BITS - self.bits;
        for i in 0..points {
            let j = i.reverse_bits() >> shift;
            if i < j {
                data.swap(2 * i, 2 * j);
                data.swap(2 * i + 1, 2 * j + 1);
            }
        }
    }

    /// Split the packed half-length spectrum Z into the real spectrum X:
    /// X[k] = E[k] + W^k O[k], X[M-k] = conj(E[k]) - conj(W^k O[k]),
    /// with E = (Z[k] + conj Z[M-k]) / 2 and O = (Z[k] - conj Z[M-k]) / 2i.
    fn unpack_real(&self, data: &mut [f32]) {
        let points = self.size / 2;

        // DC: Z[0] = a + ib gives X[0] = a + b; the Nyquist term a - b is dropped
        data[0] += data[1];
        data[1] = 0.0;

        for k in 1..=points / 2 {
            let j = points - k;
            let (zkr, zki) = (data[2 * k], data[2 * k + 1]);
            let (zjr, zji) = (data[2 * j], data[2 * j + 1]);

            let er = 0.5 * (zkr + zjr);
            let ei = 0.5 * (zki - zji);
            let or = 0.5 * (zki + zji);
            let oi = -0.5 * (zkr - zjr);

            let w = self.unpack[k];
            let tr = w.re * or - w.im * oi;
            let ti = w.re * oi + w.im * or;

            data[2 * k] = er + tr;
            data[2 * k + 1] = ei + ti;
            if j != k {
                data[2 * j] = er - tr;
                data[2 * j + 1] = ti - ei;
            }
        }
    }
}

fn conjugate(data: &mut [f32]) {
    for im in data.iter_mut().skip(1).step_by(2) {
        *im = -*im;
    }
}
