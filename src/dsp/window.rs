/// Read-only table of Hann window coefficients, one per analysis buffer slot.
#[derive(Clone, Debug)]
pub struct Window {
    coefficients: Box<[f32]>,
}

impl Window {
    /// Symmetric Hann window of `size` points. `size` must be at least 2.
    pub fn hann(size: usize) -> Self {
        debug_assert!(size >= 2, "Hann window needs at least two points");
        let denom = (size - 1) as f64;
        let coefficients = (0..size)
            .map(|i| {
                // f64 keeps the endpoints exactly zero and the table symmetric
                (0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / denom).cos())) as f32
            })
            .collect();
        Self { coefficients }
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    #[inline]
    pub fn coefficient(&self, index: usize) -> f32 {
        self.coefficients[index]
    }

    #[allow(dead_code)]
    pub fn as_slice(&self) -> &[f32] {
        &self.coefficients
    }
}
