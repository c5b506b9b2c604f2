/// Keeps the logarithm argument positive for silent bins.
pub const POWER_EPSILON: f32 = 1e-7;

/// Convert interleaved (re, im) bins into decibels, overwriting the first
/// `buffer.len() / 2` slots. Returns the number of power values written.
///
/// power_db[k] = 10 · log10((re² + im² + ε) / N), N = `buffer.len()`.
pub fn power_db_in_place(buffer: &mut [f32]) -> usize {
    let n = buffer.len() as f32;
    let bins = buffer.len() / 2;
    // Slot k is written only after slots 2k and 2k+1 have been read
    for k in 0..bins {
        let re = buffer[2 * k];
        let im = buffer[2 * k + 1];
        buffer[k] = 10.0 * ((re * re + im * im + POWER_EPSILON) / n).log10();
    }
    bins
}

/// Index and value of the loudest bin. Ties resolve to the lowest index.
pub fn peak(power: &[f32]) -> Option<(usize, f32)> {
    power
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_formula_for_every_bin() {
        let mut buffer = vec![3.0, 4.0, 0.0, 0.0, 1.0, -1.0, 10.0, 0.0];
        let bins = power_db_in_place(&mut buffer);
        assert_eq!(bins, 4);
        let expect = |p: f32| 10.0 * ((p + POWER_EPSILON) / 8.0).log10();
        assert!((buffer[0] - expect(25.0)).abs() < 1e-5);
        assert!((buffer[1] - expect(0.0)).abs() < 1e-3);
        assert!((buffer[2] - expect(2.0)).abs() < 1e-5);
        assert!((buffer[3] - expect(100.0)).abs() < 1e-5);
    }

    #[test]
    fn silence_is_finite() {
        let mut buffer = vec![0.0f32; 16];
        power_db_in_place(&mut buffer);
        for v in &buffer[..8] {
            assert!(v.is_finite());
            assert!((v - 10.0 * (POWER_EPSILON / 16.0).log10()).abs() < 1e-3);
        }
    }

    #[test]
    fn peak_picks_first_maximum() {
        assert_eq!(peak(&[]), None);
        assert_eq!(peak(&[-3.0, 5.0, 1.0, 5.0]), Some((1, 5.0)));
    }
}
