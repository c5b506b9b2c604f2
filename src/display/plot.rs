//! Character-grid spectrum plot.

#[derive(Clone, Debug)]
pub struct SpectrumPlot {
    width: usize,
    height: usize,
    low: f32,
    high: f32,
    glyph: char,
}

impl SpectrumPlot {
    /// `width` and `height` must be non-zero and `high > low`;
    /// `Config::validate` checks this before a plot is built.
    pub fn new(width: usize, height: usize, low: f32, high: f32, glyph: char) -> Self {
        Self {
            width,
            height,
            low,
            high,
            glyph,
        }
    }

    /// Row for a decibel value, 0 = bottom (`low`), `height - 1` = top (`high`).
    pub fn row_for(&self, db: f32) -> usize {
        if self.height <= 1 {
            return 0;
        }
        let clamped = if db.is_nan() { self.low } else { db.clamp(self.low, self.high) };
        let t = (clamped - self.low) / (self.high - self.low);
        let row = (t * (self.height - 1) as f32).round() as usize;
        row.min(self.height - 1)
    }

    /// Bin range `[start, end)` shown by a display column. Columns never
    /// share a bin when there are more bins than columns; with fewer bins,
    /// neighbouring columns repeat the same bin.
    pub fn column_range(&self, column: usize, bins: usize) -> (usize, usize) {
        let start = column * bins / self.width;
        let end = ((column + 1) * bins / self.width).max(start + 1).min(bins);
        (start.min(bins.saturating_sub(1)), end)
    }

    /// One value per column, taking the loudest bin in each column's range.
    pub fn columns(&self, power: &[f32]) -> Vec<f32> {
        if power.is_empty() {
            return vec![self.low; self.width];
        }
        (0..self.width)
            .map(|c| {
                let (start, end) = self.column_range(c, power.len());
                power[start..end].iter().copied().fold(f32::NEG_INFINITY, f32::max)
            })
            .collect()
    }

    /// `height` lines of exactly `width` characters, top row first, each
    /// terminated by a newline.
    pub fn render(&self, power: &[f32]) -> String {
        let rows: Vec<usize> = self.columns(power).into_iter().map(|v| self.row_for(v)).collect();

        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in (0..self.height).rev() {
            for &marked in &rows {
                out.push(if marked == row { self.glyph } else { ' ' });
            }
            out.push('\n');
        }
        out
    }

    /// Summary line printed under the grid.
    pub fn legend(&self, nyquist_hz: f32, peak_hz: f32, peak_db: f32) -> String {
        format!(
            "{:.0}..{:.0} dB | 0..{:.0} Hz | peak {:.1} Hz {:.1} dB",
            self.low, self.high, nyquist_hz, peak_hz, peak_db
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plot(width: usize, height: usize) -> SpectrumPlot {
        SpectrumPlot::new(width, height, -60.0, 40.0, '*')
    }

    fn marked_rows(rendered: &str) -> Vec<usize> {
        let lines: Vec<&str> = rendered.lines().collect();
        let height = lines.len();
        let width = lines[0].chars().count();
        (0..width)
            .map(|c| {
                let from_top = lines
                    .iter()
                    .position(|l| l.chars().nth(c) == Some('*'))
                    .expect("every column is marked");
                height - 1 - from_top
            })
            .collect()
    }

    #[test]
    fn boundaries_map_to_first_and_last_row() {
        let p = plot(4, 10);
        assert_eq!(p.row_for(-60.0), 0);
        assert_eq!(p.row_for(40.0), 9);
        assert_eq!(p.row_for(-10.0), 5);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let p = plot(4, 10);
        assert_eq!(p.row_for(-200.0), 0);
        assert_eq!(p.row_for(f32::NEG_INFINITY), 0);
        assert_eq!(p.row_for(1000.0), 9);
        assert_eq!(p.row_for(f32::NAN), 0);
    }

    #[test]
    fn grid_has_one_mark_per_column() {
        let p = plot(8, 5);
        let power = vec![-100.0, -60.0, -35.0, -10.0, 15.0, 40.0, 90.0, -10.0];
        let rendered = p.render(&power);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        for line in &lines {
            assert_eq!(line.chars().count(), 8);
        }
        assert_eq!(marked_rows(&rendered), vec![0, 0, 1, 2, 3, 4, 4, 2]);
        assert_eq!(rendered.matches('*').count(), 8);
    }

    #[test]
    fn downsampling_keeps_the_loudest_bin() {
        let p = plot(4, 11);
        let mut power = vec![-60.0f32; 16];
        power[5] = 40.0;
        assert_eq!(p.column_range(1, 16), (4, 8));
        let cols = p.columns(&power);
        assert_eq!(cols, vec![-60.0, 40.0, -60.0, -60.0]);
        assert_eq!(marked_rows(&p.render(&power)), vec![0, 10, 0, 0]);
    }

    #[test]
    fn upsampling_repeats_bins() {
        let p = plot(8, 3);
        let power = vec![-60.0, 40.0];
        assert_eq!(p.columns(&power), vec![-60.0, -60.0, -60.0, -60.0, 40.0, 40.0, 40.0, 40.0]);
    }

    #[test]
    fn single_row_plot() {
        let p = plot(3, 1);
        assert_eq!(p.render(&[-60.0, 0.0, 40.0]), "***\n");
    }

    #[test]
    fn legend_mentions_range_and_peak() {
        let p = plot(3, 1);
        let line = p.legend(22050.0, 1000.0, -3.3);
        assert_eq!(line, "-60..40 dB | 0..22050 Hz | peak 1000.0 Hz -3.3 dB");
    }
}
