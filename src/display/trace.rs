/// Serial-plotter line: fixed bounds first so plotting tools keep a steady
/// vertical scale, then the chunk mean in raw sample units.
pub fn trace_line(limit: u32, mean: f32) -> String {
    format!("-{limit} {limit} {mean:.2}")
}
