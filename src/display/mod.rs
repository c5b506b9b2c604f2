pub mod plot;
pub mod trace;

pub use plot::SpectrumPlot;
pub use trace::trace_line;
