pub mod buffer;
pub mod fft;
pub mod power;
pub mod window;
