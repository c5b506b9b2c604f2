//! Error types for the analysis pipeline.

use std::time::Duration;
use thiserror::Error;

/// A sample source read that did not return success.
///
/// `Timeout` and `Failed` are recovered by skipping the current iteration;
/// `EndOfStream` tells the driver there is nothing left to read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadError {
    #[error("read timed out after {0:?}")]
    Timeout(Duration),

    #[error("read failed: {0}")]
    Failed(String),

    #[error("end of stream")]
    EndOfStream,
}

#[derive(Error, Debug)]
pub enum SpectrumError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("FFT initialization failed: {0}")]
    Init(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SpectrumError>;
