//! Configuration error types.

use thiserror::Error;

use crate::{MAX_BARS, MAX_BPM, MIN_BARS, MIN_BPM};

/// Errors raised while parsing or validating a generation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown key root '{name}' (expected one of C, C#, D, ... B)")]
    InvalidKeyRoot { name: String },
    #[error("num_bars {bars} out of range ({MIN_BARS}-{MAX_BARS})")]
    BarsOutOfRange { bars: u32 },
    #[error("bpm {bpm} out of range ({MIN_BPM}-{MAX_BPM})")]
    BpmOutOfRange { bpm: u16 },
}
