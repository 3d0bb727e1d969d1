//! ChordForge configuration types.
//!
//! This crate defines the configuration record consumed by the composition
//! engine: the key, the harmonic style choices, and the per-part settings.
//! Every field is a closed enumeration; unknown values are rejected at
//! deserialization time and `GenerationConfig::validate` fails fast on
//! out-of-range numeric fields before any generation work starts.

pub mod config;
pub mod error;

pub use config::{
    Articulation, ArpOctaves, ArpStyle, BassStyle, Cadence, ChordBias, ChordRate, Complexity,
    GenerationConfig, KeyType, MelodyInstrument, MelodySpeed, MelodyRegister, MelodyStyle,
    NoteName, PoolStyle, ProgressionStyle, VoicingStyle, NOTE_NAMES,
};
pub use error::ConfigError;

/// Minimum supported bar count.
pub const MIN_BARS: u32 = 1;
/// Maximum supported bar count.
pub const MAX_BARS: u32 = 64;
/// Minimum supported tempo in beats per minute.
pub const MIN_BPM: u16 = 32;
/// Maximum supported tempo in beats per minute.
pub const MAX_BPM: u16 = 255;
