//! ChordForge composition engine.
//!
//! Given a validated [`GenerationConfig`](chordforge_spec::GenerationConfig),
//! the engine builds a chord pool for the requested key and style, generates a
//! chord progression (with voice-leading optimization, voicing/inversion, and
//! cadence enforcement), and derives optional bassline, arpeggio, and melody
//! note-event tracks from the result.
//!
//! The engine is purely symbolic: output is timed note events and chord
//! blocks, not audio. All randomness flows from the configuration seed
//! through per-part derived [`rand_pcg::Pcg32`] streams, so a run is fully
//! reproducible and individual parts can be regenerated independently.
//!
//! # Pipeline
//!
//! 1. [`pool`] builds the chord pool (or the dedicated 3-chord blues pool).
//! 2. [`progression`] produces one [`Slot`](progression::Slot) per chord.
//! 3. [`parts`] derive bass/arp/melody events from the finished progression.
//! 4. [`compose`] ties the pipeline together into a [`Composition`].

pub mod compose;
pub mod error;
pub mod parts;
pub mod pool;
pub mod progression;
pub mod resolve;
pub mod rng;
pub mod theory;
pub mod voicing;

pub use compose::{compose, ChordBlock, Composition};
pub use error::ComposeError;
pub use parts::NoteEvent;
pub use pool::{ChordEntry, ChordPool, ChordQuality};
pub use progression::{ChordSlot, Progression, Slot};
pub use voicing::{VoicedChord, CHORD_OCTAVE_SHIFT};
