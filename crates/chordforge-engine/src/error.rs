//! Error types for composition.

use thiserror::Error;

use chordforge_spec::ConfigError;

/// Errors that abort a generation run.
///
/// Per-slot resolution failures are not represented here: they are recovered
/// locally (fallback chord or an unresolved slot) and reported as warnings on
/// the result. Only configuration problems and pool-level failures are fatal.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Invalid configuration, surfaced before any generation work.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A chord pool came out empty; there is nothing to select from.
    #[error("chord pool is empty for {context}")]
    EmptyPool { context: String },
    /// The blues pool is missing one of its three required chords.
    #[error("blues pool is missing expected chord '{name}'")]
    MissingBluesChord { name: String },
}
