//! Top-level composition pipeline.

use serde::Serialize;

use chordforge_spec::{GenerationConfig, ProgressionStyle};

use crate::error::ComposeError;
use crate::parts::{arp, bass, melody, NoteEvent};
use crate::pool::ChordPool;
use crate::progression::{self, Progression, Slot};
use crate::rng::rng_for;
use crate::theory;

/// One chord on the chord track, placed on the absolute beat timeline.
#[derive(Debug, Clone, Serialize)]
pub struct ChordBlock {
    pub name: String,
    pub start_beats: f64,
    pub duration_beats: f64,
    pub pitches: Vec<u8>,
}

/// A finished composition: chord track, optional parts, and metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Composition {
    /// Human-readable key, e.g. "C" or "Am".
    pub key_name: String,
    pub progression: Progression,
    /// The seven diatonic pitches of the key.
    pub scale_notes: Vec<i32>,
    pub chords: Vec<ChordBlock>,
    pub bass: Option<Vec<NoteEvent>>,
    pub arp: Option<Vec<NoteEvent>>,
    pub melody: Option<Vec<NoteEvent>>,
    pub warnings: Vec<String>,
    pub total_beats: f64,
}

/// Run the full pipeline for a configuration.
///
/// The configuration is validated first; pool and progression construction
/// can fail, everything after that degrades through warnings. Each part
/// draws from its own seeded RNG stream, so toggling one part on or off
/// never changes the others.
pub fn compose(config: &GenerationConfig) -> Result<Composition, ComposeError> {
    config.validate()?;

    let key_root = config.key_root_midi();
    let minor = config.key_type.is_minor();
    let scale = theory::scale_notes(key_root, minor).to_vec();

    let mut warnings = Vec::new();
    let progression = if config.progression_style == ProgressionStyle::TwelveBarBlues {
        if config.num_bars != 12 {
            warnings.push(format!(
                "twelve-bar blues always runs 12 bars, ignoring bars = {}",
                config.num_bars
            ));
        }
        let pool = ChordPool::build_blues(key_root, config.key_type);
        progression::twelve_bar_blues(&pool, key_root, config.key_type)?
    } else {
        let pool = ChordPool::build(
            key_root,
            config.key_type,
            config.pool_style,
            config.complexity,
        );
        let mut rng = rng_for(config.seed, "progression");
        progression::generate(&pool, config, &mut rng)?
    };
    warnings.extend(progression.warnings.iter().cloned());

    let mut chords = Vec::new();
    let mut cursor = 0.0;
    for slot in &progression.slots {
        if let Slot::Resolved(chord) = slot {
            chords.push(ChordBlock {
                name: chord.display_name.clone(),
                start_beats: cursor,
                duration_beats: chord.duration_beats,
                pitches: chord
                    .midi_notes
                    .iter()
                    .copied()
                    .filter(|n| (0..=127).contains(n))
                    .map(|n| n as u8)
                    .collect(),
            });
        }
        cursor += slot.duration_beats();
    }

    let bass = config.include_bass.then(|| {
        let mut rng = rng_for(config.seed, "bass");
        bass::generate(&progression, &scale, config.bass_style, &mut rng)
    });
    let arp = config.include_arp.then(|| {
        let mut rng = rng_for(config.seed, "arp");
        arp::generate(
            &progression,
            &scale,
            config.arp_style,
            config.arp_octaves,
            &mut rng,
        )
    });
    let melody = config.include_melody.then(|| {
        let mut rng = rng_for(config.seed, "melody");
        melody::generate(
            &progression,
            &scale,
            config.melody_style,
            config.melody_speed,
            config.melody_register,
            config.articulation,
            config.melody_instrument,
            &mut rng,
        )
    });

    let total_beats = progression.total_beats();
    Ok(Composition {
        key_name: config.key_name(),
        progression,
        scale_notes: scale,
        chords,
        bass,
        arp,
        melody,
        warnings,
        total_beats,
    })
}
