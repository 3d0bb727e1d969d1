//! Chord progression generation.
//!
//! A progression is a sequence of slots, one per chord. Template styles (Pop,
//! Pachelbel, ii-V-I) resolve a repeating function sequence against the pool;
//! Smooth Random (and any slot a template fails to fill) picks the candidate
//! with the smallest average-pitch movement from the previous chord. A cadence
//! setting rewrites the final one or two slots, and the 12-bar blues has its
//! own fixed-pattern generator.
//!
//! Slot-level failures never abort the run. A slot that cannot be filled
//! becomes [`Slot::Unresolved`] and a warning is recorded; downstream part
//! generators skip unresolved slots while keeping the timeline intact.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use chordforge_spec::{Cadence, ChordBias, GenerationConfig, KeyType, ProgressionStyle, NOTE_NAMES};

use crate::error::ComposeError;
use crate::pool::ChordPool;
use crate::resolve::find_by_function;
use crate::theory;
use crate::voicing::{apply_voicing, VoicedChord, CHORD_OCTAVE_SHIFT};

const POP_SEQUENCE: [&str; 4] = ["I", "vi", "IV", "V"];
const PACHELBEL_SEQUENCE: [&str; 8] = ["I", "V", "vi", "iii", "IV", "I", "IV", "V"];
const II_V_I_SEQUENCE: [&str; 3] = ["ii", "V", "I"];

/// How many pool entries the smooth finder samples per slot.
const SMOOTH_CANDIDATES: usize = 5;
/// Constrained candidates may not exceed the previous top note by more than this.
const MAX_TOP_NOTE_RISE: i32 = 3;
/// Bias multiplier applied to the voice-leading distance of favored qualities.
const BIAS_FACTOR: f64 = 0.7;

/// A filled progression slot.
#[derive(Debug, Clone, Serialize)]
pub struct ChordSlot {
    /// Chord name with any voicing suffix, e.g. "Am7/Inv1".
    pub display_name: String,
    /// Root-position pool notes, before voicing.
    pub original_notes: Vec<i32>,
    /// Playback notes: voiced and shifted down an octave.
    pub midi_notes: Vec<i32>,
    /// Root-position root, the bass anchor for part generation.
    pub bass_root: i32,
    pub duration_beats: f64,
}

/// One progression slot; unresolved slots keep their duration so the
/// timeline stays aligned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Resolved(ChordSlot),
    Unresolved { reason: String, duration_beats: f64 },
}

impl Slot {
    pub fn duration_beats(&self) -> f64 {
        match self {
            Slot::Resolved(slot) => slot.duration_beats,
            Slot::Unresolved { duration_beats, .. } => *duration_beats,
        }
    }

    pub fn as_resolved(&self) -> Option<&ChordSlot> {
        match self {
            Slot::Resolved(slot) => Some(slot),
            Slot::Unresolved { .. } => None,
        }
    }
}

/// A generated progression plus any per-slot warnings.
#[derive(Debug, Clone, Serialize)]
pub struct Progression {
    pub slots: Vec<Slot>,
    pub warnings: Vec<String>,
}

impl Progression {
    pub fn total_beats(&self) -> f64 {
        self.slots.iter().map(Slot::duration_beats).sum()
    }
}

/// One chord chosen for a slot, with its voicing applied.
struct Selection {
    base_name: String,
    voiced: VoicedChord,
}

/// Generate a progression from the pool per the configuration.
///
/// The slot count is `bars * chords_per_bar`; the 12-bar blues style has its
/// own entry point ([`twelve_bar_blues`]) and is not handled here.
pub fn generate<R: Rng>(
    pool: &ChordPool,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<Progression, ComposeError> {
    if pool.is_empty() {
        return Err(ComposeError::EmptyPool {
            context: format!("{} progression", config.key_name()),
        });
    }

    let chords_per_bar = config.chord_rate.chords_per_bar();
    let total_slots = (config.num_bars * chords_per_bar) as usize;
    let beats_per_chord = 4.0 / f64::from(chords_per_bar);

    let template: Option<&[&str]> = match config.progression_style {
        ProgressionStyle::Pop => Some(&POP_SEQUENCE),
        ProgressionStyle::Pachelbel => Some(&PACHELBEL_SEQUENCE),
        ProgressionStyle::TwoFiveOne => Some(&II_V_I_SEQUENCE),
        ProgressionStyle::SmoothRandom | ProgressionStyle::TwelveBarBlues => None,
    };

    let mut slots = Vec::with_capacity(total_slots);
    let mut warnings = Vec::new();
    // Voiced notes and base name of the previous chord, for smoothness.
    let mut previous: Option<(Vec<i32>, String)> = None;

    for slot_index in 0..total_slots {
        let from_template = template
            .and_then(|seq| {
                let label = seq[slot_index % seq.len()];
                find_by_function(pool, label, true, rng)
            })
            .and_then(|name| {
                let entry = pool.get(&name)?;
                let voiced = apply_voicing(&entry.notes, config.voicing, &name, rng)?;
                Some(Selection { base_name: name, voiced })
            });

        let selection = match from_template {
            Some(sel) => Some(sel),
            None => find_next_smooth(
                pool,
                previous.as_ref().map(|(notes, name)| (notes.as_slice(), name.as_str())),
                config.bias,
                config.voicing,
                rng,
            ),
        };

        match selection {
            Some(sel) => {
                previous = Some((sel.voiced.voiced_notes.clone(), sel.base_name.clone()));
                slots.push(Slot::Resolved(ChordSlot {
                    display_name: sel.voiced.display_name,
                    original_notes: sel.voiced.original_notes,
                    midi_notes: sel.voiced.midi_notes,
                    bass_root: sel.voiced.root_note,
                    duration_beats: beats_per_chord,
                }));
            }
            None => {
                warnings.push(format!("no chord could be selected for slot {slot_index}"));
                previous = None;
                slots.push(Slot::Unresolved {
                    reason: "no selectable chord".to_string(),
                    duration_beats: beats_per_chord,
                });
            }
        }
    }

    let mut progression = Progression { slots, warnings };
    apply_cadence(&mut progression, pool, config, beats_per_chord, rng);
    Ok(progression)
}

/// Overwrite the final slots so the progression ends on the requested cadence.
fn apply_cadence<R: Rng>(
    progression: &mut Progression,
    pool: &ChordPool,
    config: &GenerationConfig,
    beats_per_chord: f64,
    rng: &mut R,
) {
    if config.cadence == Cadence::Any || progression.slots.len() < 2 {
        return;
    }

    let tonic = find_by_function(pool, "I", false, rng);
    let approach_label = match config.cadence {
        Cadence::Authentic => "V",
        Cadence::Plagal => "IV",
        Cadence::Any => return,
    };
    let approach = find_by_function(pool, approach_label, true, rng);

    let (tonic_name, approach_name) = match (tonic, approach) {
        (Some(t), Some(a)) => (t, a),
        _ => {
            progression.warnings.push(format!(
                "cadence chords unavailable in pool, leaving ending as generated ({:?})",
                config.cadence
            ));
            return;
        }
    };

    let voice = |name: &str, rng: &mut R| -> Option<ChordSlot> {
        let entry = pool.get(name)?;
        let voiced = apply_voicing(&entry.notes, config.voicing, name, rng)?;
        Some(ChordSlot {
            display_name: voiced.display_name,
            original_notes: voiced.original_notes,
            midi_notes: voiced.midi_notes,
            bass_root: voiced.root_note,
            duration_beats: beats_per_chord,
        })
    };

    let last = progression.slots.len() - 1;
    match (voice(&approach_name, rng), voice(&tonic_name, rng)) {
        (Some(approach_slot), Some(tonic_slot)) => {
            progression.slots[last - 1] = Slot::Resolved(approach_slot);
            progression.slots[last] = Slot::Resolved(tonic_slot);
        }
        _ => {
            progression
                .warnings
                .push("cadence voicing failed, leaving ending as generated".to_string());
        }
    }
}

/// Pick the next chord by voice-leading distance.
///
/// With no previous chord the choice is uniform over the pool. Otherwise up
/// to [`SMOOTH_CANDIDATES`] entries (excluding the previous chord when
/// possible) are voiced and scored by distance between average pitches, with
/// the bias discounting favored qualities. Candidates whose top voiced note
/// stays within [`MAX_TOP_NOTE_RISE`] of the previous top note win over
/// unconstrained ones; if nothing scores, the previous chord (or a random
/// one) is reused.
fn find_next_smooth<R: Rng>(
    pool: &ChordPool,
    previous: Option<(&[i32], &str)>,
    bias: ChordBias,
    voicing_style: chordforge_spec::VoicingStyle,
    rng: &mut R,
) -> Option<Selection> {
    let pick = |name: &str, rng: &mut R| -> Option<Selection> {
        let entry = pool.get(name)?;
        let voiced = apply_voicing(&entry.notes, voicing_style, name, rng)?;
        Some(Selection { base_name: name.to_string(), voiced })
    };

    let (prev_notes, prev_name) = match previous {
        Some(prev) => prev,
        None => {
            let name = pool.names().choose(rng)?.clone();
            return pick(&name, rng);
        }
    };

    let prev_avg = theory::average_pitch(prev_notes);
    let prev_high = prev_notes.iter().copied().max().unwrap_or(0);

    let mut candidates: Vec<&String> =
        pool.names().iter().filter(|n| n.as_str() != prev_name).collect();
    if candidates.is_empty() {
        candidates = pool.names().iter().collect();
    }
    let sample_size = SMOOTH_CANDIDATES.min(candidates.len());
    let sampled: Vec<&String> = candidates
        .choose_multiple(rng, sample_size)
        .copied()
        .collect();

    let mut best_constrained: Option<(f64, Selection)> = None;
    let mut best_unconstrained: Option<(f64, Selection)> = None;

    for name in sampled {
        let entry = match pool.get(name) {
            Some(entry) => entry,
            None => continue,
        };
        let voiced = match apply_voicing(&entry.notes, voicing_style, name, rng) {
            Some(voiced) => voiced,
            None => continue,
        };

        let mut dist = (theory::average_pitch(&voiced.voiced_notes) - prev_avg).abs();
        let favored = match bias {
            ChordBias::Standard => false,
            ChordBias::Darker => entry.quality.is_dark(),
            ChordBias::Lighter => entry.quality.is_bright(),
        };
        if favored {
            dist *= BIAS_FACTOR;
        }

        let high = voiced.voiced_notes.iter().copied().max().unwrap_or(0);
        let selection = Selection { base_name: name.clone(), voiced };

        if high <= prev_high + MAX_TOP_NOTE_RISE
            && best_constrained.as_ref().map_or(true, |(d, _)| dist < *d)
        {
            best_constrained = Some((dist, selection));
        } else if best_unconstrained.as_ref().map_or(true, |(d, _)| dist < *d) {
            best_unconstrained = Some((dist, selection));
        }
    }

    if let Some((_, sel)) = best_constrained {
        return Some(sel);
    }
    if let Some((_, sel)) = best_unconstrained {
        return Some(sel);
    }
    // Fallback: repeat the previous chord, then anything.
    if pool.get(prev_name).is_some() {
        return pick(prev_name, rng);
    }
    let name = pool.names().choose(rng)?.clone();
    pick(&name, rng)
}

/// Generate the fixed 12-bar blues progression from a blues pool.
///
/// One chord per bar, 4 beats each, root position regardless of the
/// configured voicing. The pattern is the standard change:
/// I I I I / IV IV I I / V IV I V.
pub fn twelve_bar_blues(
    pool: &ChordPool,
    key_root: i32,
    key_type: KeyType,
) -> Result<Progression, ComposeError> {
    let name_at = |offset: i32, suffix: &str| {
        format!("{}{}", NOTE_NAMES[(key_root + offset).rem_euclid(12) as usize], suffix)
    };
    let (tonic, subdominant, dominant) = match key_type {
        KeyType::Major => (name_at(0, "7"), name_at(5, "7"), name_at(7, "7")),
        KeyType::Minor => (name_at(0, "m7"), name_at(5, "m7"), name_at(7, "7")),
    };

    for name in [&tonic, &subdominant, &dominant] {
        if pool.get(name).is_none() {
            return Err(ComposeError::MissingBluesChord { name: name.clone() });
        }
    }

    let pattern = [
        &tonic, &tonic, &tonic, &tonic,
        &subdominant, &subdominant, &tonic, &tonic,
        &dominant, &subdominant, &tonic, &dominant,
    ];

    let mut slots = Vec::with_capacity(12);
    for name in pattern {
        // Presence was checked above; a miss here would be a pool bug.
        let entry = pool
            .get(name)
            .ok_or_else(|| ComposeError::MissingBluesChord { name: name.clone() })?;
        slots.push(Slot::Resolved(ChordSlot {
            display_name: name.clone(),
            original_notes: entry.notes.clone(),
            midi_notes: theory::transpose(&entry.notes, CHORD_OCTAVE_SHIFT),
            bass_root: entry.notes[0],
            duration_beats: 4.0,
        }));
    }

    Ok(Progression { slots, warnings: Vec::new() })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use chordforge_spec::{
        Cadence, ChordBias, ChordRate, Complexity, GenerationConfig, KeyType, NoteName, PoolStyle,
        ProgressionStyle, VoicingStyle,
    };

    use crate::rng::rng_for;

    use super::*;

    fn base_config() -> GenerationConfig {
        GenerationConfig {
            num_bars: 4,
            ..GenerationConfig::default()
        }
    }

    fn resolved_names(progression: &Progression) -> Vec<String> {
        progression
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Resolved(s) => s.display_name.clone(),
                Slot::Unresolved { .. } => "?".to_string(),
            })
            .collect()
    }

    #[test]
    fn slot_count_and_duration_follow_config() {
        let config = base_config();
        let pool = ChordPool::build(60, KeyType::Major, PoolStyle::Diatonic, Complexity::Standard);
        let mut rng = rng_for(1, "progression");
        let progression = generate(&pool, &config, &mut rng).unwrap();
        assert_eq!(progression.slots.len(), 4);
        assert_eq!(progression.total_beats(), 16.0);

        let mut two_per_bar = base_config();
        two_per_bar.chord_rate = ChordRate::TwoPerBar;
        let progression = generate(&pool, &two_per_bar, &mut rng).unwrap();
        assert_eq!(progression.slots.len(), 8);
        for slot in &progression.slots {
            assert_eq!(slot.duration_beats(), 2.0);
        }
    }

    #[test]
    fn pop_template_hits_expected_roots() {
        let mut config = base_config();
        config.progression_style = ProgressionStyle::Pop;
        config.voicing = VoicingStyle::RootPosition;
        let pool = ChordPool::build(60, KeyType::Major, PoolStyle::Diatonic, Complexity::Standard);
        let mut rng = rng_for(5, "progression");
        let progression = generate(&pool, &config, &mut rng).unwrap();

        let expected_roots = [60, 69, 65, 67];
        for (slot, expected) in progression.slots.iter().zip(expected_roots) {
            let chord = slot.as_resolved().unwrap();
            assert_eq!(chord.bass_root, expected);
            // Template resolution prefers sevenths.
            assert!(chord.display_name.contains('7'), "{}", chord.display_name);
        }
    }

    #[test]
    fn pachelbel_template_cycles() {
        let mut config = base_config();
        config.num_bars = 8;
        config.progression_style = ProgressionStyle::Pachelbel;
        config.voicing = VoicingStyle::RootPosition;
        let pool = ChordPool::build(60, KeyType::Major, PoolStyle::Diatonic, Complexity::Standard);
        let mut rng = rng_for(6, "progression");
        let progression = generate(&pool, &config, &mut rng).unwrap();

        let roots: Vec<i32> = progression
            .slots
            .iter()
            .map(|s| s.as_resolved().unwrap().bass_root)
            .collect();
        assert_eq!(roots, vec![60, 67, 69, 64, 65, 60, 65, 67]);
    }

    #[test]
    fn authentic_cadence_ends_v_then_i() {
        let mut config = base_config();
        config.cadence = Cadence::Authentic;
        config.voicing = VoicingStyle::RootPosition;
        let pool = ChordPool::build(60, KeyType::Major, PoolStyle::Diatonic, Complexity::Standard);
        for seed in 0..10u32 {
            let mut rng = rng_for(seed, "progression");
            let progression = generate(&pool, &config, &mut rng).unwrap();
            let n = progression.slots.len();
            assert_eq!(progression.slots[n - 1].as_resolved().unwrap().bass_root, 60);
            assert_eq!(progression.slots[n - 2].as_resolved().unwrap().bass_root, 67);
        }
    }

    #[test]
    fn plagal_cadence_in_minor_uses_iv() {
        let mut config = base_config();
        config.key_root = NoteName::A;
        config.key_type = KeyType::Minor;
        config.cadence = Cadence::Plagal;
        config.voicing = VoicingStyle::RootPosition;
        let pool = ChordPool::build(69, KeyType::Minor, PoolStyle::Diatonic, Complexity::Standard);
        let mut rng = rng_for(9, "progression");
        let progression = generate(&pool, &config, &mut rng).unwrap();
        let n = progression.slots.len();
        // iv of A minor is D, tonic is A.
        assert_eq!(progression.slots[n - 1].as_resolved().unwrap().bass_root % 12, 9);
        assert_eq!(progression.slots[n - 2].as_resolved().unwrap().bass_root % 12, 2);
    }

    #[test]
    fn smooth_random_avoids_immediate_repeats() {
        let pool = ChordPool::build(60, KeyType::Major, PoolStyle::Diatonic, Complexity::Standard);
        let mut rng = rng_for(11, "progression");
        let mut config = base_config();
        config.num_bars = 16;
        let progression = generate(&pool, &config, &mut rng).unwrap();
        let names = resolved_names(&progression);
        // Base names (voicing suffixes stripped) should rarely repeat; with a
        // 14-chord pool and 5-candidate sampling they never should.
        for pair in names.windows(2) {
            let a = pair[0].split('/').next().unwrap();
            let b = pair[1].split('/').next().unwrap();
            assert_ne!(a, b);
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let config = base_config();
        let pool = ChordPool::build(60, KeyType::Major, PoolStyle::Diatonic, Complexity::Standard);
        let a = generate(&pool, &config, &mut rng_for(42, "progression")).unwrap();
        let b = generate(&pool, &config, &mut rng_for(42, "progression")).unwrap();
        assert_eq!(resolved_names(&a), resolved_names(&b));
    }

    #[test]
    fn darker_bias_shifts_selection_toward_minor() {
        let pool = ChordPool::build(60, KeyType::Major, PoolStyle::Diatonic, Complexity::Standard);
        let count_dark = |bias: ChordBias| {
            let mut config = base_config();
            config.num_bars = 32;
            config.bias = bias;
            let mut dark = 0usize;
            for seed in 0..8u32 {
                let progression = generate(&pool, &config, &mut rng_for(seed, "bias")).unwrap();
                for name in resolved_names(&progression) {
                    let base = name.split('/').next().unwrap_or(&name).to_string();
                    if base.contains('m') && !base.contains("maj") {
                        dark += 1;
                    }
                }
            }
            dark
        };
        assert!(count_dark(ChordBias::Darker) > count_dark(ChordBias::Lighter));
    }

    #[test]
    fn twelve_bar_blues_pattern_in_a_minor() {
        let pool = ChordPool::build_blues(69, KeyType::Minor);
        let progression = twelve_bar_blues(&pool, 69, KeyType::Minor).unwrap();
        let names: Vec<String> = progression
            .slots
            .iter()
            .map(|s| s.as_resolved().unwrap().display_name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "Am7", "Am7", "Am7", "Am7", "Dm7", "Dm7", "Am7", "Am7", "E7", "Dm7", "Am7", "E7"
            ]
        );
        assert_eq!(progression.total_beats(), 48.0);
        for slot in &progression.slots {
            let chord = slot.as_resolved().unwrap();
            assert_eq!(chord.midi_notes[0], chord.original_notes[0] - 12);
        }
    }

    #[test]
    fn blues_with_wrong_pool_is_an_error() {
        let pool = ChordPool::build(60, KeyType::Major, PoolStyle::Diatonic, Complexity::Standard);
        let err = twelve_bar_blues(&pool, 60, KeyType::Major).unwrap_err();
        assert!(matches!(err, ComposeError::MissingBluesChord { .. }));
    }

    #[test]
    fn empty_pool_is_an_error() {
        let empty = ChordPool::from_entries(std::collections::HashMap::new());
        let config = base_config();
        let err = generate(&empty, &config, &mut rng_for(1, "progression")).unwrap_err();
        assert!(matches!(err, ComposeError::EmptyPool { .. }));
    }
}
