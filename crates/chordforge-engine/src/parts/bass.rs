//! Bassline generation.
//!
//! Six styles, all anchored on each slot's root-position root. Most styles
//! fold the root into a two-and-a-half-octave bass register; the 808 style
//! sits an octave lower with long sustains.

use rand::seq::SliceRandom;
use rand::Rng;

use chordforge_spec::BassStyle;

use crate::progression::Progression;
use crate::theory;

use super::{push_note, NoteEvent, TIME_EPSILON};

const BASS_OCTAVE_SHIFT: i32 = -24;
const BASS_MIN: i32 = 28;
const BASS_MAX: i32 = 60;

/// Generate a bass track for the progression.
///
/// `scale` is the seven diatonic pitches of the key; only the walking style
/// consumes it. Unresolved slots leave silence of the slot's duration.
pub fn generate<R: Rng>(
    progression: &Progression,
    scale: &[i32],
    style: BassStyle,
    rng: &mut R,
) -> Vec<NoteEvent> {
    match style {
        BassStyle::Standard => standard(progression),
        BassStyle::Walking => walking(progression, scale, rng),
        BassStyle::Pop => pop(progression, rng),
        BassStyle::Rnb => rnb(progression, rng),
        BassStyle::HipHop => hip_hop(progression, rng),
        BassStyle::EightOhEight => eight_oh_eight(progression),
    }
}

fn folded_root(bass_root: i32) -> i32 {
    theory::fold_into_range(bass_root + BASS_OCTAVE_SHIFT, BASS_MIN, BASS_MAX)
}

/// One root per slot, held for most of the slot.
fn standard(progression: &Progression) -> Vec<NoteEvent> {
    let mut events = Vec::new();
    let mut cursor = 0.0;
    for slot in &progression.slots {
        let duration = slot.duration_beats();
        if let Some(chord) = slot.as_resolved() {
            if duration >= 0.1 {
                let pitch = folded_root(chord.bass_root);
                push_note(&mut events, pitch, cursor, f64::max(0.1, duration * 0.9), None);
            }
        }
        cursor += duration;
    }
    events
}

/// Quarter-note walk through an extended bass scale.
///
/// Each slot restarts on the chord root's nearest scale pitch, then moves by
/// at most two diatonic steps per beat.
fn walking<R: Rng>(progression: &Progression, scale: &[i32], rng: &mut R) -> Vec<NoteEvent> {
    if scale.is_empty() {
        return Vec::new();
    }
    // Let the walk overshoot the root register slightly at the top.
    let mut bass_scale = theory::extended_scale(scale, &[-36, -24, -12], BASS_MIN, BASS_MAX + 7);
    if bass_scale.is_empty() {
        let pcs = theory::pitch_classes(scale);
        bass_scale = (BASS_MIN..=BASS_MAX)
            .filter(|n| pcs.contains(&n.rem_euclid(12)))
            .collect();
    }
    if bass_scale.is_empty() {
        return Vec::new();
    }

    let mut events = Vec::new();
    let mut cursor = 0.0;
    for slot in &progression.slots {
        let duration = slot.duration_beats();
        let chord = match slot.as_resolved() {
            Some(chord) => chord,
            None => {
                cursor += duration;
                continue;
            }
        };

        let target = folded_root(chord.bass_root);
        let start_note = bass_scale
            .iter()
            .copied()
            .min_by_key(|n| ((n - target).abs(), *n))
            .unwrap_or(target);

        let steps = (duration + 0.5) as usize;
        let mut walk = Vec::with_capacity(steps);
        walk.push(start_note);
        let mut current = start_note;
        for _ in 1..steps {
            let neighbors = theory::stepwise_neighbors(&bass_scale, current, 2);
            // Fold overshoots down an octave; a flat clamp would land on a
            // pitch class outside the key.
            let next = neighbors
                .choose(rng)
                .copied()
                .map(|n| if n > BASS_MAX { n - 12 } else { n })
                .unwrap_or(current);
            walk.push(next);
            current = next;
        }

        for (beat, pitch) in walk.iter().enumerate() {
            let start = cursor + beat as f64;
            if start < cursor + duration {
                let dur = f64::min(0.95, cursor + duration - start);
                push_note(&mut events, *pitch, start, dur, None);
            }
        }
        cursor += duration;
    }
    events
}

/// Quarter-note roots with occasional octave jumps on off beats.
fn pop<R: Rng>(progression: &Progression, rng: &mut R) -> Vec<NoteEvent> {
    let mut events = Vec::new();
    let mut cursor = 0.0;
    for slot in &progression.slots {
        let duration = slot.duration_beats();
        if let Some(chord) = slot.as_resolved() {
            let root = folded_root(chord.bass_root);
            let beats = (duration + 0.5) as usize;
            for beat in 0..beats {
                let start = cursor + beat as f64;
                if start >= cursor + duration {
                    break;
                }
                let mut pitch = root;
                // The octave jump only fires when it fits the register; a
                // capped jump would change the pitch class.
                if beat % 2 == 1 && duration >= 2.0 && rng.gen_bool(0.3) && root + 12 <= BASS_MAX {
                    pitch = root + 12;
                }
                let dur = f64::min(0.9, cursor + duration - start);
                if dur > 0.05 {
                    push_note(&mut events, pitch, start, dur, None);
                }
            }
        }
        cursor += duration;
    }
    events
}

/// Root/fifth figures over a small set of eighth-note rhythms.
///
/// The pattern plays once at the top of each slot; longer slots keep the
/// remaining space open.
fn rnb<R: Rng>(progression: &Progression, rng: &mut R) -> Vec<NoteEvent> {
    const RHYTHMS: [&[(f64, f64)]; 4] = [
        &[(0.0, 0.75)],
        &[(0.0, 0.5), (0.5, 0.5)],
        &[(0.0, 0.75), (0.75, 0.25)],
        &[(0.0, 1.5)],
    ];
    const RNB_MAX: i32 = 65;

    let mut events = Vec::new();
    let mut cursor = 0.0;
    for slot in &progression.slots {
        let duration = slot.duration_beats();
        if let Some(chord) = slot.as_resolved() {
            let root = theory::fold_into_range(chord.bass_root + BASS_OCTAVE_SHIFT, BASS_MIN, RNB_MAX);
            let mut fifth = root + 7;
            if fifth > RNB_MAX {
                fifth -= 12;
            }
            let rhythm = RHYTHMS.choose(rng).copied().unwrap_or(RHYTHMS[0]);
            for (offset, dur) in rhythm {
                let start = cursor + offset;
                let pitch = if rng.gen_bool(0.7) { root } else { fifth };
                let clipped = f64::min(*dur, duration - offset);
                if start < cursor + duration && clipped > 0.05 {
                    push_note(&mut events, pitch, start, clipped * 0.9, None);
                }
            }
        }
        cursor += duration;
    }
    events
}

/// Sparse syncopated roots in a low register.
fn hip_hop<R: Rng>(progression: &Progression, rng: &mut R) -> Vec<NoteEvent> {
    const RHYTHMS: [&[(f64, f64)]; 4] = [
        &[(0.0, 0.75)],
        &[(0.5, 0.75)],
        &[(0.0, 0.4), (0.5, 0.4)],
        &[(0.75, 0.75)],
    ];
    const HIP_HOP_MAX: i32 = 55;

    let mut events = Vec::new();
    let mut cursor = 0.0;
    for slot in &progression.slots {
        let duration = slot.duration_beats();
        if let Some(chord) = slot.as_resolved() {
            let root =
                theory::fold_into_range(chord.bass_root + BASS_OCTAVE_SHIFT, BASS_MIN, HIP_HOP_MAX);
            let rhythm = RHYTHMS.choose(rng).copied().unwrap_or(RHYTHMS[0]);
            for (offset, dur) in rhythm {
                let start = cursor + offset;
                let clipped = f64::min(dur * 0.9, duration - offset);
                if start < cursor + duration && clipped > 0.05 {
                    push_note(&mut events, root, start, clipped, None);
                }
            }
        }
        cursor += duration;
    }
    events
}

/// One long sub-bass note per slot.
fn eight_oh_eight(progression: &Progression) -> Vec<NoteEvent> {
    const SHIFT: i32 = -36;
    const MIN: i32 = 20;
    const MAX: i32 = 48;

    let mut events = Vec::new();
    let mut cursor = 0.0;
    for slot in &progression.slots {
        let duration = slot.duration_beats();
        if let Some(chord) = slot.as_resolved() {
            let mut pitch = chord.bass_root + SHIFT;
            while pitch < MIN {
                pitch += 12;
            }
            let pitch = pitch.clamp(MIN, MAX);
            push_note(&mut events, pitch, cursor, f64::max(0.5, duration * 0.98), None);
        }
        cursor += duration;
    }
    events
}
