//! Melody generation.
//!
//! Six melody styles plus a meta style that picks one at random. All of them
//! share the same contract: pitches are folded into the register's target
//! range and snapped onto the key scale before being emitted, so a melody
//! never carries a chromatic note even when a chord does. The instrument
//! choice nudges probabilities (leap rate, rest rate, chord-tone weight) and
//! plucks always play staccato.

use rand::seq::SliceRandom;
use rand::Rng;

use chordforge_spec::{Articulation, MelodyInstrument, MelodyRegister, MelodySpeed, MelodyStyle};

use crate::progression::{ChordSlot, Progression};
use crate::theory;

use super::{push_note, NoteEvent, TIME_EPSILON};

/// Per-beat rhythm placements: (offset within the beat, nominal duration).
type Placement = &'static [(f64, f64)];

const SLOW_PLACEMENTS: [Placement; 4] = [
    &[(0.0, 1.0)],
    &[(0.0, 0.5)],
    &[(0.0, 2.0)],
    &[(0.0, 0.75), (0.75, 0.25)],
];

const MEDIUM_PLACEMENTS: [Placement; 6] = [
    &[(0.0, 0.5)],
    &[(0.0, 1.0)],
    &[(0.0, 0.5), (0.5, 0.5)],
    &[(0.0, 0.25), (0.25, 0.25)],
    &[(0.0, 0.75), (0.75, 0.25)],
    &[(0.5, 0.5)],
];

const FAST_PLACEMENTS: [Placement; 7] = [
    &[(0.0, 0.25)],
    &[(0.0, 0.5)],
    &[(0.0, 0.25), (0.25, 0.25)],
    &[(0.0, 0.125), (0.125, 0.125)],
    &[(0.0, 0.333), (0.333, 0.333)],
    &[(0.0, 0.25), (0.5, 0.25)],
    &[(0.0, 0.166), (0.166, 0.166), (0.333, 0.166)],
];

fn placements(speed: MelodySpeed) -> &'static [Placement] {
    match speed {
        MelodySpeed::Slow => &SLOW_PLACEMENTS,
        MelodySpeed::Medium => &MEDIUM_PLACEMENTS,
        MelodySpeed::Fast => &FAST_PLACEMENTS,
    }
}

/// Settings shared by every melody style.
struct MelodyCtx {
    scale: Vec<i32>,
    scale_pcs: Vec<i32>,
    octave_shift: i32,
    target_min: i32,
    target_max: i32,
    extended_min: i32,
    extended_max: i32,
    /// `Some(duration)` when every note plays staccato.
    staccato: Option<f64>,
    instrument: MelodyInstrument,
}

impl MelodyCtx {
    fn new(
        scale: &[i32],
        register: MelodyRegister,
        articulation: Articulation,
        instrument: MelodyInstrument,
    ) -> Self {
        let (target_min, target_max) = register.target_range();
        let (extended_min, extended_max) = register.extended_range();
        let pluck = instrument == MelodyInstrument::Pluck;
        let staccato = if pluck {
            Some(0.1)
        } else if articulation == Articulation::Staccato {
            Some(0.15)
        } else {
            None
        };
        MelodyCtx {
            scale: scale.to_vec(),
            scale_pcs: theory::pitch_classes(scale),
            octave_shift: register.octave_shift(),
            target_min,
            target_max,
            extended_min,
            extended_max,
            staccato,
            instrument,
        }
    }

    /// Note duration after articulation, clipped to the remaining slot time.
    fn note_duration(&self, nominal: f64, remaining: f64) -> f64 {
        f64::min(self.staccato.unwrap_or(nominal), remaining)
    }

    /// Chord tones in the melody register that belong to the scale.
    fn diatonic_chord_tones(&self, chord: &ChordSlot) -> Vec<i32> {
        chord
            .original_notes
            .iter()
            .map(|n| n + self.octave_shift)
            .filter(|n| self.scale_pcs.contains(&n.rem_euclid(12)))
            .collect()
    }

    /// As above, restricted to the target range.
    fn diatonic_chord_tones_in_range(&self, chord: &ChordSlot) -> Vec<i32> {
        self.diatonic_chord_tones(chord)
            .into_iter()
            .filter(|n| (self.target_min..=self.target_max).contains(n))
            .collect()
    }

    /// Fold into the target range, snap onto the scale, and emit.
    ///
    /// Returns the emitted pitch for melodic-state tracking, or `None` when
    /// the note had to be dropped.
    fn emit(
        &self,
        events: &mut Vec<NoteEvent>,
        pitch: i32,
        start: f64,
        duration: f64,
    ) -> Option<i32> {
        let snapped =
            theory::snap_to_scale(pitch, &self.scale_pcs, self.target_min, self.target_max)?;
        push_note(events, snapped, start, duration, None);
        Some(snapped)
    }

    fn extended_scale(&self, shifts: &[i32]) -> Vec<i32> {
        let scale = theory::extended_scale(&self.scale, shifts, self.extended_min, self.extended_max);
        if scale.is_empty() {
            theory::scale_notes(60, false).to_vec()
        } else {
            scale
        }
    }

    fn random_scale_note<R: Rng>(&self, rng: &mut R) -> i32 {
        self.scale.choose(rng).copied().unwrap_or(60) + self.octave_shift
    }
}

/// Generate a melody track for the progression.
///
/// `RandomStyle` resolves to one of the concrete styles up front, so the
/// whole track stays in one idiom.
#[allow(clippy::too_many_arguments)]
pub fn generate<R: Rng>(
    progression: &Progression,
    scale: &[i32],
    style: MelodyStyle,
    speed: MelodySpeed,
    register: MelodyRegister,
    articulation: Articulation,
    instrument: MelodyInstrument,
    rng: &mut R,
) -> Vec<NoteEvent> {
    if scale.is_empty() {
        return Vec::new();
    }
    let style = if style == MelodyStyle::RandomStyle {
        *[
            MelodyStyle::ChordTone,
            MelodyStyle::ScaleWalker,
            MelodyStyle::Experimental,
            MelodyStyle::LeapsAndSteps,
            MelodyStyle::Minimalist,
            MelodyStyle::SustainedLead,
        ]
        .choose(rng)
        .unwrap_or(&MelodyStyle::ChordTone)
    } else {
        style
    };
    let ctx = MelodyCtx::new(scale, register, articulation, instrument);
    match style {
        MelodyStyle::ChordTone => chord_tone(progression, &ctx, speed, rng),
        MelodyStyle::ScaleWalker => scale_walker(progression, &ctx, speed, rng),
        MelodyStyle::Experimental => experimental(progression, &ctx, speed, rng),
        MelodyStyle::LeapsAndSteps => leaps_and_steps(progression, &ctx, speed, rng),
        MelodyStyle::Minimalist => minimalist(progression, &ctx, speed, rng),
        MelodyStyle::SustainedLead => sustained_lead(progression, &ctx, speed, rng),
        MelodyStyle::RandomStyle => unreachable!("resolved above"),
    }
}

/// Mostly chord tones with occasional stepwise motion.
fn chord_tone<R: Rng>(
    progression: &Progression,
    ctx: &MelodyCtx,
    speed: MelodySpeed,
    rng: &mut R,
) -> Vec<NoteEvent> {
    let (chord_weight, step_weight) = match ctx.instrument {
        MelodyInstrument::SynthLead => (0.6, 0.4),
        MelodyInstrument::Keys | MelodyInstrument::Piano => (0.8, 0.3),
        _ => (0.7, 0.3),
    };
    let extended = ctx.extended_scale(&[-24, -12, 0, 12, 24, 36]);
    let rhythm = placements(speed);

    let mut events = Vec::new();
    let mut cursor = 0.0;
    let mut last_note: Option<i32> = None;

    for slot in &progression.slots {
        let duration = slot.duration_beats();
        if let Some(chord) = slot.as_resolved() {
            let chord_tones = ctx.diatonic_chord_tones(chord);
            let beats = (duration + 0.5) as usize;
            for beat in 0..beats {
                if beat as f64 >= duration - TIME_EPSILON {
                    break;
                }
                let placement = rhythm.choose(rng).copied().unwrap_or(&[(0.0, 1.0)]);
                for (offset, nominal) in placement {
                    let in_chord = beat as f64 + offset;
                    if in_chord >= duration - TIME_EPSILON {
                        continue;
                    }
                    let dur = ctx.note_duration(*nominal, duration - in_chord);
                    if dur <= TIME_EPSILON {
                        continue;
                    }

                    let mut candidates: Vec<i32> = Vec::new();
                    if rng.gen_bool(chord_weight) && !chord_tones.is_empty() {
                        for _ in 0..3 {
                            candidates.extend_from_slice(&chord_tones);
                        }
                    }
                    if let Some(last) = last_note {
                        if rng.gen_bool(step_weight) {
                            candidates.extend(theory::stepwise_neighbors(&extended, last, 2));
                        }
                    }
                    if candidates.is_empty() {
                        candidates = if chord_tones.is_empty() {
                            vec![ctx.random_scale_note(rng)]
                        } else {
                            chord_tones.clone()
                        };
                    }

                    if let Some(pitch) = candidates.choose(rng) {
                        if let Some(emitted) = ctx.emit(&mut events, *pitch, cursor + in_chord, dur)
                        {
                            last_note = Some(emitted);
                        }
                    }
                }
            }
        }
        cursor += duration;
    }
    events
}

/// Stepwise motion with directional momentum through an extended scale.
fn scale_walker<R: Rng>(
    progression: &Progression,
    ctx: &MelodyCtx,
    speed: MelodySpeed,
    rng: &mut R,
) -> Vec<NoteEvent> {
    let direction_change_prob = if ctx.instrument == MelodyInstrument::SynthLead {
        0.4
    } else {
        0.3
    };
    let extended = ctx.extended_scale(&[-24, -12, 0, 12, 24, 36]);
    let rhythm = placements(speed);

    let starts: Vec<i32> = extended
        .iter()
        .copied()
        .filter(|n| (ctx.target_min..=ctx.target_max).contains(n))
        .collect();
    let mut last_note = starts
        .choose(rng)
        .or_else(|| extended.choose(rng))
        .copied()
        .unwrap_or(60 + ctx.octave_shift);
    let mut direction: i32 = 0;

    let mut events = Vec::new();
    let mut cursor = 0.0;

    for slot in &progression.slots {
        let duration = slot.duration_beats();
        if let Some(chord) = slot.as_resolved() {
            let chord_tones = ctx.diatonic_chord_tones(chord);
            let beats = (duration + 0.5) as usize;
            for beat in 0..beats {
                if beat as f64 >= duration - TIME_EPSILON {
                    break;
                }
                let placement = rhythm.choose(rng).copied().unwrap_or(&[(0.0, 1.0)]);
                for (offset, nominal) in placement {
                    let in_chord = beat as f64 + offset;
                    if in_chord >= duration - TIME_EPSILON {
                        continue;
                    }
                    let dur = ctx.note_duration(*nominal, duration - in_chord);
                    if dur <= TIME_EPSILON {
                        continue;
                    }

                    if rng.gen_bool(direction_change_prob) {
                        direction = -direction;
                    }
                    if direction == 0 {
                        direction = *[-1, 1].choose(rng).unwrap_or(&1);
                    }

                    let anchor = extended
                        .iter()
                        .enumerate()
                        .min_by_key(|(_, n)| (*n - last_note).abs())
                        .map(|(idx, _)| idx as isize)
                        .unwrap_or(0);
                    let mut candidates: Vec<i32> = Vec::new();
                    for step in [-2isize, -1, 1, 2] {
                        let idx = anchor + step;
                        if idx < 0 || idx as usize >= extended.len() {
                            continue;
                        }
                        let note = extended[idx as usize];
                        let preferred = (step > 0) == (direction > 0);
                        let weight = if preferred { 5 } else { 2 };
                        for _ in 0..weight {
                            candidates.push(note);
                        }
                    }
                    if rng.gen_bool(0.2) && !chord_tones.is_empty() {
                        candidates.extend_from_slice(&chord_tones);
                    }
                    if candidates.is_empty() {
                        candidates = if chord_tones.is_empty() {
                            vec![ctx.random_scale_note(rng)]
                        } else {
                            chord_tones.clone()
                        };
                    }

                    if let Some(pitch) = candidates.choose(rng).copied() {
                        if pitch != last_note {
                            direction = if pitch > last_note { 1 } else { -1 };
                        }
                        if let Some(emitted) = ctx.emit(&mut events, pitch, cursor + in_chord, dur)
                        {
                            last_note = emitted;
                        }
                    }
                }
            }
        }
        cursor += duration;
    }
    events
}

/// Motif-driven rhythms cycling through chord tones.
fn experimental<R: Rng>(
    progression: &Progression,
    ctx: &MelodyCtx,
    speed: MelodySpeed,
    rng: &mut R,
) -> Vec<NoteEvent> {
    let motifs: &[&[f64]] = if ctx.instrument == MelodyInstrument::Pluck {
        &[
            &[0.25, 0.25, 0.25, 0.25],
            &[0.5, 0.25, 0.25],
            &[0.125, 0.125, 0.125, 0.125, 0.125, 0.125, 0.125, 0.125],
        ]
    } else {
        match speed {
            MelodySpeed::Slow => &[
                &[1.0, 1.0, 1.0, 1.0],
                &[2.0, 1.0, 1.0],
                &[2.0, 2.0],
                &[1.5, 1.5, 1.0],
                &[4.0],
            ],
            MelodySpeed::Fast => &[
                &[0.5, 0.5, 0.5, 0.5],
                &[0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25],
                &[0.75, 0.25, 0.75, 0.25],
                &[0.5, 0.25, 0.25, 0.5, 0.25, 0.25],
                &[0.333, 0.333, 0.333, 0.333, 0.333, 0.333],
            ],
            MelodySpeed::Medium => &[
                &[0.5, 0.5, 1.0, 1.0],
                &[1.0, 0.5, 0.5, 1.0],
                &[1.0, 1.0, 0.5, 0.5],
                &[1.0, 1.0],
            ],
        }
    };
    let extended = ctx.extended_scale(&[-12, 0, 12, 24]);

    let mut events = Vec::new();
    let mut cursor = 0.0;
    let mut last_note: Option<i32> = None;

    for slot in &progression.slots {
        let duration = slot.duration_beats();
        if let Some(chord) = slot.as_resolved() {
            let chord_tones = ctx.diatonic_chord_tones_in_range(chord);
            let motif = motifs.choose(rng).copied().unwrap_or(&[1.0]);
            let mut tone_index = if chord_tones.is_empty() {
                0
            } else {
                rng.gen_range(0..chord_tones.len())
            };

            let mut time_in_chord = 0.0;
            let mut motif_index = 0usize;
            while time_in_chord < duration - TIME_EPSILON {
                let mut step = motif[motif_index % motif.len()];
                let remaining = duration - time_in_chord;
                if step > remaining + TIME_EPSILON {
                    step = remaining;
                }
                let dur = ctx.note_duration(step, remaining);
                if dur > TIME_EPSILON {
                    let mut candidates: Vec<i32> = Vec::new();
                    if !chord_tones.is_empty() {
                        let tone = chord_tones[tone_index % chord_tones.len()];
                        for _ in 0..5 {
                            candidates.push(tone);
                        }
                        tone_index += 1;
                    }
                    if let Some(last) = last_note {
                        if rng.gen_bool(0.3) {
                            candidates.extend(theory::stepwise_neighbors(&extended, last, 3));
                        }
                    }
                    let pitch = candidates
                        .choose(rng)
                        .copied()
                        .unwrap_or_else(|| ctx.random_scale_note(rng));
                    if let Some(emitted) =
                        ctx.emit(&mut events, pitch, cursor + time_in_chord, dur)
                    {
                        last_note = Some(emitted);
                    }
                }
                time_in_chord += step;
                motif_index += 1;
            }
        }
        cursor += duration;
    }
    events
}

/// Alternating leaps to chord tones and single-step motion.
fn leaps_and_steps<R: Rng>(
    progression: &Progression,
    ctx: &MelodyCtx,
    speed: MelodySpeed,
    rng: &mut R,
) -> Vec<NoteEvent> {
    let leap_prob = match ctx.instrument {
        MelodyInstrument::SynthLead => 0.6,
        MelodyInstrument::Piano => 0.35,
        _ => 0.45,
    };
    let extended = ctx.extended_scale(&[-24, -12, 0, 12, 24, 36]);
    let rhythm = placements(speed);

    let starts: Vec<i32> = extended
        .iter()
        .copied()
        .filter(|n| (ctx.target_min..=ctx.target_max).contains(n))
        .collect();
    let mut last_note = starts
        .choose(rng)
        .or_else(|| extended.choose(rng))
        .copied()
        .unwrap_or(60 + ctx.octave_shift);

    let mut events = Vec::new();
    let mut cursor = 0.0;

    for slot in &progression.slots {
        let duration = slot.duration_beats();
        if let Some(chord) = slot.as_resolved() {
            let leap_targets = ctx.diatonic_chord_tones_in_range(chord);
            let beats = (duration + 0.5) as usize;
            for beat in 0..beats {
                if beat as f64 >= duration - TIME_EPSILON {
                    break;
                }
                let placement = rhythm.choose(rng).copied().unwrap_or(&[(0.0, 1.0)]);
                for (offset, nominal) in placement {
                    let in_chord = beat as f64 + offset;
                    if in_chord >= duration - TIME_EPSILON {
                        continue;
                    }
                    let dur = ctx.note_duration(*nominal, duration - in_chord);
                    if dur <= TIME_EPSILON {
                        continue;
                    }

                    let mut candidates: Vec<i32> =
                        if rng.gen_bool(leap_prob) && !leap_targets.is_empty() {
                            let away: Vec<i32> = leap_targets
                                .iter()
                                .copied()
                                .filter(|n| *n != last_note)
                                .collect();
                            if away.is_empty() {
                                leap_targets.clone()
                            } else {
                                away
                            }
                        } else {
                            theory::stepwise_neighbors(&extended, last_note, 1)
                        };
                    if candidates.is_empty() {
                        candidates = if leap_targets.is_empty() {
                            extended.clone()
                        } else {
                            leap_targets.clone()
                        };
                    }

                    let pitch = candidates
                        .choose(rng)
                        .copied()
                        .unwrap_or_else(|| ctx.random_scale_note(rng));
                    if let Some(emitted) = ctx.emit(&mut events, pitch, cursor + in_chord, dur) {
                        last_note = emitted;
                    }
                }
            }
        }
        cursor += duration;
    }
    events
}

/// Sparse stable chord tones with deliberate rests.
fn minimalist<R: Rng>(
    progression: &Progression,
    ctx: &MelodyCtx,
    speed: MelodySpeed,
    rng: &mut R,
) -> Vec<NoteEvent> {
    let rhythm_options: &[Placement] = match speed {
        MelodySpeed::Slow => &[
            &[(0.0, 2.0)],
            &[(0.0, 1.0)],
            &[(0.0, 4.0)],
            &[(0.5, 1.0)],
            &[(1.0, 2.0)],
        ],
        MelodySpeed::Fast => &[
            &[(0.0, 0.5)],
            &[(0.0, 0.25)],
            &[(0.0, 1.0)],
            &[(0.25, 0.5)],
            &[(0.75, 0.25)],
        ],
        MelodySpeed::Medium => &[
            &[(0.0, 1.0)],
            &[(0.0, 0.5), (0.5, 0.5)],
            &[(0.0, 2.0)],
            &[(0.5, 1.0)],
            &[(1.0, 1.0)],
        ],
    };
    const BASE_REST_RESET: f64 = 0.35;
    let base_rest = match ctx.instrument {
        MelodyInstrument::Piano | MelodyInstrument::Keys => 0.45,
        MelodyInstrument::Pluck => 0.2,
        _ => BASE_REST_RESET,
    };
    const REST_DURATIONS: [f64; 4] = [0.5, 1.0, 1.5, 2.0];
    // Root, third, fifth of the chord as stored.
    const STABLE_INDICES: [usize; 3] = [0, 2, 4];

    let mut rest_prob = base_rest;
    let mut events = Vec::new();
    let mut cursor = 0.0;

    for slot in &progression.slots {
        let duration = slot.duration_beats();
        if let Some(chord) = slot.as_resolved() {
            let in_range = |n: &i32| (ctx.target_min..=ctx.target_max).contains(n);
            let mut stable: Vec<i32> = chord
                .original_notes
                .iter()
                .enumerate()
                .filter(|(idx, _)| STABLE_INDICES.contains(idx))
                .map(|(_, n)| n + ctx.octave_shift)
                .filter(|n| self_diatonic(ctx, *n) && in_range(n))
                .collect();
            if stable.is_empty() {
                stable = ctx.diatonic_chord_tones_in_range(chord);
            }
            if stable.is_empty() {
                stable = ctx
                    .scale
                    .iter()
                    .map(|n| n + ctx.octave_shift)
                    .filter(in_range)
                    .collect();
            }
            if stable.is_empty() {
                stable.push(60 + ctx.octave_shift);
            }

            let mut time_in_chord = 0.0;
            while time_in_chord < duration - TIME_EPSILON {
                if rng.gen_bool(rest_prob) {
                    let rest = *REST_DURATIONS.choose(rng).unwrap_or(&1.0);
                    time_in_chord += f64::min(rest, duration - time_in_chord);
                    continue;
                }

                let placement = rhythm_options.choose(rng).copied().unwrap_or(&[(0.0, 1.0)]);
                let pattern_len: f64 = placement.iter().map(|(_, d)| d).sum();
                let pattern_start = time_in_chord;
                let mut played = 0usize;

                for (offset, nominal) in placement {
                    let start_in_chord = pattern_start + offset;
                    if start_in_chord >= duration - TIME_EPSILON {
                        break;
                    }
                    let dur = ctx.note_duration(*nominal, duration - start_in_chord);
                    if dur <= TIME_EPSILON {
                        continue;
                    }
                    if let Some(pitch) = stable.choose(rng) {
                        if ctx
                            .emit(&mut events, *pitch, cursor + start_in_chord, dur)
                            .is_some()
                        {
                            played += 1;
                        }
                    }
                }

                time_in_chord = f64::min(pattern_start + pattern_len, duration);
                if played == 0 {
                    rest_prob = f64::min(0.8, rest_prob + 0.1);
                } else {
                    rest_prob = BASE_REST_RESET;
                }
            }
        }
        cursor += duration;
    }
    events
}

fn self_diatonic(ctx: &MelodyCtx, pitch: i32) -> bool {
    ctx.scale_pcs.contains(&pitch.rem_euclid(12))
}

/// Long held notes anchored on the chord root, with occasional deviations.
fn sustained_lead<R: Rng>(
    progression: &Progression,
    ctx: &MelodyCtx,
    speed: MelodySpeed,
    rng: &mut R,
) -> Vec<NoteEvent> {
    // Fractions of the whole slot: (start fraction, duration fraction).
    let rhythm_patterns: &[Placement] = if ctx.instrument == MelodyInstrument::Pluck {
        &[
            &[(0.0, 0.25), (0.25, 0.25), (0.5, 0.25), (0.75, 0.25)],
            &[
                (0.0, 0.125),
                (0.125, 0.125),
                (0.25, 0.125),
                (0.375, 0.125),
                (0.5, 0.125),
                (0.625, 0.125),
                (0.75, 0.125),
                (0.875, 0.125),
            ],
        ]
    } else {
        match speed {
            MelodySpeed::Slow => &[
                &[(0.0, 1.0)],
                &[(0.0, 0.5), (0.5, 0.5)],
                &[(0.0, 0.75), (0.75, 0.25)],
            ],
            MelodySpeed::Fast => &[
                &[(0.0, 0.25), (0.25, 0.25), (0.5, 0.25), (0.75, 0.25)],
                &[(0.0, 0.5), (0.5, 0.25), (0.75, 0.25)],
                &[(0.0, 1.0)],
            ],
            MelodySpeed::Medium => &[
                &[(0.0, 0.5)],
                &[(0.0, 0.25), (0.25, 0.25)],
                &[(0.0, 0.33), (0.33, 0.33), (0.66, 0.34)],
            ],
        }
    };
    let deviation_prob = match ctx.instrument {
        MelodyInstrument::Piano | MelodyInstrument::Keys => 0.2,
        _ => 0.3,
    };

    let mut events = Vec::new();
    let mut cursor = 0.0;

    for slot in &progression.slots {
        let duration = slot.duration_beats();
        if let Some(chord) = slot.as_resolved() {
            let chord_tones = ctx.diatonic_chord_tones_in_range(chord);
            let anchor = chord.bass_root + ctx.octave_shift;
            let target = if self_diatonic(ctx, anchor)
                && (ctx.target_min..=ctx.target_max).contains(&anchor)
            {
                anchor
            } else if let Some(tone) = chord_tones.choose(rng) {
                *tone
            } else {
                ctx.random_scale_note(rng)
            };

            let pattern = rhythm_patterns.choose(rng).copied().unwrap_or(&[(0.0, 1.0)]);
            for (start_frac, dur_frac) in pattern {
                let start_in_chord = duration * start_frac;
                let nominal = duration * dur_frac;
                let dur = ctx.note_duration(nominal, duration - start_in_chord);
                if dur <= TIME_EPSILON {
                    continue;
                }
                let mut pitch = target;
                if rng.gen_bool(deviation_prob) && chord_tones.len() > 1 {
                    let others: Vec<i32> = chord_tones
                        .iter()
                        .copied()
                        .filter(|n| *n != target)
                        .collect();
                    if let Some(other) = others.choose(rng) {
                        pitch = *other;
                    }
                }
                ctx.emit(&mut events, pitch, cursor + start_in_chord, dur);
            }
        }
        cursor += duration;
    }
    events
}

#[cfg(test)]
mod tests {
    use chordforge_spec::KeyType;
    use pretty_assertions::assert_eq;

    use crate::parts::testutil::progression_of;
    use crate::pool::ChordPool;
    use crate::progression::twelve_bar_blues;
    use crate::rng::rng_for;
    use crate::theory::scale_notes;

    use super::*;

    const ALL_STYLES: [MelodyStyle; 7] = [
        MelodyStyle::ChordTone,
        MelodyStyle::ScaleWalker,
        MelodyStyle::Experimental,
        MelodyStyle::LeapsAndSteps,
        MelodyStyle::Minimalist,
        MelodyStyle::SustainedLead,
        MelodyStyle::RandomStyle,
    ];

    fn test_progression() -> crate::progression::Progression {
        progression_of(&[
            ("Cmaj", &[60, 64, 67]),
            ("Am7", &[69, 72, 76, 79]),
            ("Fmaj7", &[65, 69, 72, 76]),
            ("G7", &[67, 71, 74, 77]),
        ])
    }

    #[test]
    fn every_style_emits_only_diatonic_notes_in_range() {
        let progression = test_progression();
        let scale = scale_notes(60, false);
        let pcs: Vec<i32> = scale.iter().map(|n| n.rem_euclid(12)).collect();
        for style in ALL_STYLES {
            for seed in 0..4u32 {
                let mut rng = rng_for(seed, "melody");
                let events = generate(
                    &progression,
                    &scale,
                    style,
                    MelodySpeed::Medium,
                    MelodyRegister::Mid,
                    Articulation::Legato,
                    MelodyInstrument::None,
                    &mut rng,
                );
                assert!(!events.is_empty(), "{style:?} produced nothing");
                for event in &events {
                    let pitch = event.pitch as i32;
                    assert!((60..=84).contains(&pitch), "{style:?}: {pitch} out of range");
                    assert!(pcs.contains(&pitch.rem_euclid(12)), "{style:?}: {pitch} chromatic");
                    assert!(event.start_beats < 16.0 + TIME_EPSILON);
                    assert!(event.velocity.is_none());
                }
            }
        }
    }

    #[test]
    fn high_register_shifts_the_range() {
        let progression = test_progression();
        let scale = scale_notes(60, false);
        let mut rng = rng_for(1, "melody");
        let events = generate(
            &progression,
            &scale,
            MelodyStyle::ChordTone,
            MelodySpeed::Medium,
            MelodyRegister::High,
            Articulation::Legato,
            MelodyInstrument::None,
            &mut rng,
        );
        for event in &events {
            assert!((72..=96).contains(&(event.pitch as i32)));
        }
    }

    #[test]
    fn staccato_caps_note_durations() {
        let progression = test_progression();
        let scale = scale_notes(60, false);
        let mut rng = rng_for(2, "melody");
        let events = generate(
            &progression,
            &scale,
            MelodyStyle::SustainedLead,
            MelodySpeed::Slow,
            MelodyRegister::Mid,
            Articulation::Staccato,
            MelodyInstrument::None,
            &mut rng,
        );
        for event in &events {
            assert!(event.duration_beats <= 0.15 + f64::EPSILON);
        }
    }

    #[test]
    fn pluck_forces_short_notes_even_when_legato() {
        let progression = test_progression();
        let scale = scale_notes(60, false);
        let mut rng = rng_for(3, "melody");
        let events = generate(
            &progression,
            &scale,
            MelodyStyle::ChordTone,
            MelodySpeed::Medium,
            MelodyRegister::Mid,
            Articulation::Legato,
            MelodyInstrument::Pluck,
            &mut rng,
        );
        assert!(!events.is_empty());
        for event in &events {
            assert!(event.duration_beats <= 0.1 + f64::EPSILON);
        }
    }

    #[test]
    fn sustained_lead_anchors_on_the_root() {
        let progression = progression_of(&[("Cmaj", &[60, 64, 67])]);
        let scale = scale_notes(60, false);
        let mut anchored = 0usize;
        let mut total = 0usize;
        for seed in 0..20u32 {
            let mut rng = rng_for(seed, "melody");
            let events = generate(
                &progression,
                &scale,
                MelodyStyle::SustainedLead,
                MelodySpeed::Slow,
                MelodyRegister::Mid,
                Articulation::Legato,
                MelodyInstrument::None,
                &mut rng,
            );
            for event in events {
                total += 1;
                if event.pitch % 12 == 0 {
                    anchored += 1;
                }
            }
        }
        assert!(total > 0);
        assert!(anchored * 2 > total, "{anchored}/{total} anchored");
    }

    #[test]
    fn melody_over_blues_snaps_chromatic_chord_tones() {
        // Dominant sevenths carry non-diatonic tones; the melody must not.
        let pool = ChordPool::build_blues(60, KeyType::Major);
        let progression = twelve_bar_blues(&pool, 60, KeyType::Major).unwrap();
        let scale = scale_notes(60, false);
        let pcs: Vec<i32> = scale.iter().map(|n| n.rem_euclid(12)).collect();
        let mut rng = rng_for(4, "melody");
        let events = generate(
            &progression,
            &scale,
            MelodyStyle::ChordTone,
            MelodySpeed::Medium,
            MelodyRegister::Mid,
            Articulation::Legato,
            MelodyInstrument::None,
            &mut rng,
        );
        assert!(!events.is_empty());
        for event in &events {
            assert!(pcs.contains(&((event.pitch as i32).rem_euclid(12))));
        }
    }

    #[test]
    fn empty_scale_is_silent() {
        let progression = test_progression();
        let mut rng = rng_for(5, "melody");
        let events = generate(
            &progression,
            &[],
            MelodyStyle::ChordTone,
            MelodySpeed::Medium,
            MelodyRegister::Mid,
            Articulation::Legato,
            MelodyInstrument::None,
            &mut rng,
        );
        assert_eq!(events, vec![]);
    }
}
