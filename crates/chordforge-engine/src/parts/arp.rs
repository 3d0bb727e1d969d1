//! Arpeggio generation.
//!
//! Arpeggios draw only on diatonic chord tones. Each slot builds a note pool
//! from the chord's root-position notes (filtered to the scale) expanded over
//! the configured octave shifts, then plays a pattern of pool indices in
//! eighths and sixteenths until the slot is full.

use rand::seq::SliceRandom;
use rand::Rng;

use chordforge_spec::{ArpOctaves, ArpStyle};

use crate::progression::Progression;
use crate::theory;

use super::{push_note, NoteEvent, TIME_EPSILON};

const ARP_VELOCITY: i32 = 95;
const NOTE_DURATIONS: [f64; 2] = [0.5, 0.25];

/// An index pattern shape over a note pool of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    Ascending,
    Descending,
    UpDown,
    RandomNotes,
    ConvergeDiverge,
}

const ALL_PATTERNS: [PatternKind; 5] = [
    PatternKind::Ascending,
    PatternKind::Descending,
    PatternKind::UpDown,
    PatternKind::RandomNotes,
    PatternKind::ConvergeDiverge,
];

impl PatternKind {
    /// Produce the index sequence for a pool of `size` notes.
    fn indices<R: Rng>(self, size: usize, rng: &mut R) -> Vec<usize> {
        if size == 0 {
            return Vec::new();
        }
        match self {
            PatternKind::Ascending => (0..size).collect(),
            PatternKind::Descending => (0..size).rev().collect(),
            PatternKind::UpDown => {
                let mut indices: Vec<usize> = (0..size).collect();
                indices.extend((0..size.saturating_sub(1)).rev());
                indices
            }
            PatternKind::RandomNotes => {
                let len = *[8usize, 12, 16].choose(rng).unwrap_or(&8);
                (0..len).map(|_| rng.gen_range(0..size)).collect()
            }
            PatternKind::ConvergeDiverge => converge_diverge(size, rng),
        }
    }
}

/// Outside-in or inside-out index walk, padded to eight steps.
fn converge_diverge<R: Rng>(size: usize, rng: &mut R) -> Vec<usize> {
    let mut pattern = Vec::new();
    if rng.gen_bool(0.5) {
        let mut low = 0usize;
        let mut high = size - 1;
        while low <= high {
            pattern.push(low);
            if low != high {
                pattern.push(high);
            }
            low += 1;
            if high == 0 {
                break;
            }
            high -= 1;
        }
    } else {
        let mid = size / 2;
        let (mut left, mut right) = if size % 2 == 1 {
            pattern.push(mid);
            (mid as isize - 1, mid + 1)
        } else {
            (mid as isize - 1, mid)
        };
        while left >= 0 && right < size {
            pattern.push(left as usize);
            pattern.push(right);
            left -= 1;
            right += 1;
        }
    }
    if pattern.is_empty() {
        pattern.push(0);
    }
    let target = 8;
    let mut full = Vec::with_capacity(target + pattern.len());
    while full.len() < target {
        full.extend_from_slice(&pattern);
    }
    full.truncate(target);
    full
}

/// Generate an arpeggio track for the progression.
///
/// Notes carry individual velocities around [`ARP_VELOCITY`]. Slots whose
/// chord has no diatonic tone (and a non-diatonic root) are skipped.
pub fn generate<R: Rng>(
    progression: &Progression,
    scale: &[i32],
    style: ArpStyle,
    octaves: ArpOctaves,
    rng: &mut R,
) -> Vec<NoteEvent> {
    if scale.is_empty() {
        return Vec::new();
    }
    let scale_pcs = theory::pitch_classes(scale);
    let shifts = octaves.shifts();

    let fixed_pattern = match style {
        ArpStyle::ConsistentRandom => Some(*ALL_PATTERNS.choose(rng).unwrap_or(&PatternKind::Ascending)),
        ArpStyle::PerBarRandom => None,
        ArpStyle::Ascending => Some(PatternKind::Ascending),
        ArpStyle::Descending => Some(PatternKind::Descending),
        ArpStyle::UpDown => Some(PatternKind::UpDown),
        ArpStyle::RandomNotes => Some(PatternKind::RandomNotes),
        ArpStyle::ConvergeDiverge => Some(PatternKind::ConvergeDiverge),
    };

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

        let mut chord_tones: Vec<i32> = chord
            .original_notes
            .iter()
            .copied()
            .filter(|n| scale_pcs.contains(&n.rem_euclid(12)))
            .collect();
        if chord_tones.is_empty() {
            // A fully chromatic chord still arpeggiates its root if diatonic.
            let root = chord.bass_root;
            if scale_pcs.contains(&root.rem_euclid(12)) {
                chord_tones.push(root);
            } else {
                cursor += duration;
                continue;
            }
        }
        chord_tones.sort_unstable();

        let mut pool: Vec<i32> = chord_tones
            .iter()
            .flat_map(|n| shifts.iter().map(move |s| n + s))
            .filter(|n| (0..=127).contains(n))
            .collect();
        pool.sort_unstable();
        pool.dedup();
        if pool.is_empty() {
            cursor += duration;
            continue;
        }

        let kind = fixed_pattern
            .unwrap_or_else(|| *ALL_PATTERNS.choose(rng).unwrap_or(&PatternKind::Ascending));
        let indices = kind.indices(pool.len(), rng);
        if indices.is_empty() {
            cursor += duration;
            continue;
        }

        let mut step = 0usize;
        let mut time_in_chord = 0.0;
        while time_in_chord < duration - TIME_EPSILON {
            let note_dur = *NOTE_DURATIONS.choose(rng).unwrap_or(&0.5);
            let actual = f64::min(note_dur, duration - time_in_chord);
            if actual <= TIME_EPSILON {
                break;
            }
            let pitch = pool[indices[step % indices.len()]];
            let velocity = (ARP_VELOCITY + rng.gen_range(-5..=5)).clamp(0, 127) as u8;
            push_note(&mut events, pitch, cursor + time_in_chord, actual, Some(velocity));
            step += 1;
            time_in_chord += note_dur;
        }
        cursor += duration;
    }
    events
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::parts::testutil::progression_of;
    use crate::rng::rng_for;
    use crate::theory::scale_notes;

    use super::*;

    #[test]
    fn ascending_pattern_walks_the_pool() {
        let mut rng = rng_for(1, "arp");
        assert_eq!(PatternKind::Ascending.indices(4, &mut rng), vec![0, 1, 2, 3]);
        assert_eq!(PatternKind::Descending.indices(3, &mut rng), vec![2, 1, 0]);
        assert_eq!(PatternKind::UpDown.indices(3, &mut rng), vec![0, 1, 2, 1, 0]);
        assert_eq!(PatternKind::Ascending.indices(0, &mut rng), Vec::<usize>::new());
    }

    #[test]
    fn converge_diverge_is_eight_steps_in_bounds() {
        for seed in 0..10u32 {
            let mut rng = rng_for(seed, "arp");
            for size in 1..6usize {
                let indices = PatternKind::ConvergeDiverge.indices(size, &mut rng);
                assert_eq!(indices.len(), 8);
                assert!(indices.iter().all(|i| *i < size));
            }
        }
    }

    #[test]
    fn random_notes_length_and_bounds() {
        let mut rng = rng_for(2, "arp");
        let indices = PatternKind::RandomNotes.indices(5, &mut rng);
        assert!([8, 12, 16].contains(&indices.len()));
        assert!(indices.iter().all(|i| *i < 5));
    }

    #[test]
    fn arp_notes_are_diatonic_chord_tones() {
        let progression = progression_of(&[("Cmaj", &[60, 64, 67]), ("G7", &[67, 71, 74, 77])]);
        let scale = scale_notes(60, false);
        let mut rng = rng_for(3, "arp");
        let events = generate(&progression, &scale, ArpStyle::Ascending, ArpOctaves::Up1, &mut rng);
        assert!(!events.is_empty());
        let allowed_first = [60, 64, 67, 72, 76, 79];
        for event in &events {
            if event.start_beats < 4.0 {
                assert!(allowed_first.contains(&(event.pitch as i32)), "{}", event.pitch);
            }
            let velocity = event.velocity.unwrap();
            assert!((90..=100).contains(&velocity));
            assert!(event.duration_beats == 0.5 || event.duration_beats == 0.25);
        }
    }

    #[test]
    fn slots_fill_without_overflow() {
        let progression = progression_of(&[("Cmaj", &[60, 64, 67])]);
        let scale = scale_notes(60, false);
        for seed in 0..5u32 {
            let mut rng = rng_for(seed, "arp");
            let events =
                generate(&progression, &scale, ArpStyle::PerBarRandom, ArpOctaves::Original, &mut rng);
            for event in &events {
                assert!(event.start_beats + event.duration_beats <= 4.0 + TIME_EPSILON);
            }
        }
    }

    #[test]
    fn non_diatonic_chord_is_skipped() {
        // F#maj in C major shares no diatonic tone and its root is chromatic.
        let progression = progression_of(&[("F#maj", &[66, 70, 73])]);
        let scale = scale_notes(60, false);
        let mut rng = rng_for(4, "arp");
        let events = generate(&progression, &scale, ArpStyle::Ascending, ArpOctaves::Original, &mut rng);
        assert_eq!(events, vec![]);
    }
}
