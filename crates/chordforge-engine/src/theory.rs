//! Scale and note utilities.
//!
//! Pitches are plain `i32` MIDI note numbers. Intermediate values may leave
//! the 0-127 range while voicings and octave shifts are applied; the final
//! event emission is where bounds are enforced. Empty or undersized inputs
//! produce empty/identity results rather than errors: a missing chord in a
//! randomized generator should degrade gracefully, not abort the run.

/// Major scale intervals from the root.
pub const MAJOR_INTERVALS: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
/// Natural minor scale intervals from the root.
pub const NATURAL_MINOR_INTERVALS: [i32; 7] = [0, 2, 3, 5, 7, 8, 10];

/// The seven diatonic pitches of a major or natural-minor scale.
pub fn scale_notes(root: i32, minor: bool) -> [i32; 7] {
    let intervals = if minor {
        &NATURAL_MINOR_INTERVALS
    } else {
        &MAJOR_INTERVALS
    };
    let mut notes = [0; 7];
    for (slot, interval) in notes.iter_mut().zip(intervals) {
        *slot = root + interval;
    }
    notes
}

/// Pitch classes (0-11) of a note list, sorted and deduplicated.
pub fn pitch_classes(notes: &[i32]) -> Vec<i32> {
    let mut pcs: Vec<i32> = notes.iter().map(|n| n.rem_euclid(12)).collect();
    pcs.sort_unstable();
    pcs.dedup();
    pcs
}

/// Transpose every note by `semitones`.
pub fn transpose(notes: &[i32], semitones: i32) -> Vec<i32> {
    notes.iter().map(|n| n + semitones).collect()
}

/// Standard chord inversion: the lowest `inversion` notes move up one octave.
///
/// The index is clamped to `[0, len - 1]`; 0 is the identity.
pub fn invert(notes: &[i32], inversion: usize) -> Vec<i32> {
    let mut sorted = notes.to_vec();
    sorted.sort_unstable();
    if sorted.is_empty() {
        return sorted;
    }
    let inversion = inversion.min(sorted.len() - 1);
    for note in sorted.iter_mut().take(inversion) {
        *note += 12;
    }
    sorted.sort_unstable();
    sorted
}

/// Drop-2 voicing: the second-highest note drops one octave.
///
/// Defined for exactly 4 notes; other sizes return the sorted input.
pub fn drop2(notes: &[i32]) -> Vec<i32> {
    let mut sorted = notes.to_vec();
    sorted.sort_unstable();
    if sorted.len() != 4 {
        return sorted;
    }
    sorted[2] -= 12;
    sorted.sort_unstable();
    sorted
}

/// Spread voicing: the second-highest note rises one octave.
///
/// Defined for 3 or more notes; smaller inputs return the sorted input.
pub fn spread(notes: &[i32]) -> Vec<i32> {
    let mut sorted = notes.to_vec();
    sorted.sort_unstable();
    if sorted.len() < 3 {
        return sorted;
    }
    let idx = sorted.len() - 2;
    sorted[idx] += 12;
    sorted.sort_unstable();
    sorted
}

/// Arithmetic mean pitch, the voice-leading distance metric. 0.0 when empty.
pub fn average_pitch(notes: &[i32]) -> f64 {
    if notes.is_empty() {
        return 0.0;
    }
    notes.iter().map(|n| *n as f64).sum::<f64>() / notes.len() as f64
}

/// Fold a pitch into `[min, max]` by whole octaves.
///
/// When the window spans less than an octave the result may overshoot `min`
/// after the downward fold; callers with narrow windows clamp separately.
pub fn fold_into_range(mut pitch: i32, min: i32, max: i32) -> i32 {
    while pitch < min {
        pitch += 12;
    }
    while pitch > max {
        pitch -= 12;
    }
    pitch
}

/// Minimal circular semitone distance between two pitch classes.
fn circular_distance(a: i32, b: i32) -> i32 {
    let diff = (a - b).rem_euclid(12);
    diff.min(12 - diff)
}

/// Fold `pitch` into `[min, max]` and snap it onto the scale.
///
/// If the folded pitch is non-diatonic it is moved to the nearest scale pitch
/// class (minimal circular distance, lowest class on ties) and folded again.
/// Returns `None` when no octave of the snapped class fits the window.
pub fn snap_to_scale(pitch: i32, scale_pcs: &[i32], min: i32, max: i32) -> Option<i32> {
    if scale_pcs.is_empty() {
        return None;
    }
    let folded = fold_into_range(pitch, min, max);
    let pc = folded.rem_euclid(12);
    if scale_pcs.contains(&pc) {
        return Some(folded);
    }
    let nearest = scale_pcs
        .iter()
        .copied()
        .min_by_key(|cand| (circular_distance(pc, *cand), *cand))?;
    let snapped = folded.div_euclid(12) * 12 + nearest;
    let snapped = fold_into_range(snapped, min, max);
    if snapped.rem_euclid(12) == nearest && (min..=max).contains(&snapped) {
        Some(snapped)
    } else {
        None
    }
}

/// Expand scale notes across octave shifts, keeping pitches within a window.
pub fn extended_scale(scale: &[i32], octave_shifts: &[i32], min: i32, max: i32) -> Vec<i32> {
    let mut notes: Vec<i32> = scale
        .iter()
        .flat_map(|n| octave_shifts.iter().map(move |shift| n + shift))
        .filter(|n| (min..=max).contains(n))
        .collect();
    notes.sort_unstable();
    notes.dedup();
    notes
}

/// Scale notes within `max_step` diatonic steps of `current` (excluding it).
///
/// `scale` must be sorted ascending. The anchor is the closest scale note to
/// `current`, so a slightly off-scale pitch still gets neighbors.
pub fn stepwise_neighbors(scale: &[i32], current: i32, max_step: usize) -> Vec<i32> {
    if scale.is_empty() {
        return Vec::new();
    }
    let anchor = scale
        .iter()
        .enumerate()
        .min_by_key(|(_, n)| ((*n - current).abs(), **n))
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    let mut neighbors = Vec::new();
    let max_step = max_step as isize;
    for step in -max_step..=max_step {
        if step == 0 {
            continue;
        }
        let idx = anchor as isize + step;
        if idx >= 0 && (idx as usize) < scale.len() {
            neighbors.push(scale[idx as usize]);
        }
    }
    neighbors
}

/// Convert a MIDI note number to a note name (e.g., 60 -> "C4").
pub fn midi_to_note_name(midi: u8) -> String {
    const NOTES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    let octave = (midi / 12) as i32 - 1;
    let note_idx = (midi % 12) as usize;
    format!("{}{}", NOTES[note_idx], octave)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn scales_are_seven_ascending_within_octave() {
        for root in 48..=72 {
            for minor in [false, true] {
                let notes = scale_notes(root, minor);
                assert_eq!(notes.len(), 7);
                assert!(notes.windows(2).all(|w| w[0] < w[1]));
                assert_eq!(notes[0], root);
                assert!(notes[6] < root + 12);
            }
        }
    }

    #[test]
    fn c_major_and_a_minor() {
        assert_eq!(scale_notes(60, false), [60, 62, 64, 65, 67, 69, 71]);
        assert_eq!(scale_notes(69, true), [69, 71, 72, 74, 76, 77, 79]);
    }

    #[test]
    fn invert_moves_lowest_notes_up() {
        let c_major = [60, 64, 67];
        assert_eq!(invert(&c_major, 0), vec![60, 64, 67]);
        assert_eq!(invert(&c_major, 1), vec![64, 67, 72]);
        assert_eq!(invert(&c_major, 2), vec![67, 72, 76]);
        // Clamped to len - 1.
        assert_eq!(invert(&c_major, 9), vec![67, 72, 76]);
        assert_eq!(invert(&[], 1), Vec::<i32>::new());
    }

    #[test]
    fn inversion_round_trip_preserves_pitch_classes() {
        let notes = [60, 64, 67, 71];
        for k in 1..notes.len() {
            let there = invert(&notes, k);
            let back = invert(&there, notes.len() - k);
            assert_eq!(pitch_classes(&back), pitch_classes(&notes));
        }
    }

    #[test]
    fn drop2_requires_four_notes() {
        assert_eq!(drop2(&[60, 64, 67, 71]), vec![55, 60, 64, 71]);
        assert_eq!(drop2(&[60, 64, 67]), vec![60, 64, 67]);
    }

    #[test]
    fn spread_raises_second_highest() {
        assert_eq!(spread(&[60, 64, 67]), vec![60, 67, 76]);
        assert_eq!(spread(&[60, 64]), vec![60, 64]);
    }

    #[test]
    fn average_pitch_empty_is_zero() {
        assert_eq!(average_pitch(&[]), 0.0);
        assert_eq!(average_pitch(&[60, 64, 68]), 64.0);
    }

    #[test]
    fn snap_keeps_diatonic_pitches() {
        let pcs = pitch_classes(&scale_notes(60, false));
        assert_eq!(snap_to_scale(64, &pcs, 60, 84), Some(64));
        // C#4 snaps to C4.
        assert_eq!(snap_to_scale(61, &pcs, 60, 84), Some(60));
        // Below the window, folded up first.
        assert_eq!(snap_to_scale(52, &pcs, 60, 84), Some(64));
    }

    #[test]
    fn snap_with_empty_scale_drops_note() {
        assert_eq!(snap_to_scale(64, &[], 60, 84), None);
    }

    #[test]
    fn stepwise_neighbors_respects_bounds() {
        let scale = [60, 62, 64, 65, 67];
        assert_eq!(stepwise_neighbors(&scale, 60, 2), vec![62, 64]);
        assert_eq!(stepwise_neighbors(&scale, 64, 1), vec![62, 65]);
        // Off-scale pitches anchor on the nearest note, lower on ties.
        assert_eq!(stepwise_neighbors(&scale, 63, 1), vec![60, 64]);
        assert_eq!(stepwise_neighbors(&[], 60, 2), Vec::<i32>::new());
    }

    #[test]
    fn note_names() {
        assert_eq!(midi_to_note_name(60), "C4");
        assert_eq!(midi_to_note_name(69), "A4");
        assert_eq!(midi_to_note_name(0), "C-1");
    }
}
