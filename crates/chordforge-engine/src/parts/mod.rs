//! Part generators: bass, arpeggio, and melody tracks.
//!
//! Each generator walks the finished progression and emits [`NoteEvent`]s on
//! an absolute beat timeline. Unresolved slots advance the time cursor
//! without emitting, so parts stay aligned with the chord track. Events whose
//! pitch leaves the MIDI range are dropped rather than clamped.

use serde::Serialize;

pub mod arp;
pub mod bass;
pub mod melody;

/// Timing comparisons use this tolerance; shorter remainders are not worth a
/// note.
pub(crate) const TIME_EPSILON: f64 = 0.01;

/// One timed note on a part track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteEvent {
    pub pitch: u8,
    /// Absolute start position in beats from the top of the piece.
    pub start_beats: f64,
    pub duration_beats: f64,
    /// Per-note velocity; `None` means the track default.
    pub velocity: Option<u8>,
}

/// Append an event if the pitch is in MIDI range and the duration is usable.
pub(crate) fn push_note(
    events: &mut Vec<NoteEvent>,
    pitch: i32,
    start_beats: f64,
    duration_beats: f64,
    velocity: Option<u8>,
) {
    if (0..=127).contains(&pitch) && duration_beats > TIME_EPSILON {
        events.push(NoteEvent {
            pitch: pitch as u8,
            start_beats,
            duration_beats,
            velocity,
        });
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::progression::{ChordSlot, Progression, Slot};
    use crate::theory;
    use crate::voicing::CHORD_OCTAVE_SHIFT;

    /// A root-position progression over the given chords, 4 beats each.
    pub fn progression_of(chords: &[(&str, &[i32])]) -> Progression {
        let slots = chords
            .iter()
            .map(|(name, notes)| {
                Slot::Resolved(ChordSlot {
                    display_name: name.to_string(),
                    original_notes: notes.to_vec(),
                    midi_notes: theory::transpose(notes, CHORD_OCTAVE_SHIFT),
                    bass_root: notes[0],
                    duration_beats: 4.0,
                })
            })
            .collect();
        Progression { slots, warnings: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn out_of_range_pitches_are_dropped() {
        let mut events = Vec::new();
        push_note(&mut events, 128, 0.0, 1.0, None);
        push_note(&mut events, -1, 0.0, 1.0, None);
        push_note(&mut events, 60, 0.0, 0.005, None);
        assert_eq!(events, vec![]);
        push_note(&mut events, 60, 0.0, 1.0, Some(100));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].pitch, 60);
    }
}
