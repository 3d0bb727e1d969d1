//! Chord voicing: inversions, drop-2, and the playback octave shift.

use rand::Rng;

use chordforge_spec::VoicingStyle;

use crate::theory;

/// Chords sound one octave below their pool notes. Pool roots sit around
/// middle C for readable display names; playback wants them lower.
pub const CHORD_OCTAVE_SHIFT: i32 = -12;

/// A chord after voicing has been applied.
#[derive(Debug, Clone)]
pub struct VoicedChord {
    /// Pool name plus any voicing suffix ("/Inv1", "/D2").
    pub display_name: String,
    /// Root-position pool notes, untouched.
    pub original_notes: Vec<i32>,
    /// Notes after inversion or drop-2, before the octave shift.
    pub voiced_notes: Vec<i32>,
    /// Playback notes: voiced notes shifted down an octave.
    pub midi_notes: Vec<i32>,
    /// The root-position root, used as the bass anchor.
    pub root_note: i32,
}

/// Apply a voicing style to root-position notes.
///
/// `allow_inversions` inverts with probability 0.6 (uniform inversion index);
/// `prefer_drop2` rewrites four-note chords as drop-2. Returns `None` for an
/// empty chord.
pub fn apply_voicing<R: Rng>(
    root_position: &[i32],
    style: VoicingStyle,
    base_name: &str,
    rng: &mut R,
) -> Option<VoicedChord> {
    if root_position.is_empty() {
        return None;
    }
    let mut sorted = root_position.to_vec();
    sorted.sort_unstable();
    let root_note = sorted[0];

    let (voiced, display_name) = match style {
        VoicingStyle::RootPosition => (sorted.clone(), base_name.to_string()),
        VoicingStyle::AllowInversions => {
            if sorted.len() > 1 && rng.gen_bool(0.6) {
                let inversion = rng.gen_range(1..sorted.len());
                (
                    theory::invert(&sorted, inversion),
                    format!("{base_name}/Inv{inversion}"),
                )
            } else {
                (sorted.clone(), base_name.to_string())
            }
        }
        VoicingStyle::PreferDrop2 => {
            if sorted.len() == 4 {
                (theory::drop2(&sorted), format!("{base_name}/D2"))
            } else {
                (sorted.clone(), base_name.to_string())
            }
        }
    };

    let midi_notes = theory::transpose(&voiced, CHORD_OCTAVE_SHIFT);
    Some(VoicedChord {
        display_name,
        original_notes: sorted,
        voiced_notes: voiced,
        midi_notes,
        root_note,
    })
}
