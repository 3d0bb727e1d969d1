//! Chord pool construction.
//!
//! A pool maps chord display names (e.g., "Cmaj7") to their root-position
//! notes, harmonic function label, and quality. Four builders cover the
//! diatonic/jazz x major/minor grid; a dedicated builder produces the
//! three-chord pool used by the 12-bar blues progression.
//!
//! Function labels are roman numerals shared by every entry of a degree
//! ("I" covers Cmaj, Cmaj7, and Cmaj9 in C major), so template resolution
//! can prefer sevenths without caring which exact entry exists. The minor
//! pools keep the natural minor v triad but replace its seventh with the
//! harmonic-minor dominant; both carry the "V(hm)" label.

use std::collections::HashMap;

use chordforge_spec::{Complexity, KeyType, PoolStyle, NOTE_NAMES};

/// Chord quality, used by the brightness bias during progression selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    HalfDiminished,
    Dominant,
    Altered,
}

impl ChordQuality {
    /// Major-family qualities read as bright.
    pub fn is_bright(self) -> bool {
        matches!(self, ChordQuality::Major)
    }

    /// Minor and diminished families read as dark. Dominant is neutral.
    pub fn is_dark(self) -> bool {
        matches!(
            self,
            ChordQuality::Minor
                | ChordQuality::Diminished
                | ChordQuality::HalfDiminished
                | ChordQuality::Altered
        )
    }
}

/// One chord in the pool: root-position notes, function label, quality.
#[derive(Debug, Clone)]
pub struct ChordEntry {
    /// Root-position notes, sorted ascending, root first.
    pub notes: Vec<i32>,
    /// Roman-numeral function label, e.g. "I", "vi", "V(hm)".
    pub function: String,
    pub quality: ChordQuality,
}

/// Interval pattern and naming for one chord type.
struct ChordDef {
    suffix: &'static str,
    intervals: &'static [i32],
    quality: ChordQuality,
}

const MAJ: ChordDef = ChordDef { suffix: "maj", intervals: &[0, 4, 7], quality: ChordQuality::Major };
const MIN: ChordDef = ChordDef { suffix: "m", intervals: &[0, 3, 7], quality: ChordQuality::Minor };
const DIM: ChordDef = ChordDef { suffix: "dim", intervals: &[0, 3, 6], quality: ChordQuality::Diminished };
const MAJ7: ChordDef = ChordDef { suffix: "maj7", intervals: &[0, 4, 7, 11], quality: ChordQuality::Major };
const MIN7: ChordDef = ChordDef { suffix: "m7", intervals: &[0, 3, 7, 10], quality: ChordQuality::Minor };
const DOM7: ChordDef = ChordDef { suffix: "7", intervals: &[0, 4, 7, 10], quality: ChordQuality::Dominant };
const MIN7B5: ChordDef = ChordDef { suffix: "m7b5", intervals: &[0, 3, 6, 10], quality: ChordQuality::HalfDiminished };
const MAJ9: ChordDef = ChordDef { suffix: "maj9", intervals: &[0, 4, 7, 11, 14], quality: ChordQuality::Major };
const MIN9: ChordDef = ChordDef { suffix: "m9", intervals: &[0, 3, 7, 10, 14], quality: ChordQuality::Minor };
const DOM9: ChordDef = ChordDef { suffix: "9", intervals: &[0, 4, 7, 10, 14], quality: ChordQuality::Dominant };
const DOM7B9: ChordDef = ChordDef { suffix: "7b9", intervals: &[0, 4, 7, 10, 13], quality: ChordQuality::Altered };
const MIN9B5: ChordDef = ChordDef { suffix: "m9b5", intervals: &[0, 3, 6, 10, 14], quality: ChordQuality::HalfDiminished };

/// A chord pool for one key, plus a function-label index.
#[derive(Debug, Clone)]
pub struct ChordPool {
    entries: HashMap<String, ChordEntry>,
    /// Display names sorted ascending, for deterministic iteration.
    names: Vec<String>,
    /// Normalized function label -> chord names carrying it, sorted.
    functions: HashMap<String, Vec<String>>,
}

/// Strip any parenthesized qualifier and lowercase, so "V(hm)" matches "v".
pub(crate) fn normalize_function(label: &str) -> String {
    let base = label.split('(').next().unwrap_or(label);
    base.trim().to_ascii_lowercase()
}

impl ChordPool {
    pub(crate) fn from_entries(entries: HashMap<String, ChordEntry>) -> Self {
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        let mut functions: HashMap<String, Vec<String>> = HashMap::new();
        for name in &names {
            let label = normalize_function(&entries[name].function);
            functions.entry(label).or_default().push(name.clone());
        }
        ChordPool { entries, names, functions }
    }

    /// Build the pool for a key and style. The root is a MIDI note; its
    /// octave anchors every chord in the pool.
    pub fn build(
        key_root: i32,
        key_type: KeyType,
        style: PoolStyle,
        complexity: Complexity,
    ) -> Self {
        let entries = match (style, key_type) {
            (PoolStyle::Diatonic, KeyType::Major) => diatonic_major(key_root, complexity),
            (PoolStyle::Diatonic, KeyType::Minor) => diatonic_minor(key_root, complexity),
            (PoolStyle::Jazz, KeyType::Major) => jazz_major(key_root, complexity),
            (PoolStyle::Jazz, KeyType::Minor) => jazz_minor(key_root, complexity),
        };
        let max_notes = complexity.max_notes();
        let entries = entries
            .into_iter()
            .filter(|(_, entry)| entry.notes.len() <= max_notes)
            .collect();
        ChordPool::from_entries(entries)
    }

    /// Build the three-chord pool for the 12-bar blues.
    ///
    /// Major: I7/IV7/V7, all dominant. Minor: i7/iv7 minor-sevenths plus a
    /// dominant V7.
    pub fn build_blues(key_root: i32, key_type: KeyType) -> Self {
        let mut entries = HashMap::new();
        match key_type {
            KeyType::Major => {
                insert(&mut entries, key_root, &DOM7, "I7");
                insert(&mut entries, key_root + 5, &DOM7, "IV7");
                insert(&mut entries, key_root + 7, &DOM7, "V7");
            }
            KeyType::Minor => {
                insert(&mut entries, key_root, &MIN7, "i7");
                insert(&mut entries, key_root + 5, &MIN7, "iv7");
                insert(&mut entries, key_root + 7, &DOM7, "V7");
            }
        }
        ChordPool::from_entries(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&ChordEntry> {
        self.entries.get(name)
    }

    /// Chord names in sorted order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Chord names whose function matches `label` after normalization.
    pub fn names_for_function(&self, label: &str) -> &[String] {
        self.functions
            .get(&normalize_function(label))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Display name for a chord: pitch-class name plus quality suffix.
fn chord_name(root: i32, def: &ChordDef) -> String {
    format!("{}{}", NOTE_NAMES[root.rem_euclid(12) as usize], def.suffix)
}

fn insert(entries: &mut HashMap<String, ChordEntry>, root: i32, def: &ChordDef, function: &str) {
    let mut notes: Vec<i32> = def.intervals.iter().map(|i| root + i).collect();
    notes.sort_unstable();
    entries.insert(
        chord_name(root, def),
        ChordEntry {
            notes,
            function: function.to_string(),
            quality: def.quality,
        },
    );
}

/// Degree table row: function label, triad, seventh, optional extensions.
struct Degree {
    function: &'static str,
    /// Semitone offset from the key root; overrides the natural-scale degree
    /// where the harmonic-minor dominant replaces the natural v.
    offset: i32,
    triad: Option<&'static ChordDef>,
    seventh: &'static ChordDef,
    extensions: &'static [&'static ChordDef],
}

fn build_degrees(key_root: i32, degrees: &[Degree], complexity: Complexity, triads: bool) -> HashMap<String, ChordEntry> {
    let mut entries = HashMap::new();
    for degree in degrees {
        let root = key_root + degree.offset;
        if triads {
            if let Some(triad) = degree.triad {
                insert(&mut entries, root, triad, degree.function);
            }
        }
        insert(&mut entries, root, degree.seventh, degree.function);
        if complexity == Complexity::Extended {
            for ext in degree.extensions {
                insert(&mut entries, root, ext, degree.function);
            }
        }
    }
    entries
}

const MAJOR_DEGREES: [Degree; 7] = [
    Degree { function: "I", offset: 0, triad: Some(&MAJ), seventh: &MAJ7, extensions: &[&MAJ9] },
    Degree { function: "ii", offset: 2, triad: Some(&MIN), seventh: &MIN7, extensions: &[] },
    Degree { function: "iii", offset: 4, triad: Some(&MIN), seventh: &MIN7, extensions: &[] },
    Degree { function: "IV", offset: 5, triad: Some(&MAJ), seventh: &MAJ7, extensions: &[] },
    Degree { function: "V", offset: 7, triad: Some(&MAJ), seventh: &DOM7, extensions: &[&DOM9] },
    Degree { function: "vi", offset: 9, triad: Some(&MIN), seventh: &MIN7, extensions: &[] },
    Degree { function: "vii", offset: 11, triad: Some(&DIM), seventh: &MIN7B5, extensions: &[] },
];

// The v degree keeps its natural minor triad, but its seventh is the
// harmonic-minor dominant; both carry the "V(hm)" label.
const MINOR_DEGREES: [Degree; 7] = [
    Degree { function: "i", offset: 0, triad: Some(&MIN), seventh: &MIN7, extensions: &[&MIN9] },
    Degree { function: "ii", offset: 2, triad: Some(&DIM), seventh: &MIN7B5, extensions: &[&MIN9B5] },
    Degree { function: "III", offset: 3, triad: Some(&MAJ), seventh: &MAJ7, extensions: &[] },
    Degree { function: "iv", offset: 5, triad: Some(&MIN), seventh: &MIN7, extensions: &[] },
    Degree { function: "V(hm)", offset: 7, triad: Some(&MIN), seventh: &DOM7, extensions: &[&DOM9, &DOM7B9] },
    Degree { function: "VI", offset: 8, triad: Some(&MAJ), seventh: &MAJ7, extensions: &[] },
    Degree { function: "VII", offset: 10, triad: Some(&MAJ), seventh: &DOM7, extensions: &[] },
];

const JAZZ_MAJOR_DEGREES: [Degree; 7] = [
    Degree { function: "I", offset: 0, triad: None, seventh: &MAJ7, extensions: &[&MAJ9] },
    Degree { function: "ii", offset: 2, triad: None, seventh: &MIN7, extensions: &[&MIN9] },
    Degree { function: "iii", offset: 4, triad: None, seventh: &MIN7, extensions: &[] },
    Degree { function: "IV", offset: 5, triad: None, seventh: &MAJ7, extensions: &[] },
    Degree { function: "V", offset: 7, triad: None, seventh: &DOM7, extensions: &[&DOM9] },
    Degree { function: "vi", offset: 9, triad: None, seventh: &MIN7, extensions: &[] },
    Degree { function: "vii", offset: 11, triad: None, seventh: &MIN7B5, extensions: &[] },
];

const JAZZ_MINOR_DEGREES: [Degree; 7] = [
    Degree { function: "i", offset: 0, triad: None, seventh: &MIN7, extensions: &[&MIN9] },
    Degree { function: "ii", offset: 2, triad: None, seventh: &MIN7B5, extensions: &[&MIN9B5] },
    Degree { function: "III", offset: 3, triad: None, seventh: &MAJ7, extensions: &[] },
    Degree { function: "iv", offset: 5, triad: None, seventh: &MIN7, extensions: &[] },
    Degree { function: "V(hm)", offset: 7, triad: None, seventh: &DOM7, extensions: &[&DOM9, &DOM7B9] },
    Degree { function: "VI", offset: 8, triad: None, seventh: &MAJ7, extensions: &[] },
    Degree { function: "VII", offset: 10, triad: None, seventh: &DOM7, extensions: &[] },
];

fn diatonic_major(key_root: i32, complexity: Complexity) -> HashMap<String, ChordEntry> {
    build_degrees(key_root, &MAJOR_DEGREES, complexity, true)
}

fn diatonic_minor(key_root: i32, complexity: Complexity) -> HashMap<String, ChordEntry> {
    build_degrees(key_root, &MINOR_DEGREES, complexity, true)
}

fn jazz_major(key_root: i32, complexity: Complexity) -> HashMap<String, ChordEntry> {
    build_degrees(key_root, &JAZZ_MAJOR_DEGREES, complexity, false)
}

fn jazz_minor(key_root: i32, complexity: Complexity) -> HashMap<String, ChordEntry> {
    build_degrees(key_root, &JAZZ_MINOR_DEGREES, complexity, false)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use chordforge_spec::NoteName;

    use super::*;

    fn all_roots() -> impl Iterator<Item = (i32, NoteName)> {
        NoteName::ALL.iter().map(|n| (60 + i32::from(n.pitch_class()), *n))
    }

    #[test]
    fn pools_are_never_empty_for_any_key() {
        for (root, _) in all_roots() {
            for key_type in [KeyType::Major, KeyType::Minor] {
                for style in [PoolStyle::Diatonic, PoolStyle::Jazz] {
                    for complexity in [Complexity::Standard, Complexity::Extended] {
                        let pool = ChordPool::build(root, key_type, style, complexity);
                        assert!(!pool.is_empty());
                        let max = complexity.max_notes();
                        for name in pool.names() {
                            let entry = pool.get(name).unwrap();
                            assert!(entry.notes.len() <= max, "{name} too big");
                            assert!(entry.notes.windows(2).all(|w| w[0] <= w[1]));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn c_major_diatonic_standard_contents() {
        let pool = ChordPool::build(60, KeyType::Major, PoolStyle::Diatonic, Complexity::Standard);
        // 7 triads + 7 sevenths.
        assert_eq!(pool.len(), 14);
        assert_eq!(pool.get("Cmaj").unwrap().notes, vec![60, 64, 67]);
        assert_eq!(pool.get("Cmaj7").unwrap().notes, vec![60, 64, 67, 71]);
        assert_eq!(pool.get("G7").unwrap().notes, vec![67, 71, 74, 77]);
        assert_eq!(pool.get("Bdim").unwrap().notes, vec![71, 74, 77]);
        assert_eq!(pool.get("Bm7b5").unwrap().notes, vec![71, 74, 77, 81]);
        // No ninths at standard complexity.
        assert!(pool.get("Cmaj9").is_none());
        // Triad and seventh share the degree label.
        assert_eq!(pool.get("Am").unwrap().function, "vi");
        assert_eq!(pool.get("Am7").unwrap().function, "vi");
    }

    #[test]
    fn extended_adds_curated_ninths() {
        let pool = ChordPool::build(60, KeyType::Major, PoolStyle::Diatonic, Complexity::Extended);
        assert_eq!(pool.get("Cmaj9").unwrap().notes, vec![60, 64, 67, 71, 74]);
        assert_eq!(pool.get("G9").unwrap().notes, vec![67, 71, 74, 77, 81]);
        assert!(pool.get("Dm9").is_none());
    }

    #[test]
    fn minor_pool_uses_harmonic_dominant() {
        let pool = ChordPool::build(69, KeyType::Minor, PoolStyle::Diatonic, Complexity::Standard);
        // A minor: the dominant seventh is E7, not Em7, and carries the hm
        // label. The minor v triad stays in the pool under the same label.
        let e7 = pool.get("E7").unwrap();
        assert_eq!(e7.notes, vec![76, 80, 83, 86]);
        assert_eq!(e7.function, "V(hm)");
        assert!(pool.get("Em7").is_none());
        let em = pool.get("Em").unwrap();
        assert_eq!(em.notes, vec![76, 79, 83]);
        assert_eq!(em.function, "V(hm)");
        assert_eq!(em.quality, ChordQuality::Minor);
        // VII keeps its natural root with dominant quality.
        assert_eq!(pool.get("G7").unwrap().function, "VII");
    }

    #[test]
    fn jazz_pools_have_no_triads() {
        let pool = ChordPool::build(60, KeyType::Major, PoolStyle::Jazz, Complexity::Standard);
        assert_eq!(pool.len(), 7);
        assert!(pool.get("Cmaj").is_none());
        assert!(pool.get("Cmaj7").is_some());
    }

    #[test]
    fn function_index_ignores_case_and_qualifier() {
        let pool = ChordPool::build(69, KeyType::Minor, PoolStyle::Diatonic, Complexity::Standard);
        let v_names = ["E7".to_string(), "Em".to_string()];
        assert_eq!(pool.names_for_function("V"), &v_names);
        assert_eq!(pool.names_for_function("v(hm)"), &v_names);
        let i_names = pool.names_for_function("I");
        assert_eq!(i_names, &["Am".to_string(), "Am7".to_string()]);
    }

    #[test]
    fn blues_pools() {
        let major = ChordPool::build_blues(60, KeyType::Major);
        assert_eq!(major.len(), 3);
        assert_eq!(major.get("C7").unwrap().function, "I7");
        assert_eq!(major.get("F7").unwrap().function, "IV7");
        assert_eq!(major.get("G7").unwrap().function, "V7");

        let minor = ChordPool::build_blues(69, KeyType::Minor);
        assert_eq!(minor.len(), 3);
        assert_eq!(minor.get("Am7").unwrap().function, "i7");
        assert_eq!(minor.get("Dm7").unwrap().function, "iv7");
        assert_eq!(minor.get("E7").unwrap().function, "V7");
        assert_eq!(minor.get("E7").unwrap().quality, ChordQuality::Dominant);
    }

    #[test]
    fn names_are_sorted() {
        let pool = ChordPool::build(60, KeyType::Major, PoolStyle::Diatonic, Complexity::Standard);
        let mut sorted = pool.names().to_vec();
        sorted.sort();
        assert_eq!(pool.names(), sorted.as_slice());
    }
}
