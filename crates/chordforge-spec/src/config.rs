//! The generation configuration record and its closed enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{MAX_BARS, MAX_BPM, MIN_BARS, MIN_BPM};

/// Pitch-class names in chromatic order from C.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A key-root note name (sharps only, matching the chromatic table above).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum NoteName {
    #[default]
    C,
    #[serde(rename = "c_sharp")]
    CSharp,
    D,
    #[serde(rename = "d_sharp")]
    DSharp,
    E,
    F,
    #[serde(rename = "f_sharp")]
    FSharp,
    G,
    #[serde(rename = "g_sharp")]
    GSharp,
    A,
    #[serde(rename = "a_sharp")]
    ASharp,
    B,
}

impl NoteName {
    /// All twelve note names in chromatic order.
    pub const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::D,
        NoteName::DSharp,
        NoteName::E,
        NoteName::F,
        NoteName::FSharp,
        NoteName::G,
        NoteName::GSharp,
        NoteName::A,
        NoteName::ASharp,
        NoteName::B,
    ];

    /// Semitone offset from C (0-11).
    pub fn pitch_class(&self) -> u8 {
        *self as u8
    }

    /// The note name for a pitch class (0-11, higher values folded).
    pub fn from_pitch_class(pc: i32) -> NoteName {
        Self::ALL[pc.rem_euclid(12) as usize]
    }

    /// Display name, e.g. `"C#"`.
    pub fn name(&self) -> &'static str {
        NOTE_NAMES[self.pitch_class() as usize]
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NoteName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NOTE_NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(trimmed))
            .map(|idx| Self::ALL[idx])
            .ok_or_else(|| ConfigError::InvalidKeyRoot {
                name: trimmed.to_string(),
            })
    }
}

/// Major or natural-minor tonality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum KeyType {
    #[default]
    Major,
    Minor,
}

impl KeyType {
    pub fn is_minor(&self) -> bool {
        matches!(self, KeyType::Minor)
    }
}

/// Harmonic dialect used to build the chord pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum PoolStyle {
    /// Diatonic triads and sevenths for every scale degree.
    #[default]
    Diatonic,
    /// Seventh-chord-only pool with curated ninth extensions.
    Jazz,
}

/// Chord complexity level for pool construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Complexity {
    /// Triads and seventh chords only (at most 4 notes per chord).
    #[default]
    Standard,
    /// Adds curated ninth/altered entries (at most 6 notes per chord).
    Extended,
}

impl Complexity {
    /// Maximum note count a pool entry may carry at this level.
    pub fn max_notes(&self) -> usize {
        match self {
            Complexity::Standard => 4,
            Complexity::Extended => 6,
        }
    }
}

/// Template or algorithm governing the harmonic sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ProgressionStyle {
    /// Voice-leading-optimized random walk through the pool.
    #[default]
    SmoothRandom,
    /// I-vi-IV-V repeating template.
    Pop,
    /// I-V-vi-iii-IV-I-IV-V repeating template.
    Pachelbel,
    /// ii-V-I repeating 3-cycle.
    TwoFiveOne,
    /// Fixed 12-bar blues; forces 12 bars and the dedicated blues pool.
    TwelveBarBlues,
}

/// Number of chords per bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ChordRate {
    #[default]
    OnePerBar,
    TwoPerBar,
}

impl ChordRate {
    pub fn chords_per_bar(&self) -> u32 {
        match self {
            ChordRate::OnePerBar => 1,
            ChordRate::TwoPerBar => 2,
        }
    }
}

/// Vertical arrangement applied to each chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum VoicingStyle {
    #[default]
    RootPosition,
    AllowInversions,
    PreferDrop2,
}

/// Constraint on the final one or two chords of the progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Cadence {
    #[default]
    Any,
    /// V -> I ending.
    Authentic,
    /// IV -> I ending.
    Plagal,
}

/// Brightness bias applied during smooth-random selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ChordBias {
    #[default]
    Standard,
    Darker,
    Lighter,
}

/// Bassline generation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum BassStyle {
    #[default]
    Standard,
    Walking,
    Pop,
    Rnb,
    HipHop,
    #[serde(rename = "808")]
    EightOhEight,
}

/// Arpeggiator index-pattern style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ArpStyle {
    /// One random pattern chosen up front and reused for every slot.
    #[default]
    ConsistentRandom,
    /// A fresh random pattern for every slot.
    PerBarRandom,
    Ascending,
    Descending,
    UpDown,
    RandomNotes,
    ConvergeDiverge,
}

/// Octave expansion applied to the arpeggiator note pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ArpOctaves {
    #[default]
    Original,
    Up1,
    Down1,
    Up2,
    Down2,
    Up3,
    Down3,
}

impl ArpOctaves {
    /// Semitone shifts applied to each chord tone when expanding the pool.
    pub fn shifts(&self) -> &'static [i32] {
        match self {
            ArpOctaves::Original => &[0],
            ArpOctaves::Up1 => &[0, 12],
            ArpOctaves::Down1 => &[0, -12],
            ArpOctaves::Up2 => &[0, 12, 24],
            ArpOctaves::Down2 => &[0, -12, -24],
            ArpOctaves::Up3 => &[0, 12, 24, 36],
            ArpOctaves::Down3 => &[0, -12, -24, -36],
        }
    }
}

/// Melody generation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum MelodyStyle {
    #[default]
    ChordTone,
    ScaleWalker,
    Experimental,
    LeapsAndSteps,
    Minimalist,
    SustainedLead,
    /// Draws one of the six concrete styles at random per run.
    RandomStyle,
}

/// Rhythmic density of the melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum MelodySpeed {
    Slow,
    #[default]
    Medium,
    Fast,
}

/// Register the melody targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum MelodyRegister {
    #[default]
    Mid,
    High,
}

impl MelodyRegister {
    /// Octave shift applied to chord tones when building melody material.
    pub fn octave_shift(&self) -> i32 {
        match self {
            MelodyRegister::Mid => 12,
            MelodyRegister::High => 24,
        }
    }

    /// Target pitch window `(min, max)` the melody is folded into.
    pub fn target_range(&self) -> (i32, i32) {
        match self {
            MelodyRegister::Mid => (60, 84),
            MelodyRegister::High => (72, 96),
        }
    }

    /// Wider pitch window used when assembling the extended scale.
    pub fn extended_range(&self) -> (i32, i32) {
        match self {
            MelodyRegister::Mid => (48, 96),
            MelodyRegister::High => (60, 108),
        }
    }
}

/// Note-length treatment for the melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Articulation {
    #[default]
    Legato,
    Staccato,
}

/// Instrument flavor that perturbs per-style melody parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum MelodyInstrument {
    #[default]
    None,
    SynthLead,
    Keys,
    Piano,
    Pluck,
}

/// The full configuration for one generation run.
///
/// Immutable once constructed; `validate` must pass before the record is
/// handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GenerationConfig {
    /// Key root note name.
    pub key_root: NoteName,
    /// Major or natural-minor key.
    pub key_type: KeyType,
    /// Harmonic dialect for pool construction.
    pub pool_style: PoolStyle,
    /// Triads/sevenths only, or curated extensions too.
    pub complexity: Complexity,
    /// Harmonic sequence template or algorithm.
    pub progression_style: ProgressionStyle,
    /// Chords per bar.
    pub chord_rate: ChordRate,
    /// Voicing transform applied per chord.
    pub voicing: VoicingStyle,
    /// Ending constraint.
    pub cadence: Cadence,
    /// Brightness bias for smooth-random selection.
    pub bias: ChordBias,
    /// Number of bars (ignored and forced to 12 for the blues style).
    pub num_bars: u32,
    /// Bassline style.
    pub bass_style: BassStyle,
    /// Arpeggiator pattern style.
    pub arp_style: ArpStyle,
    /// Arpeggiator octave expansion.
    pub arp_octaves: ArpOctaves,
    /// Melody generation style.
    pub melody_style: MelodyStyle,
    /// Melody rhythmic density.
    pub melody_speed: MelodySpeed,
    /// Melody register.
    pub melody_register: MelodyRegister,
    /// Melody articulation.
    pub articulation: Articulation,
    /// Melody instrument flavor.
    pub melody_instrument: MelodyInstrument,
    /// Whether to generate a bassline track.
    pub include_bass: bool,
    /// Whether to generate an arpeggio track.
    pub include_arp: bool,
    /// Whether to generate a melody track.
    pub include_melody: bool,
    /// Tempo in beats per minute (pass-through to the file writer).
    pub bpm: u16,
    /// Whether the file writer should embed a tempo event.
    pub embed_tempo: bool,
    /// Base seed for deterministic generation.
    pub seed: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            key_root: NoteName::C,
            key_type: KeyType::Major,
            pool_style: PoolStyle::Diatonic,
            complexity: Complexity::Standard,
            progression_style: ProgressionStyle::SmoothRandom,
            chord_rate: ChordRate::OnePerBar,
            voicing: VoicingStyle::RootPosition,
            cadence: Cadence::Any,
            bias: ChordBias::Standard,
            num_bars: 8,
            bass_style: BassStyle::Standard,
            arp_style: ArpStyle::ConsistentRandom,
            arp_octaves: ArpOctaves::Original,
            melody_style: MelodyStyle::ChordTone,
            melody_speed: MelodySpeed::Medium,
            melody_register: MelodyRegister::Mid,
            articulation: Articulation::Legato,
            melody_instrument: MelodyInstrument::None,
            include_bass: true,
            include_arp: true,
            include_melody: true,
            bpm: 120,
            embed_tempo: true,
            seed: 0,
        }
    }
}

impl GenerationConfig {
    /// MIDI note number of the key root in the reference octave (C4 = 60).
    pub fn key_root_midi(&self) -> i32 {
        60 + i32::from(self.key_root.pitch_class())
    }

    /// Human-readable key name, e.g. `"Am"` or `"C"`.
    pub fn key_name(&self) -> String {
        if self.key_type.is_minor() {
            format!("{}m", self.key_root)
        } else {
            self.key_root.to_string()
        }
    }

    /// Validates numeric ranges. Enum fields are closed by construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BARS..=MAX_BARS).contains(&self.num_bars) {
            return Err(ConfigError::BarsOutOfRange {
                bars: self.num_bars,
            });
        }
        if !(MIN_BPM..=MAX_BPM).contains(&self.bpm) {
            return Err(ConfigError::BpmOutOfRange { bpm: self.bpm });
        }
        Ok(())
    }
}
