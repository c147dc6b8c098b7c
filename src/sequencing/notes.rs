/*
Pitch Table
===========

Pitches are named by a note class and an octave. The twelve note classes are
counted upward from A, so every octave here runs A, A#, B, C, ... G#:

    offset   0  1   2  3  4   5  6   7  8  9   10 11
    class    A  A#  B  C  C#  D  D#  E  F  F#  G  G#

Tuning is twelve-tone equal temperament anchored at A4 = 440 Hz. Each
semitone multiplies the frequency by 2^(1/12), so twelve of them (one octave)
double it:

    frequency = 440 * 2^((offset + 12 * (octave - 4)) / 12)

    A4  = 440.000 Hz
    A#4 = 466.164 Hz
    A5  = 880.000 Hz

Octaves 0 through 10 make up the documented table. Octaves outside that range
are not rejected; they follow the same formula.

Notation:
  "A#4" and "A#:4" both parse to (A#, 4). Flats are accepted as aliases for
  the equivalent sharp ("Bb4" == "A#4").
*/

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lowest octave of the documented table.
pub const MIN_OCTAVE: i32 = 0;
/// Highest octave of the documented table.
pub const MAX_OCTAVE: i32 = 10;

/// Reference pitch: A4.
pub const A4_FREQUENCY: f64 = 440.0;
const REFERENCE_OCTAVE: i32 = 4;

/// One of the twelve pitch classes, ordered by semitone offset from A.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoteClass {
    A,
    ASharp,
    B,
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
}

struct NoteInfo {
    notation: &'static str,
    flat: Option<&'static str>,
}

// Indexed by `NoteClass as usize`, which is also the semitone offset.
const NOTE_TABLE: [NoteInfo; 12] = [
    NoteInfo { notation: "A", flat: None },
    NoteInfo { notation: "A#", flat: Some("Bb") },
    NoteInfo { notation: "B", flat: None },
    NoteInfo { notation: "C", flat: None },
    NoteInfo { notation: "C#", flat: Some("Db") },
    NoteInfo { notation: "D", flat: None },
    NoteInfo { notation: "D#", flat: Some("Eb") },
    NoteInfo { notation: "E", flat: None },
    NoteInfo { notation: "F", flat: None },
    NoteInfo { notation: "F#", flat: Some("Gb") },
    NoteInfo { notation: "G", flat: None },
    NoteInfo { notation: "G#", flat: Some("Ab") },
];

impl NoteClass {
    /// All classes in semitone order.
    pub const ALL: [NoteClass; 12] = [
        NoteClass::A,
        NoteClass::ASharp,
        NoteClass::B,
        NoteClass::C,
        NoteClass::CSharp,
        NoteClass::D,
        NoteClass::DSharp,
        NoteClass::E,
        NoteClass::F,
        NoteClass::FSharp,
        NoteClass::G,
        NoteClass::GSharp,
    ];

    /// Semitones above A (0-11).
    pub const fn semitone_offset(self) -> u8 {
        self as u8
    }

    /// Display notation, e.g. `"C#"`.
    pub fn notation(self) -> &'static str {
        NOTE_TABLE[self as usize].notation
    }

    /// Look up a class by notation. Accepts sharps and flat aliases.
    pub fn from_notation(notation: &str) -> Option<Self> {
        NOTE_TABLE
            .iter()
            .position(|info| {
                info.notation.eq_ignore_ascii_case(notation)
                    || info.flat.is_some_and(|flat| flat.eq_ignore_ascii_case(notation))
            })
            .map(|index| Self::ALL[index])
    }

    /// Class `semitones` steps above this one, wrapping within the octave.
    pub fn transpose(self, semitones: i32) -> Self {
        let index = (self as i64 + semitones as i64).rem_euclid(12);
        Self::ALL[index as usize]
    }

    /// Equal-temperament frequency of this class in `octave`, in Hz.
    ///
    /// Computed in f64 so any octave is accepted. Far outside the table the
    /// result reaches 0 or infinity, which generation rejects.
    pub fn frequency(self, octave: i32) -> f64 {
        let semitones =
            self.semitone_offset() as f64 + 12.0 * (octave as f64 - REFERENCE_OCTAVE as f64);
        A4_FREQUENCY * 2.0_f64.powf(semitones / 12.0)
    }
}

impl fmt::Display for NoteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notation())
    }
}

/// A note class in a specific octave.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub class: NoteClass,
    pub octave: i32,
}

impl Pitch {
    pub const fn new(class: NoteClass, octave: i32) -> Self {
        Self { class, octave }
    }

    /// Frequency in Hz. Pure: equal pitches always give equal frequencies.
    pub fn frequency(self) -> f64 {
        self.class.frequency(self.octave)
    }

    /// Whether the octave lies inside the documented 0-10 table.
    pub fn in_table(self) -> bool {
        (MIN_OCTAVE..=MAX_OCTAVE).contains(&self.octave)
    }

    /// Pitch `semitones` steps away, carrying into neighbouring octaves.
    /// The octave saturates at the `i32` limits.
    pub fn transpose(self, semitones: i32) -> Self {
        let absolute = self.class as i64 + semitones as i64;
        let octave = self.octave as i64 + absolute.div_euclid(12);
        Self {
            class: self.class.transpose(semitones),
            octave: octave.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.octave)
    }
}

/// Every pitch of the documented table with its frequency, ordered by class
/// then octave.
pub fn pitch_table() -> Vec<(Pitch, f64)> {
    NoteClass::ALL
        .iter()
        .flat_map(|&class| {
            (MIN_OCTAVE..=MAX_OCTAVE).map(move |octave| {
                let pitch = Pitch::new(class, octave);
                (pitch, pitch.frequency())
            })
        })
        .collect()
}

/// Error returned when a pitch string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsePitchError {
    /// The note name before the octave is not a known class
    UnknownNote(String),
    /// The octave part is missing or not an integer
    InvalidOctave(String),
}

impl fmt::Display for ParsePitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsePitchError::UnknownNote(note) => write!(f, "unknown note name '{}'", note),
            ParsePitchError::InvalidOctave(octave) => write!(f, "invalid octave '{}'", octave),
        }
    }
}

impl std::error::Error for ParsePitchError {}

impl FromStr for Pitch {
    type Err = ParsePitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit() || c == '-' || c == ':')
            .unwrap_or(s.len());
        let (name, rest) = s.split_at(split);
        let octave = rest.strip_prefix(':').unwrap_or(rest);

        let class = NoteClass::from_notation(name)
            .ok_or_else(|| ParsePitchError::UnknownNote(name.to_string()))?;
        let octave = octave
            .parse::<i32>()
            .map_err(|_| ParsePitchError::InvalidOctave(octave.to_string()))?;

        Ok(Pitch::new(class, octave))
    }
}
