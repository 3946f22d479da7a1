//! Defines the spelling of notes and the parser that turns names such as `F#3` or `B♭2` into
//! piano keys.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{
    data::{ChromaticNote, NoteEvent},
    error::NoteError,
};

/// Defines the names of the natural notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum NaturalNote {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl NaturalNote {
    /// Returns the pitch class of the natural note.
    #[must_use]
    pub fn semitones(self) -> i32 {
        match self {
            NaturalNote::C => 0,
            NaturalNote::D => 2,
            NaturalNote::E => 4,
            NaturalNote::F => 5,
            NaturalNote::G => 7,
            NaturalNote::A => 9,
            NaturalNote::B => 11,
        }
    }

    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(NaturalNote::A),
            'B' => Some(NaturalNote::B),
            'C' => Some(NaturalNote::C),
            'D' => Some(NaturalNote::D),
            'E' => Some(NaturalNote::E),
            'F' => Some(NaturalNote::F),
            'G' => Some(NaturalNote::G),
            _ => None,
        }
    }
}

impl Display for NaturalNote {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let letter = match self {
            NaturalNote::A => "A",
            NaturalNote::B => "B",
            NaturalNote::C => "C",
            NaturalNote::D => "D",
            NaturalNote::E => "E",
            NaturalNote::F => "F",
            NaturalNote::G => "G",
        };
        f.write_str(letter)
    }
}

/// Defines the pitch accidentals that can be applied to a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Accidental {
    Natural,
    Flat,
    Sharp,
}

impl Accidental {
    /// Returns the offset in semitones the accidental applies to a natural note.
    #[must_use]
    pub fn semitones(self) -> i32 {
        match self {
            Accidental::Natural => 0,
            Accidental::Flat => -1,
            Accidental::Sharp => 1,
        }
    }

    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '#' | '♯' => Some(Accidental::Sharp),
            'b' | '♭' => Some(Accidental::Flat),
            _ => None,
        }
    }
}

impl Display for Accidental {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Accidental::Natural => Ok(()),
            Accidental::Flat => f.write_str("b"),
            Accidental::Sharp => f.write_str("#"),
        }
    }
}

/// The union of a natural note and an accidental that describes a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note(pub NaturalNote, pub Accidental);

#[allow(missing_docs)]
impl Note {
    pub const A: Note = Note(NaturalNote::A, Accidental::Natural);
    pub const A_FLAT: Note = Note(NaturalNote::A, Accidental::Flat);
    pub const A_SHARP: Note = Note(NaturalNote::A, Accidental::Sharp);
    pub const B: Note = Note(NaturalNote::B, Accidental::Natural);
    pub const B_FLAT: Note = Note(NaturalNote::B, Accidental::Flat);
    pub const C: Note = Note(NaturalNote::C, Accidental::Natural);
    pub const C_SHARP: Note = Note(NaturalNote::C, Accidental::Sharp);
    pub const D: Note = Note(NaturalNote::D, Accidental::Natural);
    pub const D_FLAT: Note = Note(NaturalNote::D, Accidental::Flat);
    pub const D_SHARP: Note = Note(NaturalNote::D, Accidental::Sharp);
    pub const E: Note = Note(NaturalNote::E, Accidental::Natural);
    pub const E_FLAT: Note = Note(NaturalNote::E, Accidental::Flat);
    pub const F: Note = Note(NaturalNote::F, Accidental::Natural);
    pub const F_SHARP: Note = Note(NaturalNote::F, Accidental::Sharp);
    pub const G: Note = Note(NaturalNote::G, Accidental::Natural);
    pub const G_FLAT: Note = Note(NaturalNote::G, Accidental::Flat);
    pub const G_SHARP: Note = Note(NaturalNote::G, Accidental::Sharp);

    /// Returns the offset of the note from the C of the same octave. Can be negative for `Cb` or
    /// reach 12 for `B#`.
    #[must_use]
    pub fn semitones(&self) -> i32 {
        self.0.semitones() + self.1.semitones()
    }

    /// Returns the pitch class of the note.
    #[must_use]
    pub fn chromatic(&self) -> ChromaticNote {
        ChromaticNote::C.transpose(self.semitones())
    }

    /// Returns the name of the note in the given octave, accounting for spellings that cross the
    /// octave boundary.
    pub fn in_octave(&self, octave: u8) -> Option<NoteEvent> {
        NoteEvent::new(0, octave).transpose(self.semitones())
    }
}

impl Display for Note {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}", self.0, self.1)
    }
}

/// Parses the spelling of a note without its octave, such as `Eb` or `G♯`.
pub fn parse_note_name(name: &str) -> Result<Note, NoteError> {
    let (note, rest) = split_name(name)?;
    if rest.is_empty() {
        Ok(note)
    } else {
        Err(NoteError::UnknownNoteName(name.to_string()))
    }
}

/// Parses a note name followed by an optional octave number, such as `F#3`, `Bb2`, or `C`. A
/// missing octave defaults to zero.
pub fn parse_note(text: &str) -> Result<NoteEvent, NoteError> {
    let text = text.trim();
    let (note, octave_text) = split_name(text)?;
    let octave = if octave_text.is_empty() {
        0
    } else {
        octave_text
            .parse::<u8>()
            .map_err(|_| NoteError::InvalidOctave(text.to_string()))?
    };
    note.in_octave(octave)
        .ok_or_else(|| NoteError::OutOfRange(text.to_string()))
}

/// Splits the letter and accidental at the start of the text from the remainder.
fn split_name(text: &str) -> Result<(Note, &str), NoteError> {
    let mut chars = text.chars();
    let natural = chars
        .next()
        .and_then(NaturalNote::from_letter)
        .ok_or_else(|| NoteError::UnknownNoteName(text.to_string()))?;

    let rest = chars.as_str();
    let mut after_letter = rest.chars();
    match after_letter.next().and_then(Accidental::from_symbol) {
        Some(accidental) => Ok((Note(natural, accidental), after_letter.as_str())),
        None => {
            // Any other non-digit character is a misspelled accidental.
            if rest.chars().next().is_some_and(|c| !c.is_ascii_digit()) {
                return Err(NoteError::UnknownNoteName(text.to_string()));
            }
            Ok((Note(natural, Accidental::Natural), rest))
        }
    }
}
