//! Describes the physical computer keyboard and builds keyboard mappings on top of it, either from
//! a list of notes laid over a sequence of keys or from a textual grid with one line per row of
//! keys.
//!
//! A grid has up to four lines. The first line binds the number row, the second the top letter
//! row, the third the home row and the fourth the bottom row. Each whitespace-separated token is a
//! note name such as `F#3` or the sentinel `.`, which leaves the key unbound. Tokens past the end
//! of a row are ignored.

use indoc::indoc;
use strum::{Display, EnumIter};
use ustr::Ustr;

use crate::{
    data::{KeyboardMapping, NoteEvent, music::notes::parse_note},
    error::{GeneratorError, MappingError},
    sequence_generator::{Direction, chromatic_run},
};

/// The token that leaves a key unbound in a grid.
pub const UNBOUND_TOKEN: &str = ".";

/// The number row.
pub const NUMBER_ROW: [&str; 12] = [
    "Digit1", "Digit2", "Digit3", "Digit4", "Digit5", "Digit6", "Digit7", "Digit8", "Digit9",
    "Digit0", "Minus", "Equal",
];

/// The top row of letters.
pub const TOP_ROW: [&str; 12] = [
    "KeyQ",
    "KeyW",
    "KeyE",
    "KeyR",
    "KeyT",
    "KeyY",
    "KeyU",
    "KeyI",
    "KeyO",
    "KeyP",
    "BracketLeft",
    "BracketRight",
];

/// The home row.
pub const HOME_ROW: [&str; 11] = [
    "KeyA",
    "KeyS",
    "KeyD",
    "KeyF",
    "KeyG",
    "KeyH",
    "KeyJ",
    "KeyK",
    "KeyL",
    "Semicolon",
    "Quote",
];

/// The bottom row of letters.
pub const BOTTOM_ROW: [&str; 10] = [
    "KeyZ", "KeyX", "KeyC", "KeyV", "KeyB", "KeyN", "KeyM", "Comma", "Period", "Slash",
];

/// The rows of keys in the order used by grids, from the top of the keyboard to the bottom.
pub const KEYBOARD_ROWS: [&[&str]; 4] = [&NUMBER_ROW, &TOP_ROW, &HOME_ROW, &BOTTOM_ROW];

/// Every key from the bottom-left of the keyboard to the top-right, row by row.
pub const FLAT_KEY_SEQUENCE: [&str; 45] = [
    "KeyZ",
    "KeyX",
    "KeyC",
    "KeyV",
    "KeyB",
    "KeyN",
    "KeyM",
    "Comma",
    "Period",
    "Slash",
    "KeyA",
    "KeyS",
    "KeyD",
    "KeyF",
    "KeyG",
    "KeyH",
    "KeyJ",
    "KeyK",
    "KeyL",
    "Semicolon",
    "Quote",
    "KeyQ",
    "KeyW",
    "KeyE",
    "KeyR",
    "KeyT",
    "KeyY",
    "KeyU",
    "KeyI",
    "KeyO",
    "KeyP",
    "BracketLeft",
    "BracketRight",
    "Digit1",
    "Digit2",
    "Digit3",
    "Digit4",
    "Digit5",
    "Digit6",
    "Digit7",
    "Digit8",
    "Digit9",
    "Digit0",
    "Minus",
    "Equal",
];

/// Returns the character printed on the given key.
#[must_use]
pub fn key_label(key_id: &str) -> Option<char> {
    match key_id {
        "Comma" => Some(','),
        "Period" => Some('.'),
        "Slash" => Some('/'),
        "Semicolon" => Some(';'),
        "Quote" => Some('\''),
        "BracketLeft" => Some('['),
        "BracketRight" => Some(']'),
        "Minus" => Some('-'),
        "Equal" => Some('='),
        _ => {
            let suffix = key_id
                .strip_prefix("Key")
                .or_else(|| key_id.strip_prefix("Digit"))?;
            let mut chars = suffix.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
                _ => None,
            }
        }
    }
}

/// Binds the i-th note to the i-th key. Notes without a matching key are ignored.
pub fn bind_sequence<'a>(
    notes: &[NoteEvent],
    keys: impl IntoIterator<Item = &'a str>,
) -> KeyboardMapping {
    keys.into_iter()
        .zip(notes)
        .map(|(key, note)| (Ustr::from(key), *note))
        .collect()
}

/// Lays the notes over the keyboard from the bottom-left key to the top-right one.
#[must_use]
pub fn flat_mapping(notes: &[NoteEvent]) -> KeyboardMapping {
    bind_sequence(notes, FLAT_KEY_SEQUENCE)
}

/// Lays a chromatic run starting at `start` over the keyboard from the bottom-left key to the
/// top-right one.
pub fn flat_chromatic_mapping(start: NoteEvent) -> Result<KeyboardMapping, GeneratorError> {
    Ok(flat_mapping(&chromatic_run(start, Direction::Ascending)?))
}

/// Parses a textual grid into a keyboard mapping.
pub fn parse_grid(text: &str) -> Result<KeyboardMapping, MappingError> {
    let lines: Vec<&str> = text.trim().lines().collect();
    if lines.len() > KEYBOARD_ROWS.len() {
        return Err(MappingError::TooManyRows(lines.len()));
    }

    let mut mapping = KeyboardMapping::default();
    for (row, (line, keys)) in lines.iter().zip(KEYBOARD_ROWS).enumerate() {
        for (column, (token, key)) in line.split_whitespace().zip(keys.iter()).enumerate() {
            if token == UNBOUND_TOKEN {
                continue;
            }
            let note = parse_note(token).map_err(|source| MappingError::InvalidToken {
                row,
                column,
                token: token.to_string(),
                source,
            })?;
            mapping.bind(*key, note);
        }
    }
    Ok(mapping)
}

/// The named layouts that can be used for free play.
#[derive(Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Layout {
    #[strum(to_string = "Major/minor Tonic Chord")]
    TonicChord,
    #[strum(to_string = "Fifths Only")]
    FifthsOnly,
    #[strum(to_string = "Fourths Only")]
    FourthsOnly,
    #[strum(to_string = "Four Augmented Scales")]
    AugmentedScales,
    #[strum(to_string = "Minor Pentatonic")]
    MinorPentatonic,
    #[strum(to_string = "Hirajoshi Scale")]
    Hirajoshi,
    #[strum(to_string = "Flat Chromatic Layout")]
    FlatChromatic,
}

/// The lowest note of the flat chromatic layout.
pub const FLAT_LAYOUT_START: NoteEvent = NoteEvent::new(0, 2);

impl Layout {
    /// Returns the grid describing the layout. The flat chromatic layout is generated and has no
    /// grid.
    #[must_use]
    pub fn grid(self) -> Option<&'static str> {
        let grid = match self {
            Layout::FlatChromatic => return None,
            Layout::TonicChord => indoc! {"
                E1 E2 E3 E4 E5 E6 E7 . . . . .
                G1 G2 G3 G4 G5 G6 G7 . . . . .
                C1 C2 C3 C4 C5 C6 C7 C8 . . .
                Eb1 Eb2 Eb3 Eb4 Eb5 Eb6 Eb7 . . .
            "},
            Layout::FifthsOnly => indoc! {"
                C1 G1 D2 A2 E3 B3 F#4 C#5 G#5 D#6 A#6 F7
                C2 G2 D3 A3 E4 B4 F#5 C#6 G#6 D#7 A#7 F8
                C3 G3 D4 A4 E5 B5 F#6 C#7 G#7 D#8 A#8 .
                C4 G4 D5 A5 E6 B6 F#7 C#8 . . . .
            "},
            Layout::FourthsOnly => indoc! {"
                C1 F1 Bb1 Eb2 Ab2 Db3 Gb3 B3 E4 A4 D5 G5
                C2 F2 Bb2 Eb3 Ab3 Db4 Gb4 B4 E5 A5 D6 G6
                C3 F3 Bb3 Eb4 Ab4 Db5 Gb5 B5 E6 A6 D7 G7
                C4 F4 Bb4 Eb5 Ab5 Db6 Gb6 B6 E7 A7 D8 G8
            "},
            Layout::AugmentedScales => indoc! {"
                C2 E2 G#2 C3 E3 G#3 C4 E4 G#4 C5 E5 G#5
                C#2 F2 A2 C#3 F3 A3 C#4 F4 A4 C#5 F5 A5
                D2 F#2 A#2 D3 F#3 A#3 D4 F#4 A#4 D5 F#5 A#5
                D#2 G2 B2 D#3 G3 B3 D#4 G4 B4 D#5 G5 B5
            "},
            Layout::MinorPentatonic => indoc! {"
                C4 Eb4 F4 G4 Bb4 . . . . . . .
                C3 Eb3 F3 G3 Bb3 C7 Eb7 F7 G7 Bb7 . .
                C2 Eb2 F2 G2 Bb2 C6 Eb6 F6 G6 Bb6 .
                C1 Eb1 F1 G1 Bb1 C5 Eb5 F5 G5 Bb5
            "},
            Layout::Hirajoshi => indoc! {"
                C4 C#4 F4 F#4 Bb4 C8 . . . . . Bb0
                C3 C#3 F3 F#3 Bb3 C7 C#7 F7 F#7 Bb7
                C2 C#2 F2 F#2 Bb2 C6 C#6 F6 F#6 Bb6
                C1 C#1 F1 F#1 Bb1 C5 C#5 F5 F#5 Bb5
            "},
        };
        Some(grid)
    }

    /// Returns the keyboard mapping of the layout.
    pub fn mapping(self) -> Result<KeyboardMapping, MappingError> {
        match self.grid() {
            Some(grid) => parse_grid(grid),
            None => Ok(flat_chromatic_mapping(FLAT_LAYOUT_START)?),
        }
    }
}
