//! Defines the table of the 24 major and minor triads used by the chord lessons. Every chord has a
//! fixed voicing and is played on three fixed keys, so that the chords of one quality can be laid
//! out on the keyboard at the same time.

use strum::{Display, EnumIter};
use ustr::Ustr;

use crate::data::{ChromaticNote, KeyboardMapping, NoteEvent};

/// The spelling of the chord roots, in chromatic order.
const ROOT_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B",
];

/// The three keys that play each chord, in the chromatic order of the roots.
const CHORD_KEYS: [[&str; 3]; 12] = [
    ["KeyZ", "KeyX", "KeyC"],
    ["KeyV", "KeyB", "KeyN"],
    ["KeyM", "Comma", "Period"],
    ["KeyA", "KeyS", "KeyD"],
    ["KeyF", "KeyG", "KeyH"],
    ["KeyJ", "KeyK", "KeyL"],
    ["KeyQ", "KeyW", "KeyE"],
    ["KeyR", "KeyT", "KeyY"],
    ["KeyU", "KeyI", "KeyO"],
    ["Digit1", "Digit2", "Digit3"],
    ["Digit4", "Digit5", "Digit6"],
    ["Digit7", "Digit8", "Digit9"],
];

/// The quality of a triad.
#[derive(Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
#[allow(missing_docs)]
pub enum ChordQuality {
    Major,
    Minor,
}

impl ChordQuality {
    /// Returns the offsets in semitones of the third and the fifth from the root.
    #[must_use]
    pub fn offsets(self) -> [i32; 3] {
        match self {
            ChordQuality::Major => [0, 4, 7],
            ChordQuality::Minor => [0, 3, 7],
        }
    }
}

/// A triad in root position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Triad {
    /// The quality of the chord.
    pub quality: ChordQuality,

    /// The root, third, and fifth of the chord, from lowest to highest.
    pub notes: [NoteEvent; 3],
}

impl Triad {
    /// Returns the root-position triad built on the given note, if all its notes exist.
    #[must_use]
    pub fn voiced(root: NoteEvent, quality: ChordQuality) -> Option<Self> {
        let [r, t, f] = quality.offsets();
        Some(Triad {
            quality,
            notes: [root.transpose(r)?, root.transpose(t)?, root.transpose(f)?],
        })
    }

    /// Returns the root of the chord.
    #[must_use]
    pub fn root(&self) -> NoteEvent {
        self.notes[0]
    }

    /// Returns the pitch classes of the chord in root, third, fifth order.
    #[must_use]
    pub fn chromatic_notes(&self) -> [ChromaticNote; 3] {
        self.notes.map(|note| note.note)
    }
}

/// An entry of the chord table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChordEntry {
    /// The position of the root in chromatic order, which is also the position of the chord in
    /// its lesson.
    pub index: usize,

    /// The voiced chord.
    pub triad: Triad,

    /// The keys that play the root, third, and fifth.
    pub keys: [&'static str; 3],
}

impl ChordEntry {
    /// Returns the name of the chord, such as `C#-major` or `Bb-minor`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}-{}", ROOT_NAMES[self.index], self.triad.quality)
    }

    /// Returns the bindings of the chord's keys to its notes.
    #[must_use]
    pub fn mapping(&self) -> KeyboardMapping {
        self.keys
            .iter()
            .zip(self.triad.notes)
            .map(|(key, note)| (Ustr::from(key), note))
            .collect()
    }
}

/// Returns the octave in which the chord with the given root is voiced. Low roots sit in the
/// second octave, the middle ones in the third, and the rest in the fourth.
fn root_octave(index: usize) -> u8 {
    match index {
        0..=2 => 2,
        3..=5 => 3,
        _ => 4,
    }
}

/// Returns the table entry for the chord with the given root and quality.
#[must_use]
pub fn chord(root: ChromaticNote, quality: ChordQuality) -> ChordEntry {
    let index = root.value() as usize;
    let base = usize::from(root_octave(index)) * 12 + index;
    let notes = quality.offsets().map(|offset| {
        let semitone = base + offset as usize;
        NoteEvent::new((semitone % 12) as u8, (semitone / 12) as u8)
    });
    ChordEntry {
        index,
        triad: Triad { quality, notes },
        keys: CHORD_KEYS[index],
    }
}

/// Returns the twelve chords of the given quality in chromatic order of their roots.
#[must_use]
pub fn chords(quality: ChordQuality) -> Vec<ChordEntry> {
    (0..12).map(|root| chord(ChromaticNote::new(root), quality)).collect()
}

/// Looks up a chord by name, such as `C#-major` or `Bb-minor`.
#[must_use]
pub fn chord_by_name(name: &str) -> Option<ChordEntry> {
    let (root_name, quality_name) = name.split_once('-')?;
    let index = ROOT_NAMES.iter().position(|root| *root == root_name)?;
    let quality = match quality_name {
        "major" => ChordQuality::Major,
        "minor" => ChordQuality::Minor,
        _ => return None,
    };
    Some(chord(ChromaticNote::new(index as u8), quality))
}
