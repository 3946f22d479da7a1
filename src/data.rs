//! Defines the basic data structures used by the trainer to describe notes, the bindings between
//! computer keys and notes, the tasks a learner works through, and the progress made on each of
//! them.

pub mod music;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};
use strum::{Display, EnumIter};
use ts_rs::TS;
use ustr::{Ustr, UstrMap};

use crate::{checker::Checker, error::NoteError};

/// The ID of a task. For example, `play-b-across-octaves`.
pub type TaskId = Ustr;

/// The ID of a lesson. Lessons are numbered starting at one in the order they are presented.
pub type LessonId = u32;

/// The identifier of a physical key, independent of the keyboard locale. For example, `KeyA`,
/// `Digit1`, or `Comma`.
pub type KeyId = Ustr;

/// The canonical key of a note used for set membership, of the form `{note}-{octave}`.
pub type NoteKey = Ustr;

/// An ordered list of notes. Notes might repeat.
pub type NoteSequence = Vec<NoteEvent>;

/// The names of the pitch classes, using sharps for the black keys.
const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One of the twelve pitch classes inside an octave, where zero is C. The value is always
/// reduced modulo 12.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, TS,
)]
#[serde(try_from = "u8")]
#[ts(export)]
pub struct ChromaticNote(u8);

#[allow(missing_docs)]
impl ChromaticNote {
    pub const C: ChromaticNote = ChromaticNote(0);
    pub const C_SHARP: ChromaticNote = ChromaticNote(1);
    pub const D: ChromaticNote = ChromaticNote(2);
    pub const D_SHARP: ChromaticNote = ChromaticNote(3);
    pub const E: ChromaticNote = ChromaticNote(4);
    pub const F: ChromaticNote = ChromaticNote(5);
    pub const F_SHARP: ChromaticNote = ChromaticNote(6);
    pub const G: ChromaticNote = ChromaticNote(7);
    pub const G_SHARP: ChromaticNote = ChromaticNote(8);
    pub const A: ChromaticNote = ChromaticNote(9);
    pub const A_SHARP: ChromaticNote = ChromaticNote(10);
    pub const B: ChromaticNote = ChromaticNote(11);

    /// Creates a new chromatic note, wrapping the value around the octave.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        ChromaticNote(value % 12)
    }

    /// Returns the numeric value of the note in the range `[0, 11]`.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns the note the given number of semitones away, wrapping around the octave.
    #[must_use]
    pub fn transpose(self, semitones: i32) -> Self {
        ChromaticNote((i32::from(self.0) + semitones).rem_euclid(12) as u8)
    }

    /// Returns whether the note corresponds to a black key on the piano.
    #[must_use]
    pub fn is_black(self) -> bool {
        matches!(self.0, 1 | 3 | 6 | 8 | 10)
    }

    /// Returns the name of the note using sharps for the black keys.
    #[must_use]
    pub fn name(self) -> &'static str {
        SHARP_NAMES[self.0 as usize]
    }
}

impl TryFrom<u8> for ChromaticNote {
    type Error = NoteError;

    /// Accepts only values in the range `[0, 11]`.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 11 {
            return Err(NoteError::InvalidPitchClass(value));
        }
        Ok(ChromaticNote(value))
    }
}

impl fmt::Display for ChromaticNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single key on the piano, identified by its pitch class and its octave.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct NoteEvent {
    /// The pitch class of the note.
    pub note: ChromaticNote,

    /// The octave of the note. Octave four contains middle C.
    pub octave: u8,
}

impl NoteEvent {
    /// Creates a new note. The note value is wrapped around the octave.
    #[must_use]
    pub const fn new(note: u8, octave: u8) -> Self {
        NoteEvent {
            note: ChromaticNote::new(note),
            octave,
        }
    }

    /// Returns the canonical key of the note, of the form `{note}-{octave}`.
    #[must_use]
    pub fn key(&self) -> NoteKey {
        Ustr::from(&format!("{}-{}", self.note.value(), self.octave))
    }

    /// Parses a canonical key of the form `{note}-{octave}` back into a note.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let (note, octave) = key.split_once('-')?;
        let note: u8 = note.parse().ok()?;
        if note > 11 {
            return None;
        }
        Some(NoteEvent::new(note, octave.parse().ok()?))
    }

    /// Returns the number of semitones between C0 and this note.
    #[must_use]
    pub fn semitone_index(&self) -> i32 {
        i32::from(self.octave) * 12 + i32::from(self.note.value())
    }

    /// Returns the note at the given number of semitones from C0, if it exists.
    #[must_use]
    pub fn from_semitone_index(index: i32) -> Option<Self> {
        if index < 0 {
            return None;
        }
        let octave = u8::try_from(index / 12).ok()?;
        Some(NoteEvent::new((index % 12) as u8, octave))
    }

    /// Returns the note the given number of semitones away, carrying over into the next or
    /// previous octave as needed.
    #[must_use]
    pub fn transpose(&self, semitones: i32) -> Option<Self> {
        Self::from_semitone_index(self.semitone_index() + semitones)
    }
}

impl Ord for NoteEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semitone_index().cmp(&other.semitone_index())
    }
}

impl PartialOrd for NoteEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.note, self.octave)
    }
}

impl FromStr for NoteEvent {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        music::notes::parse_note(s)
    }
}

/// A binding from physical keys to the notes they play. Each key plays at most one note, but the
/// same note can be bound to any number of keys. Binding a key twice replaces the earlier note.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeyboardMapping(UstrMap<NoteEvent>);

impl KeyboardMapping {
    /// Binds the key to the given note, replacing any previous binding for the key.
    pub fn bind(&mut self, key_id: impl Into<KeyId>, note: NoteEvent) {
        self.0.insert(key_id.into(), note);
    }

    /// Returns the note bound to the given key.
    #[must_use]
    pub fn get(&self, key_id: &KeyId) -> Option<NoteEvent> {
        self.0.get(key_id).copied()
    }

    /// Overlays the bindings of the other mapping on top of this one. Keys bound in both mappings
    /// keep the note from `other`.
    pub fn layer(&mut self, other: &KeyboardMapping) {
        self.0.extend(other.0.iter().map(|(key, note)| (*key, *note)));
    }

    /// Returns the number of bound keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no key is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the bindings in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyId, &NoteEvent)> {
        self.0.iter()
    }

    /// Returns whether the note is bound to at least one key.
    #[must_use]
    pub fn contains_note(&self, note: &NoteEvent) -> bool {
        self.0.values().any(|bound| bound == note)
    }

    /// Returns the keys bound to the given note, sorted by name.
    #[must_use]
    pub fn keys_for(&self, note: &NoteEvent) -> Vec<KeyId> {
        let mut keys: Vec<KeyId> = self
            .0
            .iter()
            .filter(|(_, bound)| *bound == note)
            .map(|(key, _)| *key)
            .collect();
        keys.sort();
        keys
    }

    /// Returns the distinct notes of the given pitch class, from lowest to highest.
    #[must_use]
    pub fn notes_of_pitch_class(&self, pitch_class: ChromaticNote) -> Vec<NoteEvent> {
        let mut notes: Vec<NoteEvent> = self
            .0
            .values()
            .filter(|note| note.note == pitch_class)
            .copied()
            .collect();
        notes.sort();
        notes.dedup();
        notes
    }

    /// Returns a mapping with only the bindings whose note has the given pitch class.
    #[must_use]
    pub fn filter_pitch_class(&self, pitch_class: ChromaticNote) -> KeyboardMapping {
        self.0
            .iter()
            .filter(|(_, note)| note.note == pitch_class)
            .map(|(key, note)| (*key, *note))
            .collect()
    }

    /// Returns the distinct pitch classes present in the mapping in ascending order.
    #[must_use]
    pub fn chromatic_notes(&self) -> Vec<ChromaticNote> {
        let mut notes: Vec<ChromaticNote> = self.0.values().map(|note| note.note).collect();
        notes.sort();
        notes.dedup();
        notes
    }
}

impl FromIterator<(KeyId, NoteEvent)> for KeyboardMapping {
    fn from_iter<I: IntoIterator<Item = (KeyId, NoteEvent)>>(iter: I) -> Self {
        let mut mapping = KeyboardMapping::default();
        for (key, note) in iter {
            mapping.bind(key, note);
        }
        mapping
    }
}

/// The color scheme the presentation layer should use for the keys while a task is active.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, EnumIter, Eq, PartialEq, Serialize, TS,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[ts(export)]
pub enum ColorMode {
    /// Each pitch class gets its own color and keys keep the piano layout.
    #[default]
    Chromatic,

    /// Each pitch class gets its own color and all keys are drawn with the same width.
    FlatChromatic,

    /// White and black keys.
    Traditional,
}

/// The status of a task the learner has reached.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TaskStatus {
    /// The task receives the notes played by the learner.
    Active,

    /// All the required notes were played, but some keys are still held down. The task is
    /// finalized once every key is released so that those releases are not attributed to the
    /// next task.
    Completing,

    /// The task is done.
    Completed,
}

/// The progress of the learner on a single task.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TaskProgress {
    /// The ID of the task.
    #[ts(as = "String")]
    pub task_id: TaskId,

    /// The number of required notes played so far.
    pub progress: usize,

    /// The status of the task.
    pub status: TaskStatus,
}

impl TaskProgress {
    /// Returns the progress of a task that was just reached.
    #[must_use]
    pub fn new(task_id: TaskId) -> Self {
        TaskProgress {
            task_id,
            progress: 0,
            status: TaskStatus::Active,
        }
    }
}

/// A task as written by the author of a lesson. The task registry turns definitions into
/// [`TaskConfig`] values once the whole chain of tasks is known.
#[derive(Builder, Clone, Debug)]
pub struct TaskDefinition {
    /// The ID of the task, unique across all lessons.
    #[builder(setter(into))]
    pub id: TaskId,

    /// A short description of what the learner should play.
    #[builder(setter(into), default)]
    pub description: String,

    /// Decides which notes advance the task.
    pub checker: Checker,

    /// The number of notes required to complete the task. Defaults to the number of notes the
    /// checker expects.
    #[builder(setter(strip_option), default)]
    pub total: Option<usize>,

    /// The bindings introduced by this task.
    #[builder(default)]
    pub keyboard_mapping: KeyboardMapping,

    /// Whether the bindings of the previous task remain available under the ones of this task.
    #[builder(default)]
    pub cumulative: bool,

    /// The color scheme used while the task is active.
    #[builder(default)]
    pub color_mode: ColorMode,

    /// The task that must be completed before this one.
    #[builder(setter(into, strip_option), default)]
    pub previous_task_id: Option<TaskId>,
}

/// A task stored in the registry.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskConfig {
    /// The ID of the task.
    pub id: TaskId,

    /// A short description of what the learner should play.
    pub description: String,

    /// Decides which notes advance the task.
    pub checker: Checker,

    /// The number of notes required to complete the task.
    pub total: usize,

    /// The bindings active while the task is the focus, including the ones inherited from
    /// previous tasks.
    pub keyboard_mapping: KeyboardMapping,

    /// The color scheme used while the task is active.
    pub color_mode: ColorMode,

    /// The task that must be completed before this one.
    pub previous_task_id: Option<TaskId>,
}

impl TaskConfig {
    /// Returns the pitch classes present in the task's keyboard mapping.
    #[must_use]
    pub fn chromatic_notes(&self) -> Vec<ChromaticNote> {
        self.keyboard_mapping.chromatic_notes()
    }
}

/// A lesson as written by its author, with the full definition of its tasks.
#[derive(Clone, Debug)]
pub struct LessonDefinition {
    /// The ID of the lesson.
    pub id: LessonId,

    /// The title of the lesson.
    pub title: String,

    /// The paragraphs that introduce the lesson.
    pub content: Vec<String>,

    /// The instruction shown once the learner reaches the last task.
    pub final_text: Option<String>,

    /// The tasks in the order they must be played.
    pub tasks: Vec<TaskDefinition>,
}

/// An ordered group of tasks stored in the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lesson {
    /// The ID of the lesson.
    pub id: LessonId,

    /// The title of the lesson.
    pub title: String,

    /// The paragraphs that introduce the lesson.
    pub content: Vec<String>,

    /// The instruction shown once the learner reaches the last task.
    pub final_text: Option<String>,

    /// The IDs of the tasks in the order they must be played.
    pub task_ids: Vec<TaskId>,
}

/// The options that control the behavior of a practice session.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct TrainerOptions {
    /// Whether completing a task makes the next task in the lesson the active one. If false, the
    /// next task is reached but the learner must activate it.
    pub auto_advance: bool,

    /// The lowest note of the chromatic layout used when no task is active.
    pub free_play_start: NoteEvent,

    /// The color scheme used when no task is active.
    pub free_play_color_mode: ColorMode,

    /// The lesson opened when the trainer starts.
    pub first_lesson: LessonId,
}

impl Default for TrainerOptions {
    /// Returns the default trainer options.
    fn default() -> Self {
        TrainerOptions {
            auto_advance: true,
            free_play_start: NoteEvent::new(0, 3),
            free_play_color_mode: ColorMode::Chromatic,
            first_lesson: 1,
        }
    }
}
