//! Contains the errors returned by the piano trainer.

use thiserror::Error;
use ustr::Ustr;

use crate::data::{LessonId, NoteEvent};

/// An error returned when parsing a note name such as `F#3` or `Bb2`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum NoteError {
    #[error("unknown note name in {0:?}")]
    UnknownNoteName(String),

    #[error("invalid octave in note {0:?}")]
    InvalidOctave(String),

    #[error("note {0:?} lies below the lowest octave")]
    OutOfRange(String),

    #[error("pitch class {0} is outside the range [0, 11]")]
    InvalidPitchClass(u8),
}

/// An error returned when generating a sequence of notes.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum GeneratorError {
    #[error("interval of {0} semitones is outside the range [1, 11]")]
    InvalidInterval(u8),

    #[error("note {0} lies outside the piano range A0..C8")]
    OutOfRange(NoteEvent),

    #[error("sequence exceeded the maximum length of {0} notes")]
    SequenceTooLong(usize),
}

/// An error returned when parsing a textual keyboard grid.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MappingError {
    #[error("cannot parse token {token:?} at row {row}, column {column}: {source}")]
    InvalidToken {
        row: usize,
        column: usize,
        token: String,
        #[source]
        source: NoteError,
    },

    #[error("grid has {0} rows but the keyboard only has four")]
    TooManyRows(usize),

    #[error("cannot generate layout: {0}")]
    Generator(#[from] GeneratorError),
}

/// An error returned when adding lessons and tasks to the task registry.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum RegistryError {
    #[error("task with ID {0} already exists")]
    DuplicateTask(Ustr),

    #[error("lesson with ID {0} already exists")]
    DuplicateLesson(LessonId),

    #[error("task {task_id} lists unknown task {previous_task_id} as its previous task")]
    UnknownPreviousTask {
        task_id: Ustr,
        previous_task_id: Ustr,
    },

    #[error("task {task_id} in lesson {lesson_id} must follow task {expected:?}, found {found:?}")]
    BrokenChain {
        lesson_id: LessonId,
        task_id: Ustr,
        expected: Option<Ustr>,
        found: Option<Ustr>,
    },

    #[error("cycle in the previous-task chain detected at task {0}")]
    Cycle(Ustr),

    #[error("task {0} has no notes to play")]
    EmptyTask(Ustr),

    #[error("task {task_id} requires {total} notes but only {targets} can be played")]
    UnreachableTotal {
        task_id: Ustr,
        total: usize,
        targets: usize,
    },

    #[error("task {task_id} requires note {note} but no key is bound to it")]
    UnboundTarget { task_id: Ustr, note: NoteEvent },
}

/// An error returned by the practice session.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SessionError {
    #[error("cannot find lesson with ID {0}")]
    UnknownLesson(LessonId),

    #[error("cannot find task with ID {0}")]
    UnknownTask(Ustr),
}

/// An error returned when reading or writing the trainer options.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum OptionsManagerError {
    #[error("cannot retrieve trainer options: {0}")]
    GetOptions(#[source] anyhow::Error),

    #[error("cannot set trainer options: {0}")]
    SetOptions(#[source] anyhow::Error),
}
