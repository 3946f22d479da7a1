//! Decides whether a played note advances a task. Checkers hold no mutable state. The notes
//! already counted live in a [`NoteHistory`] owned by the practice session.

use ustr::UstrSet;

use crate::data::{NoteEvent, NoteSequence};

/// The notes already counted towards the active task.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteHistory {
    /// The canonical keys of the notes counted so far.
    pub played: UstrSet,

    /// The position of the next expected note in a sequence.
    pub next_index: usize,
}

impl NoteHistory {
    /// Records a note that advanced the task.
    pub fn record(&mut self, note: &NoteEvent) {
        self.played.insert(note.key());
        self.next_index += 1;
    }

    /// Forgets every recorded note.
    pub fn reset(&mut self) {
        self.played.clear();
        self.next_index = 0;
    }
}

/// Decides which notes count towards a task.
#[derive(Clone, Debug, PartialEq)]
pub enum Checker {
    /// The notes must be played in this exact order.
    Sequence(NoteSequence),

    /// Each note must be played once, in any order. Contains canonical note keys.
    Set(UstrSet),
}

impl Checker {
    /// Returns a checker that accepts the given notes in any order.
    pub fn set_of<'a>(notes: impl IntoIterator<Item = &'a NoteEvent>) -> Self {
        Checker::Set(notes.into_iter().map(NoteEvent::key).collect())
    }

    /// Returns whether playing the note advances the task given what was already played.
    #[must_use]
    pub fn check_note(&self, note: &NoteEvent, history: &NoteHistory) -> bool {
        match self {
            Checker::Sequence(sequence) => sequence.get(history.next_index) == Some(note),
            Checker::Set(targets) => {
                let key = note.key();
                targets.contains(&key) && !history.played.contains(&key)
            }
        }
    }

    /// Returns the number of notes counted towards the task.
    #[must_use]
    pub fn progress(&self, history: &NoteHistory) -> usize {
        match self {
            Checker::Sequence(_) => history.next_index,
            Checker::Set(targets) => history.played.intersection(targets).count(),
        }
    }

    /// Returns the number of notes that can be counted towards the task.
    #[must_use]
    pub fn target_size(&self) -> usize {
        match self {
            Checker::Sequence(sequence) => sequence.len(),
            Checker::Set(targets) => targets.len(),
        }
    }

    /// Returns the notes the learner must play. Sequences keep their order and sets are sorted
    /// from the lowest note to the highest.
    #[must_use]
    pub fn targets(&self) -> NoteSequence {
        match self {
            Checker::Sequence(sequence) => sequence.clone(),
            Checker::Set(targets) => {
                let mut notes: NoteSequence = targets
                    .iter()
                    .filter_map(|key| NoteEvent::from_key(key))
                    .collect();
                notes.sort();
                notes
            }
        }
    }
}
