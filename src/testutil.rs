//! Contains utilities common to the trainer's tests: a player that records the notes it receives
//! and helpers to press and release keys on a practice session.

use crate::{
    data::{KeyId, NoteEvent, TaskConfig},
    player::NotePlayer,
    session::{KeyDownOutcome, KeyUpOutcome, PracticeSession},
};

/// A call received by a [`RecordingPlayer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The note started playing.
    Played(NoteEvent),

    /// The note stopped playing.
    Released(NoteEvent),
}

/// A player that records every call it receives.
#[derive(Clone, Debug, Default)]
pub struct RecordingPlayer {
    /// The calls in the order they were received.
    pub events: Vec<PlayerEvent>,
}

impl RecordingPlayer {
    /// Returns the notes that started playing, in order.
    #[must_use]
    pub fn played_notes(&self) -> Vec<NoteEvent> {
        self.events
            .iter()
            .filter_map(|event| match event {
                PlayerEvent::Played(note) => Some(*note),
                PlayerEvent::Released(_) => None,
            })
            .collect()
    }
}

impl NotePlayer for RecordingPlayer {
    fn play_note(&mut self, note: NoteEvent) {
        self.events.push(PlayerEvent::Played(note));
    }

    fn release_note(&mut self, note: NoteEvent) {
        self.events.push(PlayerEvent::Released(note));
    }
}

/// Presses and releases a single key.
pub fn tap(session: &mut PracticeSession, key_id: &str) -> (KeyDownOutcome, KeyUpOutcome) {
    let down = session.on_key_down(key_id);
    let up = session.on_key_up(key_id);
    (down, up)
}

/// Presses all the keys, then releases them in the same order. Returns the outcome of the last
/// release, which is the one that can complete a task.
pub fn play_together(session: &mut PracticeSession, key_ids: &[KeyId]) -> KeyUpOutcome {
    for key_id in key_ids {
        session.on_key_down(key_id);
    }
    key_ids
        .iter()
        .map(|key_id| session.on_key_up(key_id))
        .last()
        .unwrap_or_default()
}

/// Taps the keys one after the other. Returns the outcome of the last release.
pub fn play_in_turn(session: &mut PracticeSession, key_ids: &[KeyId]) -> KeyUpOutcome {
    key_ids
        .iter()
        .map(|key_id| tap(session, key_id).1)
        .last()
        .unwrap_or_default()
}

/// Returns a key for each note needed to complete the task, in the order the notes must be
/// played. When several keys play the same note, the first one by name is chosen.
#[must_use]
pub fn keys_to_complete(task: &TaskConfig) -> Vec<KeyId> {
    task.checker
        .targets()
        .iter()
        .filter_map(|note| task.keyboard_mapping.keys_for(note).first().copied())
        .take(task.total)
        .collect()
}
