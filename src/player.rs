//! Defines the port through which the trainer makes sound. Synthesis lives outside the crate.
//! The session only tells the player which notes start and stop.

use crate::data::NoteEvent;

/// Receives the notes played by the learner. Calls are synchronous and must not block.
pub trait NotePlayer {
    /// Starts playing the note.
    fn play_note(&mut self, note: NoteEvent);

    /// Stops playing the note.
    fn release_note(&mut self, note: NoteEvent);
}

/// A player that makes no sound. Used when the host has no audio output.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentPlayer;

impl NotePlayer for SilentPlayer {
    fn play_note(&mut self, _note: NoteEvent) {}

    fn release_note(&mut self, _note: NoteEvent) {}
}
