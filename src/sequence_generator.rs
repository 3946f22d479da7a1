//! Generates the runs of notes the lessons are built from: chromatic runs across the range of the
//! piano and ladders of a fixed interval.

use crate::{
    data::{NoteEvent, NoteSequence, music::intervals::Interval},
    error::GeneratorError,
};

/// The lowest key of the piano, A0.
pub const LOWEST_NOTE: NoteEvent = NoteEvent::new(9, 0);

/// The highest key of the piano, C8.
pub const HIGHEST_NOTE: NoteEvent = NoteEvent::new(0, 8);

/// Interval ladders stop before reaching this octave.
pub const LADDER_CEILING_OCTAVE: u8 = 8;

/// The maximum number of notes a generated sequence can contain.
pub const MAX_SEQUENCE_LENGTH: usize = 100;

/// The direction of a chromatic run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Towards C8.
    Ascending,

    /// Towards A0.
    Descending,
}

fn ensure_on_piano(note: NoteEvent) -> Result<(), GeneratorError> {
    if note < LOWEST_NOTE || note > HIGHEST_NOTE {
        return Err(GeneratorError::OutOfRange(note));
    }
    Ok(())
}

/// Returns every semitone between the two notes, both included, walking from `start` towards
/// `end` in whichever direction `end` lies.
pub fn chromatic_range(start: NoteEvent, end: NoteEvent) -> Result<NoteSequence, GeneratorError> {
    ensure_on_piano(start)?;
    ensure_on_piano(end)?;

    let (from, to) = (start.semitone_index(), end.semitone_index());
    let indices: Box<dyn Iterator<Item = i32>> = if from <= to {
        Box::new(from..=to)
    } else {
        Box::new((to..=from).rev())
    };
    Ok(indices.filter_map(NoteEvent::from_semitone_index).collect())
}

/// Returns every semitone from `start` to the end of the piano in the given direction. The run
/// ends with C8 when ascending and with A0 when descending.
pub fn chromatic_run(
    start: NoteEvent,
    direction: Direction,
) -> Result<NoteSequence, GeneratorError> {
    match direction {
        Direction::Ascending => chromatic_range(start, HIGHEST_NOTE),
        Direction::Descending => chromatic_range(start, LOWEST_NOTE),
    }
}

/// Returns the notes reached by repeatedly adding `interval` semitones to `start`. The ladder
/// stops before the first note in octave eight, so a start at or above that octave yields an
/// empty sequence.
pub fn interval_ladder(start: NoteEvent, interval: u8) -> Result<NoteSequence, GeneratorError> {
    if !(1..=11).contains(&interval) {
        return Err(GeneratorError::InvalidInterval(interval));
    }

    let mut sequence = NoteSequence::new();
    let mut current = Some(start);
    while let Some(note) = current {
        if note.octave >= LADDER_CEILING_OCTAVE {
            break;
        }
        if sequence.len() == MAX_SEQUENCE_LENGTH {
            return Err(GeneratorError::SequenceTooLong(MAX_SEQUENCE_LENGTH));
        }
        sequence.push(note);
        current = note.transpose(i32::from(interval));
    }
    Ok(sequence)
}

/// Same as [`interval_ladder`], but taking a named interval.
pub fn interval_ladder_by(
    start: NoteEvent,
    interval: Interval,
) -> Result<NoteSequence, GeneratorError> {
    interval_ladder(start, interval.semitones())
}
