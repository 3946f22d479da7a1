//! Contains the music theory used to generate the notes of the lessons.

pub mod chords;
pub mod intervals;
pub mod notes;
pub mod scales;
