//! Defines the scale modes used by the lessons, each as a list of offsets from the tonic.

use strum::{Display, EnumIter};

use crate::{
    data::{NoteEvent, NoteSequence},
    error::GeneratorError,
};

/// Defines a type of scale. Each mode is described by the offsets in semitones of its degrees
/// from the tonic.
#[derive(Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ScaleMode {
    #[strum(to_string = "Major")]
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    #[strum(to_string = "Minor")]
    Aeolian,
    Locrian,
    #[strum(to_string = "Minor Pentatonic")]
    MinorPentatonic,
    Hirajoshi,
}

impl ScaleMode {
    /// Alias for the Ionian mode.
    pub const MAJOR: ScaleMode = ScaleMode::Ionian;

    /// Alias for the Aeolian mode.
    pub const MINOR: ScaleMode = ScaleMode::Aeolian;

    /// Returns the offsets of the degrees of the scale from the tonic, starting with the tonic.
    #[must_use]
    pub fn offsets(self) -> &'static [u8] {
        match self {
            ScaleMode::Ionian => &[0, 2, 4, 5, 7, 9, 11],
            ScaleMode::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleMode::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleMode::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            ScaleMode::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleMode::Aeolian => &[0, 2, 3, 5, 7, 8, 10],
            ScaleMode::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            ScaleMode::MinorPentatonic => &[0, 3, 5, 7, 10],
            ScaleMode::Hirajoshi => &[0, 1, 5, 6, 10],
        }
    }

    /// Returns the number of distinct degrees in the scale.
    #[must_use]
    pub fn degrees(self) -> usize {
        self.offsets().len()
    }
}

/// Returns the notes of the scale from the tonic up to the tonic one octave higher.
pub fn scale_sequence(mode: ScaleMode, tonic: NoteEvent) -> Result<NoteSequence, GeneratorError> {
    mode.offsets()
        .iter()
        .map(|offset| i32::from(*offset))
        .chain(std::iter::once(12))
        .map(|offset| {
            tonic
                .transpose(offset)
                .ok_or(GeneratorError::OutOfRange(tonic))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    /// Verifies the C major scale starting at C3.
    #[test]
    fn c_major() -> anyhow::Result<()> {
        let scale = scale_sequence(ScaleMode::MAJOR, NoteEvent::new(0, 3))?;
        assert_eq!(
            scale,
            vec![
                NoteEvent::new(0, 3),
                NoteEvent::new(2, 3),
                NoteEvent::new(4, 3),
                NoteEvent::new(5, 3),
                NoteEvent::new(7, 3),
                NoteEvent::new(9, 3),
                NoteEvent::new(11, 3),
                NoteEvent::new(0, 4),
            ]
        );
        Ok(())
    }

    /// Verifies that a scale starting on a late note carries into the next octave.
    #[test]
    fn carries_octave() -> anyhow::Result<()> {
        let scale = scale_sequence(ScaleMode::Locrian, NoteEvent::new(11, 4))?;
        assert_eq!(scale[1], NoteEvent::new(0, 5));
        assert_eq!(scale[7], NoteEvent::new(11, 5));
        Ok(())
    }

    /// Verifies that every scale is ascending and closes on the octave.
    #[test]
    fn every_mode_ascends() -> anyhow::Result<()> {
        let tonic = NoteEvent::new(9, 2);
        for mode in ScaleMode::iter() {
            let scale = scale_sequence(mode, tonic)?;
            assert_eq!(scale.len(), mode.degrees() + 1);
            assert!(scale.windows(2).all(|pair| pair[0] < pair[1]));
            assert_eq!(scale.last().copied(), tonic.transpose(12));
        }
        Ok(())
    }

    /// Verifies the display names of the modes.
    #[test]
    fn mode_names() {
        assert_eq!(ScaleMode::Ionian.to_string(), "Major");
        assert_eq!(ScaleMode::Aeolian.to_string(), "Minor");
        assert_eq!(ScaleMode::MinorPentatonic.to_string(), "Minor Pentatonic");
    }
}
