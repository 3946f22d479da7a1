//! Defines the musical intervals.

use strum::{Display, EnumIter};

/// Defines the different musical intervals.
#[derive(Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Interval {
    Unison,
    #[strum(to_string = "Minor Second")]
    MinorSecond,
    #[strum(to_string = "Major Second")]
    MajorSecond,
    #[strum(to_string = "Minor Third")]
    MinorThird,
    #[strum(to_string = "Major Third")]
    MajorThird,
    #[strum(to_string = "Perfect Fourth")]
    PerfectFourth,
    Tritone,
    #[strum(to_string = "Perfect Fifth")]
    PerfectFifth,
    #[strum(to_string = "Minor Sixth")]
    MinorSixth,
    #[strum(to_string = "Major Sixth")]
    MajorSixth,
    #[strum(to_string = "Minor Seventh")]
    MinorSeventh,
    #[strum(to_string = "Major Seventh")]
    MajorSeventh,
    Octave,
}

impl Interval {
    /// Returns the size of the interval in semitones.
    #[must_use]
    pub fn semitones(self) -> u8 {
        match self {
            Interval::Unison => 0,
            Interval::MinorSecond => 1,
            Interval::MajorSecond => 2,
            Interval::MinorThird => 3,
            Interval::MajorThird => 4,
            Interval::PerfectFourth => 5,
            Interval::Tritone => 6,
            Interval::PerfectFifth => 7,
            Interval::MinorSixth => 8,
            Interval::MajorSixth => 9,
            Interval::MinorSeventh => 10,
            Interval::MajorSeventh => 11,
            Interval::Octave => 12,
        }
    }
}
