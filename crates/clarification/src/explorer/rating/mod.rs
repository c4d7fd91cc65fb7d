//! Letter-grade scales: the 9-point display meter and the 7-class prediction scale.

mod delta;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use delta::{DeltaColor, RatingDelta, Trend};

/// Display value for letters outside the scale.
pub const DEFAULT_DISPLAY_VALUE: u8 = 5;

/// Ordinal ESG letter grade, declared worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "CC")]
    Cc,
    #[serde(rename = "CCC")]
    Ccc,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "BB")]
    Bb,
    #[serde(rename = "BBB")]
    Bbb,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AAA")]
    Aaa,
}

/// Class index order of the rating model.
const PREDICTION_SCALE: [LetterGrade; 7] = [
    LetterGrade::Ccc,
    LetterGrade::B,
    LetterGrade::Bb,
    LetterGrade::Bbb,
    LetterGrade::A,
    LetterGrade::Aa,
    LetterGrade::Aaa,
];

impl LetterGrade {
    pub const ALL: [LetterGrade; 9] = [
        LetterGrade::C,
        LetterGrade::Cc,
        LetterGrade::Ccc,
        LetterGrade::B,
        LetterGrade::Bb,
        LetterGrade::Bbb,
        LetterGrade::A,
        LetterGrade::Aa,
        LetterGrade::Aaa,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::Cc => "CC",
            Self::Ccc => "CCC",
            Self::B => "B",
            Self::Bb => "BB",
            Self::Bbb => "BBB",
            Self::A => "A",
            Self::Aa => "AA",
            Self::Aaa => "AAA",
        }
    }

    /// Position on the 9-point display meter (C=2 .. AAA=10).
    pub const fn display_value(self) -> u8 {
        self as u8 + 2
    }

    /// Class index on the prediction scale; `None` for CC and C.
    pub const fn prediction_index(self) -> Option<u8> {
        match self {
            Self::C | Self::Cc => None,
            other => Some(other as u8 - 2),
        }
    }

    /// Exact match against the nine letters; surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|grade| grade.as_str() == trimmed)
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LetterGrade {
    type Err = RatingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| RatingError::UnknownGrade(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("'{0}' is not a rating letter")]
    UnknownGrade(String),
    #[error("predicted class {0} is outside the 0..=6 rating scale")]
    ClassOutOfRange(i64),
}

/// Display meter value for a raw dataset letter. Anything unrecognized maps to 5.
pub fn display_value(letter: &str) -> u8 {
    LetterGrade::parse(letter).map_or(DEFAULT_DISPLAY_VALUE, LetterGrade::display_value)
}

/// Strict class index to letter mapping.
pub fn prediction_grade(index: i64) -> Result<LetterGrade, RatingError> {
    usize::try_from(index)
        .ok()
        .and_then(|position| PREDICTION_SCALE.get(position).copied())
        .ok_or(RatingError::ClassOutOfRange(index))
}

/// Class index to letter, clamping indices outside 0..=6 to CCC or AAA.
pub fn prediction_grade_clamped(index: i64) -> LetterGrade {
    match prediction_grade(index) {
        Ok(grade) => grade,
        Err(_) => {
            let clamped = if index < 0 {
                LetterGrade::Ccc
            } else {
                LetterGrade::Aaa
            };
            warn!(index, clamped = %clamped, "predicted class outside rating scale");
            clamped
        }
    }
}
