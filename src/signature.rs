//! Time and key signatures

use crate::symbols::MusicalSymbol;
use serde::{Deserialize, Serialize};

/// Global time signature of a detection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

/// Global key signature of a detection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeySignature {
    pub sharps: u8,
    pub flats: u8,
}

/// A detection result that records whether it came from image evidence or
/// from the built-in default, so consumers and tests can tell the two apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Detection<T> {
    Detected(T),
    Defaulted(T),
}

impl<T> Detection<T> {
    pub fn value(&self) -> &T {
        match self {
            Detection::Detected(v) | Detection::Defaulted(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Detection::Detected(v) | Detection::Defaulted(v) => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Detection::Defaulted(_))
    }
}

/// Detect the time signature from the recognized symbols
///
/// Signature glyph recognition is not implemented; the result is always
/// the 4/4 fallback, tagged as such.
pub fn detect_time_signature(_symbols: &[MusicalSymbol]) -> Detection<TimeSignature> {
    Detection::Defaulted(TimeSignature::default())
}

/// Detect the key signature from the recognized symbols
///
/// Signature glyph recognition is not implemented; the result is always
/// the no-accidentals fallback, tagged as such.
pub fn detect_key_signature(_symbols: &[MusicalSymbol]) -> Detection<KeySignature> {
    Detection::Defaulted(KeySignature::default())
}
