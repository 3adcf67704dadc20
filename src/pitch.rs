//! Pitch resolution from staff geometry and clef

use crate::symbols::{AccidentalKind, MusicalSymbol};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Chromatic note names, one per semitone from C
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Musical clef, fixing the pitch of the bottom staff line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    #[default]
    Treble,
    Bass,
}

impl Clef {
    /// MIDI number of the bottom staff line (position 4)
    fn base_midi(&self) -> i32 {
        match self {
            Clef::Treble => 64, // E4
            Clef::Bass => 43,   // G2
        }
    }
}

impl FromStr for Clef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "treble" => Ok(Clef::Treble),
            "bass" => Ok(Clef::Bass),
            other => Err(format!("unknown clef '{}' (expected treble or bass)", other)),
        }
    }
}

/// Map a staff position to a MIDI note number
///
/// Every staff step (line to space, space to line) is modeled as exactly 2
/// semitones. This uniform whole-tone approximation does not reproduce the
/// diatonic interval pattern of a real staff; pitches away from the bottom
/// reference line drift accordingly. It is kept as the defined behavior.
pub fn staff_position_to_midi(position: f32, clef: Clef) -> i32 {
    clef.base_midi() + ((4.0 - position) * 2.0).round() as i32
}

/// Spell a MIDI note number as letter + accidental + octave (e.g. "C#4")
pub fn midi_to_name(midi: i32) -> String {
    let midi = midi.clamp(0, 127);
    let octave = midi / 12 - 1;
    format!("{}{}", NOTE_NAMES[(midi % 12) as usize], octave)
}

/// Rewrite a pitch name's accidental suffix, keeping letter and octave
fn apply_accidental(name: &str, accidental: AccidentalKind) -> String {
    let suffix = match accidental {
        AccidentalKind::Sharp => "#",
        AccidentalKind::DoubleSharp => "##",
        AccidentalKind::Flat => "b",
        AccidentalKind::DoubleFlat => "bb",
        AccidentalKind::None | AccidentalKind::Natural => return name.to_string(),
    };

    let octave_start = name
        .find(|c: char| c.is_ascii_digit() || c == '-')
        .unwrap_or(name.len());
    let letter = &name[..1];
    let octave = &name[octave_start..];
    format!("{}{}{}", letter, suffix, octave)
}

/// Resolve a note head's pitch name from staff position, clef and
/// accidental. Heads with no resolvable staff position default to "C4".
pub fn resolve_pitch(
    staff_position: Option<f32>,
    clef: Clef,
    accidental: AccidentalKind,
) -> String {
    let name = match staff_position {
        Some(position) => midi_to_name(staff_position_to_midi(position, clef)),
        None => "C4".to_string(),
    };
    apply_accidental(&name, accidental)
}

/// Fill in pitch names for every note symbol; rests are left untouched
pub fn resolve_pitches(mut symbols: Vec<MusicalSymbol>, clef: Clef) -> Vec<MusicalSymbol> {
    for symbol in symbols.iter_mut().filter(|s| s.is_note()) {
        symbol.pitch = Some(resolve_pitch(symbol.staff_position, clef, symbol.accidental));
    }
    symbols
}

/// Convert a pitch name like "C4", "F#5" or "Bb3" to a MIDI note number,
/// clamped to the valid [0, 127] range
pub fn note_name_to_midi(name: &str) -> u8 {
    if name.len() < 2 {
        return 60;
    }

    let octave: i32 = name[name.len() - 1..].parse().unwrap_or(4);
    let note = &name[..name.len() - 1];

    let mut chars = note.chars();
    let letter = chars.next().unwrap_or('C').to_ascii_uppercase();
    let base = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => 0,
    };

    let mut semitone = base;
    for modifier in chars {
        match modifier {
            '#' => semitone += 1,
            'b' => semitone -= 1,
            _ => {}
        }
    }

    ((octave + 1) * 12 + semitone).clamp(0, 127) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_line_anchors() {
        assert_eq!(staff_position_to_midi(4.0, Clef::Treble), 64);
        assert_eq!(staff_position_to_midi(4.0, Clef::Bass), 43);
    }

    #[test]
    fn test_accidental_rewrite() {
        assert_eq!(apply_accidental("E4", AccidentalKind::Sharp), "E#4");
        assert_eq!(apply_accidental("C#4", AccidentalKind::Flat), "Cb4");
        assert_eq!(apply_accidental("D5", AccidentalKind::DoubleFlat), "Dbb5");
        assert_eq!(apply_accidental("A#3", AccidentalKind::Natural), "A#3");
    }
}
