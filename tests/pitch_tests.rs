//! Validation tests for pitch resolution

use sheet2midi::pitch::{
    midi_to_name, note_name_to_midi, resolve_pitch, staff_position_to_midi, Clef,
};
use sheet2midi::symbols::AccidentalKind;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_pitches() {
        assert_eq!(note_name_to_midi("C4"), 60);
        assert_eq!(note_name_to_midi("A4"), 69);
        assert_eq!(note_name_to_midi("C5"), 72);
    }

    #[test]
    fn test_all_names_resolve_within_midi_range() {
        let letters = ["C", "D", "E", "F", "G", "A", "B"];
        let suffixes = ["", "#", "##", "b", "bb"];

        for letter in letters {
            for suffix in suffixes {
                for octave in 0..=9 {
                    let name = format!("{}{}{}", letter, suffix, octave);
                    let midi = note_name_to_midi(&name);
                    assert!(midi <= 127, "{} resolved to {}", name, midi);
                }
            }
        }
    }

    #[test]
    fn test_accidental_suffix_shifts_semitones() {
        assert_eq!(note_name_to_midi("F#4"), note_name_to_midi("F4") + 1);
        assert_eq!(note_name_to_midi("F##4"), note_name_to_midi("F4") + 2);
        assert_eq!(note_name_to_midi("Bb3"), note_name_to_midi("B3") - 1);
        assert_eq!(note_name_to_midi("Bbb3"), note_name_to_midi("B3") - 2);
    }

    #[test]
    fn test_degenerate_names_default_to_c4() {
        assert_eq!(note_name_to_midi(""), 60);
        assert_eq!(note_name_to_midi("X"), 60);
    }

    #[test]
    fn test_bottom_line_by_clef() {
        assert_eq!(staff_position_to_midi(4.0, Clef::Treble), 64); // E4
        assert_eq!(staff_position_to_midi(4.0, Clef::Bass), 43); // G2
        assert_eq!(midi_to_name(64), "E4");
        assert_eq!(midi_to_name(43), "G2");
    }

    #[test]
    fn test_uniform_two_semitone_steps() {
        // Each half-position step moves one semitone under the whole-tone
        // approximation
        assert_eq!(staff_position_to_midi(3.5, Clef::Treble), 65);
        assert_eq!(staff_position_to_midi(3.0, Clef::Treble), 66);
        assert_eq!(staff_position_to_midi(0.0, Clef::Treble), 72);
    }

    #[test]
    fn test_resolve_pitch_with_accidentals() {
        assert_eq!(
            resolve_pitch(Some(4.0), Clef::Treble, AccidentalKind::None),
            "E4"
        );
        assert_eq!(
            resolve_pitch(Some(4.0), Clef::Treble, AccidentalKind::Sharp),
            "E#4"
        );
        assert_eq!(
            resolve_pitch(Some(4.0), Clef::Treble, AccidentalKind::DoubleFlat),
            "Ebb4"
        );
        // Natural keeps the table spelling
        assert_eq!(
            resolve_pitch(Some(3.0), Clef::Treble, AccidentalKind::Natural),
            "F#4"
        );
    }

    #[test]
    fn test_unresolvable_position_defaults_to_c4() {
        assert_eq!(resolve_pitch(None, Clef::Treble, AccidentalKind::None), "C4");
        assert_eq!(
            resolve_pitch(None, Clef::Bass, AccidentalKind::Sharp),
            "C#4"
        );
    }

    #[test]
    fn test_midi_name_round_trip_on_naturals_and_sharps() {
        for midi in 24..=96 {
            let name = midi_to_name(midi);
            assert_eq!(note_name_to_midi(&name) as i32, midi);
        }
    }
}
