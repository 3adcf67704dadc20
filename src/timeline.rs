//! Temporal assembly: spatial symbol order to a time-ordered event timeline

use crate::config::{ExportConfig, TimingConfig};
use crate::pitch::note_name_to_midi;
use crate::symbols::{Duration, MusicalSymbol};
use serde::{Deserialize, Serialize};

/// One entry of the event timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventGroup {
    /// One or more simultaneous notes sharing an onset; the group's elapsed
    /// time equals its longest member duration
    Chord {
        keys: Vec<u8>,
        duration_ticks: u32,
    },
    /// Time advancing with no sounding note
    Silence { duration_ticks: u32 },
}

impl EventGroup {
    pub fn duration_ticks(&self) -> u32 {
        match self {
            EventGroup::Chord { duration_ticks, .. }
            | EventGroup::Silence { duration_ticks } => *duration_ticks,
        }
    }
}

/// Ordered, polyphony-aware event timeline handed to the MIDI encoder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTimeline {
    pub groups: Vec<EventGroup>,
    pub ticks_per_quarter: u16,
}

impl EventTimeline {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_ticks(&self) -> u32 {
        self.groups.iter().map(|g| g.duration_ticks()).sum()
    }
}

/// Convert a duration to MIDI ticks; unclassified durations default to a
/// quarter note
pub fn duration_to_ticks(duration: Option<Duration>, ticks_per_quarter: u16) -> u32 {
    let quarter_notes = duration.unwrap_or(Duration::Quarter).quarter_notes();
    (quarter_notes * ticks_per_quarter as f32).round() as u32
}

/// Assemble the x-sorted symbol set into the event timeline
///
/// Symbols whose x lies within `time_threshold_px` of the group anchor (the
/// first symbol of the group) share one onset. Groups with at least one
/// pitched note become chords; rest-only groups become silences that push
/// time forward without sounding.
pub fn assemble(
    symbols: &[MusicalSymbol],
    timing: &TimingConfig,
    export: &ExportConfig,
) -> EventTimeline {
    let events: Vec<&MusicalSymbol> = symbols
        .iter()
        .filter(|s| s.pitch.is_some() || !s.is_note())
        .collect();

    let mut groups = Vec::new();
    let threshold = timing.time_threshold_px as i64;

    let mut i = 0;
    while i < events.len() {
        let anchor_x = events[i].bbox.x as i64;
        let mut j = i + 1;
        while j < events.len() && events[j].bbox.x as i64 - anchor_x <= threshold {
            j += 1;
        }
        let group = &events[i..j];

        let keys: Vec<u8> = group
            .iter()
            .filter_map(|s| s.pitch.as_deref())
            .map(note_name_to_midi)
            .collect();

        let duration_ticks = if keys.is_empty() {
            // Silence: the longest rest in the window sets the gap
            group
                .iter()
                .map(|s| duration_to_ticks(s.duration, export.ticks_per_quarter))
                .max()
                .unwrap_or(0)
        } else {
            group
                .iter()
                .filter(|s| s.pitch.is_some())
                .map(|s| duration_to_ticks(s.duration, export.ticks_per_quarter))
                .max()
                .unwrap_or(0)
        };

        if keys.is_empty() {
            groups.push(EventGroup::Silence { duration_ticks });
        } else {
            groups.push(EventGroup::Chord {
                keys,
                duration_ticks,
            });
        }

        i = j;
    }

    EventTimeline {
        groups,
        ticks_per_quarter: export.ticks_per_quarter,
    }
}
