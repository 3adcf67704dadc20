//! MIDI export: event timeline to standard MIDI file

use crate::config::ExportConfig;
use crate::error::Result as OmrResult;
use crate::signature::TimeSignature;
use crate::timeline::{EventGroup, EventTimeline};
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, TrackEvent, TrackEventKind};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write the timeline to a MIDI file at the given path
pub fn export_midi(
    timeline: &EventTimeline,
    time_signature: TimeSignature,
    config: &ExportConfig,
    output_path: &Path,
) -> OmrResult<()> {
    if timeline.is_empty() {
        eprintln!("Warning: no events to export; writing metadata-only MIDI file");
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let midi_data = encode_timeline(timeline, time_signature, config)?;

    let mut file = File::create(output_path)?;
    file.write_all(&midi_data)?;

    println!(
        "Exported {} event group(s) to {}",
        timeline.groups.len(),
        output_path.display()
    );
    Ok(())
}

/// Convert the event timeline to MIDI file bytes
pub fn encode_timeline(
    timeline: &EventTimeline,
    time_signature: TimeSignature,
    config: &ExportConfig,
) -> OmrResult<Vec<u8>> {
    let ppq = timeline.ticks_per_quarter.max(1);
    let tempo_uspq = 60_000_000 / config.tempo_bpm.max(1);
    let channel = u4::from(config.channel);
    let velocity = u7::from(config.velocity);

    let mut track_events = Vec::new();

    track_events.push(TrackEvent {
        delta: u28::from(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(b"Sheet Music Track")),
    });
    track_events.push(TrackEvent {
        delta: u28::from(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::from(tempo_uspq))),
    });
    track_events.push(TrackEvent {
        delta: u28::from(0),
        kind: TrackEventKind::Meta(MetaMessage::TimeSignature(
            time_signature.numerator,
            denominator_log2(time_signature.denominator),
            24, // MIDI clocks per metronome click
            8,  // 32nd notes per quarter note
        )),
    });
    track_events.push(TrackEvent {
        delta: u28::from(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::from(config.program),
            },
        },
    });

    // Silences accumulate here and land on the next emitted event
    let mut pending_ticks = 0u32;

    for group in &timeline.groups {
        match group {
            EventGroup::Silence { duration_ticks } => {
                pending_ticks += duration_ticks;
            }
            EventGroup::Chord {
                keys,
                duration_ticks,
            } => {
                for (i, &key) in keys.iter().enumerate() {
                    track_events.push(TrackEvent {
                        delta: u28::from(if i == 0 { pending_ticks } else { 0 }),
                        kind: TrackEventKind::Midi {
                            channel,
                            message: MidiMessage::NoteOn {
                                key: u7::from(key),
                                vel: velocity,
                            },
                        },
                    });
                }
                pending_ticks = 0;

                // The first note-off carries the whole group duration so
                // the group's elapsed time equals its longest member
                for (i, &key) in keys.iter().enumerate() {
                    track_events.push(TrackEvent {
                        delta: u28::from(if i == 0 { *duration_ticks } else { 0 }),
                        kind: TrackEventKind::Midi {
                            channel,
                            message: MidiMessage::NoteOff {
                                key: u7::from(key),
                                vel: velocity,
                            },
                        },
                    });
                }
            }
        }
    }

    track_events.push(TrackEvent {
        delta: u28::from(pending_ticks),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let header = Header {
        format: Format::SingleTrack,
        timing: midly::Timing::Metrical(u15::from(ppq)),
    };

    let smf = Smf {
        header,
        tracks: vec![track_events],
    };

    let mut bytes = Vec::new();
    smf.write(&mut bytes)
        .map_err(|e| anyhow::anyhow!("Failed to write MIDI data: {:?}", e))?;
    Ok(bytes)
}

/// MIDI time signatures store the denominator as its base-2 logarithm
fn denominator_log2(denominator: u8) -> u8 {
    (denominator.max(1) as f32).log2() as u8
}
