//! Symbol association: links classifier candidates into finalized symbols
//!
//! Phase 1 candidates stay immutable; this stage derives durations, beam
//! groups and accidental attachments from them and emits a separate,
//! finalized symbol collection.

use crate::config::Config;
use crate::symbols::{
    AccidentalCandidate, AccidentalKind, BeamCandidate, CandidateSet, Duration, HeadCandidate,
    MusicalSymbol, StemCandidate, SymbolKind,
};

/// Build the finalized symbol set from the classifier candidates
///
/// Notes get their duration from stem ownership, demoted by beam
/// membership, and their accidental from the nearest preceding accidental
/// glyph. Rests pass through with their classified duration. The result is
/// sorted by ascending x and treated as read-only downstream.
pub fn associate(candidates: &CandidateSet, config: &Config) -> Vec<MusicalSymbol> {
    let heads = &candidates.heads;

    let durations = assign_durations(heads, &candidates.stems, config);
    let (beamed, beam_groups) = assign_beam_groups(heads, &candidates.beams, config);
    let accidentals = attach_accidentals(heads, &candidates.accidentals, config);

    let mut symbols: Vec<MusicalSymbol> = Vec::with_capacity(heads.len() + candidates.rests.len());

    for (i, head) in heads.iter().enumerate() {
        let duration = if beamed[i] && durations[i] == Duration::Quarter {
            // A beam marks eighth-or-shorter; whole and half notes are
            // never demoted
            Duration::Eighth
        } else {
            durations[i]
        };

        symbols.push(MusicalSymbol {
            kind: SymbolKind::Note,
            bbox: head.bbox,
            staff_position: head.staff_position,
            pitch: None,
            duration: Some(duration),
            accidental: accidentals[i],
            is_beamed: beamed[i],
            beam_group: beam_groups[i],
        });
    }

    for rest in &candidates.rests {
        symbols.push(MusicalSymbol {
            kind: SymbolKind::Rest,
            bbox: rest.bbox,
            staff_position: None,
            pitch: None,
            duration: Some(rest.duration),
            accidental: AccidentalKind::None,
            is_beamed: false,
            beam_group: None,
        });
    }

    symbols.sort_by_key(|s| s.bbox.x);
    symbols
}

/// Duration class per head from stem ownership
///
/// An owned stem means quarter (flags are not distinguished here; only
/// beams refine further). A stemless head is a whole note when large,
/// otherwise a half note.
fn assign_durations(
    heads: &[HeadCandidate],
    stems: &[StemCandidate],
    config: &Config,
) -> Vec<Duration> {
    heads
        .iter()
        .map(|head| {
            let has_stem = stems.iter().any(|stem| stem_belongs_to(head, stem));
            if has_stem {
                Duration::Quarter
            } else if head.bbox.width > config.note_heads.whole_note_size_px
                || head.bbox.height > config.note_heads.whole_note_size_px
            {
                Duration::Whole
            } else {
                Duration::Half
            }
        })
        .collect()
}

/// A stem belongs to a head when its x lies within one head-width of the
/// head's x and its vertical span overlaps the head's center or bottom edge
fn stem_belongs_to(head: &HeadCandidate, stem: &StemCandidate) -> bool {
    let dx = (stem.bbox.x as i64 - head.bbox.x as i64).abs();
    if dx >= head.bbox.width as i64 {
        return false;
    }

    let stem_top = stem.bbox.y as i64;
    let stem_bottom = (stem.bbox.y + stem.bbox.height) as i64;
    let center_y = head.bbox.center_y() as i64;
    let head_top = head.bbox.y as i64;
    let head_bottom = (head.bbox.y + head.bbox.height) as i64;

    (stem_top <= center_y && center_y <= stem_bottom)
        || (head_top <= stem_bottom && stem_bottom <= head_bottom)
}

/// Beam membership: each beam claims the heads inside its x-span within
/// vertical attachment range; two or more claimed heads form a beam group
fn assign_beam_groups(
    heads: &[HeadCandidate],
    beams: &[BeamCandidate],
    config: &Config,
) -> (Vec<bool>, Vec<Option<usize>>) {
    let mut beamed = vec![false; heads.len()];
    let mut groups = vec![None; heads.len()];
    let mut next_group = 0usize;

    let reach = config.beams.head_attach_range_px as i64;

    for beam in beams {
        let beam_x_start = beam.bbox.x as i64;
        let beam_x_end = (beam.bbox.x + beam.bbox.width) as i64;
        let beam_y = beam.bbox.center_y() as i64;

        let members: Vec<usize> = heads
            .iter()
            .enumerate()
            .filter(|(_, head)| {
                let hx = head.bbox.center_x() as i64;
                let hy = head.bbox.center_y() as i64;
                hx >= beam_x_start && hx <= beam_x_end && (hy - beam_y).abs() <= reach
            })
            .map(|(i, _)| i)
            .collect();

        if members.len() < 2 {
            continue;
        }

        let group_id = next_group;
        next_group += 1;
        for i in members {
            beamed[i] = true;
            if groups[i].is_none() {
                groups[i] = Some(group_id);
            }
        }
    }

    (beamed, groups)
}

/// Attach each accidental to the nearest note head strictly to its right
/// within independent axis bounds; unmatched accidentals are dropped
fn attach_accidentals(
    heads: &[HeadCandidate],
    accidentals: &[AccidentalCandidate],
    config: &Config,
) -> Vec<AccidentalKind> {
    let mut attached = vec![AccidentalKind::None; heads.len()];

    let dx_max = config.accidentals.head_search_dx as i64;
    let dy_max = config.accidentals.head_search_dy as i64;

    for accidental in accidentals {
        let ax = accidental.bbox.x as i64;
        let ay = accidental.bbox.center_y() as i64;

        let target = heads
            .iter()
            .enumerate()
            .filter(|(_, head)| {
                let hx = head.bbox.x as i64;
                let hy = head.bbox.center_y() as i64;
                hx > ax && hx - ax <= dx_max && (hy - ay).abs() <= dy_max
            })
            .min_by_key(|(_, head)| head.bbox.x);

        if let Some((i, _)) = target {
            attached[i] = accidental.kind;
        }
    }

    attached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::BoundingBox;

    fn head_at(x: u32, y: u32, width: u32, height: u32) -> HeadCandidate {
        HeadCandidate {
            bbox: BoundingBox {
                x,
                y,
                width,
                height,
            },
            staff_position: None,
            filled: true,
        }
    }

    #[test]
    fn test_stem_ownership_by_center_overlap() {
        let head = head_at(100, 50, 12, 10);
        let stem = StemCandidate {
            bbox: BoundingBox {
                x: 110,
                y: 20,
                width: 2,
                height: 36,
            },
        };
        assert!(stem_belongs_to(&head, &stem));

        let far_stem = StemCandidate {
            bbox: BoundingBox {
                x: 130,
                y: 20,
                width: 2,
                height: 36,
            },
        };
        assert!(!stem_belongs_to(&head, &far_stem));
    }

    #[test]
    fn test_stemless_small_head_is_half() {
        let candidates = CandidateSet {
            heads: vec![head_at(100, 50, 12, 10)],
            ..Default::default()
        };
        let symbols = associate(&candidates, &Config::default());
        assert_eq!(symbols[0].duration, Some(Duration::Half));
    }
}
