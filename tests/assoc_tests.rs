//! Validation tests for symbol association

use sheet2midi::assoc::associate;
use sheet2midi::config::Config;
use sheet2midi::symbols::{
    AccidentalCandidate, AccidentalKind, BeamCandidate, BoundingBox, CandidateSet, Duration,
    HeadCandidate, RestCandidate, StemCandidate, SymbolKind,
};

fn bbox(x: u32, y: u32, width: u32, height: u32) -> BoundingBox {
    BoundingBox {
        x,
        y,
        width,
        height,
    }
}

fn head(x: u32, y: u32, width: u32, height: u32) -> HeadCandidate {
    HeadCandidate {
        bbox: bbox(x, y, width, height),
        staff_position: Some(2.0),
        filled: true,
    }
}

fn stem_over(head: &HeadCandidate) -> StemCandidate {
    StemCandidate {
        bbox: bbox(
            head.bbox.x + head.bbox.width - 2,
            head.bbox.y.saturating_sub(30),
            2,
            30 + head.bbox.height / 2,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stemmed_head_is_quarter() {
        let h = head(100, 50, 12, 10);
        let candidates = CandidateSet {
            stems: vec![stem_over(&h)],
            heads: vec![h],
            ..Default::default()
        };

        let symbols = associate(&candidates, &Config::default());
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].kind, SymbolKind::Note);
        assert_eq!(symbols[0].duration, Some(Duration::Quarter));
    }

    #[test]
    fn test_stemless_small_head_is_half() {
        let candidates = CandidateSet {
            heads: vec![head(100, 50, 12, 10)],
            ..Default::default()
        };

        let symbols = associate(&candidates, &Config::default());
        assert_eq!(symbols[0].duration, Some(Duration::Half));
    }

    #[test]
    fn test_stemless_large_head_is_whole() {
        let candidates = CandidateSet {
            heads: vec![head(100, 50, 18, 12)],
            ..Default::default()
        };

        let symbols = associate(&candidates, &Config::default());
        assert_eq!(symbols[0].duration, Some(Duration::Whole));
    }

    #[test]
    fn test_distant_stem_does_not_own_head() {
        let h = head(100, 50, 12, 10);
        let candidates = CandidateSet {
            stems: vec![StemCandidate {
                bbox: bbox(150, 20, 2, 40),
            }],
            heads: vec![h],
            ..Default::default()
        };

        let symbols = associate(&candidates, &Config::default());
        assert_eq!(symbols[0].duration, Some(Duration::Half));
    }

    #[test]
    fn test_beam_groups_and_demotes_quarters() {
        let h1 = head(100, 60, 12, 10);
        let h2 = head(140, 60, 12, 10);
        let candidates = CandidateSet {
            stems: vec![stem_over(&h1), stem_over(&h2)],
            beams: vec![BeamCandidate {
                bbox: bbox(95, 30, 60, 4),
            }],
            heads: vec![h1, h2],
            ..Default::default()
        };

        let symbols = associate(&candidates, &Config::default());
        assert_eq!(symbols.len(), 2);
        for symbol in &symbols {
            assert!(symbol.is_beamed);
            assert_eq!(symbol.duration, Some(Duration::Eighth));
        }
        assert_eq!(symbols[0].beam_group, symbols[1].beam_group);
        assert!(symbols[0].beam_group.is_some());
    }

    #[test]
    fn test_beam_never_promotes_stemless_heads() {
        // Two stemless heads under a beam keep their whole/half class
        let h1 = head(100, 60, 12, 10);
        let h2 = head(140, 60, 18, 16);
        let candidates = CandidateSet {
            beams: vec![BeamCandidate {
                bbox: bbox(95, 30, 60, 4),
            }],
            heads: vec![h1, h2],
            ..Default::default()
        };

        let symbols = associate(&candidates, &Config::default());
        assert!(symbols[0].is_beamed);
        assert_eq!(symbols[0].duration, Some(Duration::Half));
        assert_eq!(symbols[1].duration, Some(Duration::Whole));
    }

    #[test]
    fn test_single_head_under_beam_is_not_grouped() {
        let h1 = head(100, 60, 12, 10);
        let candidates = CandidateSet {
            stems: vec![stem_over(&h1)],
            beams: vec![BeamCandidate {
                bbox: bbox(95, 30, 60, 4),
            }],
            heads: vec![h1],
            ..Default::default()
        };

        let symbols = associate(&candidates, &Config::default());
        assert!(!symbols[0].is_beamed);
        assert_eq!(symbols[0].duration, Some(Duration::Quarter));
    }

    #[test]
    fn test_far_beam_does_not_group() {
        // Beam is vertically out of attachment range
        let h1 = head(100, 100, 12, 10);
        let h2 = head(140, 100, 12, 10);
        let candidates = CandidateSet {
            beams: vec![BeamCandidate {
                bbox: bbox(95, 10, 60, 4),
            }],
            heads: vec![h1, h2],
            ..Default::default()
        };

        let symbols = associate(&candidates, &Config::default());
        assert!(symbols.iter().all(|s| !s.is_beamed));
    }

    #[test]
    fn test_accidental_attaches_to_nearest_following_head() {
        let near = head(100, 50, 12, 10);
        let far = head(118, 50, 12, 10);
        let candidates = CandidateSet {
            accidentals: vec![AccidentalCandidate {
                bbox: bbox(88, 48, 6, 14),
                kind: AccidentalKind::Sharp,
            }],
            heads: vec![near, far],
            ..Default::default()
        };

        let symbols = associate(&candidates, &Config::default());
        assert_eq!(symbols[0].accidental, AccidentalKind::Sharp);
        assert_eq!(symbols[1].accidental, AccidentalKind::None);
    }

    #[test]
    fn test_accidental_without_following_head_is_dropped() {
        // The only head is to the accidental's left
        let h = head(50, 50, 12, 10);
        let candidates = CandidateSet {
            accidentals: vec![AccidentalCandidate {
                bbox: bbox(88, 48, 6, 14),
                kind: AccidentalKind::Flat,
            }],
            heads: vec![h],
            ..Default::default()
        };

        let symbols = associate(&candidates, &Config::default());
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].accidental, AccidentalKind::None);
    }

    #[test]
    fn test_accidental_out_of_vertical_range_is_dropped() {
        let h = head(100, 90, 12, 10);
        let candidates = CandidateSet {
            accidentals: vec![AccidentalCandidate {
                bbox: bbox(88, 20, 6, 14),
                kind: AccidentalKind::Sharp,
            }],
            heads: vec![h],
            ..Default::default()
        };

        let symbols = associate(&candidates, &Config::default());
        assert_eq!(symbols[0].accidental, AccidentalKind::None);
    }

    #[test]
    fn test_rests_pass_through_and_result_is_x_sorted() {
        let candidates = CandidateSet {
            heads: vec![head(200, 50, 12, 10), head(40, 50, 12, 10)],
            rests: vec![RestCandidate {
                bbox: bbox(120, 60, 8, 16),
                duration: Duration::Quarter,
            }],
            ..Default::default()
        };

        let symbols = associate(&candidates, &Config::default());
        assert_eq!(symbols.len(), 3);
        let xs: Vec<u32> = symbols.iter().map(|s| s.bbox.x).collect();
        assert_eq!(xs, vec![40, 120, 200]);
        assert_eq!(symbols[1].kind, SymbolKind::Rest);
        assert_eq!(symbols[1].duration, Some(Duration::Quarter));
        // Rests never carry pitch
        assert!(symbols[1].pitch.is_none());
    }
}
