//! Recognition output types and analysis export

use crate::staff::StaffLayout;
use crate::timeline::EventTimeline;
use serde::{Deserialize, Serialize};

/// Standard note durations, in quarter-note units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Duration {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
}

impl Duration {
    pub fn quarter_notes(&self) -> f32 {
        match self {
            Duration::Whole => 4.0,
            Duration::Half => 2.0,
            Duration::Quarter => 1.0,
            Duration::Eighth => 0.5,
            Duration::Sixteenth => 0.25,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Duration::Whole => "whole",
            Duration::Half => "half",
            Duration::Quarter => "quarter",
            Duration::Eighth => "eighth",
            Duration::Sixteenth => "sixteenth",
        }
    }
}

/// Pitch modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccidentalKind {
    None,
    Sharp,
    Flat,
    Natural,
    DoubleSharp,
    DoubleFlat,
}

/// What a finalized symbol denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Note,
    Rest,
}

/// Axis-aligned bounding box shared by all candidates and symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn center_x(&self) -> u32 {
        self.x + self.width / 2
    }

    pub fn center_y(&self) -> u32 {
        self.y + self.height / 2
    }
}

/// Phase-1 note head candidate: geometry only, no musical meaning yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadCandidate {
    pub bbox: BoundingBox,
    /// Fractional staff position of the head center, when on a staff
    pub staff_position: Option<f32>,
    pub filled: bool,
}

/// Phase-1 stem candidate (intermediate geometry, not emitted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StemCandidate {
    pub bbox: BoundingBox,
}

/// Phase-1 beam candidate (intermediate geometry, not emitted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamCandidate {
    pub bbox: BoundingBox,
}

/// Phase-1 accidental candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentalCandidate {
    pub bbox: BoundingBox,
    pub kind: AccidentalKind,
}

/// Phase-1 rest candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestCandidate {
    pub bbox: BoundingBox,
    pub duration: Duration,
}

/// Everything the classifiers produced for one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub heads: Vec<HeadCandidate>,
    pub stems: Vec<StemCandidate>,
    pub beams: Vec<BeamCandidate>,
    pub accidentals: Vec<AccidentalCandidate>,
    pub rests: Vec<RestCandidate>,
}

/// A finalized musical symbol, produced by the associator
///
/// `pitch` is set if and only if the symbol denotes a sounding note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicalSymbol {
    pub kind: SymbolKind,
    pub bbox: BoundingBox,
    pub staff_position: Option<f32>,
    pub pitch: Option<String>,
    pub duration: Option<Duration>,
    pub accidental: AccidentalKind,
    pub is_beamed: bool,
    pub beam_group: Option<usize>,
}

impl MusicalSymbol {
    pub fn x(&self) -> u32 {
        self.bbox.x
    }

    pub fn is_note(&self) -> bool {
        self.kind == SymbolKind::Note
    }
}

/// Analysis bundle written alongside the MIDI output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub version: String,
    pub staves: usize,
    pub line_thickness: u32,
    pub staff_info: Vec<StaffInfo>,
    pub symbol_summary: SymbolSummary,
    pub timeline_groups: usize,
    pub timeline_ticks: u32,
    pub symbols: Vec<MusicalSymbol>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffInfo {
    pub lines: [u32; 5],
    pub line_spacing: f32,
    pub x_range: (u32, u32),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolSummary {
    pub total: usize,
    pub notes: usize,
    pub rests: usize,
    pub beamed: usize,
    pub with_accidental: usize,
}

/// Build the analysis bundle for one recognized page set
pub fn build_analysis_results(
    layout: &StaffLayout,
    symbols: &[MusicalSymbol],
    timeline: &EventTimeline,
) -> AnalysisResults {
    let summary = SymbolSummary {
        total: symbols.len(),
        notes: symbols.iter().filter(|s| s.is_note()).count(),
        rests: symbols.iter().filter(|s| !s.is_note()).count(),
        beamed: symbols.iter().filter(|s| s.is_beamed).count(),
        with_accidental: symbols
            .iter()
            .filter(|s| s.accidental != AccidentalKind::None)
            .count(),
    };

    AnalysisResults {
        version: env!("CARGO_PKG_VERSION").to_string(),
        staves: layout.staves.len(),
        line_thickness: layout.line_thickness,
        staff_info: layout
            .staves
            .iter()
            .map(|s| StaffInfo {
                lines: s.lines,
                line_spacing: s.line_spacing,
                x_range: (s.x_start, s.x_end),
            })
            .collect(),
        symbol_summary: summary,
        timeline_groups: timeline.groups.len(),
        timeline_ticks: timeline.total_ticks(),
        symbols: symbols.to_vec(),
    }
}

/// Export analysis results to `analysis.json` next to the MIDI output
pub fn export_analysis(
    results: &AnalysisResults,
    output_dir: &std::path::Path,
) -> crate::error::Result<()> {
    std::fs::create_dir_all(output_dir)?;
    let analysis_path = output_dir.join("analysis.json");
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&analysis_path, json)?;
    println!("Exported analysis results to {}", analysis_path.display());
    Ok(())
}
