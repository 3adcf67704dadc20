//! Configuration system for the sheet-music-to-MIDI processor

use crate::pitch::Clef;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: String,
    pub preprocess: PreprocessConfig,
    pub staff: StaffConfig,
    pub note_heads: NoteHeadConfig,
    pub stems: StemConfig,
    pub beams: BeamConfig,
    pub accidentals: AccidentalConfig,
    pub rests: RestConfig,
    pub pitch: PitchConfig,
    pub timing: TimingConfig,
    pub export: ExportConfig,
    pub qa: QaConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            preprocess: PreprocessConfig::default(),
            staff: StaffConfig::default(),
            note_heads: NoteHeadConfig::default(),
            stems: StemConfig::default(),
            beams: BeamConfig::default(),
            accidentals: AccidentalConfig::default(),
            rests: RestConfig::default(),
            pitch: PitchConfig::default(),
            timing: TimingConfig::default(),
            export: ExportConfig::default(),
            qa: QaConfig::default(),
        }
    }
}

/// Image preprocessing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub blur_sigma: f32,
    /// Binarization method: "adaptive", "otsu" or "simple"
    pub threshold_method: String,
    pub adaptive_block_radius: u32,
    pub simple_threshold: u8,
    pub noise_opening_radius: u8,
    /// Skew below this angle (degrees) is left uncorrected
    pub deskew_min_angle_deg: f32,
    /// Half-width of the angle sweep when estimating skew
    pub deskew_search_deg: f32,
    pub deskew_step_deg: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.0,
            threshold_method: "adaptive".to_string(),
            adaptive_block_radius: 7,
            simple_threshold: 127,
            noise_opening_radius: 1,
            deskew_min_angle_deg: 0.5,
            deskew_search_deg: 5.0,
            deskew_step_deg: 0.25,
        }
    }
}

/// Staff detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffConfig {
    /// Normalized row-projection value above which a row is a line candidate
    pub projection_threshold: f32,
    /// Candidate rows at most this far apart merge into one line
    pub line_merge_px: u32,
    /// Gap standard deviation must stay within this fraction of the mean gap
    pub spacing_tolerance: f32,
    /// Column-sum fraction of the maximum that still counts as staff content
    pub x_extent_threshold: f32,
    /// Rows probed above/below each line when estimating stroke thickness
    pub thickness_probe_rows: u32,
    pub default_line_thickness: u32,
}

impl Default for StaffConfig {
    fn default() -> Self {
        Self {
            projection_threshold: 0.70,
            line_merge_px: 2,
            spacing_tolerance: 0.30,
            x_extent_threshold: 0.10,
            thickness_probe_rows: 5,
            default_line_thickness: 2,
        }
    }
}

/// Note head classification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteHeadConfig {
    pub min_area: f32,
    pub max_area: f32,
    /// Width/height band for head-shaped components
    pub aspect_ratio: [f32; 2],
    pub min_circularity: f32,
    /// Bounding-box density above which a head counts as filled
    pub filled_density: f32,
    /// Density bar on the line-intact image for recovering hollow heads
    pub hollow_density: f32,
    /// Stemless heads wider or taller than this are whole notes
    pub whole_note_size_px: u32,
}

impl Default for NoteHeadConfig {
    fn default() -> Self {
        Self {
            min_area: 10.0,
            max_area: 1000.0,
            aspect_ratio: [0.4, 2.5],
            min_circularity: 0.3,
            filled_density: 0.5,
            hollow_density: 0.2,
            whole_note_size_px: 15,
        }
    }
}

/// Stem detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StemConfig {
    /// Height of the vertical line opening kernel
    pub kernel_height: usize,
    pub max_width: u32,
    pub min_height: u32,
    /// Minimum height/width ratio
    pub min_aspect: f32,
}

impl Default for StemConfig {
    fn default() -> Self {
        Self {
            kernel_height: 15,
            max_width: 5,
            min_height: 10,
            min_aspect: 3.0,
        }
    }
}

/// Beam detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamConfig {
    /// Width of the horizontal line opening kernel
    pub kernel_width: usize,
    pub min_width: u32,
    pub max_height: u32,
    /// Minimum width/height ratio
    pub min_aspect: f32,
    /// Vertical reach from a beam to the note heads it groups
    pub head_attach_range_px: u32,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            kernel_width: 20,
            min_width: 15,
            max_height: 5,
            min_aspect: 4.0,
            head_attach_range_px: 40,
        }
    }
}

/// Accidental classification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccidentalConfig {
    pub min_area: f32,
    pub max_area: f32,
    /// Height/width band for sharps
    pub sharp_ratio: [f32; 2],
    /// Row-projection peaks required for a sharp
    pub sharp_min_peaks: usize,
    /// Fraction of the row maximum a row must exceed to count toward a peak
    pub sharp_peak_threshold: f32,
    /// Height/width band for flats
    pub flat_ratio: [f32; 2],
    /// Bottom-half density must exceed this multiple of the top-half density
    pub flat_density_ratio: f32,
    /// Height/width band for naturals (checked after sharp and flat)
    pub natural_ratio: [f32; 2],
    /// Horizontal search range to the following note head
    pub head_search_dx: u32,
    /// Vertical search range to the following note head
    pub head_search_dy: u32,
}

impl Default for AccidentalConfig {
    fn default() -> Self {
        Self {
            min_area: 20.0,
            max_area: 500.0,
            sharp_ratio: [2.0, 4.0],
            sharp_min_peaks: 2,
            sharp_peak_threshold: 0.5,
            flat_ratio: [1.5, 3.0],
            flat_density_ratio: 1.2,
            natural_ratio: [1.8, 2.8],
            head_search_dx: 30,
            head_search_dy: 15,
        }
    }
}

/// Rest classification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    pub min_area: f32,
    pub max_area: f32,
    /// Height/width band for whole rests (inclusive)
    pub whole_ratio: [f32; 2],
    /// Height/width band for half rests (inclusive, checked after whole)
    pub half_ratio: [f32; 2],
    /// Whole and half rests must stay below this area
    pub short_rest_max_area: f32,
    /// Height/width band for quarter rests (exclusive)
    pub quarter_ratio: [f32; 2],
    /// Height/width band for eighth rests (exclusive)
    pub eighth_ratio: [f32; 2],
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            min_area: 15.0,
            max_area: 800.0,
            whole_ratio: [0.2, 0.6],
            half_ratio: [0.3, 0.7],
            short_rest_max_area: 200.0,
            quarter_ratio: [1.5, 3.0],
            eighth_ratio: [1.2, 2.0],
        }
    }
}

/// Pitch resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PitchConfig {
    pub clef: Clef,
}

/// Temporal assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Events within this x distance of the group anchor share an onset
    pub time_threshold_px: u32,
    /// X offset applied per page index in multi-page mode
    pub page_x_offset: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            time_threshold_px: 20,
            page_x_offset: 100_000,
        }
    }
}

/// MIDI export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub tempo_bpm: u32,
    pub ticks_per_quarter: u16,
    /// MIDI program number (0 = Acoustic Grand Piano)
    pub program: u8,
    pub velocity: u8,
    pub channel: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: 120,
            ticks_per_quarter: 480,
            program: 0,
            velocity: 64,
            channel: 0,
        }
    }
}

/// QA artifacts configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    pub generate_overlay: bool,
    pub export_analysis: bool,
    pub save_intermediate: bool,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            generate_overlay: true,
            export_analysis: true,
            save_intermediate: false,
        }
    }
}

/// Validate configuration parameters
pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&config.staff.projection_threshold) {
        anyhow::bail!("staff.projection_threshold must be within [0, 1]");
    }
    if config.staff.spacing_tolerance <= 0.0 {
        anyhow::bail!("staff.spacing_tolerance must be positive");
    }
    if !(0.0..=1.0).contains(&config.staff.x_extent_threshold) {
        anyhow::bail!("staff.x_extent_threshold must be within [0, 1]");
    }

    for (name, band) in [
        ("note_heads.aspect_ratio", &config.note_heads.aspect_ratio),
        ("accidentals.sharp_ratio", &config.accidentals.sharp_ratio),
        ("accidentals.flat_ratio", &config.accidentals.flat_ratio),
        ("accidentals.natural_ratio", &config.accidentals.natural_ratio),
        ("rests.whole_ratio", &config.rests.whole_ratio),
        ("rests.half_ratio", &config.rests.half_ratio),
        ("rests.quarter_ratio", &config.rests.quarter_ratio),
        ("rests.eighth_ratio", &config.rests.eighth_ratio),
    ] {
        if band[0] >= band[1] {
            anyhow::bail!("{} must be an increasing band", name);
        }
    }

    if config.note_heads.min_area >= config.note_heads.max_area {
        anyhow::bail!("note_heads.min_area must be < max_area");
    }
    if config.export.tempo_bpm == 0 {
        anyhow::bail!("export.tempo_bpm must be positive");
    }
    if config.export.ticks_per_quarter == 0 {
        anyhow::bail!("export.ticks_per_quarter must be positive");
    }
    if config.export.velocity > 127 {
        anyhow::bail!("export.velocity must be within [0, 127]");
    }
    if config.export.program > 127 {
        anyhow::bail!("export.program must be within [0, 127]");
    }
    if config.export.channel > 15 {
        anyhow::bail!("export.channel must be within [0, 15]");
    }
    if config.timing.time_threshold_px == 0 {
        anyhow::bail!("timing.time_threshold_px must be positive");
    }

    Ok(())
}

/// Load configuration from JSON file
pub fn load_config<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Save configuration to JSON file
pub fn save_config<P: AsRef<std::path::Path>>(config: &Config, path: P) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
