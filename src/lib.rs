//! Sheet-Music-to-MIDI Conversion System
//!
//! A deterministic, non-ML optical music recognition pipeline that extracts
//! a playable MIDI event stream from images of printed sheet music.

pub mod assoc;
pub mod classify;
pub mod config;
pub mod error;
pub mod midi;
pub mod pitch;
pub mod qa;
pub mod raster;
pub mod signature;
pub mod staff;
pub mod symbols;
pub mod timeline;

pub use config::Config;
pub use error::{OmrError, Result as OmrResult};

use crate::raster::BinaryImage;
use crate::signature::{Detection, KeySignature, TimeSignature};
use crate::staff::StaffLayout;
use crate::symbols::MusicalSymbol;
use crate::timeline::EventTimeline;
use std::path::{Path, PathBuf};

/// Everything recognized on one page
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    pub layout: StaffLayout,
    pub symbols: Vec<MusicalSymbol>,
    pub time_signature: Detection<TimeSignature>,
    pub key_signature: Detection<KeySignature>,
}

/// Summary of one finished conversion
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub staves: usize,
    pub symbols: usize,
    pub timeline_groups: usize,
    pub output: PathBuf,
}

/// Main processing pipeline for sheet-music-to-MIDI conversion
pub struct SheetToMidi {
    config: Config,
}

impl SheetToMidi {
    /// Create a new processor with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the recognition stages on one clean binary image
    ///
    /// Each stage is a pure per-image function; nothing is retained between
    /// calls, so the same input always produces the same analysis.
    pub fn recognize(&self, binary: &BinaryImage) -> OmrResult<PageAnalysis> {
        let layout = staff::detect_staves(binary, &self.config.staff);
        if layout.staves.is_empty() {
            eprintln!("Warning: no staff lines detected; results may be inaccurate");
        }

        let erased = staff::remove_staff_lines(binary, &layout);

        let candidates = classify::detect_candidates(&erased, binary, &layout, &self.config);

        let symbols = assoc::associate(&candidates, &self.config);
        let symbols = pitch::resolve_pitches(symbols, self.config.pitch.clef);

        if symbols.is_empty() {
            eprintln!("Warning: no musical symbols detected");
        }

        let time_signature = signature::detect_time_signature(&symbols);
        let key_signature = signature::detect_key_signature(&symbols);

        Ok(PageAnalysis {
            layout,
            symbols,
            time_signature,
            key_signature,
        })
    }

    /// Convert a single sheet music image to a MIDI file
    pub fn convert(&self, input_path: &Path, output_path: &Path) -> OmrResult<ConversionSummary> {
        println!("Converting {} to MIDI...", input_path.display());

        let gray = raster::load_image(input_path)?;
        let binary = raster::preprocess(&gray, &self.config.preprocess)?;

        let page = self.recognize(&binary)?;

        if self.config.qa.save_intermediate {
            let erased = staff::remove_staff_lines(&binary, &page.layout);
            qa::save_intermediate_images(&binary, &erased, output_path)?;
        }

        let events = timeline::assemble(&page.symbols, &self.config.timing, &self.config.export);

        midi::export_midi(
            &events,
            page.time_signature.into_value(),
            &self.config.export,
            output_path,
        )?;

        self.export_artifacts(&binary, &page, &events, output_path)?;

        println!("Conversion complete:");
        println!("  Input:  {}", input_path.display());
        println!("  Output: {}", output_path.display());
        println!(
            "  Detected: {} staff/staves, {} symbol(s)",
            page.layout.staves.len(),
            page.symbols.len()
        );

        Ok(ConversionSummary {
            staves: page.layout.staves.len(),
            symbols: page.symbols.len(),
            timeline_groups: events.groups.len(),
            output: output_path.to_path_buf(),
        })
    }

    /// Convert several pre-rasterized pages into a single MIDI file
    ///
    /// Pages are recognized independently; each page's symbols are shifted
    /// right by a fixed offset per page index before one temporal assembly
    /// pass, so events from different pages can never share a chord window.
    pub fn convert_multipage(
        &self,
        input_paths: &[PathBuf],
        output_path: &Path,
    ) -> OmrResult<ConversionSummary> {
        let mut all_symbols = Vec::new();
        let mut total_staves = 0;
        let mut last_page: Option<(BinaryImage, PageAnalysis)> = None;

        for (page_index, input_path) in input_paths.iter().enumerate() {
            println!(
                "Processing page {}/{}: {}",
                page_index + 1,
                input_paths.len(),
                input_path.display()
            );

            let gray = raster::load_image(input_path)?;
            let binary = raster::preprocess(&gray, &self.config.preprocess)?;
            let page = self.recognize(&binary)?;

            total_staves += page.layout.staves.len();

            let offset = page_index as u32 * self.config.timing.page_x_offset;
            all_symbols.extend(page.symbols.iter().cloned().map(|mut s| {
                s.bbox.x += offset;
                s
            }));

            last_page = Some((binary, page));
        }

        let events = timeline::assemble(&all_symbols, &self.config.timing, &self.config.export);

        let time_signature = last_page
            .as_ref()
            .map(|(_, page)| page.time_signature.into_value())
            .unwrap_or_default();

        midi::export_midi(&events, time_signature, &self.config.export, output_path)?;

        if let Some((binary, page)) = &last_page {
            self.export_artifacts(binary, page, &events, output_path)?;
        }

        Ok(ConversionSummary {
            staves: total_staves,
            symbols: all_symbols.len(),
            timeline_groups: events.groups.len(),
            output: output_path.to_path_buf(),
        })
    }

    /// Convert every image in a directory tree; failures are logged and
    /// skipped so one bad image never aborts the batch
    pub fn batch_convert(&self, input_dir: &Path, output_dir: &Path) -> OmrResult<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir)?;

        let mut image_files = Vec::new();
        collect_image_files(input_dir, &mut image_files)?;
        image_files.sort();

        println!("Found {} image(s) to convert", image_files.len());

        let mut outputs = Vec::new();
        for (i, image_path) in image_files.iter().enumerate() {
            println!(
                "Processing {}/{}: {}",
                i + 1,
                image_files.len(),
                image_path.display()
            );

            let stem = image_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("page");
            let output_path = output_dir.join(format!("{}.mid", stem));

            match self.convert(image_path, &output_path) {
                Ok(_) => outputs.push(output_path),
                Err(e) => {
                    eprintln!("Error converting {}: {}", image_path.display(), e);
                    continue;
                }
            }
        }

        println!(
            "Batch conversion complete: {}/{} successful",
            outputs.len(),
            image_files.len()
        );

        Ok(outputs)
    }

    fn export_artifacts(
        &self,
        binary: &BinaryImage,
        page: &PageAnalysis,
        events: &EventTimeline,
        output_path: &Path,
    ) -> OmrResult<()> {
        let output_dir = output_path.parent().unwrap_or_else(|| Path::new("."));

        if self.config.qa.export_analysis {
            let results = symbols::build_analysis_results(&page.layout, &page.symbols, events);
            symbols::export_analysis(&results, output_dir)?;
        }

        if self.config.qa.generate_overlay {
            qa::generate_overlay(binary, page, output_dir)?;
        }

        Ok(())
    }
}

/// Validate configuration and input file before processing
pub fn validate_input<P: AsRef<Path>>(input_path: P, config: &Config) -> OmrResult<()> {
    raster::validate_image_file(input_path)?;
    config::validate_config(config)
        .map_err(|e| OmrError::ConfigValidationFailed(e.to_string()))?;
    Ok(())
}

fn collect_image_files(dir: &Path, files: &mut Vec<PathBuf>) -> OmrResult<()> {
    if !dir.is_dir() {
        return Err(OmrError::InputValidationError(format!(
            "'{}' is not a directory",
            dir.display()
        )));
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_image_files(&path, files)?;
        } else if raster::validate_image_file(&path).is_ok() {
            files.push(path);
        }
    }
    Ok(())
}
