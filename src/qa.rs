//! QA artifacts: recognition overlay and statistics report

use crate::error::{OmrError, Result as OmrResult};
use crate::raster::BinaryImage;
use crate::symbols::SymbolKind;
use crate::PageAnalysis;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::path::Path;

const INK: Rgb<u8> = Rgb([30, 30, 30]);
const PAPER: Rgb<u8> = Rgb([255, 255, 255]);
const STAFF_COLOR: Rgb<u8> = Rgb([70, 130, 220]);
const NOTE_COLOR: Rgb<u8> = Rgb([200, 40, 40]);
const REST_COLOR: Rgb<u8> = Rgb([40, 160, 70]);

/// Render the recognized staves and symbols on top of the input image and
/// write a statistics report next to it
pub fn generate_overlay(
    binary: &BinaryImage,
    page: &PageAnalysis,
    output_dir: &Path,
) -> OmrResult<()> {
    let qa_dir = output_dir.join("qa");
    std::fs::create_dir_all(&qa_dir)
        .map_err(|e| OmrError::QaGenerationError(format!("Failed to create qa dir: {}", e)))?;

    let mut canvas = render_binary(binary);

    for staff in &page.layout.staves {
        for &line_y in &staff.lines {
            draw_line_segment_mut(
                &mut canvas,
                (staff.x_start as f32, line_y as f32),
                (staff.x_end as f32, line_y as f32),
                STAFF_COLOR,
            );
        }
    }

    for symbol in &page.symbols {
        let color = match symbol.kind {
            SymbolKind::Note => NOTE_COLOR,
            SymbolKind::Rest => REST_COLOR,
        };
        let rect = Rect::at(symbol.bbox.x as i32 - 1, symbol.bbox.y as i32 - 1)
            .of_size(symbol.bbox.width + 2, symbol.bbox.height + 2);
        draw_hollow_rect_mut(&mut canvas, rect, color);
    }

    let overlay_path = qa_dir.join("overlay.png");
    canvas
        .save(&overlay_path)
        .map_err(|e| OmrError::QaGenerationError(format!("Failed to save overlay: {}", e)))?;

    generate_statistics(page, &qa_dir)?;

    println!("QA artifacts generated in {}", qa_dir.display());
    Ok(())
}

/// Save the preprocessed and staff-erased images next to the MIDI output,
/// mirroring the numbered intermediate files of the processing steps
pub fn save_intermediate_images(
    binary: &BinaryImage,
    erased: &BinaryImage,
    output_path: &Path,
) -> OmrResult<()> {
    let stem = output_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let dir = output_path.parent().unwrap_or_else(|| Path::new("."));

    let preprocessed = dir.join(format!("{}_1_preprocessed.png", stem));
    binary
        .to_gray()
        .save(&preprocessed)
        .map_err(|e| OmrError::QaGenerationError(format!("{}", e)))?;
    println!("  Saved intermediate image: {}", preprocessed.display());

    let no_staff = dir.join(format!("{}_2_no_staff.png", stem));
    erased
        .to_gray()
        .save(&no_staff)
        .map_err(|e| OmrError::QaGenerationError(format!("{}", e)))?;
    println!("  Saved intermediate image: {}", no_staff.display());

    Ok(())
}

fn render_binary(binary: &BinaryImage) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(binary.width(), binary.height(), PAPER);
    for y in 0..binary.height() {
        for x in 0..binary.width() {
            if binary.is_set(x, y) {
                canvas.put_pixel(x, y, INK);
            }
        }
    }
    canvas
}

fn generate_statistics(page: &PageAnalysis, qa_dir: &Path) -> OmrResult<()> {
    let stats = serde_json::json!({
        "staves": page.layout.staves.len(),
        "line_thickness": page.layout.line_thickness,
        "symbols": page.symbols.len(),
        "notes": page.symbols.iter().filter(|s| s.is_note()).count(),
        "rests": page.symbols.iter().filter(|s| !s.is_note()).count(),
        "time_signature_defaulted": page.time_signature.is_defaulted(),
        "key_signature_defaulted": page.key_signature.is_defaulted(),
    });

    let stats_path = qa_dir.join("statistics.json");
    std::fs::write(&stats_path, serde_json::to_string_pretty(&stats)?)
        .map_err(|e| OmrError::QaGenerationError(format!("{}", e)))?;
    Ok(())
}
