//! Accidental detection: sharps, flats and naturals

use super::Region;
use crate::config::AccidentalConfig;
use crate::raster::BinaryImage;
use crate::symbols::{AccidentalCandidate, AccidentalKind};

/// Classify accidental-sized components by height/width band plus shape
/// evidence
///
/// The ratio bands overlap; evaluation order (sharp, flat, natural) is the
/// tie-break.
pub fn detect_accidentals(
    regions: &[Region],
    erased: &BinaryImage,
    config: &AccidentalConfig,
) -> Vec<AccidentalCandidate> {
    let mut accidentals = Vec::new();

    for region in regions {
        let area = region.area as f32;
        if area < config.min_area || area > config.max_area {
            continue;
        }

        let ratio = region.tallness();
        let kind = if ratio > config.sharp_ratio[0]
            && ratio < config.sharp_ratio[1]
            && row_projection_peaks(erased, region, config.sharp_peak_threshold)
                >= config.sharp_min_peaks
        {
            AccidentalKind::Sharp
        } else if ratio > config.flat_ratio[0]
            && ratio < config.flat_ratio[1]
            && is_bottom_heavy(erased, region, config.flat_density_ratio)
        {
            AccidentalKind::Flat
        } else if ratio > config.natural_ratio[0] && ratio < config.natural_ratio[1] {
            AccidentalKind::Natural
        } else {
            continue;
        };

        accidentals.push(AccidentalCandidate {
            bbox: region.bbox,
            kind,
        });
    }

    accidentals
}

/// Count distinct horizontal-projection peaks inside a region's box:
/// maximal runs of rows whose sum exceeds the given fraction of the row
/// maximum. Sharps show two (their two cross strokes).
fn row_projection_peaks(image: &BinaryImage, region: &Region, threshold: f32) -> usize {
    let bbox = region.bbox;
    let mut sums = vec![0u32; bbox.height as usize];
    for (i, sum) in sums.iter_mut().enumerate() {
        let y = bbox.y + i as u32;
        for x in bbox.x..bbox.x + bbox.width {
            if x < image.width() && y < image.height() && image.is_set(x, y) {
                *sum += 1;
            }
        }
    }

    let max = match sums.iter().max() {
        Some(&m) if m > 0 => m as f32,
        _ => return 0,
    };

    let mut peaks = 0;
    let mut in_peak = false;
    for &sum in &sums {
        let above = sum as f32 > max * threshold;
        if above && !in_peak {
            peaks += 1;
        }
        in_peak = above;
    }
    peaks
}

/// Flats carry their bulb low: bottom-half pixel density must exceed the
/// top-half density by the configured factor
fn is_bottom_heavy(image: &BinaryImage, region: &Region, ratio: f32) -> bool {
    let bbox = region.bbox;
    let half = bbox.height / 2;
    if half == 0 {
        return false;
    }
    let top = image.box_density(bbox.x, bbox.y, bbox.width, half);
    let bottom = image.box_density(bbox.x, bbox.y + half, bbox.width, bbox.height - half);
    bottom > top * ratio
}
