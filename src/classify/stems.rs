//! Stem detection: thin tall vertical strokes

use super::{find_regions, vertical_line_open};
use crate::config::StemConfig;
use crate::raster::BinaryImage;
use crate::symbols::StemCandidate;

/// Detect note stems on the staff-erased image
///
/// A vertical line opening isolates tall thin strokes; surviving components
/// are kept when thin, tall and strongly elongated.
pub fn detect_stems(erased: &BinaryImage, config: &StemConfig) -> Vec<StemCandidate> {
    let opened = vertical_line_open(erased, config.kernel_height);

    find_regions(&opened)
        .into_iter()
        .filter(|r| {
            r.bbox.width <= config.max_width
                && r.bbox.height >= config.min_height
                && r.tallness() >= config.min_aspect
        })
        .map(|r| StemCandidate { bbox: r.bbox })
        .collect()
}
