//! Beam detection: horizontal strokes joining stem groups

use super::{find_regions, horizontal_line_open};
use crate::config::BeamConfig;
use crate::raster::BinaryImage;
use crate::symbols::BeamCandidate;

/// Detect beams on the staff-erased image
///
/// A horizontal line opening isolates wide flat strokes; surviving
/// components are kept when wide, flat and strongly elongated.
pub fn detect_beams(erased: &BinaryImage, config: &BeamConfig) -> Vec<BeamCandidate> {
    let opened = horizontal_line_open(erased, config.kernel_width);

    find_regions(&opened)
        .into_iter()
        .filter(|r| {
            r.bbox.width >= config.min_width
                && r.bbox.height <= config.max_height
                && r.aspect() >= config.min_aspect
        })
        .map(|r| BeamCandidate { bbox: r.bbox })
        .collect()
}
