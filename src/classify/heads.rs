//! Note head detection: filled and hollow ovals

use super::Region;
use crate::config::NoteHeadConfig;
use crate::raster::BinaryImage;
use crate::staff::StaffLayout;
use crate::symbols::HeadCandidate;

/// Detect note heads among the connected components of the staff-erased
/// image
///
/// Head-shaped components must fall inside the area and aspect bands and be
/// sufficiently circular. Filled heads are dense on the erased image;
/// hollow heads that lost contour pixels to the line erasure are recovered
/// by re-checking density on the line-intact image with a lower bar.
pub fn detect_note_heads(
    regions: &[Region],
    erased: &BinaryImage,
    original: &BinaryImage,
    layout: &StaffLayout,
    config: &NoteHeadConfig,
) -> Vec<HeadCandidate> {
    let mut heads = Vec::new();

    for region in regions {
        let area = region.area as f32;
        if area < config.min_area || area > config.max_area {
            continue;
        }

        let aspect = region.aspect();
        if aspect < config.aspect_ratio[0] || aspect > config.aspect_ratio[1] {
            continue;
        }

        if region.circularity() <= config.min_circularity {
            continue;
        }

        let bbox = region.bbox;
        let density = erased.box_density(bbox.x, bbox.y, bbox.width, bbox.height);
        let filled = if density > config.filled_density {
            true
        } else {
            let density_orig = original.box_density(bbox.x, bbox.y, bbox.width, bbox.height);
            if density_orig > config.hollow_density {
                false
            } else {
                continue;
            }
        };

        let staff_position = layout.staff_position(bbox.center_y()).map(|(_, pos)| pos);

        heads.push(HeadCandidate {
            bbox,
            staff_position,
            filled,
        });
    }

    heads.sort_by_key(|h| h.bbox.x);
    heads
}
