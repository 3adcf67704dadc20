//! Rest detection: classified purely by shape ratio and area

use super::Region;
use crate::config::RestConfig;
use crate::symbols::{Duration, RestCandidate};

/// Classify rest-sized components by height/width ratio bands
///
/// The whole and half bands overlap; the first matching band wins. Quarter
/// and eighth bands are exclusive at both ends.
pub fn detect_rests(regions: &[Region], config: &RestConfig) -> Vec<RestCandidate> {
    let mut rests = Vec::new();

    for region in regions {
        let area = region.area as f32;
        if area < config.min_area || area > config.max_area {
            continue;
        }

        let ratio = region.tallness();
        let duration = if ratio >= config.whole_ratio[0]
            && ratio <= config.whole_ratio[1]
            && area < config.short_rest_max_area
        {
            Duration::Whole
        } else if ratio >= config.half_ratio[0]
            && ratio <= config.half_ratio[1]
            && area < config.short_rest_max_area
        {
            Duration::Half
        } else if ratio > config.quarter_ratio[0] && ratio < config.quarter_ratio[1] {
            Duration::Quarter
        } else if ratio > config.eighth_ratio[0] && ratio < config.eighth_ratio[1] {
            Duration::Eighth
        } else {
            continue;
        };

        rests.push(RestCandidate {
            bbox: region.bbox,
            duration,
        });
    }

    rests
}
