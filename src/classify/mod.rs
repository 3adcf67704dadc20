//! Symbol classifiers operating on connected components of the
//! staff-erased binary image

pub mod accidentals;
pub mod beams;
pub mod heads;
pub mod rests;
pub mod stems;

use crate::config::Config;
use crate::raster::BinaryImage;
use crate::staff::StaffLayout;
use crate::symbols::{BoundingBox, CandidateSet};
use image::Luma;
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::HashMap;
use std::collections::VecDeque;

/// A connected foreground component with the statistics the classifiers need
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub bbox: BoundingBox,
    /// Foreground pixel count
    pub area: u32,
    /// Pixels on the outer boundary (adjacent to the exterior background)
    pub perimeter: u32,
}

impl Region {
    /// Width/height ratio
    pub fn aspect(&self) -> f32 {
        self.bbox.width as f32 / self.bbox.height as f32
    }

    /// Height/width ratio
    pub fn tallness(&self) -> f32 {
        self.bbox.height as f32 / self.bbox.width as f32
    }

    /// 4*pi*area / perimeter^2; close to 1 for circular shapes
    pub fn circularity(&self) -> f32 {
        if self.perimeter == 0 {
            return 0.0;
        }
        4.0 * std::f32::consts::PI * self.area as f32 / (self.perimeter * self.perimeter) as f32
    }
}

/// Extract connected components with area, bounding box and outer perimeter
///
/// The perimeter counts only pixels bordering the exterior background
/// (background reachable from the image edge), so enclosed holes do not
/// inflate it. Regions are returned in left-to-right, top-to-bottom order.
pub fn find_regions(image: &BinaryImage) -> Vec<Region> {
    let gray = image.to_gray();
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let labeled = connected_components(&gray, Connectivity::Eight, Luma([0u8]));
    let exterior = exterior_mask(image);

    let mut stats: HashMap<u32, (u32, u32, u32, u32, u32, u32)> = HashMap::new();

    for (x, y, label) in labeled.enumerate_pixels() {
        let label_val = label[0];
        if label_val == 0 {
            continue;
        }

        let on_border = is_outer_border(image, &exterior, x, y);

        stats
            .entry(label_val)
            .and_modify(|(min_x, min_y, max_x, max_y, count, perim)| {
                *min_x = (*min_x).min(x);
                *min_y = (*min_y).min(y);
                *max_x = (*max_x).max(x);
                *max_y = (*max_y).max(y);
                *count += 1;
                if on_border {
                    *perim += 1;
                }
            })
            .or_insert((x, y, x, y, 1, u32::from(on_border)));
    }

    let mut regions: Vec<Region> = stats
        .into_values()
        .map(|(min_x, min_y, max_x, max_y, count, perim)| Region {
            bbox: BoundingBox {
                x: min_x,
                y: min_y,
                width: max_x - min_x + 1,
                height: max_y - min_y + 1,
            },
            area: count,
            perimeter: perim,
        })
        .collect();

    // HashMap order is arbitrary; keep the result deterministic
    regions.sort_by_key(|r| (r.bbox.x, r.bbox.y, r.bbox.width, r.bbox.height));
    regions
}

/// Background pixels reachable from the image edge (flood fill, 4-connected)
fn exterior_mask(image: &BinaryImage) -> ndarray::Array2<bool> {
    let h = image.height() as usize;
    let w = image.width() as usize;
    let mut mask = ndarray::Array2::from_elem((h, w), false);
    let mut queue = VecDeque::new();

    let seed = |mask: &mut ndarray::Array2<bool>, queue: &mut VecDeque<(usize, usize)>, x: usize, y: usize| {
        if !image.is_set(x as u32, y as u32) && !mask[[y, x]] {
            mask[[y, x]] = true;
            queue.push_back((x, y));
        }
    };

    for x in 0..w {
        seed(&mut mask, &mut queue, x, 0);
        seed(&mut mask, &mut queue, x, h - 1);
    }
    for y in 0..h {
        seed(&mut mask, &mut queue, 0, y);
        seed(&mut mask, &mut queue, w - 1, y);
    }

    while let Some((x, y)) = queue.pop_front() {
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            if nx < w && ny < h && !image.is_set(nx as u32, ny as u32) && !mask[[ny, nx]] {
                mask[[ny, nx]] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    mask
}

fn is_outer_border(
    image: &BinaryImage,
    exterior: &ndarray::Array2<bool>,
    x: u32,
    y: u32,
) -> bool {
    let w = image.width();
    let h = image.height();
    if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
        return true;
    }
    exterior[[(y - 1) as usize, x as usize]]
        || exterior[[(y + 1) as usize, x as usize]]
        || exterior[[y as usize, (x - 1) as usize]]
        || exterior[[y as usize, (x + 1) as usize]]
}

/// Morphological opening with a 1-pixel-wide vertical line element:
/// keeps vertical foreground runs of at least `min_run` pixels
pub fn vertical_line_open(image: &BinaryImage, min_run: usize) -> BinaryImage {
    let mut result = BinaryImage::new(image.width(), image.height());
    let h = image.height() as usize;

    for x in 0..image.width() {
        let mut run_start = 0usize;
        let mut run_len = 0usize;
        for y in 0..=h {
            let set = y < h && image.is_set(x, y as u32);
            if set {
                if run_len == 0 {
                    run_start = y;
                }
                run_len += 1;
            } else {
                if run_len >= min_run {
                    for yy in run_start..run_start + run_len {
                        result.set(x, yy as u32, true);
                    }
                }
                run_len = 0;
            }
        }
    }

    result
}

/// Morphological opening with a 1-pixel-tall horizontal line element:
/// keeps horizontal foreground runs of at least `min_run` pixels
pub fn horizontal_line_open(image: &BinaryImage, min_run: usize) -> BinaryImage {
    let mut result = BinaryImage::new(image.width(), image.height());
    let w = image.width() as usize;

    for y in 0..image.height() {
        let mut run_start = 0usize;
        let mut run_len = 0usize;
        for x in 0..=w {
            let set = x < w && image.is_set(x as u32, y);
            if set {
                if run_len == 0 {
                    run_start = x;
                }
                run_len += 1;
            } else {
                if run_len >= min_run {
                    for xx in run_start..run_start + run_len {
                        result.set(xx as u32, y, true);
                    }
                }
                run_len = 0;
            }
        }
    }

    result
}

/// Run every classifier over the staff-erased image
pub fn detect_candidates(
    erased: &BinaryImage,
    original: &BinaryImage,
    layout: &StaffLayout,
    config: &Config,
) -> CandidateSet {
    let regions = find_regions(erased);

    CandidateSet {
        heads: heads::detect_note_heads(&regions, erased, original, layout, &config.note_heads),
        stems: stems::detect_stems(erased, &config.stems),
        beams: beams::detect_beams(erased, &config.beams),
        accidentals: accidentals::detect_accidentals(&regions, erased, &config.accidentals),
        rests: rests::detect_rests(&regions, &config.rests),
    }
}
