//! Staff line detection and staff geometry

use crate::config::StaffConfig;
use crate::raster::BinaryImage;
use serde::{Deserialize, Serialize};

/// A musical staff: five parallel lines defining pitch by vertical position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    /// Y-coordinates of the 5 staff lines, strictly increasing
    pub lines: [u32; 5],
    /// Average spacing between consecutive lines
    pub line_spacing: f32,
    pub x_start: u32,
    pub x_end: u32,
}

impl Staff {
    pub fn top(&self) -> u32 {
        self.lines[0]
    }

    pub fn bottom(&self) -> u32 {
        self.lines[4]
    }

    pub fn height(&self) -> u32 {
        self.bottom() - self.top()
    }

    pub fn contains_y(&self, y: u32) -> bool {
        self.top() <= y && y <= self.bottom()
    }

    /// Fractional position of a y-coordinate on this staff: 0 = top line,
    /// 4 = bottom line, half-integers = spaces
    pub fn position_of(&self, y: u32) -> f32 {
        (y as f32 - self.top() as f32) / self.line_spacing
    }
}

/// Detection result: the staves of one image plus the measured stroke width
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffLayout {
    pub staves: Vec<Staff>,
    pub line_thickness: u32,
}

impl StaffLayout {
    /// Find the first staff containing the y-coordinate and the fractional
    /// position on it. `None` for y outside every staff (off-staff ledger
    /// notes have no resolvable pitch context).
    pub fn staff_position(&self, y: u32) -> Option<(usize, f32)> {
        for (idx, staff) in self.staves.iter().enumerate() {
            if staff.contains_y(y) {
                return Some((idx, staff.position_of(y)));
            }
        }
        None
    }
}

/// Detect candidate staff-line rows via the horizontal projection profile
///
/// Rows whose normalized projection exceeds the threshold are line
/// candidates; consecutive candidates within `line_merge_px` collapse into
/// one line at their mean row.
pub fn detect_staff_lines(image: &BinaryImage, config: &StaffConfig) -> Vec<u32> {
    let projection = image.row_projection();
    let max_val = projection.iter().cloned().fold(0.0f32, f32::max);
    if max_val <= 0.0 {
        return Vec::new();
    }

    let candidates: Vec<u32> = projection
        .iter()
        .enumerate()
        .filter(|(_, &v)| v / max_val > config.projection_threshold)
        .map(|(y, _)| y as u32)
        .collect();

    let mut lines = Vec::new();
    if candidates.is_empty() {
        return lines;
    }

    let mut group: Vec<u32> = vec![candidates[0]];
    for &y in &candidates[1..] {
        if y - *group.last().unwrap() <= config.line_merge_px {
            group.push(y);
        } else {
            lines.push(mean_u32(&group));
            group = vec![y];
        }
    }
    lines.push(mean_u32(&group));

    lines
}

/// Estimate the staff-line stroke thickness
///
/// Samples a vertical strip at the image's horizontal midpoint around each
/// of the first five lines and takes the median foreground run length.
pub fn estimate_line_thickness(
    image: &BinaryImage,
    lines: &[u32],
    config: &StaffConfig,
) -> u32 {
    if lines.is_empty() || image.width() == 0 {
        return config.default_line_thickness;
    }

    let x = image.width() / 2;
    let probe = config.thickness_probe_rows;
    let mut thicknesses = Vec::new();

    for &line_y in lines.iter().take(5) {
        let y_start = line_y.saturating_sub(probe);
        let y_end = (line_y + probe).min(image.height().saturating_sub(1));
        let mut thickness = 0u32;
        for y in y_start..=y_end {
            if image.is_set(x, y) {
                thickness += 1;
            }
        }
        if thickness > 0 {
            thicknesses.push(thickness);
        }
    }

    if thicknesses.is_empty() {
        return config.default_line_thickness;
    }
    thicknesses.sort_unstable();
    thicknesses[thicknesses.len() / 2]
}

/// Group detected line rows into staves of 5 consistently spaced lines
///
/// A 5-line window is accepted when the gap standard deviation stays within
/// the spacing tolerance of the mean gap; accepted windows consume their 5
/// lines, rejected windows advance by one line so a single spurious
/// detection does not lose the staff.
pub fn group_lines_into_staves(
    lines: &[u32],
    image: &BinaryImage,
    config: &StaffConfig,
) -> Vec<Staff> {
    let mut staves = Vec::new();
    if lines.len() < 5 {
        return staves;
    }

    let mut i = 0;
    while i + 5 <= lines.len() {
        let window: [u32; 5] = lines[i..i + 5].try_into().unwrap();
        let gaps: Vec<f32> = (0..4)
            .map(|j| (window[j + 1] - window[j]) as f32)
            .collect();
        let mean_gap = gaps.iter().sum::<f32>() / 4.0;
        let variance = gaps.iter().map(|g| (g - mean_gap).powi(2)).sum::<f32>() / 4.0;
        let std_gap = variance.sqrt();

        if std_gap <= mean_gap * config.spacing_tolerance {
            if let Some((x_start, x_end)) = staff_x_extent(image, &window, config) {
                staves.push(Staff {
                    lines: window,
                    line_spacing: mean_gap,
                    x_start,
                    x_end,
                });
            }
            i += 5;
        } else {
            i += 1;
        }
    }

    staves
}

/// Horizontal extent of a staff from column sums within its line band
fn staff_x_extent(
    image: &BinaryImage,
    lines: &[u32; 5],
    config: &StaffConfig,
) -> Option<(u32, u32)> {
    let sums = image.column_projection(lines[0], lines[4]);
    let max_sum = sums.iter().cloned().fold(0.0f32, f32::max);
    if max_sum <= 0.0 {
        return None;
    }
    let threshold = max_sum * config.x_extent_threshold;
    let first = sums.iter().position(|&s| s > threshold)?;
    let last = sums.iter().rposition(|&s| s > threshold)?;
    Some((first as u32, last as u32))
}

/// Complete staff detection: line rows, stroke thickness, staff grouping
pub fn detect_staves(image: &BinaryImage, config: &StaffConfig) -> StaffLayout {
    let lines = detect_staff_lines(image, config);
    let line_thickness = estimate_line_thickness(image, &lines, config);
    let staves = group_lines_into_staves(&lines, image, config);

    println!("Detected {} staff/staves", staves.len());
    for (idx, staff) in staves.iter().enumerate() {
        println!(
            "  Staff {}: lines at {:?}, spacing={:.1}px",
            idx + 1,
            staff.lines,
            staff.line_spacing
        );
    }

    StaffLayout {
        staves,
        line_thickness,
    }
}

/// Return a copy of the image with all staff lines erased
///
/// For every staff line, rows within `line_thickness` of the line are
/// zeroed across the staff's x-extent. Content outside those bands is
/// untouched.
pub fn remove_staff_lines(image: &BinaryImage, layout: &StaffLayout) -> BinaryImage {
    let mut result = image.clone();
    let thickness = layout.line_thickness;

    for staff in &layout.staves {
        for &line_y in &staff.lines {
            let y_start = line_y.saturating_sub(thickness);
            let y_end = (line_y + thickness).min(image.height().saturating_sub(1));
            for y in y_start..=y_end {
                for x in staff.x_start..=staff.x_end.min(image.width().saturating_sub(1)) {
                    result.set(x, y, false);
                }
            }
        }
    }

    result
}

fn mean_u32(values: &[u32]) -> u32 {
    (values.iter().map(|&v| v as u64).sum::<u64>() / values.len() as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_of_lines_and_spaces() {
        let staff = Staff {
            lines: [40, 60, 80, 100, 120],
            line_spacing: 20.0,
            x_start: 0,
            x_end: 100,
        };
        assert!((staff.position_of(40) - 0.0).abs() < 1e-6);
        assert!((staff.position_of(120) - 4.0).abs() < 1e-6);
        assert!((staff.position_of(70) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_mean_of_merged_rows_truncates() {
        assert_eq!(mean_u32(&[40, 41]), 40);
        assert_eq!(mean_u32(&[10, 11, 12]), 11);
    }
}
