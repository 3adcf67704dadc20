//! Image loading, preprocessing and the binary pixel grid

use crate::config::PreprocessConfig;
use crate::error::{OmrError, Result as OmrResult};
use image::{GrayImage, Luma};
use imageproc::contrast::{adaptive_threshold, otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::morphology::open;
use ndarray::Array2;
use std::path::Path;

/// Foreground pixel value in binary grids
pub const FG: u8 = 255;

/// Binary (foreground/background) pixel grid
///
/// Foreground pixels are 255, background 0. Rows are y, columns are x,
/// matching the `[[y, x]]` indexing of the backing array.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryImage {
    pixels: Array2<u8>,
}

impl BinaryImage {
    /// Create an all-background image
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: Array2::zeros((height as usize, width as usize)),
        }
    }

    /// Build from a grayscale image; any non-zero pixel is foreground
    pub fn from_gray(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        let mut pixels = Array2::zeros((height as usize, width as usize));
        for (x, y, p) in gray.enumerate_pixels() {
            if p[0] > 0 {
                pixels[[y as usize, x as usize]] = FG;
            }
        }
        Self { pixels }
    }

    /// Render back into a grayscale image
    pub fn to_gray(&self) -> GrayImage {
        let (h, w) = self.pixels.dim();
        let mut gray = GrayImage::new(w as u32, h as u32);
        for y in 0..h {
            for x in 0..w {
                if self.pixels[[y, x]] > 0 {
                    gray.put_pixel(x as u32, y as u32, Luma([FG]));
                }
            }
        }
        gray
    }

    pub fn width(&self) -> u32 {
        self.pixels.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.dim().0 as u32
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.pixels[[y as usize, x as usize]] > 0
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        self.pixels[[y as usize, x as usize]] = if on { FG } else { 0 };
    }

    pub fn pixels(&self) -> &Array2<u8> {
        &self.pixels
    }

    /// Count of foreground pixels per row
    pub fn row_projection(&self) -> Vec<f32> {
        let (h, w) = self.pixels.dim();
        let mut projection = vec![0.0; h];
        for y in 0..h {
            let mut count = 0u32;
            for x in 0..w {
                if self.pixels[[y, x]] > 0 {
                    count += 1;
                }
            }
            projection[y] = count as f32;
        }
        projection
    }

    /// Count of foreground pixels per column, restricted to a row band
    pub fn column_projection(&self, y_start: u32, y_end: u32) -> Vec<f32> {
        let (h, w) = self.pixels.dim();
        let y_start = (y_start as usize).min(h);
        let y_end = ((y_end as usize) + 1).min(h);
        let mut projection = vec![0.0; w];
        for x in 0..w {
            let mut count = 0u32;
            for y in y_start..y_end {
                if self.pixels[[y, x]] > 0 {
                    count += 1;
                }
            }
            projection[x] = count as f32;
        }
        projection
    }

    /// Foreground density inside a bounding box
    pub fn box_density(&self, x: u32, y: u32, width: u32, height: u32) -> f32 {
        if width == 0 || height == 0 {
            return 0.0;
        }
        let (h, w) = self.pixels.dim();
        let x_end = ((x + width) as usize).min(w);
        let y_end = ((y + height) as usize).min(h);
        let mut count = 0u32;
        for yy in (y as usize)..y_end {
            for xx in (x as usize)..x_end {
                if self.pixels[[yy, xx]] > 0 {
                    count += 1;
                }
            }
        }
        count as f32 / (width * height) as f32
    }
}

/// Load an image file as grayscale
pub fn load_image<P: AsRef<Path>>(path: P) -> OmrResult<GrayImage> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|e| OmrError::ImageLoadError(format!("{}: {}", path.display(), e)))?;
    Ok(img.to_luma8())
}

/// Check that a path looks like a readable image before running the pipeline
pub fn validate_image_file<P: AsRef<Path>>(path: P) -> OmrResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(OmrError::InputValidationError(format!(
            "input file '{}' does not exist",
            path.display()
        )));
    }
    if path.is_dir() {
        return Err(OmrError::InputValidationError(format!(
            "input '{}' is a directory",
            path.display()
        )));
    }
    let supported = ["png", "jpg", "jpeg", "bmp", "tiff", "tif"];
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !supported.contains(&ext.as_str()) {
        return Err(OmrError::UnsupportedImageFormat(format!(
            "'{}' is not a supported image extension",
            ext
        )));
    }
    Ok(())
}

/// Binarize a grayscale image, foreground = ink
pub fn binarize(gray: &GrayImage, config: &PreprocessConfig) -> OmrResult<GrayImage> {
    match config.threshold_method.as_str() {
        "adaptive" => {
            let mut binary = adaptive_threshold(gray, config.adaptive_block_radius);
            // adaptive_threshold keeps the bright side; ink is the dark side
            image::imageops::invert(&mut binary);
            Ok(binary)
        }
        "otsu" => {
            let level = otsu_level(gray);
            Ok(threshold(gray, level, ThresholdType::BinaryInverted))
        }
        "simple" => Ok(threshold(
            gray,
            config.simple_threshold,
            ThresholdType::BinaryInverted,
        )),
        other => Err(OmrError::PreprocessingError(format!(
            "unknown threshold method '{}'",
            other
        ))),
    }
}

/// Estimate the dominant skew angle in degrees via projection profiling
///
/// Sweeps candidate angles and scores each by the sharpness (sum of squared
/// bin counts) of the row projection the foreground pixels would have after
/// that rotation. Staff lines dominate a page, so the sharpest projection
/// marks the angle at which they run level. Candidates are visited from
/// small to large magnitude, so a straight page scores angle 0.
pub fn estimate_skew_angle(binary: &BinaryImage, config: &PreprocessConfig) -> f32 {
    let (h, w) = binary.pixels().dim();
    let mut points = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if binary.pixels()[[y, x]] > 0 {
                points.push((x as f32, y as f32));
            }
        }
    }
    if points.len() < 2 {
        return 0.0;
    }

    let step = config.deskew_step_deg.max(0.05);
    let steps = (config.deskew_search_deg / step).ceil() as i32;

    let mut candidates = vec![0.0f32];
    for i in 1..=steps {
        candidates.push(i as f32 * step);
        candidates.push(-(i as f32) * step);
    }

    let mut best_angle = 0.0f32;
    let mut best_score = 0.0f64;
    for angle in candidates {
        let score = projection_sharpness(&points, w, h, angle);
        if score > best_score {
            best_score = score;
            best_angle = angle;
        }
    }
    best_angle
}

fn projection_sharpness(points: &[(f32, f32)], width: usize, height: usize, angle_deg: f32) -> f64 {
    let theta = angle_deg.to_radians();
    let (sin, cos) = theta.sin_cos();

    // Rotated rows can fall outside [0, h); shift bins by the worst case
    let margin = (width as f32 * sin.abs()).ceil() as usize + 1;
    let mut bins = vec![0u32; height + 2 * margin];

    for &(x, y) in points {
        let row = x * sin + y * cos;
        let bin = (row.round() as i64 + margin as i64).clamp(0, bins.len() as i64 - 1);
        bins[bin as usize] += 1;
    }

    bins.iter().map(|&c| (c as f64) * (c as f64)).sum()
}

/// Rotate a binary image to correct skew; returns the corrected image and
/// the angle that was applied (0.0 when below the correction threshold)
pub fn deskew(binary: &BinaryImage, config: &PreprocessConfig) -> (BinaryImage, f32) {
    let angle = -estimate_skew_angle(binary, config);
    if angle.abs() <= config.deskew_min_angle_deg {
        return (binary.clone(), 0.0);
    }
    let gray = binary.to_gray();
    let rotated = rotate_about_center(
        &gray,
        (-angle).to_radians(),
        Interpolation::Nearest,
        Luma([0u8]),
    );
    (BinaryImage::from_gray(&rotated), angle)
}

/// Complete preprocessing pipeline: grayscale image to clean binary grid
pub fn preprocess(gray: &GrayImage, config: &PreprocessConfig) -> OmrResult<BinaryImage> {
    let blurred = if config.blur_sigma > 0.0 {
        gaussian_blur_f32(gray, config.blur_sigma)
    } else {
        gray.clone()
    };

    let binary = binarize(&blurred, config)?;

    let denoised = if config.noise_opening_radius > 0 {
        open(&binary, Norm::LInf, config.noise_opening_radius)
    } else {
        binary
    };

    let (deskewed, angle) = deskew(&BinaryImage::from_gray(&denoised), config);
    if angle.abs() > config.deskew_min_angle_deg {
        println!("Image was rotated by {:.2} degrees", angle);
    }

    Ok(deskewed)
}
