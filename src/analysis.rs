//! Border-color analysis for detecting boring wallpapers.

use std::path::Path;

use image::ImageResult;

/// Border pixels with a mean channel value above this count as white-ish.
const WHITE_BRIGHTNESS: u16 = 240;

/// Border pixels with a mean channel value below this count as black-ish.
const BLACK_BRIGHTNESS: u16 = 15;

/// Returns `true` when the image's border is predominantly one near-uniform
/// color (white or black).
///
/// Samples a border band of `min(10, width/20, height/20)` pixels along
/// every edge and classifies each pixel by mean brightness. The image is
/// boring when the white or black share of the band exceeds `threshold`.
/// Images too small to have a border band are never boring.
///
/// # Errors
///
/// Returns an error if the image cannot be opened or decoded.
#[allow(clippy::cast_precision_loss)]
pub fn is_boring_background(path: &Path, threshold: f64) -> ImageResult<bool> {
    let img = image::open(path)?.into_rgb8();
    let (width, height) = img.dimensions();

    let border = 10.min(width / 20).min(height / 20);
    if border == 0 {
        return Ok(false);
    }

    let in_border = |x: u32, y: u32| {
        x < border || x >= width - border || y < border || y >= height - border
    };

    let mut total: u64 = 0;
    let mut white: u64 = 0;
    let mut black: u64 = 0;
    for (x, y, pixel) in img.enumerate_pixels() {
        if !in_border(x, y) {
            continue;
        }
        total += 1;
        let [r, g, b] = pixel.0;
        let brightness = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
        if brightness > WHITE_BRIGHTNESS {
            white += 1;
        } else if brightness < BLACK_BRIGHTNESS {
            black += 1;
        }
    }

    let white_ratio = white as f64 / total as f64;
    let black_ratio = black as f64 / total as f64;
    let boring = white_ratio > threshold || black_ratio > threshold;

    if boring {
        let (color, ratio) = if white_ratio > black_ratio {
            ("white", white_ratio)
        } else {
            ("black", black_ratio)
        };
        log::info!(
            "Detected {color} background ({:.1}%): {}",
            ratio * 100.0,
            path.display()
        );
    }

    Ok(boring)
}
