use image::{Rgba, RgbaImage, imageops};
use image::imageops::FilterType;

/// Center and uniformly scale a cut-out onto a fixed transparent canvas.
///
/// The subject is scaled by `min(target * fill / w, target * fill / h)` so
/// its longer side occupies `fill_fraction` of the canvas, resampled with
/// Catmull-Rom, and drawn centered. Inputs that are already a normalized
/// canvas are returned unchanged, so re-normalizing with the same
/// parameters is pixel-identical.
pub fn normalize_canvas(image: &RgbaImage, target_size: u32, fill_fraction: f32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let target_size = target_size.max(1);
    let canvas = RgbaImage::from_pixel(target_size, target_size, Rgba([0, 0, 0, 0]));
    if width == 0 || height == 0 {
        return canvas;
    }

    if is_normalized(image, target_size, fill_fraction) {
        return image.clone();
    }

    let fill = target_size as f32 * fill_fraction;
    let scale = (fill / width as f32).min(fill / height as f32);
    let scaled_w = ((width as f32 * scale) as u32).clamp(1, target_size);
    let scaled_h = ((height as f32 * scale) as u32).clamp(1, target_size);

    let scaled = imageops::resize(image, scaled_w, scaled_h, FilterType::CatmullRom);

    let mut canvas = canvas;
    let offset_x = (target_size - scaled_w) / 2;
    let offset_y = (target_size - scaled_h) / 2;
    imageops::overlay(&mut canvas, &scaled, offset_x.into(), offset_y.into());
    canvas
}

/// Bounding box of non-transparent pixels, as (x, y, width, height).
fn content_bbox(image: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let (width, height) = image.dimensions();
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut has_content = false;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] != 0 {
            has_content = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    has_content.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Whether the image already is a canvas produced by `normalize_canvas`
/// with the same parameters: target-sized, content centered, long side at
/// the fill fraction (within integer-rounding slack).
fn is_normalized(image: &RgbaImage, target_size: u32, fill_fraction: f32) -> bool {
    if image.dimensions() != (target_size, target_size) {
        return false;
    }
    let Some((x, y, w, h)) = content_bbox(image) else {
        // An all-transparent canvas of the right size renormalizes to itself
        return true;
    };
    let expected_long = target_size as f32 * fill_fraction;
    let long_side = w.max(h) as f32;
    let centered_x = (2 * x + w).abs_diff(target_size) <= 1;
    let centered_y = (2 * y + h).abs_diff(target_size) <= 1;
    centered_x && centered_y && (long_side - expected_long).abs() <= 1.0
}
